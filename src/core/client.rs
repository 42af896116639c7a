use crate::config::Settings;
use crate::core::Storage;
use crate::utils::error::{ProbeError, Result};
use crate::utils::validation::validate_required_field;
use reqwest::{Certificate, Client, ClientBuilder, Identity, Proxy};

/// How the mTLS client treats the server's certificate chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerVerification {
    #[default]
    Verify,
    /// Accepts any server certificate. Only for self-signed test endpoints.
    InsecureTestOnly,
}

/// A client TLS identity assembled from a certificate/key PEM pair.
#[derive(Clone)]
pub struct ClientCredentials {
    identity: Identity,
}

impl ClientCredentials {
    pub async fn load<S: Storage>(storage: &S, cert_path: &str, key_path: &str) -> Result<Self> {
        let cert = storage
            .read_file(cert_path)
            .await
            .map_err(|e| ProbeError::CredentialsError {
                reason: format!("cannot read certificate {}: {}", cert_path, e),
            })?;
        let key = storage
            .read_file(key_path)
            .await
            .map_err(|e| ProbeError::CredentialsError {
                reason: format!("cannot read key {}: {}", key_path, e),
            })?;

        let mut pem = key;
        pem.push(b'\n');
        pem.extend_from_slice(&cert);

        let identity = Identity::from_pem(&pem).map_err(|e| ProbeError::CredentialsError {
            reason: format!("{} / {} is not a usable key pair: {}", cert_path, key_path, e),
        })?;

        // 只有建置 TLS 設定時才會比對憑證與私鑰是否成對
        Client::builder()
            .no_proxy()
            .identity(identity.clone())
            .build()
            .map_err(|e| ProbeError::CredentialsError {
                reason: format!(
                    "{} and {} do not form a matching key pair: {}",
                    cert_path, key_path, e
                ),
            })?;

        tracing::debug!("Loaded client credentials from {} and {}", cert_path, key_path);
        Ok(Self { identity })
    }
}

/// Reads every PEM certificate in the bundle at `path`.
pub async fn load_ca_bundle<S: Storage>(storage: &S, path: &str) -> Result<Vec<Certificate>> {
    let pem = storage
        .read_file(path)
        .await
        .map_err(|e| ProbeError::CertificateError {
            path: path.to_string(),
            reason: e.to_string(),
        })?;

    let certs = Certificate::from_pem_bundle(&pem).map_err(|e| ProbeError::CertificateError {
        path: path.to_string(),
        reason: e.to_string(),
    })?;

    if certs.is_empty() {
        return Err(ProbeError::CertificateError {
            path: path.to_string(),
            reason: "no PEM certificates found".to_string(),
        });
    }

    tracing::debug!("Loaded {} CA certificate(s) from {}", certs.len(), path);
    Ok(certs)
}

fn apply_proxy(builder: ClientBuilder, proxy_url: Option<&str>) -> Result<ClientBuilder> {
    match proxy_url {
        Some(url) => {
            tracing::debug!("Routing requests through proxy {}", url);
            Ok(builder.proxy(Proxy::all(url)?))
        }
        // 明確停用代理，忽略 HTTP(S)_PROXY 環境變數
        None => Ok(builder.no_proxy()),
    }
}

fn apply_verification(builder: ClientBuilder, verification: ServerVerification) -> ClientBuilder {
    match verification {
        ServerVerification::Verify => builder,
        ServerVerification::InsecureTestOnly => {
            tracing::warn!(
                "⚠️ Server certificate verification is DISABLED (test-only override)"
            );
            builder.danger_accept_invalid_certs(true)
        }
    }
}

fn add_roots(mut builder: ClientBuilder, roots: Vec<Certificate>) -> ClientBuilder {
    for cert in roots {
        builder = builder.add_root_certificate(cert);
    }
    builder
}

/// Proxy-only client with the default trust roots.
pub fn build_transport_client(settings: &Settings) -> Result<Client> {
    let builder = apply_proxy(Client::builder(), settings.endpoints.proxy_url.as_deref())?;
    Ok(builder.build()?)
}

/// Proxied client that additionally trusts the local CA bundle.
pub async fn build_proxied_client<S: Storage>(settings: &Settings, storage: &S) -> Result<Client> {
    let roots = load_ca_bundle(storage, &settings.ca_bundle_path).await?;
    let builder = add_roots(Client::builder(), roots);
    let builder = apply_proxy(builder, settings.endpoints.proxy_url.as_deref())?;
    Ok(builder.build()?)
}

pub async fn build_mtls_client<S: Storage>(
    settings: &Settings,
    storage: &S,
    credentials: Option<ClientCredentials>,
) -> Result<Client> {
    let mut builder = Client::builder();

    if settings.use_proxy {
        let proxy = validate_required_field("endpoints.proxy_url", &settings.endpoints.proxy_url)?;
        let roots = load_ca_bundle(storage, &settings.ca_bundle_path).await?;
        builder = apply_proxy(add_roots(builder, roots), Some(proxy.as_str()))?;
    } else {
        builder = builder.no_proxy();
    }

    if let Some(credentials) = credentials {
        builder = builder.identity(credentials.identity);
    }

    builder = apply_verification(builder, settings.mtls_verification);
    Ok(builder.build()?)
}
