use crate::config::Settings;
use crate::core::client::{build_mtls_client, ClientCredentials};
use crate::core::Storage;
use crate::utils::error::Result;
use reqwest::header::USER_AGENT;

fn connection_banner(settings: &Settings) -> String {
    let target = &settings.endpoints.mtls_url;
    if settings.use_proxy {
        let proxy = settings
            .endpoints
            .proxy_url
            .as_deref()
            .unwrap_or("<not configured>");
        format!("Connecting to {} using proxy: {}", target, proxy)
    } else {
        format!("Connecting to {} without proxy", target)
    }
}

/// Sends one GET to the mTLS endpoint and returns the body as text.
///
/// Credentials are loaded before the client is built, so a missing or broken
/// key pair fails without any network traffic. The response status is logged
/// but not checked; the endpoint's error pages are useful output too.
pub async fn fetch_mtls_endpoint<S: Storage>(settings: &Settings, storage: &S) -> Result<String> {
    let target = &settings.endpoints.mtls_url;
    println!("{}", connection_banner(settings));

    let credentials = if settings.no_certs {
        tracing::info!("Sending request without client credentials");
        None
    } else {
        Some(ClientCredentials::load(storage, &settings.cert_path, &settings.key_path).await?)
    };

    let client = build_mtls_client(settings, storage, credentials).await?;

    let response = client
        .get(target)
        .header(USER_AGENT, &settings.user_agent)
        .send()
        .await?;
    tracing::debug!("mTLS endpoint response status: {}", response.status());

    let body = response.bytes().await?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}
