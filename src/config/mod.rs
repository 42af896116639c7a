pub mod cli;
pub mod toml_config;

use crate::core::client::ServerVerification;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_url, Validate,
};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
#[cfg(feature = "cli")]
use std::path::PathBuf;

pub const DEFAULT_PROXY_URL: &str = "http://proxify:8888";
pub const DEFAULT_CA_URL: &str = "http://proxify/cacert.crt";
pub const DEFAULT_BREWERY_URL: &str = "https://api.openbrewerydb.org/breweries";
pub const DEFAULT_MTLS_URL: &str = "https://trashcan.undeadops.xyz/hello";
pub const DEFAULT_IP_ECHO_URL: &str = "http://ifconfig.me/ip";
pub const DEFAULT_CA_BUNDLE: &str = "rootCA.crt";
pub const DEFAULT_CLIENT_CERT: &str = "client.pem";
pub const DEFAULT_CLIENT_KEY: &str = "client-key.pem";
pub const DEFAULT_CITY: &str = "san_diego";
pub const DEFAULT_PER_PAGE: u32 = 5;
pub const DEFAULT_USER_AGENT: &str = "httpproxy/1.0";
pub const MAX_PER_PAGE: u32 = 200;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "proxify-probe")]
#[command(about = "Manual test harness for the proxify HTTP/HTTPS forward proxy")]
pub struct CliConfig {
    #[arg(long = "useproxy", help = "Use Proxify Proxy for the mTLS request")]
    pub use_proxy: bool,

    #[arg(long = "getca", help = "Download CA Certificate")]
    pub get_ca: bool,

    #[arg(long = "getbrews", help = "Use proxy to fetch list of breweries from api")]
    pub get_brews: bool,

    #[arg(long = "gettrash", help = "Fetch the mTLS test endpoint using client certs")]
    pub get_trash: bool,

    #[arg(long = "nocerts", help = "Do not supply TLS client credentials")]
    pub no_certs: bool,

    #[arg(long, help = "mTLS client certificate [default: client.pem]")]
    pub cert: Option<String>,

    #[arg(long, help = "mTLS client certificate key [default: client-key.pem]")]
    pub key: Option<String>,

    #[arg(long, help = "TOML file overriding endpoints and defaults")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "City to list breweries for [default: san_diego]")]
    pub city: Option<String>,

    #[arg(long, help = "Number of breweries to request [default: 5]")]
    pub per_page: Option<u32>,

    #[arg(long = "ca-file", help = "CA bundle path [default: rootCA.crt]")]
    pub ca_file: Option<String>,

    #[arg(
        long,
        help = "TEST ONLY: skip server certificate verification for the mTLS endpoint"
    )]
    pub insecure: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU/memory usage after each step")]
    pub monitor: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// `None` means every client connects directly.
    pub proxy_url: Option<String>,
    pub ca_url: String,
    pub brewery_url: String,
    pub mtls_url: String,
    pub ip_echo_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            proxy_url: Some(DEFAULT_PROXY_URL.to_string()),
            ca_url: DEFAULT_CA_URL.to_string(),
            brewery_url: DEFAULT_BREWERY_URL.to_string(),
            mtls_url: DEFAULT_MTLS_URL.to_string(),
            ip_echo_url: DEFAULT_IP_ECHO_URL.to_string(),
        }
    }
}

/// Resolved run configuration, built once and handed to every command path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoints: Endpoints,
    pub fetch_ca: bool,
    pub fetch_breweries: bool,
    pub fetch_mtls: bool,
    pub use_proxy: bool,
    pub no_certs: bool,
    pub cert_path: String,
    pub key_path: String,
    pub ca_bundle_path: String,
    pub city: String,
    pub per_page: u32,
    pub user_agent: String,
    pub mtls_verification: ServerVerification,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            fetch_ca: false,
            fetch_breweries: false,
            fetch_mtls: false,
            use_proxy: false,
            no_certs: false,
            cert_path: DEFAULT_CLIENT_CERT.to_string(),
            key_path: DEFAULT_CLIENT_KEY.to_string(),
            ca_bundle_path: DEFAULT_CA_BUNDLE.to_string(),
            city: DEFAULT_CITY.to_string(),
            per_page: DEFAULT_PER_PAGE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            mtls_verification: ServerVerification::Verify,
        }
    }
}

impl Settings {
    /// Defaults, then the TOML file named by `--config`, then explicit flags.
    #[cfg(feature = "cli")]
    pub fn resolve(cli: &CliConfig) -> Result<Self> {
        let mut settings = Settings::default();

        if let Some(path) = &cli.config {
            tracing::debug!("Loading config file {}", path.display());
            let file = toml_config::TomlConfig::from_file(path)?;
            file.apply_to(&mut settings);
        }

        cli.apply_to(&mut settings);
        Ok(settings)
    }

    pub fn any_action(&self) -> bool {
        self.fetch_ca || self.fetch_breweries || self.fetch_mtls
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn apply_to(&self, settings: &mut Settings) {
        settings.fetch_ca = self.get_ca;
        settings.fetch_breweries = self.get_brews;
        settings.fetch_mtls = self.get_trash;
        settings.use_proxy = self.use_proxy;
        settings.no_certs = self.no_certs;

        if let Some(cert) = &self.cert {
            settings.cert_path = cert.clone();
        }
        if let Some(key) = &self.key {
            settings.key_path = key.clone();
        }
        if let Some(ca_file) = &self.ca_file {
            settings.ca_bundle_path = ca_file.clone();
        }
        if let Some(city) = &self.city {
            settings.city = city.clone();
        }
        if let Some(per_page) = self.per_page {
            settings.per_page = per_page;
        }
        if self.insecure {
            settings.mtls_verification = ServerVerification::InsecureTestOnly;
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if let Some(proxy) = &self.endpoints.proxy_url {
            validate_url("endpoints.proxy_url", proxy)?;
        }
        validate_url("endpoints.ca_url", &self.endpoints.ca_url)?;
        validate_url("endpoints.brewery_url", &self.endpoints.brewery_url)?;
        validate_url("endpoints.mtls_url", &self.endpoints.mtls_url)?;
        validate_url("endpoints.ip_echo_url", &self.endpoints.ip_echo_url)?;

        validate_path("files.ca_bundle", &self.ca_bundle_path)?;
        if self.fetch_mtls && !self.no_certs {
            validate_path("files.cert", &self.cert_path)?;
            validate_path("files.key", &self.key_path)?;
        }

        validate_non_empty_string("brewery.city", &self.city)?;
        validate_range("brewery.per_page", self.per_page, 1, MAX_PER_PAGE)?;
        validate_non_empty_string("mtls.user_agent", &self.user_agent)?;

        Ok(())
    }
}

/// Rewrites Go-style `-flag` / `-flag=value` arguments into `--flag` so the
/// historical invocation (`proxify-probe -getca -useproxy`) keeps working.
pub fn normalize_go_style_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut normalized = Vec::new();
    let mut passthrough = false;

    for (index, arg) in args.into_iter().enumerate() {
        if index == 0 || passthrough {
            normalized.push(arg);
            continue;
        }

        let rewritten = match arg.to_str() {
            Some("--") => {
                passthrough = true;
                None
            }
            Some(s) if s.len() > 2 && s.starts_with('-') && !s.starts_with("--") => {
                Some(OsString::from(format!("-{}", s)))
            }
            _ => None,
        };

        normalized.push(rewritten.unwrap_or(arg));
    }

    normalized
}
