use crate::config::Settings;
use crate::core::client::ServerVerification;
use crate::utils::error::{ProbeError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional file-based overrides; every key may be omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub endpoints: EndpointsSection,
    pub files: FilesSection,
    pub brewery: BrewerySection,
    pub mtls: MtlsSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsSection {
    /// An empty string disables the proxy entirely.
    pub proxy_url: Option<String>,
    pub ca_url: Option<String>,
    pub brewery_url: Option<String>,
    pub mtls_url: Option<String>,
    pub ip_echo_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesSection {
    pub ca_bundle: Option<String>,
    pub cert: Option<String>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BrewerySection {
    pub city: Option<String>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MtlsSection {
    pub user_agent: Option<String>,
    pub insecure_skip_verify: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProbeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content)
            .map_err(|e| ProbeError::config(format!("TOML parsing error: {}", e)))
    }

    /// 替換環境變數 (例如 ${PROXY_HOST})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ProbeError::config(format!("invalid substitution pattern: {}", e)))?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_to(&self, settings: &mut Settings) {
        let endpoints = &mut settings.endpoints;
        if let Some(proxy) = &self.endpoints.proxy_url {
            endpoints.proxy_url = if proxy.trim().is_empty() {
                None
            } else {
                Some(proxy.clone())
            };
        }
        overlay(&mut endpoints.ca_url, &self.endpoints.ca_url);
        overlay(&mut endpoints.brewery_url, &self.endpoints.brewery_url);
        overlay(&mut endpoints.mtls_url, &self.endpoints.mtls_url);
        overlay(&mut endpoints.ip_echo_url, &self.endpoints.ip_echo_url);

        overlay(&mut settings.ca_bundle_path, &self.files.ca_bundle);
        overlay(&mut settings.cert_path, &self.files.cert);
        overlay(&mut settings.key_path, &self.files.key);

        overlay(&mut settings.city, &self.brewery.city);
        if let Some(per_page) = self.brewery.per_page {
            settings.per_page = per_page;
        }

        overlay(&mut settings.user_agent, &self.mtls.user_agent);
        if let Some(insecure) = self.mtls.insecure_skip_verify {
            settings.mtls_verification = if insecure {
                ServerVerification::InsecureTestOnly
            } else {
                ServerVerification::Verify
            };
        }
    }
}

fn overlay(target: &mut String, value: &Option<String>) {
    if let Some(value) = value {
        *target = value.clone();
    }
}
