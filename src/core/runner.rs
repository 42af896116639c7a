use crate::config::Settings;
use crate::core::brewery::fetch_breweries;
use crate::core::ca::fetch_ca_certificate;
use crate::core::client::{build_proxied_client, build_transport_client};
use crate::core::mtls::fetch_mtls_endpoint;
use crate::core::{Brewery, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// What each enabled command path produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub ca_bytes: Option<u64>,
    pub breweries: Option<Vec<Brewery>>,
    pub brewery_error: Option<String>,
    pub mtls_body: Option<String>,
}

/// Runs the enabled command paths in a fixed order: CA download, brewery
/// listing, mTLS request.
///
/// Only the brewery request is allowed to fail softly. Every other error,
/// including building the brewery client, ends the run.
pub struct ProbeRunner<S: Storage> {
    settings: Settings,
    storage: S,
    monitor: SystemMonitor,
}

impl<S: Storage> ProbeRunner<S> {
    pub fn new(settings: Settings, storage: S) -> Self {
        Self::new_with_monitoring(settings, storage, false)
    }

    pub fn new_with_monitoring(settings: Settings, storage: S, enable_monitoring: bool) -> Self {
        Self {
            settings,
            storage,
            monitor: SystemMonitor::new(enable_monitoring),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        if !self.settings.any_action() {
            tracing::warn!("Nothing to do; pass --getca, --getbrews or --gettrash");
            return Ok(summary);
        }

        // 下載 CA 憑證
        if self.settings.fetch_ca {
            summary.ca_bytes = Some(self.download_ca().await?);
            self.monitor.log_stats("getca");
        }

        // 透過代理取得酒廠清單
        if self.settings.fetch_breweries {
            let (breweries, error) = self.list_breweries().await?;
            summary.breweries = Some(breweries);
            summary.brewery_error = error;
            self.monitor.log_stats("getbrews");
        }

        // mTLS 請求
        if self.settings.fetch_mtls {
            let body = fetch_mtls_endpoint(&self.settings, &self.storage).await?;
            println!("{}", body);
            summary.mtls_body = Some(body);
            self.monitor.log_stats("gettrash");
        }

        self.monitor.log_final_stats();
        Ok(summary)
    }

    async fn download_ca(&self) -> Result<u64> {
        let client = build_transport_client(&self.settings)?;
        fetch_ca_certificate(
            &client,
            &self.settings.endpoints.ca_url,
            &self.storage,
            &self.settings.ca_bundle_path,
        )
        .await
    }

    async fn list_breweries(&self) -> Result<(Vec<Brewery>, Option<String>)> {
        let client = build_proxied_client(&self.settings, &self.storage).await?;

        let (breweries, error) = match fetch_breweries(&client, &self.settings).await {
            Ok(breweries) => (breweries, None),
            Err(e) => {
                tracing::error!("Brewery request failed: {}", e);
                println!("Error getting breweries for {}: {}", self.settings.city, e);
                (Vec::new(), Some(e.to_string()))
            }
        };

        if breweries.is_empty() {
            println!("[]");
        }
        for brewery in &breweries {
            println!("{}", brewery);
        }

        Ok((breweries, error))
    }
}
