use crate::config::Settings;
use crate::core::ip_echo::fetch_apparent_ip;
use crate::core::Brewery;
use crate::utils::error::{ProbeError, Result};
use reqwest::Client;
use url::Url;

pub fn brewery_query_url(base: &str, city: &str, per_page: u32) -> Result<Url> {
    let mut url = Url::parse(base)?;
    url.query_pairs_mut()
        .append_pair("by_city", city)
        .append_pair("per_page", &per_page.to_string());
    Ok(url)
}

/// Lists breweries for `settings.city` through `client`.
///
/// Prints the query URL and the apparent caller IP first; an unreachable IP
/// echo service is only a warning.
pub async fn fetch_breweries(client: &Client, settings: &Settings) -> Result<Vec<Brewery>> {
    let url = brewery_query_url(
        &settings.endpoints.brewery_url,
        &settings.city,
        settings.per_page,
    )?;
    println!("{}", url);

    // 顯示對外 IP
    match fetch_apparent_ip(client, &settings.endpoints.ip_echo_url).await {
        Ok(Some(ip)) => println!("{}", ip),
        Ok(None) => tracing::warn!("IP echo service did not return an address"),
        Err(e) => tracing::warn!("Could not determine apparent IP: {}", e),
    }

    tracing::debug!("Making API request to: {}", url);
    let response = client.get(url.as_str()).send().await?;

    let status = response.status();
    tracing::debug!("API response status: {}", status);
    if !status.is_success() {
        return Err(ProbeError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    // 解析 JSON 陣列
    let body = response.bytes().await?;
    let breweries: Vec<Brewery> = serde_json::from_slice(&body)?;
    tracing::info!("Fetched {} breweries for {}", breweries.len(), settings.city);

    Ok(breweries)
}
