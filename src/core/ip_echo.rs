use crate::utils::error::Result;
use reqwest::{Client, StatusCode};

/// Asks an IP-echo service which address our requests appear to come from.
/// Through the proxy this is the proxy's egress address.
pub async fn fetch_apparent_ip(client: &Client, url: &str) -> Result<Option<String>> {
    let response = client.get(url).send().await?;

    if response.status() != StatusCode::OK {
        tracing::debug!("IP echo at {} answered {}", url, response.status());
        return Ok(None);
    }

    let body = response.text().await?;
    Ok(Some(body.trim().to_string()))
}
