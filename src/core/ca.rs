use crate::core::Storage;
use crate::utils::error::{ProbeError, Result};
use reqwest::Client;

/// Downloads the proxy's CA certificate and replaces `dest` with it.
///
/// The body is read chunk by chunk and only written once the transfer is
/// complete, so a failed or empty download never clobbers a working bundle.
/// Returns the number of bytes written.
pub async fn fetch_ca_certificate<S: Storage>(
    client: &Client,
    url: &str,
    storage: &S,
    dest: &str,
) -> Result<u64> {
    tracing::info!("Fetching CA certificate from {}", url);
    let mut response = client.get(url).send().await?;

    let status = response.status();
    tracing::debug!("CA endpoint response status: {}", status);
    if !status.is_success() {
        return Err(ProbeError::UnexpectedStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    // 逐塊讀取回應內容
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        body.extend_from_slice(&chunk);
    }

    if body.is_empty() {
        return Err(ProbeError::EmptyBody {
            url: url.to_string(),
        });
    }

    // 覆寫本地 CA 檔案
    storage.write_file(dest, &body).await?;
    tracing::info!("Wrote {} bytes to {}", body.len(), dest);

    Ok(body.len() as u64)
}
