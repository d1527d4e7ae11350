// Shared HTTP client for the data fetchers
use crate::application::market_data::FetchError;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("pixeltracker/", env!("CARGO_PKG_VERSION"));

pub fn build_http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// GET a URL and decode its JSON body
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: reqwest::Url,
) -> Result<T, FetchError> {
    tracing::debug!(host = url.host_str().unwrap_or_default(), path = url.path(), "GET");

    let response = client
        .get(url)
        .header("Accept", "application/json")
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(FetchError::Status { status, body });
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Parse a configured base URL
pub fn parse_url(raw: &str) -> Result<reqwest::Url, FetchError> {
    reqwest::Url::parse(raw)
        .map_err(|e| FetchError::Malformed(format!("invalid url {:?}: {}", raw, e)))
}
