// YouTube Data API client - Channel subscriber counts
use crate::application::market_data::{FetchError, SubscriberSource};
use crate::infrastructure::http::{get_json, parse_url};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct YoutubeClient {
    client: reqwest::Client,
    /// Channels endpoint, already carrying `part=statistics`
    api_host: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    statistics: ChannelStatistics,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelStatistics {
    /// Absent when the channel hides its count
    #[serde(default)]
    subscriber_count: Option<String>,
}

impl YoutubeClient {
    pub fn new(client: reqwest::Client, api_host: String, api_key: String) -> Self {
        Self {
            client,
            api_host,
            api_key,
        }
    }

    fn build_url(&self, channel_id: &str) -> Result<reqwest::Url, FetchError> {
        let mut url = parse_url(&self.api_host)?;
        url.query_pairs_mut()
            .append_pair("id", channel_id)
            .append_pair("key", &self.api_key);
        Ok(url)
    }
}

fn subscribers_from_response(
    channel_id: &str,
    response: ChannelListResponse,
) -> Result<u64, FetchError> {
    let item = response
        .items
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed(format!("channel {} not found", channel_id)))?;

    let raw = item.statistics.subscriber_count.ok_or_else(|| {
        FetchError::Malformed(format!("channel {} hides its subscriber count", channel_id))
    })?;

    raw.parse::<u64>()
        .map_err(|e| FetchError::Malformed(format!("subscriber count {:?}: {}", raw, e)))
}

#[async_trait]
impl SubscriberSource for YoutubeClient {
    async fn subscriber_count(&self, channel_id: &str) -> Result<u64, FetchError> {
        let url = self.build_url(channel_id)?;
        let response: ChannelListResponse = get_json(&self.client, url).await?;
        subscribers_from_response(channel_id, response)
    }
}
