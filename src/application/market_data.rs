// Data source traits for tile readings
use crate::domain::quote::AssetQuote;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait SubscriberSource: Send + Sync {
    /// Current subscriber count of a channel
    async fn subscriber_count(&self, channel_id: &str) -> Result<u64, FetchError>;
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Latest price and 24h change for a crypto id or market ticker
    async fn quote(&self, id: &str) -> Result<AssetQuote, FetchError>;
}
