// CoinGecko client - Crypto prices and 24h change
use crate::application::market_data::{FetchError, QuoteSource};
use crate::domain::quote::AssetQuote;
use crate::infrastructure::http::{get_json, parse_url};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: reqwest::Client,
    api_host: String,
    vs_currency: String,
}

#[derive(Debug, Deserialize)]
struct MarketEntry {
    symbol: String,
    current_price: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
}

impl CoinGeckoClient {
    pub fn new(client: reqwest::Client, api_host: String, vs_currency: String) -> Self {
        Self {
            client,
            api_host: api_host.trim_end_matches('/').to_string(),
            vs_currency,
        }
    }

    fn build_url(&self, id: &str) -> Result<reqwest::Url, FetchError> {
        let mut url = parse_url(&format!("{}/coins/markets", self.api_host))?;
        url.query_pairs_mut()
            .append_pair("vs_currency", &self.vs_currency)
            .append_pair("ids", id);
        Ok(url)
    }
}

fn quote_from_markets(id: &str, entries: Vec<MarketEntry>) -> Result<AssetQuote, FetchError> {
    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed(format!("no market data for {}", id)))?;

    let price = entry
        .current_price
        .ok_or_else(|| FetchError::Malformed(format!("no current price for {}", id)))?;

    Ok(AssetQuote::new(
        entry.symbol.to_uppercase(),
        price,
        entry.price_change_percentage_24h.unwrap_or_default(),
    ))
}

#[async_trait]
impl QuoteSource for CoinGeckoClient {
    async fn quote(&self, id: &str) -> Result<AssetQuote, FetchError> {
        let url = self.build_url(id)?;
        let entries: Vec<MarketEntry> = get_json(&self.client, url).await?;
        quote_from_markets(id, entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<AssetQuote, FetchError> {
        let entries: Vec<MarketEntry> = serde_json::from_str(json).unwrap();
        quote_from_markets("bitcoin", entries)
    }

    #[test]
    fn test_build_url() {
        let client = CoinGeckoClient::new(
            reqwest::Client::new(),
            "https://api.coingecko.com/api/v3/".to_string(),
            "usd".to_string(),
        );

        let url = client.build_url("bitcoin").unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&ids=bitcoin"
        );
    }

    #[test]
    fn test_parse_market_entry() {
        let quote = parse(
            r#"[{"id": "bitcoin", "symbol": "btc", "name": "Bitcoin",
                 "current_price": 63215.1, "price_change_percentage_24h": -1.25}]"#,
        )
        .unwrap();

        assert_eq!(quote, AssetQuote::new("BTC".to_string(), 63_215.1, -1.25));
    }

    #[test]
    fn test_missing_change_counts_as_flat() {
        let quote = parse(r#"[{"symbol": "eth", "current_price": 2400.5}]"#).unwrap();
        assert_eq!(quote.change_24h_pct, 0.0);
    }

    #[test]
    fn test_unknown_id_is_malformed() {
        assert!(matches!(parse("[]"), Err(FetchError::Malformed(_))));
    }

    #[test]
    fn test_null_price_is_malformed() {
        let result = parse(r#"[{"symbol": "btc", "current_price": null}]"#);
        assert!(matches!(result, Err(FetchError::Malformed(_))));
    }
}
