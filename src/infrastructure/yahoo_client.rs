// Yahoo Finance client - Ticker price and change against the same hour yesterday
use crate::application::market_data::{FetchError, QuoteSource};
use crate::domain::quote::AssetQuote;
use crate::infrastructure::http::{get_json, parse_url};
use async_trait::async_trait;
use serde::Deserialize;

const DAY_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    client: reqwest::Client,
    api_host: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: String,
    #[serde(default)]
    short_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteIndicator>,
}

#[derive(Debug, Deserialize)]
struct QuoteIndicator {
    /// Hours without trades come back as null
    #[serde(default)]
    close: Vec<Option<f64>>,
}

impl YahooFinanceClient {
    pub fn new(client: reqwest::Client, api_host: String) -> Self {
        Self {
            client,
            api_host: api_host.trim_end_matches('/').to_string(),
        }
    }

    /// Two days of hourly candles
    fn build_url(&self, ticker: &str) -> Result<reqwest::Url, FetchError> {
        let mut url = parse_url(&format!(
            "{}/v8/finance/chart/{}",
            self.api_host,
            urlencoding::encode(ticker)
        ))?;
        url.query_pairs_mut()
            .append_pair("range", "2d")
            .append_pair("interval", "1h");
        Ok(url)
    }
}

fn quote_from_chart(ticker: &str, response: ChartResponse) -> Result<AssetQuote, FetchError> {
    let result = match response.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => {
            let reason = response
                .chart
                .error
                .map(|e| e.description)
                .unwrap_or_else(|| "empty chart".to_string());
            return Err(FetchError::Malformed(format!("no data for {}: {}", ticker, reason)));
        }
    };

    let closes = result
        .indicators
        .quote
        .into_iter()
        .next()
        .map(|q| q.close)
        .unwrap_or_default();

    let points: Vec<(i64, f64)> = result
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| close.map(|c| (*ts, c)))
        .collect();

    let (latest_ts, latest_price) = points
        .iter()
        .copied()
        .max_by_key(|(ts, _)| *ts)
        .ok_or_else(|| FetchError::Malformed(format!("no prices for {}", ticker)))?;

    let target_ts = latest_ts - DAY_SECS;
    let (_, previous_price) = points
        .iter()
        .copied()
        .find(|(ts, _)| *ts == target_ts)
        .ok_or_else(|| {
            FetchError::Malformed(format!(
                "no price for {} at the same hour 24 hours earlier ({})",
                ticker,
                chrono::DateTime::from_timestamp(target_ts, 0)
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| target_ts.to_string())
            ))
        })?;

    if previous_price == 0.0 {
        return Err(FetchError::Malformed(format!(
            "price for {} 24 hours earlier is zero",
            ticker
        )));
    }

    let change = (latest_price - previous_price) / previous_price * 100.0;
    let symbol = result
        .meta
        .short_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(result.meta.symbol)
        .replace('/', "");

    Ok(AssetQuote::new(symbol, latest_price, change))
}

#[async_trait]
impl QuoteSource for YahooFinanceClient {
    async fn quote(&self, ticker: &str) -> Result<AssetQuote, FetchError> {
        let url = self.build_url(ticker)?;
        let response: ChartResponse = get_json(&self.client, url).await?;
        quote_from_chart(ticker, response)
    }
}
