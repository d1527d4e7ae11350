// Tiles - One repeatable fetch and compose unit per metric
use crate::application::market_data::{FetchError, QuoteSource, SubscriberSource};
use crate::domain::format::{format_change, format_price, format_subscribers};
use crate::domain::frame::{Background, Color, Frame};
use crate::domain::quote::AssetQuote;
use crate::domain::synthetic::{fake_quote, fake_subscribers};
use crate::infrastructure::config::Settings;
use async_trait::async_trait;
use std::sync::Arc;

const SUBSCRIBER_ROW: i32 = 18;
const SYMBOL_ROW: i32 = 16;
const PRICE_ROW: i32 = 23;

#[async_trait]
pub trait Tile: Send {
    fn label(&self) -> &str;

    /// Fetch a fresh reading. On error the previous reading is kept.
    async fn refresh(&mut self) -> Result<(), FetchError>;

    /// Describe the image for the last reading, if there is one
    fn compose(&self) -> Option<Frame>;
}

/// Sources the tiles pull from
#[derive(Clone)]
pub struct TileSources {
    pub subscribers: Arc<dyn SubscriberSource>,
    pub crypto: Arc<dyn QuoteSource>,
    pub finance: Arc<dyn QuoteSource>,
}

pub struct SubscriberTile {
    source: Arc<dyn SubscriberSource>,
    channel_id: String,
    label: String,
    last: Option<u64>,
    test_mode: bool,
    cycle: u64,
}

impl SubscriberTile {
    pub fn new(source: Arc<dyn SubscriberSource>, channel_id: String, test_mode: bool) -> Self {
        Self {
            source,
            label: format!("youtube:{}", channel_id),
            channel_id,
            last: None,
            test_mode,
            cycle: 0,
        }
    }
}

#[async_trait]
impl Tile for SubscriberTile {
    fn label(&self) -> &str {
        &self.label
    }

    async fn refresh(&mut self) -> Result<(), FetchError> {
        let count = if self.test_mode {
            fake_subscribers(self.cycle)
        } else {
            self.source.subscriber_count(&self.channel_id).await?
        };
        self.cycle += 1;

        tracing::debug!(tile = %self.label, count, "Fetched subscriber count");
        self.last = Some(count);
        Ok(())
    }

    fn compose(&self) -> Option<Frame> {
        let count = self.last?;
        Some(
            Frame::new(Background::Subscribers).line(
                format_subscribers(count),
                SUBSCRIBER_ROW,
                Color::WHITE,
            ),
        )
    }
}

/// Price tile, used for both crypto ids and market tickers
pub struct QuoteTile {
    source: Arc<dyn QuoteSource>,
    id: String,
    background: Background,
    label: String,
    last: Option<AssetQuote>,
    test_mode: bool,
    cycle: u64,
}

impl QuoteTile {
    pub fn new(
        source: Arc<dyn QuoteSource>,
        id: String,
        background: Background,
        test_mode: bool,
    ) -> Self {
        let kind = match background {
            Background::Crypto => "crypto",
            Background::Finance => "finance",
            Background::Subscribers => "quote",
        };
        Self {
            source,
            label: format!("{}:{}", kind, id),
            id,
            background,
            last: None,
            test_mode,
            cycle: 0,
        }
    }
}

#[async_trait]
impl Tile for QuoteTile {
    fn label(&self) -> &str {
        &self.label
    }

    async fn refresh(&mut self) -> Result<(), FetchError> {
        let quote = if self.test_mode {
            fake_quote(&self.id, self.cycle)
        } else {
            self.source.quote(&self.id).await?
        };
        self.cycle += 1;

        tracing::debug!(
            tile = %self.label,
            price = quote.price,
            change = %format_change(quote.change_24h_pct),
            "Fetched quote"
        );
        self.last = Some(quote);
        Ok(())
    }

    fn compose(&self) -> Option<Frame> {
        let quote = self.last.as_ref()?;
        let price_color = if quote.is_up() { Color::GREEN } else { Color::RED };

        Some(
            Frame::new(self.background)
                .line(quote.symbol.clone(), SYMBOL_ROW, Color::WHITE)
                .line(format_price(quote.price), PRICE_ROW, price_color),
        )
    }
}

/// Build the rotation from the `tiles` setting. Unknown names are skipped.
pub fn build_tiles(
    settings: &Settings,
    sources: &TileSources,
    test_mode: bool,
) -> Vec<Box<dyn Tile>> {
    let mut tiles: Vec<Box<dyn Tile>> = Vec::new();

    for name in settings.tile_names() {
        match name.as_str() {
            "yt" | "youtube" => {
                tiles.push(Box::new(SubscriberTile::new(
                    sources.subscribers.clone(),
                    settings.youtube_channel_id.clone(),
                    test_mode,
                )));
            }
            "crypto" => {
                for id in settings.crypto_ids() {
                    tiles.push(Box::new(QuoteTile::new(
                        sources.crypto.clone(),
                        id,
                        Background::Crypto,
                        test_mode,
                    )));
                }
            }
            "finance" => {
                for ticker in settings.finance_tickers() {
                    tiles.push(Box::new(QuoteTile::new(
                        sources.finance.clone(),
                        ticker,
                        Background::Finance,
                        test_mode,
                    )));
                }
            }
            other => {
                tracing::warn!("Unknown tile {:?} in settings, skipping", other);
            }
        }
    }

    tiles
}
