// Asset quote domain model

/// Latest price of a crypto currency or a market ticker.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetQuote {
    pub symbol: String,
    pub price: f64,
    pub change_24h_pct: f64,
}

impl AssetQuote {
    pub fn new(symbol: String, price: f64, change_24h_pct: f64) -> Self {
        Self {
            symbol,
            price,
            change_24h_pct,
        }
    }

    pub fn is_up(&self) -> bool {
        self.change_24h_pct >= 0.0
    }
}
