// Synthetic readings for test-data mode
use super::quote::AssetQuote;

const SUBSCRIBER_DIGITS: u32 = 9;

/// Fake subscriber count for the given refresh: 1, 12, 123, ... 123456789,
/// then around again. Walks through every formatting band.
pub fn fake_subscribers(cycle: u64) -> u64 {
    let digits = (cycle % SUBSCRIBER_DIGITS as u64) as u32 + 1;
    123_456_789 / 10u64.pow(SUBSCRIBER_DIGITS - digits)
}

/// Fake quote for the given refresh. Price magnitude and the sign of the
/// change rotate so both colours and several widths show up.
pub fn fake_quote(symbol: &str, cycle: u64) -> AssetQuote {
    let price = 98_765.432_1 / 10f64.powi((cycle % 5) as i32);
    let change = if cycle % 2 == 0 { 1.25 } else { -3.5 };
    AssetQuote::new(symbol.to_uppercase(), price, change)
}
