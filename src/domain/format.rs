// Number formatting for the tiny pixel canvas

/// Longest price string that still fits a 32px canvas with a 4px font.
const PRICE_GLYPHS: usize = 8;
const MAX_PRICE_DECIMALS: usize = 5;

/// Format a subscriber count with a K/M suffix and a comma decimal separator.
///
/// Digits are truncated, never rounded, so a channel never shows a milestone
/// before it has actually reached it: 12,345 -> "12,3K", 1,999,999 -> "1,99M".
pub fn format_subscribers(count: u64) -> String {
    compact(count, ',')
}

/// Format a price so it fits the canvas, trimming trailing zeros.
pub fn format_price(price: f64) -> String {
    let magnitude = price.abs();
    if magnitude >= 100_000.0 {
        let sign = if price < 0.0 { "-" } else { "" };
        return format!("{}{}", sign, compact(magnitude as u64, '.'));
    }

    let int_digits = (magnitude.trunc() as u64).to_string().len();
    let sign_width = usize::from(price < 0.0);
    // Leave one glyph for the decimal point.
    let decimals = PRICE_GLYPHS
        .saturating_sub(int_digits + sign_width + 1)
        .min(MAX_PRICE_DECIMALS);

    let formatted = format!("{:.*}", decimals, price);
    trim_decimals(&formatted)
}

/// Format a 24h percentage change with an explicit sign.
pub fn format_change(change_pct: f64) -> String {
    if change_pct >= 0.0 {
        format!("+{:.2}%", change_pct)
    } else {
        format!("{:.2}%", change_pct)
    }
}

fn compact(value: u64, separator: char) -> String {
    let (scaled_by, suffix) = match value {
        0..=999 => return value.to_string(),
        1_000..=999_999 => (1_000, 'K'),
        _ => (1_000_000, 'M'),
    };

    let whole = value / scaled_by;
    let decimals: u32 = match whole {
        0..=9 => 2,
        10..=99 => 1,
        _ => 0,
    };

    if decimals == 0 {
        return format!("{}{}", whole, suffix);
    }

    let fraction = (value % scaled_by) / (scaled_by / 10u64.pow(decimals));
    format!(
        "{}{}{:0width$}{}",
        whole,
        separator,
        fraction,
        suffix,
        width = decimals as usize
    )
}

fn trim_decimals(formatted: &str) -> String {
    if !formatted.contains('.') {
        return formatted.to_string();
    }
    formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribers_below_thousand_are_plain() {
        assert_eq!(format_subscribers(0), "0");
        assert_eq!(format_subscribers(7), "7");
        assert_eq!(format_subscribers(999), "999");
    }

    #[test]
    fn test_subscribers_thousands_bands() {
        assert_eq!(format_subscribers(1_000), "1,00K");
        assert_eq!(format_subscribers(1_234), "1,23K");
        assert_eq!(format_subscribers(12_345), "12,3K");
        assert_eq!(format_subscribers(99_999), "99,9K");
        assert_eq!(format_subscribers(123_456), "123K");
        assert_eq!(format_subscribers(999_999), "999K");
    }

    #[test]
    fn test_subscribers_millions_bands() {
        assert_eq!(format_subscribers(1_234_567), "1,23M");
        assert_eq!(format_subscribers(1_999_999), "1,99M");
        assert_eq!(format_subscribers(12_345_678), "12,3M");
        assert_eq!(format_subscribers(123_456_789), "123M");
        assert_eq!(format_subscribers(2_500_000_000), "2500M");
    }

    #[test]
    fn test_subscribers_keep_leading_zero_in_fraction() {
        assert_eq!(format_subscribers(1_050), "1,05K");
        assert_eq!(format_subscribers(10_050), "10,0K");
        assert_eq!(format_subscribers(3_004_000), "3,00M");
    }

    #[test]
    fn test_price_fits_canvas() {
        assert_eq!(format_price(1.083_42), "1.08342");
        assert_eq!(format_price(2_345.678_9), "2345.679");
        assert_eq!(format_price(63_215.1), "63215.1");
        assert_eq!(format_price(2_400.0), "2400");
        assert_eq!(format_price(0.000_012_34), "0.00001");
    }

    #[test]
    fn test_price_large_values_are_compact() {
        assert_eq!(format_price(123_456.0), "123K");
        assert_eq!(format_price(1_234_567.0), "1.23M");
    }

    #[test]
    fn test_price_negative() {
        assert_eq!(format_price(-1.5), "-1.5");
    }

    #[test]
    fn test_change_has_sign() {
        assert_eq!(format_change(2.346), "+2.35%");
        assert_eq!(format_change(-0.4), "-0.40%");
        assert_eq!(format_change(0.0), "+0.00%");
    }
}
