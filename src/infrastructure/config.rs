use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Process-wide settings, read once at startup.
///
/// Values come from `config/pixeltracker.toml` if present, overridden by
/// `SUBS_*` environment variables (e.g. `SUBS_REFRESH_TIME=60`).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct Settings {
    // YouTube
    pub youtube_api_host: String,
    pub youtube_channel_id: String,
    pub youtube_api_key: String,

    // Crypto
    pub crypto_api_host: String,
    /// CoinGecko ids, comma separated
    pub crypto_currencies: String,
    pub crypto_vs_currency: String,

    // Finance
    pub finance_api_host: String,
    /// Yahoo Finance tickers, comma separated
    pub finance_tickers: String,

    // General
    /// Tile kinds in rotation order: yt, crypto, finance
    pub tiles: String,
    /// Seconds each tile stays on screen
    pub refresh_time: u64,
    pub http_timeout: u64,
    pub log_level: String,
    pub server_host: String,
    pub server_port: u16,

    // Display
    pub screen_size: u32,
    pub resources_dir: Option<String>,
    pub message_font: Option<String>,
    pub display_command: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            youtube_api_host: "https://www.googleapis.com/youtube/v3/channels?part=statistics"
                .to_string(),
            youtube_channel_id: String::new(),
            youtube_api_key: String::new(),
            crypto_api_host: "https://api.coingecko.com/api/v3".to_string(),
            crypto_currencies: "bitcoin,ethereum".to_string(),
            crypto_vs_currency: "usd".to_string(),
            finance_api_host: "https://query1.finance.yahoo.com".to_string(),
            finance_tickers: "GC=F,EURUSD=X".to_string(),
            tiles: "crypto,finance".to_string(),
            refresh_time: 30,
            http_timeout: 10,
            log_level: "info".to_string(),
            server_host: "0.0.0.0".to_string(),
            server_port: 9191,
            screen_size: 32,
            resources_dir: None,
            message_font: None,
            display_command: "idotmatrix".to_string(),
        }
    }
}

impl Settings {
    pub fn tile_names(&self) -> Vec<String> {
        split_list(&self.tiles)
            .into_iter()
            .map(|name| name.to_lowercase())
            .collect()
    }

    pub fn crypto_ids(&self) -> Vec<String> {
        split_list(&self.crypto_currencies)
    }

    pub fn finance_tickers(&self) -> Vec<String> {
        split_list(&self.finance_tickers)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_time.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout.max(1))
    }

    pub fn resources_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.resources_dir)
    }

    pub fn message_font_path(&self) -> Option<PathBuf> {
        non_empty_path(&self.message_font)
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/pixeltracker").required(false))
        .add_source(config::Environment::with_prefix("SUBS"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Split a comma separated setting, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty_path(value: &Option<String>) -> Option<PathBuf> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Config, File, FileFormat};

    fn from_toml(toml: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_apply_to_missing_keys() {
        let settings = from_toml("refresh_time = 45");

        assert_eq!(settings.refresh_interval(), Duration::from_secs(45));
        assert_eq!(settings.server_port, 9191);
        assert_eq!(settings.tile_names(), vec!["crypto", "finance"]);
        assert_eq!(settings.crypto_ids(), vec!["bitcoin", "ethereum"]);
        assert_eq!(settings.finance_tickers(), vec!["GC=F", "EURUSD=X"]);
    }

    #[test]
    fn test_overrides_from_file() {
        let settings = from_toml(
            r#"
            tiles = "YT, finance"
            youtube_channel_id = "UC123"
            resources_dir = "/opt/pixeltracker/resources"
            message_font = "  "
            "#,
        );

        assert_eq!(settings.tile_names(), vec!["yt", "finance"]);
        assert_eq!(settings.youtube_channel_id, "UC123");
        assert_eq!(
            settings.resources_path(),
            Some(PathBuf::from("/opt/pixeltracker/resources"))
        );
        assert_eq!(settings.message_font_path(), None);
    }

    #[test]
    fn test_split_list_drops_blanks() {
        assert_eq!(split_list(" a, ,b,,c "), vec!["a", "b", "c"]);
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_zero_refresh_is_clamped() {
        let mut settings = Settings::default();
        settings.refresh_time = 0;
        assert_eq!(settings.refresh_interval(), Duration::from_secs(1));
    }
}
