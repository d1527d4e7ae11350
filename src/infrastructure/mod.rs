// Infrastructure layer - External dependencies and adapters
pub mod coingecko_client;
pub mod command_display;
pub mod config;
pub mod http;
pub mod image_renderer;
pub mod preview_display;
pub mod yahoo_client;
pub mod youtube_client;
