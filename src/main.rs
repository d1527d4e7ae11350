// Main entry point - CLI, dependency injection, server and display loop
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::display::DisplayAdapter;
use crate::application::message_service::MessageService;
use crate::application::rotation::RotationLoop;
use crate::application::tiles::{TileSources, build_tiles};
use crate::domain::message::Message;
use crate::infrastructure::coingecko_client::CoinGeckoClient;
use crate::infrastructure::command_display::CommandDisplay;
use crate::infrastructure::config::{Settings, load_settings};
use crate::infrastructure::http::build_http_client;
use crate::infrastructure::image_renderer::FrameRenderer;
use crate::infrastructure::preview_display::PreviewDisplay;
use crate::infrastructure::yahoo_client::YahooFinanceClient;
use crate::infrastructure::youtube_client::YoutubeClient;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{health_check, post_message};

/// Show YouTube, crypto and market numbers on a 16x16 or 32x32 pixel display
#[derive(Parser, Debug)]
#[command(name = "pixeltracker", version, about)]
struct Args {
    /// Scan for displays in Bluetooth range and exit
    #[arg(long)]
    scan: bool,

    /// Bluetooth address of the display, or "auto" to search for it
    #[arg(long, env = "SUBS_ADDRESS")]
    address: Option<String>,

    /// Show fake readings that change on every refresh instead of live data
    #[arg(long)]
    test: bool,

    /// Write frames and messages to this directory instead of a device
    #[arg(long, value_name = "DIR")]
    preview: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings().context("Failed to load settings")?;
    init_tracing(&settings, args.verbose);

    tracing::info!("Initializing pixeltracker");

    let display: Arc<dyn DisplayAdapter> = match &args.preview {
        Some(dir) => Arc::new(PreviewDisplay::new(dir.clone())),
        None => Arc::new(CommandDisplay::new(settings.display_command.clone())),
    };

    if args.scan {
        let devices = display.scan().await.context("Display scan failed")?;
        if devices.is_empty() {
            tracing::warn!("No displays found");
        }
        for device in devices {
            println!("{}", device);
        }
        return Ok(());
    }

    // Without a display there is nothing to do
    display
        .connect(args.address.as_deref())
        .await
        .context("Failed to connect to display")?;

    let (message_service, messages) = MessageService::channel();
    let state = Arc::new(AppState { message_service });

    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/message", post(post_message))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let bind_addr = (settings.server_host.as_str(), settings.server_port);
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| {
            format!(
                "Failed to bind {}:{}",
                settings.server_host, settings.server_port
            )
        })?;
    tracing::info!("Accepting messages on http://{}/message", listener.local_addr()?);
    let server = tokio::spawn(async move { axum::serve(listener, router).await });

    let rotation = build_rotation(&settings, display, messages, args.test)?;

    tokio::select! {
        () = rotation.run() => {}
        result = server => {
            result.context("HTTP server task failed")??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Caught interrupt, stopping");
        }
    }

    Ok(())
}

fn build_rotation(
    settings: &Settings,
    display: Arc<dyn DisplayAdapter>,
    messages: mpsc::Receiver<Message>,
    test_mode: bool,
) -> anyhow::Result<RotationLoop> {
    let http = build_http_client(settings.http_timeout())?;

    let sources = TileSources {
        subscribers: Arc::new(YoutubeClient::new(
            http.clone(),
            settings.youtube_api_host.clone(),
            settings.youtube_api_key.clone(),
        )),
        crypto: Arc::new(CoinGeckoClient::new(
            http.clone(),
            settings.crypto_api_host.clone(),
            settings.crypto_vs_currency.clone(),
        )),
        finance: Arc::new(YahooFinanceClient::new(http, settings.finance_api_host.clone())),
    };

    let tiles = build_tiles(settings, &sources, test_mode);
    if tiles.is_empty() {
        tracing::warn!(tiles = %settings.tiles, "No tiles configured, only messages will be shown");
    }
    if test_mode {
        tracing::info!("Test mode: tiles show synthetic data");
    }

    let renderer = FrameRenderer::new(settings.screen_size, settings.resources_path());

    Ok(RotationLoop::new(
        tiles,
        messages,
        renderer,
        display,
        settings.refresh_interval(),
        settings.message_font_path(),
    ))
}

fn init_tracing(settings: &Settings, verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(settings, verbose))
        .init();
}

/// `-v` forces debug. Otherwise `RUST_LOG` wins over the configured level.
fn log_filter(settings: &Settings, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(settings.log_level.as_str()))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
