// Display adapter trait - The pixel matrix behind its control tool
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("no device address given, use --address or --scan")]
    MissingAddress,

    #[error("display is not connected")]
    NotConnected,

    #[error("failed to start display program {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("display program exited with {code:?}: {stderr}")]
    Command { code: Option<i32>, stderr: String },

    #[error("display i/o error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait DisplayAdapter: Send + Sync {
    /// Look for displays in range, one line per device found
    async fn scan(&self) -> Result<Vec<String>, DisplayError>;

    /// Bind to a device. `None` is only accepted by adapters without hardware.
    async fn connect(&self, address: Option<&str>) -> Result<(), DisplayError>;

    /// Upload a bitmap and switch the display to image mode
    async fn send_image(&self, path: &Path) -> Result<(), DisplayError>;

    /// Switch the display to scrolling text mode
    async fn send_text(&self, text: &str, font: Option<&Path>) -> Result<(), DisplayError>;
}
