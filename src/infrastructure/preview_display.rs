// Display adapter that writes frames to a directory instead of a device
use crate::application::display::{DisplayAdapter, DisplayError};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;

const MESSAGE_LOG: &str = "messages.log";

pub struct PreviewDisplay {
    dir: PathBuf,
    frames: AtomicU64,
}

impl PreviewDisplay {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            frames: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl DisplayAdapter for PreviewDisplay {
    async fn scan(&self) -> Result<Vec<String>, DisplayError> {
        Ok(vec![format!("preview:{}", self.dir.display())])
    }

    async fn connect(&self, _address: Option<&str>) -> Result<(), DisplayError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tracing::info!(dir = %self.dir.display(), "Writing frames to preview directory");
        Ok(())
    }

    async fn send_image(&self, path: &Path) -> Result<(), DisplayError> {
        let n = self.frames.fetch_add(1, Ordering::SeqCst) + 1;
        let target = self.dir.join(format!("frame-{:05}.png", n));
        tokio::fs::copy(path, &target).await?;
        tracing::debug!(target = %target.display(), "Saved preview frame");
        Ok(())
    }

    async fn send_text(&self, text: &str, _font: Option<&Path>) -> Result<(), DisplayError> {
        let mut log = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.dir.join(MESSAGE_LOG))
            .await?;
        log.write_all(format!("{}\t{}\n", Utc::now().to_rfc3339(), text).as_bytes())
            .await?;
        log.flush().await?;
        Ok(())
    }
}
