// Display adapter driving the external display-control program
//
// Bluetooth transport and the device protocol live in that program. Each call
// here is one invocation of it against the connected address.
use crate::application::display::{DisplayAdapter, DisplayError};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Mutex;
use tokio::process::Command;

pub struct CommandDisplay {
    program: String,
    address: Mutex<Option<String>>,
}

impl CommandDisplay {
    pub fn new(program: String) -> Self {
        Self {
            program,
            address: Mutex::new(None),
        }
    }

    fn address(&self) -> Result<String, DisplayError> {
        self.address
            .lock()
            .map_err(|_| DisplayError::NotConnected)?
            .clone()
            .ok_or(DisplayError::NotConnected)
    }

    async fn invoke(&self, args: &[&str]) -> Result<String, DisplayError> {
        tracing::debug!(program = %self.program, ?args, "Invoking display program");

        // Dropping the future (a message preempting a tile) kills the child
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| DisplayError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DisplayError::Command {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl DisplayAdapter for CommandDisplay {
    async fn scan(&self) -> Result<Vec<String>, DisplayError> {
        let stdout = self.invoke(&["--scan"]).await?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn connect(&self, address: Option<&str>) -> Result<(), DisplayError> {
        let address = address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .ok_or(DisplayError::MissingAddress)?;

        if address.eq_ignore_ascii_case("auto") {
            tracing::info!("Display address set to auto, the display program will search for it");
        } else {
            tracing::info!(address, "Using display address");
        }

        let mut current = self.address.lock().map_err(|_| DisplayError::NotConnected)?;
        *current = Some(address.to_string());
        Ok(())
    }

    async fn send_image(&self, path: &Path) -> Result<(), DisplayError> {
        let address = self.address()?;
        let path = path.to_string_lossy();
        self.invoke(&["--address", &address, "--image", "true", "--set-image", &path])
            .await?;
        Ok(())
    }

    async fn send_text(&self, text: &str, font: Option<&Path>) -> Result<(), DisplayError> {
        let address = self.address()?;
        let font = font.map(|f| f.to_string_lossy().into_owned());

        let mut args = vec!["--address", address.as_str(), "--set-text", text];
        if let Some(font) = &font {
            args.extend(["--font-path", font.as_str()]);
        }

        self.invoke(&args).await?;
        Ok(())
    }
}
