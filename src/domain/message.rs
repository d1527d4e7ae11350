// Message domain model - Ad-hoc text pushed to the display
use chrono::{DateTime, Utc};
use std::time::Duration;

/// The display drops text past roughly 80-88 characters.
pub const MAX_MESSAGE_CHARS: usize = 80;

/// Scroll speed of the display's text mode at the default font and speed.
const SECONDS_PER_CHAR: f64 = 6.912 / 26.0;
/// Each message scrolls past twice.
const PASSES: f64 = 2.0;

pub const MIN_DISPLAY_SECS: f64 = 7.0;
pub const MAX_DISPLAY_SECS: f64 = 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl Message {
    pub fn new(text: &str) -> Self {
        Self {
            text: truncate_chars(text, MAX_MESSAGE_CHARS),
            received_at: Utc::now(),
        }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn display_duration(&self) -> Duration {
        display_duration(self.char_count())
    }
}

/// How long a message of `chars` characters stays on screen.
pub fn display_duration(chars: usize) -> Duration {
    let secs = PASSES * SECONDS_PER_CHAR * chars as f64;
    Duration::from_secs_f64(secs.clamp(MIN_DISPLAY_SECS, MAX_DISPLAY_SECS))
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
