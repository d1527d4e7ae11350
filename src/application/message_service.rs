// Message service - Use case for queueing ad-hoc display messages
use crate::domain::message::Message;
use thiserror::Error;
use tokio::sync::mpsc;

pub const MESSAGE_QUEUE_CAPACITY: usize = 32;

#[derive(Debug, Error, PartialEq)]
pub enum SubmitError {
    #[error("message text is empty")]
    Empty,

    #[error("message queue is full")]
    QueueFull,

    #[error("display loop is not running")]
    Closed,
}

#[derive(Clone)]
pub struct MessageService {
    queue: mpsc::Sender<Message>,
}

impl MessageService {
    pub fn new(queue: mpsc::Sender<Message>) -> Self {
        Self { queue }
    }

    /// Create the service together with the receiving end for the display loop
    pub fn channel() -> (Self, mpsc::Receiver<Message>) {
        let (tx, rx) = mpsc::channel(MESSAGE_QUEUE_CAPACITY);
        (Self::new(tx), rx)
    }

    /// Truncate and enqueue a message, returning what was queued
    pub fn submit(&self, text: &str) -> Result<Message, SubmitError> {
        if text.trim().is_empty() {
            return Err(SubmitError::Empty);
        }

        let message = Message::new(text);
        self.queue
            .try_send(message.clone())
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => SubmitError::QueueFull,
                mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
            })?;

        tracing::info!(chars = message.char_count(), "Queued message");
        Ok(message)
    }
}
