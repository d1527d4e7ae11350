// Rotation loop - Cycle tiles on a timer and let messages interrupt them
//
// Only one tile or message is on its way to the display at any time. The loop
// is strictly sequential, so the display session never sees concurrent sends.
use crate::application::display::DisplayAdapter;
use crate::application::tiles::Tile;
use crate::domain::message::Message;
use crate::infrastructure::image_renderer::FrameRenderer;
use anyhow::Context;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, timeout};

/// Time after a message is shown during which a newer one replaces it.
pub const PREEMPT_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cycle {
    /// The tile image reached the display
    TileShown(String),
    /// The tile failed to fetch, render or send, or ran past the interval
    TileSkipped(String),
    /// A message arrived before the tile reached the display and cancelled it
    TileInterrupted(String),
    /// Queued messages were shown, with how many
    Messages(usize),
    /// No tiles configured and the message queue is closed
    Idle,
}

pub struct RotationLoop {
    tiles: Vec<Box<dyn Tile>>,
    messages: mpsc::Receiver<Message>,
    renderer: FrameRenderer,
    display: Arc<dyn DisplayAdapter>,
    refresh_interval: Duration,
    message_font: Option<PathBuf>,
    next_tile: usize,
}

impl RotationLoop {
    pub fn new(
        tiles: Vec<Box<dyn Tile>>,
        messages: mpsc::Receiver<Message>,
        renderer: FrameRenderer,
        display: Arc<dyn DisplayAdapter>,
        refresh_interval: Duration,
        message_font: Option<PathBuf>,
    ) -> Self {
        Self {
            tiles,
            messages,
            renderer,
            display,
            refresh_interval,
            message_font,
            next_tile: 0,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(
            tiles = self.tiles.len(),
            refresh_secs = self.refresh_interval.as_secs(),
            "Starting tile rotation"
        );

        loop {
            if self.run_cycle().await == Cycle::Idle {
                tracing::info!("No tiles and no message source left, stopping rotation");
                return;
            }
        }
    }

    /// Run one decision of the loop: pending messages first, otherwise the
    /// next tile in round-robin order.
    pub async fn run_cycle(&mut self) -> Cycle {
        if let Ok(message) = self.messages.try_recv() {
            return Cycle::Messages(self.show_messages(message).await);
        }

        if self.tiles.is_empty() {
            return match self.messages.recv().await {
                Some(message) => Cycle::Messages(self.show_messages(message).await),
                None => Cycle::Idle,
            };
        }

        let index = self.next_tile % self.tiles.len();
        self.next_tile = self.next_tile.wrapping_add(1);

        let (cycle, interrupt) = self.show_tile(index).await;
        if let Some(message) = interrupt {
            self.show_messages(message).await;
        }
        cycle
    }

    /// Run a tile while listening for messages until the refresh interval ends.
    /// An arriving message drops the tile future wherever it is.
    async fn show_tile(&mut self, index: usize) -> (Cycle, Option<Message>) {
        let tile = &mut self.tiles[index];
        let label = tile.label().to_string();

        let deadline = sleep(self.refresh_interval);
        let tile_run = run_tile(&mut **tile, &self.renderer, self.display.as_ref());
        tokio::pin!(deadline, tile_run);

        let mut outcome = None;
        loop {
            tokio::select! {
                result = &mut tile_run, if outcome.is_none() => {
                    outcome = Some(match result {
                        Ok(()) => {
                            tracing::info!(tile = %label, "Tile shown");
                            Cycle::TileShown(label.clone())
                        }
                        Err(e) => {
                            tracing::warn!(tile = %label, "Skipping tile this cycle: {:#}", e);
                            Cycle::TileSkipped(label.clone())
                        }
                    });
                }
                Some(message) = self.messages.recv() => {
                    return match outcome.take() {
                        Some(cycle) => {
                            tracing::info!(tile = %label, "Message takes over from the shown tile");
                            (cycle, Some(message))
                        }
                        None => {
                            tracing::info!(tile = %label, "Message arrived, cancelling tile");
                            (Cycle::TileInterrupted(label), Some(message))
                        }
                    };
                }
                () = &mut deadline => break,
            }
        }

        match outcome {
            Some(cycle) => (cycle, None),
            None => {
                tracing::warn!(tile = %label, "Tile did not finish within the refresh interval");
                (Cycle::TileSkipped(label), None)
            }
        }
    }

    /// Show a message and keep showing newer ones that arrive within the
    /// preemption window. Returns how many were shown.
    async fn show_messages(&mut self, first: Message) -> usize {
        let mut message = first;
        let mut shown = 0;

        loop {
            tracing::info!(
                chars = message.char_count(),
                received_at = %message.received_at,
                "Showing message"
            );
            if let Err(e) = self
                .display
                .send_text(&message.text, self.message_font.as_deref())
                .await
            {
                tracing::warn!("Failed to send message to display: {}", e);
            }
            shown += 1;

            let duration = message.display_duration();
            let started = Instant::now();
            match timeout(PREEMPT_WINDOW, self.messages.recv()).await {
                Ok(Some(next)) => {
                    tracing::debug!("Newer message replaces the one on screen");
                    message = next;
                }
                _ => {
                    sleep(duration.saturating_sub(started.elapsed())).await;
                    return shown;
                }
            }
        }
    }
}

async fn run_tile(
    tile: &mut dyn Tile,
    renderer: &FrameRenderer,
    display: &dyn DisplayAdapter,
) -> anyhow::Result<()> {
    tile.refresh().await.context("fetch failed")?;
    let frame = tile.compose().context("tile has no reading yet")?;

    let image = renderer.render(&frame).context("render failed")?;
    tracing::debug!(path = %image.path().display(), "Rendered tile image");

    display
        .send_image(image.path())
        .await
        .context("sending image to display failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::display::DisplayError;
    use crate::application::market_data::FetchError;
    use crate::domain::frame::{Background, Color, Frame};
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Image,
        Text(String),
    }

    #[derive(Default)]
    struct RecordingDisplay {
        sent: Mutex<Vec<Sent>>,
    }

    impl RecordingDisplay {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DisplayAdapter for RecordingDisplay {
        async fn scan(&self) -> Result<Vec<String>, DisplayError> {
            Ok(Vec::new())
        }

        async fn connect(&self, _address: Option<&str>) -> Result<(), DisplayError> {
            Ok(())
        }

        async fn send_image(&self, path: &Path) -> Result<(), DisplayError> {
            assert!(path.exists(), "image must exist while it is being sent");
            self.sent.lock().unwrap().push(Sent::Image);
            Ok(())
        }

        async fn send_text(&self, text: &str, _font: Option<&Path>) -> Result<(), DisplayError> {
            self.sent.lock().unwrap().push(Sent::Text(text.to_string()));
            Ok(())
        }
    }

    struct FakeTile {
        label: String,
        delay: Duration,
        fail: bool,
        refreshed: Arc<AtomicUsize>,
    }

    impl FakeTile {
        fn boxed(label: &str, delay: Duration, fail: bool) -> (Box<dyn Tile>, Arc<AtomicUsize>) {
            let refreshed = Arc::new(AtomicUsize::new(0));
            let tile = FakeTile {
                label: label.to_string(),
                delay,
                fail,
                refreshed: refreshed.clone(),
            };
            (Box::new(tile), refreshed)
        }
    }

    #[async_trait]
    impl Tile for FakeTile {
        fn label(&self) -> &str {
            &self.label
        }

        async fn refresh(&mut self) -> Result<(), FetchError> {
            sleep(self.delay).await;
            self.refreshed.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(FetchError::Malformed("boom".to_string()));
            }
            Ok(())
        }

        fn compose(&self) -> Option<Frame> {
            Some(Frame::new(Background::Finance).line(self.label.clone(), 16, Color::WHITE))
        }
    }

    fn rotation(
        tiles: Vec<Box<dyn Tile>>,
        display: Arc<RecordingDisplay>,
    ) -> (RotationLoop, mpsc::Sender<Message>) {
        let (tx, rx) = mpsc::channel(8);
        let rotation = RotationLoop::new(
            tiles,
            rx,
            FrameRenderer::new(32, None),
            display,
            Duration::from_secs(30),
            None,
        );
        (rotation, tx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_message_is_shown_before_tiles() {
        let display = Arc::new(RecordingDisplay::default());
        let (tile, refreshed) = FakeTile::boxed("gold", Duration::ZERO, false);
        let (mut rotation, tx) = rotation(vec![tile], display.clone());

        tx.send(Message::new("hello")).await.unwrap();
        let cycle = rotation.run_cycle().await;

        assert_eq!(cycle, Cycle::Messages(1));
        assert_eq!(display.sent(), vec![Sent::Text("hello".to_string())]);
        assert_eq!(refreshed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_shows_for_its_duration() {
        let display = Arc::new(RecordingDisplay::default());
        let (mut rotation, tx) = rotation(Vec::new(), display.clone());

        tx.send(Message::new("hi")).await.unwrap();
        let started = Instant::now();
        rotation.run_cycle().await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(7) && elapsed < Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_cancels_tile_in_flight() {
        let display = Arc::new(RecordingDisplay::default());
        let (tile, refreshed) = FakeTile::boxed("slow", Duration::from_secs(20), false);
        let (mut rotation, tx) = rotation(vec![tile], display.clone());

        let sender = tx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(1)).await;
            sender.send(Message::new("stop")).await.unwrap();
        });

        let cycle = rotation.run_cycle().await;

        assert_eq!(cycle, Cycle::TileInterrupted("slow".to_string()));
        assert_eq!(display.sent(), vec![Sent::Text("stop".to_string())]);
        assert_eq!(refreshed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_after_tile_shown_keeps_tile_outcome() {
        let display = Arc::new(RecordingDisplay::default());
        let (tile, refreshed) = FakeTile::boxed("t", Duration::ZERO, false);
        let (mut rotation, tx) = rotation(vec![tile], display.clone());

        let sender = tx.clone();
        tokio::spawn(async move {
            sleep(Duration::from_secs(10)).await;
            sender.send(Message::new("late")).await.unwrap();
        });

        let started = Instant::now();
        let cycle = rotation.run_cycle().await;

        assert_eq!(cycle, Cycle::TileShown("t".to_string()));
        assert_eq!(
            display.sent(),
            vec![Sent::Image, Sent::Text("late".to_string())]
        );
        assert_eq!(refreshed.load(Ordering::SeqCst), 1);
        // Message shown at 10s for its 7s minimum, not the full interval
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(17) && elapsed < Duration::from_secs(18));
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_message_replaces_current_one() {
        let display = Arc::new(RecordingDisplay::default());
        let (mut rotation, tx) = rotation(Vec::new(), display.clone());

        tx.send(Message::new("one")).await.unwrap();
        tx.send(Message::new("two")).await.unwrap();
        let cycle = rotation.run_cycle().await;

        assert_eq!(cycle, Cycle::Messages(2));
        assert_eq!(
            display.sent(),
            vec![Sent::Text("one".to_string()), Sent::Text("two".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_tile_is_skipped_and_rotation_continues() {
        let display = Arc::new(RecordingDisplay::default());
        let (bad, _) = FakeTile::boxed("bad", Duration::ZERO, true);
        let (good, _) = FakeTile::boxed("good", Duration::ZERO, false);
        let (mut rotation, _tx) = rotation(vec![bad, good], display.clone());

        assert_eq!(rotation.run_cycle().await, Cycle::TileSkipped("bad".to_string()));
        assert_eq!(rotation.run_cycle().await, Cycle::TileShown("good".to_string()));
        assert_eq!(display.sent(), vec![Sent::Image]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tile_waits_out_refresh_interval() {
        let display = Arc::new(RecordingDisplay::default());
        let (tile, _) = FakeTile::boxed("gold", Duration::from_secs(2), false);
        let (mut rotation, _tx) = rotation(vec![tile], display);

        let started = Instant::now();
        rotation.run_cycle().await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_secs(31));
    }

    #[tokio::test(start_paused = true)]
    async fn test_round_robin_wraps() {
        let display = Arc::new(RecordingDisplay::default());
        let (a, _) = FakeTile::boxed("a", Duration::ZERO, false);
        let (b, _) = FakeTile::boxed("b", Duration::ZERO, false);
        let (mut rotation, _tx) = rotation(vec![a, b], display);

        let mut shown = Vec::new();
        for _ in 0..3 {
            shown.push(rotation.run_cycle().await);
        }

        assert_eq!(
            shown,
            vec![
                Cycle::TileShown("a".to_string()),
                Cycle::TileShown("b".to_string()),
                Cycle::TileShown("a".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_tile_slower_than_interval_is_abandoned() {
        let display = Arc::new(RecordingDisplay::default());
        let (tile, refreshed) = FakeTile::boxed("stuck", Duration::from_secs(90), false);
        let (mut rotation, _tx) = rotation(vec![tile], display.clone());

        assert_eq!(rotation.run_cycle().await, Cycle::TileSkipped("stuck".to_string()));
        assert_eq!(refreshed.load(Ordering::SeqCst), 0);
        assert!(display.sent().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_without_tiles_or_senders() {
        let display = Arc::new(RecordingDisplay::default());
        let (mut rotation, tx) = rotation(Vec::new(), display);
        drop(tx);

        assert_eq!(rotation.run_cycle().await, Cycle::Idle);
    }
}
