use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use tokio::sync::mpsc;

use crate::commands::ExternalOutcome;
use crate::error::Result;

/// Application events.
#[derive(Debug)]
pub enum Event {
    /// A key press event.
    Key(KeyEvent),
    /// A periodic tick; drives deletion timers and status expiry.
    Tick,
    /// Terminal resize event.
    Resize,
    /// The watched directory changed on disk.
    FsChange(PathBuf),
    /// The type-to-jump timer with this generation fired.
    SearchExpired(u64),
    /// A foreground program returned.
    ExternalDone(ExternalOutcome),
}

/// Async event handler that polls crossterm events and forwards them via a channel.
///
/// Polling can be paused while a child program owns the terminal so that
/// keystrokes reach the child instead of us.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    tx: mpsc::UnboundedSender<Event>,
    paused: Arc<AtomicBool>,
    tick_rate: Duration,
}

impl EventHandler {
    /// Create a new EventHandler with the given tick rate.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();
        let paused = Arc::new(AtomicBool::new(false));
        let pump_paused = paused.clone();

        tokio::spawn(async move {
            loop {
                if pump_paused.load(Ordering::SeqCst) {
                    tokio::time::sleep(tick_rate).await;
                    continue;
                }
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Some(Event::Key(key)),
                        Ok(CrosstermEvent::Resize(..)) => Some(Event::Resize),
                        _ => None,
                    }
                } else {
                    Some(Event::Tick)
                };
                if let Some(event) = event {
                    if event_tx.send(event).is_err() {
                        break;
                    }
                }
            }
        });

        Self {
            rx,
            tx,
            paused,
            tick_rate,
        }
    }

    /// Get a sender clone for timers and the watcher.
    pub fn sender(&self) -> mpsc::UnboundedSender<Event> {
        self.tx.clone()
    }

    /// Stop reading the terminal. Waits out one poll interval so an
    /// in-flight poll cannot swallow the child's first keystroke.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
        std::thread::sleep(self.tick_rate);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Receive the next event (blocks until available).
    pub async fn next(&mut self) -> Result<Event> {
        self.rx
            .recv()
            .await
            .ok_or_else(|| crate::error::AppError::Terminal("Event channel closed".into()))
    }
}

/// Send `SearchExpired(generation)` after `after`.
pub fn schedule_search_clear(tx: mpsc::UnboundedSender<Event>, generation: u64, after: Duration) {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        let _ = tx.send(Event::SearchExpired(generation));
    });
}
