use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use tokio::sync::mpsc;

use crate::event::Event;

/// Watches the directory being browsed and asks for a relist when it changes.
///
/// Only the directory itself is watched; a new watcher is created whenever
/// the browsed directory changes.
pub struct DirWatcher {
    active: Arc<AtomicBool>,
    /// Dropping the debouncer stops the watch.
    _debouncer: notify_debouncer_mini::Debouncer<notify::RecommendedWatcher>,
}

impl DirWatcher {
    pub fn new(
        dir: &Path,
        debounce: Duration,
        event_tx: mpsc::UnboundedSender<Event>,
    ) -> notify::Result<Self> {
        let active = Arc::new(AtomicBool::new(true));
        let active_cb = active.clone();
        let watched = dir.to_path_buf();

        let mut debouncer = new_debouncer(
            debounce,
            move |result: Result<Vec<DebouncedEvent>, notify::Error>| {
                if !active_cb.load(Ordering::Relaxed) {
                    return;
                }
                match result {
                    Ok(events) => {
                        if has_changes(&events) {
                            let _ = event_tx.send(Event::FsChange(watched.clone()));
                        }
                    }
                    Err(e) => log::warn!("watcher error: {}", e),
                }
            },
        )?;

        debouncer
            .watcher()
            .watch(dir, notify::RecursiveMode::NonRecursive)?;

        Ok(Self {
            active,
            _debouncer: debouncer,
        })
    }

    /// Stop forwarding events, e.g. while an external program runs.
    pub fn pause(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn resume(&self) {
        self.active.store(true, Ordering::Relaxed);
    }
}

fn has_changes(events: &[DebouncedEvent]) -> bool {
    events.iter().any(|e| e.kind == DebouncedEventKind::Any)
}
