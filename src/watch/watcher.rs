// src/watch/watcher.rs

use std::path::PathBuf;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping it stops
/// delivery of notifications.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    watched: usize,
}

impl WatcherHandle {
    /// Number of directories with an active subscription.
    pub fn watched(&self) -> usize {
        self.watched
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("watched", &self.watched)
            .finish()
    }
}

/// Subscribe to each directory (non-recursively; the walk already decided
/// which subdirectories matter) and forward raw events into `event_tx`.
///
/// A directory that cannot be watched (gone, permission denied) is logged
/// and skipped; the others are still subscribed.
pub fn spawn_watcher(
    dirs: &[PathBuf],
    event_tx: mpsc::UnboundedSender<Event>,
) -> Result<WatcherHandle> {
    // Closure called synchronously by notify on its own thread.
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("hotbuild: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("hotbuild: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    let mut watched = 0;
    for dir in dirs {
        let dir = dir.canonicalize().unwrap_or_else(|_| dir.clone());
        match watcher.watch(&dir, RecursiveMode::NonRecursive) {
            Ok(()) => {
                debug!(dir = ?dir, "watching directory");
                watched += 1;
            }
            Err(err) => warn!(dir = ?dir, error = %err, "cannot watch directory"),
        }
    }

    if watched == 0 {
        warn!("no directory could be watched; changes will not trigger rebuilds");
    } else {
        info!(count = watched, "file watcher started");
    }

    Ok(WatcherHandle {
        _inner: watcher,
        watched,
    })
}
