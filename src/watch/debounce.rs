// src/watch/debounce.rs

//! Burst coalescing for filesystem notifications.
//!
//! The first qualifying change flips the pending flag and schedules a cycle
//! after a fixed quiet interval. Every change that arrives while the flag is
//! set (during the wait, the compile, or the process swap) is dropped: it is
//! either folded into the upcoming cycle or, if the cycle has already begun,
//! lost. The flag clears when the runtime drops the [`CycleGuard`] at the end
//! of the cycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use notify::event::{EventKind, ModifyKind};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::watch::path_utils::{has_tracked_extension, relative_str};
use crate::watch::patterns::IgnoreRules;

/// Single "a cycle is scheduled or running" bit.
///
/// Only [`try_begin`](Self::try_begin) sets it; only dropping the returned
/// guard clears it.
#[derive(Debug, Clone, Default)]
pub struct PendingFlag(Arc<AtomicBool>);

impl PendingFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// CAS `false -> true`. `None` if a cycle is already pending or running.
    pub fn try_begin(&self) -> Option<CycleGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| CycleGuard {
                flag: Arc::clone(&self.0),
            })
    }

    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Proof of owning the pending flag. Clears it on drop.
#[derive(Debug)]
pub struct CycleGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Decides whether a changed path may trigger a rebuild at all.
#[derive(Debug, Clone)]
pub struct EventFilter {
    root: PathBuf,
    ignore: IgnoreRules,
    extensions: Vec<String>,
}

impl EventFilter {
    pub fn new(root: impl Into<PathBuf>, ignore: IgnoreRules, extensions: Vec<String>) -> Self {
        Self {
            root: root.into(),
            ignore,
            extensions,
        }
    }

    /// Tracked extension and not ignored. Matcher errors count as "no".
    pub fn accepts(&self, path: &Path) -> bool {
        if !has_tracked_extension(path, &self.extensions) {
            return false;
        }
        let rel = relative_str(&self.root, path)
            .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"));
        match self.ignore.is_ignored(&rel) {
            Ok(ignored) => {
                if ignored {
                    debug!(path = %rel, "change in ignored path");
                }
                !ignored
            }
            Err(err) => {
                warn!(path = %rel, error = %err, "ignore matching failed; dropping change");
                false
            }
        }
    }
}

/// Only content-affecting notifications count: create, write, remove and
/// rename. Access and metadata-only events are dropped.
pub fn is_relevant_kind(kind: &EventKind) -> bool {
    match kind {
        EventKind::Create(_) | EventKind::Remove(_) => true,
        EventKind::Modify(ModifyKind::Metadata(_)) => false,
        EventKind::Modify(_) => true,
        _ => false,
    }
}

/// Owner of the pending flag.
#[derive(Debug, Clone)]
pub struct Debouncer {
    filter: EventFilter,
    flag: PendingFlag,
    quiet: Duration,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl Debouncer {
    pub fn new(
        filter: EventFilter,
        quiet: Duration,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
    ) -> Self {
        Self {
            filter,
            flag: PendingFlag::new(),
            quiet,
            runtime_tx,
        }
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet
    }

    pub fn is_pending(&self) -> bool {
        self.flag.is_pending()
    }

    /// Handle one changed path. Returns true if this call scheduled a cycle.
    pub fn on_event(&self, path: &Path) -> bool {
        if !self.filter.accepts(path) {
            return false;
        }
        self.schedule(TriggerReason::FileChange(path.to_path_buf()), self.quiet)
    }

    /// Claim the pending flag and deliver a `CycleDue` after `delay`.
    ///
    /// Returns false (and does nothing) when a cycle is already pending or
    /// running. Must be called from within a Tokio runtime.
    pub fn schedule(&self, trigger: TriggerReason, delay: Duration) -> bool {
        let Some(guard) = self.flag.try_begin() else {
            debug!(?trigger, "cycle already pending; dropping change");
            return false;
        };

        let tx = self.runtime_tx.clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let TriggerReason::FileChange(path) = &trigger {
                info!(path = ?path, "watched file changes");
            }
            if tx
                .send(RuntimeEvent::CycleDue { trigger, guard })
                .await
                .is_err()
            {
                debug!("runtime channel closed; dropping scheduled cycle");
            }
        });
        true
    }
}

/// Consume raw `notify` events and feed their paths to the debouncer.
pub fn spawn_debouncer(
    debouncer: Debouncer,
    mut event_rx: mpsc::UnboundedReceiver<notify::Event>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !is_relevant_kind(&event.kind) {
                continue;
            }
            debug!(?event, "received notify event");
            for path in &event.paths {
                debouncer.on_event(path);
            }
        }
        debug!("debouncer loop finished");
    })
}
