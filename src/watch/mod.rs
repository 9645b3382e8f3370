// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Matching paths against ignore patterns, including `**` globstars.
//! - Walking the tree once at startup to pick the directories to watch.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Debouncing bursts of changes into single rebuild triggers.
//!
//! It does **not** know how to build or run anything; it only turns
//! filesystem changes into `RuntimeEvent::CycleDue`.

pub mod debounce;
pub mod path_utils;
pub mod patterns;
pub mod walker;
pub mod watcher;

pub use debounce::{
    CycleGuard, Debouncer, EventFilter, PendingFlag, is_relevant_kind, spawn_debouncer,
};
pub use patterns::{IgnoreRules, glob_match};
pub use walker::{WatchConfig, build_watch_set};
pub use watcher::{WatcherHandle, spawn_watcher};
