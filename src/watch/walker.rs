// src/watch/walker.rs

//! Startup walk that decides which directories get a watch subscription.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::IgnoreRules;

/// What to watch. Immutable once the orchestrator starts.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Tree root; ignore patterns are evaluated against paths relative to it.
    pub root: PathBuf,
    pub ignore: IgnoreRules,
    /// Watched even when the root walk would not reach them. Missing entries
    /// are skipped.
    pub extra_watch_paths: Vec<PathBuf>,
    /// Extra directory exclusion, consulted only during the walk.
    pub exclude_dir_regex: Option<Regex>,
}

impl WatchConfig {
    pub fn new(root: impl Into<PathBuf>, ignore: IgnoreRules) -> Self {
        Self {
            root: root.into(),
            ignore,
            extra_watch_paths: Vec::new(),
            exclude_dir_regex: None,
        }
    }
}

/// Collect every directory to subscribe to.
///
/// Ignored directories are pruned together with their whole subtree. The
/// result holds the surviving directories under the root, then the extra
/// watch paths (each walked the same way), then the root itself, without
/// duplicates. Unreadable directories are logged and skipped.
pub fn build_watch_set(fs: &dyn FileSystem, config: &WatchConfig) -> Vec<PathBuf> {
    let mut set = WatchSet::default();

    walk_tree(fs, config, &config.root, &mut set);

    for extra in &config.extra_watch_paths {
        if !fs.is_dir(extra) {
            debug!(path = ?extra, "extra watch path not found; skipping");
            continue;
        }
        set.insert(fs, extra);
        walk_tree(fs, config, extra, &mut set);
    }

    set.insert(fs, &config.root);

    info!(count = set.dirs.len(), "watch set built");
    set.dirs
}

#[derive(Default)]
struct WatchSet {
    dirs: Vec<PathBuf>,
    seen: HashSet<PathBuf>,
}

impl WatchSet {
    /// Returns false if the directory was already present.
    fn insert(&mut self, fs: &dyn FileSystem, dir: &Path) -> bool {
        let key = fs.canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        if !self.seen.insert(key) {
            return false;
        }
        self.dirs.push(dir.to_path_buf());
        true
    }
}

fn walk_tree(fs: &dyn FileSystem, config: &WatchConfig, base: &Path, set: &mut WatchSet) {
    let mut stack = Vec::new();
    push_children(fs, config, base, base, &mut stack);

    while let Some(dir) = stack.pop() {
        if set.insert(fs, &dir) {
            push_children(fs, config, base, &dir, &mut stack);
        }
    }
}

/// Push the non-pruned subdirectories of `dir`, reversed so that the stack
/// pops them in name order.
fn push_children(
    fs: &dyn FileSystem,
    config: &WatchConfig,
    base: &Path,
    dir: &Path,
    stack: &mut Vec<PathBuf>,
) {
    let mut entries = match fs.read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(dir = ?dir, error = %err, "cannot read directory; not watching below it");
            return;
        }
    };
    entries.sort();

    for child in entries.into_iter().rev() {
        if !fs.is_dir(&child) {
            continue;
        }
        let rel = relative_str(&config.root, &child)
            .or_else(|| relative_str(base, &child))
            .unwrap_or_else(|| child.to_string_lossy().replace('\\', "/"));

        if is_pruned(config, &rel) {
            debug!(dir = %rel, "skipping ignored directory");
            continue;
        }
        stack.push(child);
    }
}

fn is_pruned(config: &WatchConfig, rel: &str) -> bool {
    if let Some(re) = &config.exclude_dir_regex {
        if re.is_match(rel) {
            return true;
        }
    }
    match config.ignore.is_ignored(rel) {
        Ok(ignored) => ignored,
        Err(err) => {
            warn!(dir = %rel, error = %err, "ignore pattern failed; keeping directory");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn project() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/main.go", b"package main");
        fs.add_file("/proj/internal/utils.go", b"package internal");
        fs.add_file("/proj/internal/deep/x.go", b"package deep");
        fs.add_file("/proj/vendor/lib/lib.go", b"package lib");
        fs.add_file("/proj/.git/config", b"");
        fs.add_file("/proj/web/node_modules/react/index.js", b"");
        fs
    }

    fn dirs(set: &[PathBuf]) -> Vec<String> {
        set.iter().map(|p| p.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn ignored_subtrees_are_pruned() {
        let fs = project();
        let ignore = IgnoreRules::new([".git", "vendor", "node_modules"]).unwrap();
        let set = build_watch_set(&fs, &WatchConfig::new("/proj", ignore));

        assert_eq!(
            dirs(&set),
            vec![
                "/proj/internal",
                "/proj/internal/deep",
                "/proj/web",
                "/proj",
            ]
        );
    }

    #[test]
    fn regex_excludes_directories_during_walk() {
        let fs = project();
        let mut config = WatchConfig::new("/proj", IgnoreRules::default());
        config.exclude_dir_regex = Some(Regex::new(r"^(\.git|vendor|web)(/|$)").unwrap());

        let set = build_watch_set(&fs, &config);
        assert_eq!(
            dirs(&set),
            vec!["/proj/internal", "/proj/internal/deep", "/proj"]
        );
    }

    #[test]
    fn extra_paths_are_added_once_and_missing_ones_skipped() {
        let fs = project();
        fs.add_file("/shared/proto/api.go", b"package proto");
        let mut config = WatchConfig::new("/proj", IgnoreRules::new(["vendor", ".git", "web"]).unwrap());
        config.extra_watch_paths = vec![
            PathBuf::from("/proj/internal"),
            PathBuf::from("/shared"),
            PathBuf::from("/does/not/exist"),
        ];

        let set = build_watch_set(&fs, &config);
        assert_eq!(
            dirs(&set),
            vec![
                "/proj/internal",
                "/proj/internal/deep",
                "/shared",
                "/shared/proto",
                "/proj",
            ]
        );
    }

    #[test]
    fn unreadable_directory_does_not_abort_the_walk() {
        let fs = project();
        fs.deny_read("/proj/internal");
        let ignore = IgnoreRules::new([".git", "vendor", "web"]).unwrap();

        let set = build_watch_set(&fs, &WatchConfig::new("/proj", ignore));
        assert_eq!(dirs(&set), vec!["/proj/internal", "/proj"]);
    }
}
