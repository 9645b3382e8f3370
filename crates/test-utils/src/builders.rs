#![allow(dead_code)]

use hotbuild::config::{RawConfigFile, RunConfig, RunSection};

/// Builder for `RunConfig` to simplify test setup.
///
/// Starts from the `[run]` defaults with `main.go` as the entry.
pub struct RunConfigBuilder {
    run: RunSection,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self {
            run: RunSection {
                file: Some("main.go".to_string()),
                ..RunSection::default()
            },
        }
    }

    pub fn with_entry(mut self, file: &str) -> Self {
        self.run.file = Some(file.to_string());
        self
    }

    pub fn without_entry(mut self) -> Self {
        self.run.file = None;
        self
    }

    pub fn with_output_dir(mut self, dir: &str) -> Self {
        self.run.path = dir.to_string();
        self
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.run.root = root.to_string();
        self
    }

    pub fn with_ignore(mut self, pattern: &str) -> Self {
        self.run.ignore_paths.push(pattern.to_string());
        self
    }

    pub fn with_watch_path(mut self, path: &str) -> Self {
        self.run.watch_paths.push(path.to_string());
        self
    }

    pub fn with_run_args(mut self, args: &str) -> Self {
        self.run.args = args.to_string();
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.run.debounce_ms = ms;
        self
    }

    /// The raw form, for tests that exercise validation themselves.
    pub fn raw(self) -> RawConfigFile {
        RawConfigFile { run: self.run }
    }

    pub fn build(self) -> RunConfig {
        RunConfig::try_from(self.raw()).expect("Failed to build valid config from builder")
    }
}

impl Default for RunConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
