// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::engine::BuildTarget;
use crate::watch::WatchConfig;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [run]
/// file = "main.go"
/// path = "./bin"
/// args = "server -p 8080"
/// watch_paths = ["internal", "api"]
/// ignore_paths = [".git", "vendor/*", "*.pb.go", "node_modules"]
/// ```
///
/// Every key is optional here; the CLI may supply the rest. Validation
/// happens when converting into [`RunConfig`].
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub run: RunSection,
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RunSection {
    /// Source entry point handed to the compiler. Required after merging
    /// with the CLI.
    #[serde(default)]
    pub file: Option<String>,

    /// Directory that receives the built binary.
    #[serde(default = "default_output_dir")]
    pub path: String,

    /// Extra compiler options, passed through verbatim.
    #[serde(default)]
    pub extra: String,

    /// Arguments for the launched process.
    #[serde(default)]
    pub args: String,

    /// Directories to watch in addition to the root tree.
    #[serde(default)]
    pub watch_paths: Vec<String>,

    /// Glob / globstar ignore patterns.
    #[serde(default)]
    pub ignore_paths: Vec<String>,

    /// Regex excluding directories during the initial tree walk only.
    #[serde(default)]
    pub exclude_dir_regex: Option<String>,

    /// Watch root; patterns are evaluated relative to it.
    #[serde(default = "default_root")]
    pub root: String,

    /// Compiler executable, invoked as `<compiler> build -o <out> <extra> <file>`.
    #[serde(default = "default_compiler")]
    pub compiler: String,

    /// File extensions (without the dot) whose changes trigger a rebuild.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Quiet interval in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_output_dir() -> String {
    "./".to_string()
}

fn default_root() -> String {
    ".".to_string()
}

fn default_compiler() -> String {
    "go".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["go".to_string()]
}

fn default_debounce_ms() -> u64 {
    1500
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            file: None,
            path: default_output_dir(),
            extra: String::new(),
            args: String::new(),
            watch_paths: Vec::new(),
            ignore_paths: Vec::new(),
            exclude_dir_regex: None,
            root: default_root(),
            compiler: default_compiler(),
            extensions: default_extensions(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// Validated configuration. Immutable once the orchestrator starts.
///
/// Only constructible through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub target: BuildTarget,
    pub watch: WatchConfig,
    pub compiler: String,
    pub extensions: Vec<String>,
    pub debounce: Duration,
}

impl RunConfig {
    pub(crate) fn new_unchecked(
        target: BuildTarget,
        watch: WatchConfig,
        compiler: String,
        extensions: Vec<String>,
        debounce: Duration,
    ) -> Self {
        Self {
            target,
            watch,
            compiler,
            extensions,
            debounce,
        }
    }
}
