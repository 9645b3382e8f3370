// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::config::RunSection;

/// Command-line arguments for `hotbuild`.
///
/// Every option also exists as a key under `[run]` in `Hotbuild.toml`; flags
/// given here win over the file.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "hotbuild",
    version,
    about = "Rebuild and restart a program whenever its sources change.",
    after_help = "\
Examples:
  hotbuild main.go
  hotbuild main.go --args \"server -p 8080\"
  hotbuild main.go -e -mod=vendor
  hotbuild main.go -w internal/,api/
  hotbuild main.go -i \"vendor/*,*.pb.go,node_modules/*\"
  hotbuild main.go -p ./bin -i \"test/*,tmp/*,**/testdata/**\""
)]
pub struct CliArgs {
    /// Source entry point to build.
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Output directory for the built binary [default: ./].
    #[arg(short = 'p', long = "path", value_name = "DIR")]
    pub path: Option<String>,

    /// Extra compiler options, passed through verbatim.
    #[arg(short = 'e', long, value_name = "OPTIONS", allow_hyphen_values = true)]
    pub extra: Option<String>,

    /// Arguments for the launched process.
    #[arg(short = 'a', long, value_name = "ARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Additional directories to watch, comma separated (e.g. "internal/,api/").
    #[arg(short = 'w', long, value_name = "PATHS", value_delimiter = ',')]
    pub watch_paths: Vec<String>,

    /// Ignore patterns, comma separated (e.g. "vendor/*,*.pb.go,.git").
    #[arg(short = 'i', long, value_name = "PATTERNS", value_delimiter = ',')]
    pub ignore_paths: Vec<String>,

    /// Regex of directories to skip while building the watch set.
    #[arg(long, value_name = "REGEX")]
    pub exclude_dir_regex: Option<String>,

    /// Watch root [default: .].
    #[arg(long, value_name = "DIR")]
    pub root: Option<String>,

    /// Compiler executable [default: go].
    #[arg(long, value_name = "PROGRAM")]
    pub compiler: Option<String>,

    /// File extensions that trigger a rebuild, comma separated [default: go].
    #[arg(long = "ext", value_name = "EXTS", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Quiet interval in milliseconds [default: 1500].
    #[arg(long, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Hotbuild.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `HOTBUILD_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate config, print the watch set, but don't build or run anything.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Overlay the flags that were given onto a `[run]` section.
    pub fn apply_to(&self, run: &mut RunSection) {
        if let Some(file) = &self.file {
            run.file = Some(file.clone());
        }
        if let Some(path) = &self.path {
            run.path = path.clone();
        }
        if let Some(extra) = &self.extra {
            run.extra = extra.clone();
        }
        if let Some(args) = &self.args {
            run.args = args.clone();
        }
        if !self.watch_paths.is_empty() {
            run.watch_paths = self.watch_paths.clone();
        }
        if !self.ignore_paths.is_empty() {
            run.ignore_paths = self.ignore_paths.clone();
        }
        if let Some(re) = &self.exclude_dir_regex {
            run.exclude_dir_regex = Some(re.clone());
        }
        if let Some(root) = &self.root {
            run.root = root.clone();
        }
        if let Some(compiler) = &self.compiler {
            run.compiler = compiler.clone();
        }
        if !self.extensions.is_empty() {
            run.extensions = self.extensions.clone();
        }
        if let Some(ms) = self.debounce_ms {
            run.debounce_ms = ms;
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_file_values() {
        let args = CliArgs::try_parse_from([
            "hotbuild",
            "main.go",
            "-p",
            "./bin",
            "-w",
            "internal/,api/",
            "-i",
            "vendor/*,*.pb.go",
            "-a",
            "server -p 8080",
        ])
        .unwrap();

        let mut run = RunSection {
            path: "./out".to_string(),
            ignore_paths: vec!["dist".to_string()],
            compiler: "tinygo".to_string(),
            ..RunSection::default()
        };
        args.apply_to(&mut run);

        assert_eq!(run.file.as_deref(), Some("main.go"));
        assert_eq!(run.path, "./bin");
        assert_eq!(run.watch_paths, vec!["internal/", "api/"]);
        assert_eq!(run.ignore_paths, vec!["vendor/*", "*.pb.go"]);
        assert_eq!(run.args, "server -p 8080");
        // Not given on the command line: file value survives.
        assert_eq!(run.compiler, "tinygo");
    }

    #[test]
    fn extra_options_may_start_with_a_dash() {
        let args = CliArgs::try_parse_from(["hotbuild", "main.go", "-e", "-mod=vendor"]).unwrap();
        assert_eq!(args.extra.as_deref(), Some("-mod=vendor"));
    }
}
