// src/config/validate.rs

use std::path::PathBuf;
use std::time::Duration;

use regex::Regex;

use crate::config::model::{RawConfigFile, RunConfig, RunSection};
use crate::engine::BuildTarget;
use crate::errors::{HotbuildError, Result};
use crate::watch::{IgnoreRules, WatchConfig};

impl TryFrom<RawConfigFile> for RunConfig {
    type Error = HotbuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let run = raw.run;
        let entry = validate_entry(&run)?;
        validate_global_config(&run)?;

        let ignore = IgnoreRules::new(split_list(&run.ignore_paths))?;
        let exclude_dir_regex = match run.exclude_dir_regex.as_deref().map(str::trim) {
            Some(re) if !re.is_empty() => Some(Regex::new(re)?),
            _ => None,
        };

        let output_dir = if run.path.trim().is_empty() {
            PathBuf::from("./")
        } else {
            PathBuf::from(run.path.trim())
        };

        let target = BuildTarget {
            entry,
            output_dir,
            extra_build_args: run.extra.trim().to_string(),
            run_args: run.args.trim().to_string(),
        };

        let watch = WatchConfig {
            root: PathBuf::from(&run.root),
            ignore,
            extra_watch_paths: split_list(&run.watch_paths)
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            exclude_dir_regex,
        };

        let extensions = split_list(&run.extensions)
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect();

        Ok(RunConfig::new_unchecked(
            target,
            watch,
            run.compiler.trim().to_string(),
            extensions,
            Duration::from_millis(run.debounce_ms),
        ))
    }
}

fn validate_entry(run: &RunSection) -> Result<PathBuf> {
    match run.file.as_deref().map(str::trim) {
        Some(file) if !file.is_empty() => Ok(PathBuf::from(file)),
        _ => Err(HotbuildError::ConfigError(
            "missing required entry path (FILE argument or [run].file)".to_string(),
        )),
    }
}

fn validate_global_config(run: &RunSection) -> Result<()> {
    if run.debounce_ms == 0 {
        return Err(HotbuildError::ConfigError(
            "[run].debounce_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if run.compiler.trim().is_empty() {
        return Err(HotbuildError::ConfigError(
            "[run].compiler must not be empty".to_string(),
        ));
    }
    if split_list(&run.extensions).is_empty() {
        return Err(HotbuildError::ConfigError(
            "[run].extensions must name at least one file extension".to_string(),
        ));
    }
    Ok(())
}

/// Flatten comma-separated entries (`["a,b", "c"]` -> `["a", "b", "c"]`).
fn split_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(file: Option<&str>) -> RawConfigFile {
        RawConfigFile {
            run: RunSection {
                file: file.map(str::to_string),
                ..RunSection::default()
            },
        }
    }

    #[test]
    fn missing_entry_is_a_config_error() {
        let err = RunConfig::try_from(section(None)).unwrap_err();
        assert!(matches!(err, HotbuildError::ConfigError(ref msg) if msg.contains("entry path")));
    }

    #[test]
    fn defaults_follow_the_go_toolchain() {
        let cfg = RunConfig::try_from(section(Some("main.go"))).unwrap();
        assert_eq!(cfg.target.entry, PathBuf::from("main.go"));
        assert_eq!(cfg.target.output_dir, PathBuf::from("./"));
        assert_eq!(cfg.compiler, "go");
        assert_eq!(cfg.extensions, vec!["go".to_string()]);
        assert_eq!(cfg.debounce, Duration::from_millis(1500));
        assert!(cfg.watch.ignore.is_empty());
        assert!(cfg.watch.exclude_dir_regex.is_none());
    }

    #[test]
    fn comma_lists_are_flattened() {
        let mut raw = section(Some("main.go"));
        raw.run.watch_paths = vec!["internal/,api/".to_string()];
        raw.run.ignore_paths = vec!["vendor/*, *.pb.go".to_string(), ".git".to_string()];
        raw.run.extensions = vec![".go,.mod".to_string()];

        let cfg = RunConfig::try_from(raw).unwrap();
        assert_eq!(
            cfg.watch.extra_watch_paths,
            vec![PathBuf::from("internal/"), PathBuf::from("api/")]
        );
        assert_eq!(cfg.watch.ignore.patterns(), &["vendor/*", "*.pb.go", ".git"]);
        assert_eq!(cfg.extensions, vec!["go".to_string(), "mod".to_string()]);
    }

    #[test]
    fn malformed_ignore_pattern_is_rejected() {
        let mut raw = section(Some("main.go"));
        raw.run.ignore_paths = vec!["[vendor".to_string()];
        assert!(matches!(
            RunConfig::try_from(raw),
            Err(HotbuildError::Pattern { .. })
        ));
    }

    #[test]
    fn bad_exclude_regex_is_rejected() {
        let mut raw = section(Some("main.go"));
        raw.run.exclude_dir_regex = Some("(unclosed".to_string());
        assert!(matches!(RunConfig::try_from(raw), Err(HotbuildError::Regex(_))));
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let mut raw = section(Some("main.go"));
        raw.run.debounce_ms = 0;
        assert!(matches!(
            RunConfig::try_from(raw),
            Err(HotbuildError::ConfigError(_))
        ));
    }
}
