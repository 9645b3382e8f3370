// tests/config_loading.rs

mod common;
use crate::common::builders::RunConfigBuilder;

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use tempfile::NamedTempFile;

use hotbuild::cli::CliArgs;
use hotbuild::config::{load_and_validate, load_optional};
use hotbuild::errors::HotbuildError;

use clap::Parser;

#[test]
fn full_run_section_is_loaded_and_validated() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
[run]
file = "cmd/server/main.go"
path = "./bin"
extra = "-mod=vendor"
args = "server -p 8080"
watch_paths = ["internal", "api"]
ignore_paths = [".git", "vendor/*", "**/testdata/**"]
exclude_dir_regex = "^tmp"
debounce_ms = 500
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.target.entry, PathBuf::from("cmd/server/main.go"));
    assert_eq!(cfg.target.output_dir, PathBuf::from("./bin"));
    assert_eq!(cfg.target.binary_name(), "main");
    assert_eq!(cfg.target.extra_build_args, "-mod=vendor");
    assert_eq!(cfg.target.run_args, "server -p 8080");
    assert_eq!(
        cfg.watch.extra_watch_paths,
        vec![PathBuf::from("internal"), PathBuf::from("api")]
    );
    assert_eq!(
        cfg.watch.ignore.patterns(),
        &[".git", "vendor/*", "**/testdata/**"]
    );
    assert!(cfg.watch.exclude_dir_regex.is_some());
    assert_eq!(cfg.debounce, Duration::from_millis(500));
}

#[test]
fn unknown_toml_syntax_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[run\nfile = ").unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(HotbuildError::TomlError(_))
    ));
}

#[test]
fn config_without_entry_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[run]\nargs = \"-v\"\n").unwrap();

    match load_and_validate(file.path()) {
        Err(HotbuildError::ConfigError(msg)) => assert!(msg.contains("entry")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn missing_default_file_is_fine_but_missing_explicit_file_is_not() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Hotbuild.toml");

    let raw = load_optional(&path, false).unwrap();
    assert!(raw.run.file.is_none());

    assert!(matches!(
        load_optional(&path, true),
        Err(HotbuildError::IoError(_))
    ));
}

#[test]
fn cli_flags_complete_a_partial_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[run]\nignore_paths = [\"vendor\"]\ncompiler = \"tinygo\"\n").unwrap();

    let args = CliArgs::try_parse_from(["hotbuild", "app.go", "--debounce-ms", "200"]).unwrap();
    let mut raw = load_optional(file.path(), true).unwrap();
    args.apply_to(&mut raw.run);

    let cfg = hotbuild::config::RunConfig::try_from(raw).unwrap();
    assert_eq!(cfg.target.entry, PathBuf::from("app.go"));
    assert_eq!(cfg.compiler, "tinygo");
    assert_eq!(cfg.watch.ignore.patterns(), &["vendor"]);
    assert_eq!(cfg.debounce, Duration::from_millis(200));
}

#[test]
fn builder_rejects_what_validation_rejects() {
    let raw = RunConfigBuilder::new().with_ignore("[oops").raw();
    assert!(matches!(
        hotbuild::config::RunConfig::try_from(raw),
        Err(HotbuildError::Pattern { .. })
    ));

    let raw = RunConfigBuilder::new().without_entry().raw();
    assert!(hotbuild::config::RunConfig::try_from(raw).is_err());
}
