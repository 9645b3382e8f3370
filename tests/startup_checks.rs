// tests/startup_checks.rs

mod common;
use crate::common::init_tracing;

use std::fs;

use clap::Parser;

use hotbuild::cli::CliArgs;

fn args(dir: &std::path::Path, extra: &[&str]) -> CliArgs {
    let config = dir.join("Hotbuild.toml");
    fs::write(&config, "[run]\n").unwrap();
    let entry = dir.join("main.go");
    fs::write(&entry, "package main").unwrap();

    let mut argv = vec![
        "hotbuild".to_string(),
        entry.to_string_lossy().into_owned(),
        "--config".to_string(),
        config.to_string_lossy().into_owned(),
        "--root".to_string(),
        dir.to_string_lossy().into_owned(),
    ];
    argv.extend(extra.iter().map(|s| s.to_string()));
    CliArgs::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn missing_compiler_is_reported_before_anything_runs() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let args = args(dir.path(), &["--compiler", "hotbuild-no-such-compiler"]);

    let err = hotbuild::run(args).await.unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("hotbuild-no-such-compiler"), "{msg}");
    assert!(msg.contains("not found"), "{msg}");
}

#[cfg(unix)]
#[tokio::test]
async fn dry_run_with_an_installed_compiler_succeeds() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let args = args(dir.path(), &["--compiler", "sh", "--dry-run"]);

    hotbuild::run(args).await.unwrap();
}
