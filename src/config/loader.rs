// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawConfigFile, RunConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load the config file if there is one.
///
/// A missing file at the default location is not an error (all options can
/// come from the CLI); a missing file the user named explicitly is.
pub fn load_optional(path: impl AsRef<Path>, explicit: bool) -> Result<RawConfigFile> {
    let path = path.as_ref();
    if !explicit && !path.exists() {
        return Ok(RawConfigFile::default());
    }
    load_from_path(path)
}

/// Load a configuration file from path and validate it into a [`RunConfig`].
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<RunConfig> {
    let raw_config = load_from_path(&path)?;
    let config = RunConfig::try_from(raw_config)?;
    Ok(config)
}

/// Config file looked up in the working directory when `--config` is absent.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Hotbuild.toml")
}
