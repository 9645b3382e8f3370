// src/config/mod.rs

//! Configuration loading and validation for hotbuild.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate and normalise it into a [`RunConfig`] (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_optional};
pub use model::{RawConfigFile, RunConfig, RunSection};
