// src/exec/backend.rs

//! Pluggable compiler / process backends.
//!
//! The orchestrator never touches `tokio::process` directly. Production code
//! uses [`ShellCompiler`](super::ShellCompiler) and
//! [`ChildSupervisor`](super::ChildSupervisor); tests provide
//! implementations that record calls and never spawn anything.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::time::Duration;

use crate::errors::Result;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One compiler invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub entry: PathBuf,
    pub output: PathBuf,
    /// Passed through verbatim.
    pub extra_args: String,
}

/// Result of a compiler run that could be started at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// Combined stdout + stderr.
    pub output: String,
}

impl BuildOutput {
    pub fn succeeded(output: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            output: output.into(),
        }
    }

    pub fn failed(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            output: output.into(),
        }
    }
}

/// Compiler collaborator.
///
/// `Err` means the compiler could not be invoked; a compile that ran and
/// failed is `Ok` with `success == false`.
pub trait Compiler: Send + Sync {
    fn build(&self, request: BuildRequest) -> BoxFuture<'_, Result<BuildOutput>>;
}

/// Launches and stops the supervised program.
pub trait ProcessSupervisor: Send {
    /// Launch `program` with `args`, returning its pid.
    fn start(&mut self, program: &Path, args: &str) -> Result<u32>;

    /// Request termination of `pid`.
    ///
    /// Safe on unknown or already exited pids: those return an error the
    /// caller may ignore.
    fn terminate(&mut self, pid: u32) -> BoxFuture<'_, Result<()>>;

    /// Ask `pid` to exit (SIGTERM on Unix), wait up to `grace`, then kill it.
    ///
    /// `Ok(true)` if it exited on its own within `grace`, `Ok(false)` if it
    /// had to be killed. Platforms without signals kill right away.
    fn stop(&mut self, pid: u32, grace: Duration) -> BoxFuture<'_, Result<bool>>;

    fn is_running(&mut self, pid: u32) -> bool;
}
