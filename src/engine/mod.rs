// src/engine/mod.rs

//! Build-run orchestration.
//!
//! - [`orchestrator`] owns the single supervised-process slot and runs one
//!   rebuild cycle (compile, then replace the process on success).
//! - [`runtime`] is the async shell: it reads [`RuntimeEvent`]s from a
//!   channel and runs cycles strictly one after another.

use std::path::PathBuf;

use crate::fs::PlatformFileOps;
use crate::watch::CycleGuard;

pub mod orchestrator;
pub mod runtime;

pub use orchestrator::{CycleOutcome, CyclePhase, Orchestrator, SHUTDOWN_GRACE, SupervisedProcess};
pub use runtime::{RunSummary, Runtime};

/// Why a rebuild cycle was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerReason {
    /// Initial build at startup.
    Startup,
    /// The first qualifying change of a burst.
    FileChange(PathBuf),
}

/// Events flowing into the runtime.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// The quiet interval elapsed; run one cycle. Dropping `guard` once the
    /// cycle is over re-arms the debouncer.
    CycleDue {
        trigger: TriggerReason,
        guard: CycleGuard,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// What to build and how to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    /// Source entry point handed to the compiler.
    pub entry: PathBuf,
    /// Directory receiving the binary.
    pub output_dir: PathBuf,
    /// Passed verbatim to the compiler.
    pub extra_build_args: String,
    /// Passed to the launched process.
    pub run_args: String,
}

impl BuildTarget {
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            output_dir: PathBuf::from("./"),
            extra_build_args: String::new(),
            run_args: String::new(),
        }
    }

    /// Binary name: the entry's file name without extension.
    pub fn binary_name(&self) -> String {
        self.entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "main".to_string())
    }

    /// `output_dir/<binary_name><suffix>` for the given platform.
    pub fn output_path(&self, platform: &dyn PlatformFileOps) -> PathBuf {
        platform.executable_path(&self.output_dir.join(self.binary_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{UnixFileOps, WindowsFileOps};

    #[test]
    fn output_path_uses_entry_stem_and_platform_suffix() {
        let mut target = BuildTarget::new("cmd/server/main.go");
        target.output_dir = PathBuf::from("bin");

        assert_eq!(target.output_path(&UnixFileOps), PathBuf::from("bin/main"));
        assert_eq!(
            target.output_path(&WindowsFileOps),
            PathBuf::from("bin/main.exe")
        );
    }

    #[test]
    fn default_output_dir_is_cwd() {
        let target = BuildTarget::new("app.go");
        assert_eq!(target.output_path(&UnixFileOps), PathBuf::from("./app"));
    }
}
