// src/engine/orchestrator.rs

//! One rebuild cycle, start to finish.
//!
//! ```text
//! Idle -> Pending -> Building -+-> BuildFailed ---------------------> Idle
//!                              +-> BuildSucceeded -> Replacing -> Running (Idle)
//! ```
//!
//! `Pending` lives in the debouncer; everything from `Building` on happens
//! inside [`Orchestrator::run_cycle`].

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::engine::{BuildTarget, TriggerReason};
use crate::exec::{BuildRequest, Compiler, ProcessSupervisor};
use crate::fs::{FileSystem, PlatformFileOps};

/// How long [`Orchestrator::shutdown`] waits for the program to exit after
/// asking it to stop.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// The one program instance we are responsible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisedProcess {
    pub pid: u32,
}

/// Where the orchestrator is within a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Building,
    BuildFailed,
    BuildSucceeded,
    Replacing,
    /// Idle with a live process.
    Running,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Compile failed (or could not start); the running process, if any,
    /// was left alone.
    BuildFailed { exit_code: Option<i32> },
    /// New binary is running. `previous` is the pid that was superseded.
    Replaced { previous: Option<u32>, pid: u32 },
    /// Build succeeded but the new binary would not start. The slot is
    /// empty afterwards.
    LaunchFailed { previous: Option<u32> },
}

/// Owns the supervised-process slot. Nothing else reads or writes it.
pub struct Orchestrator<C: Compiler, S: ProcessSupervisor> {
    target: BuildTarget,
    output: PathBuf,
    compiler: C,
    supervisor: S,
    platform: Box<dyn PlatformFileOps>,
    fs: Arc<dyn FileSystem>,
    process: Option<SupervisedProcess>,
    phase: CyclePhase,
    stop_grace: Duration,
}

impl<C: Compiler, S: ProcessSupervisor> std::fmt::Debug for Orchestrator<C, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("target", &self.target)
            .field("output", &self.output)
            .field("process", &self.process)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<C: Compiler, S: ProcessSupervisor> Orchestrator<C, S> {
    pub fn new(
        target: BuildTarget,
        compiler: C,
        supervisor: S,
        platform: Box<dyn PlatformFileOps>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let output = target.output_path(platform.as_ref());
        Self {
            target,
            output,
            compiler,
            supervisor,
            platform,
            fs,
            process: None,
            phase: CyclePhase::Idle,
            stop_grace: SHUTDOWN_GRACE,
        }
    }

    /// Override the shutdown grace period.
    pub fn with_stop_grace(mut self, grace: Duration) -> Self {
        self.stop_grace = grace;
        self
    }

    /// Where the binary is written.
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    pub fn current_process(&self) -> Option<SupervisedProcess> {
        self.process
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    fn enter(&mut self, next: CyclePhase) {
        debug!(from = ?self.phase, to = ?next, "cycle phase");
        self.phase = next;
    }

    fn settle(&mut self) {
        let next = if self.process.is_some() {
            CyclePhase::Running
        } else {
            CyclePhase::Idle
        };
        self.enter(next);
    }

    /// Compile, and on success replace the supervised process.
    ///
    /// Never fails: every problem is logged and reflected in the outcome so
    /// the caller can go back to idle.
    pub async fn run_cycle(&mut self, trigger: &TriggerReason) -> CycleOutcome {
        info!(entry = ?self.target.entry, ?trigger, "build: starting");
        self.enter(CyclePhase::Building);

        match self.platform.prepare_output(self.fs.as_ref(), &self.output) {
            Ok(Some(aside)) => debug!(path = ?aside, "previous binary renamed"),
            Ok(None) => {}
            Err(err) => warn!(path = ?self.output, error = %err, "could not move previous binary aside"),
        }

        let request = BuildRequest {
            entry: self.target.entry.clone(),
            output: self.output.clone(),
            extra_args: self.target.extra_build_args.clone(),
        };

        let build = match self.compiler.build(request).await {
            Ok(build) => build,
            Err(err) => {
                error!(error = %err, "build error: compiler could not be run");
                self.enter(CyclePhase::BuildFailed);
                self.settle();
                return CycleOutcome::BuildFailed { exit_code: None };
            }
        };

        if !build.success {
            error!(
                exit_code = ?build.exit_code,
                "build error:\n{}",
                build.output.trim_end()
            );
            if let Some(process) = self.process {
                info!(pid = process.pid, "keeping previous process running");
            }
            self.enter(CyclePhase::BuildFailed);
            self.settle();
            return CycleOutcome::BuildFailed {
                exit_code: build.exit_code,
            };
        }

        if !build.output.trim().is_empty() {
            debug!("compiler output:\n{}", build.output.trim_end());
        }
        info!(output = ?self.output, "build: succeeded");
        self.enter(CyclePhase::BuildSucceeded);

        let outcome = self.replace_process().await;
        self.settle();
        outcome
    }

    async fn replace_process(&mut self) -> CycleOutcome {
        self.enter(CyclePhase::Replacing);
        let previous = self.process.take().map(|p| p.pid);

        if let Some(pid) = previous {
            match self.supervisor.terminate(pid).await {
                Ok(()) => info!(pid, "stopped previous process"),
                Err(err) => warn!(pid, error = %err, "kill process error"),
            }
        }

        info!(
            program = ?self.output,
            args = %self.target.run_args,
            "starting process"
        );
        match self.supervisor.start(&self.output, &self.target.run_args) {
            Ok(pid) => {
                info!(pid, "build running");
                self.process = Some(SupervisedProcess { pid });
                CycleOutcome::Replaced { previous, pid }
            }
            Err(err) => {
                error!(error = %err, "build running error");
                CycleOutcome::LaunchFailed { previous }
            }
        }
    }

    /// Stop the supervised process and delete the built binary.
    ///
    /// Unlike a rebuild, the program gets a termination signal and up to
    /// the grace period to exit before it is killed.
    pub async fn shutdown(&mut self) {
        if let Some(process) = self.process.take() {
            let pid = process.pid;
            match self.supervisor.stop(pid, self.stop_grace).await {
                Ok(true) => info!(pid, "process exited gracefully"),
                Ok(false) => warn!(pid, grace = ?self.stop_grace, "process killed after grace period"),
                Err(err) => debug!(pid, error = %err, "stop process error"),
            }
        }
        self.settle();

        if !self.fs.exists(&self.output) {
            return;
        }
        match self.fs.remove_file(&self.output) {
            Ok(()) => info!(path = ?self.output, "deleted binary file"),
            Err(err) => warn!(path = ?self.output, error = %err, "delete binary file error"),
        }
    }
}
