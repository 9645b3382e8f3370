// src/exec/supervisor.rs

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tracing::debug;

use super::backend::{BoxFuture, ProcessSupervisor};
use super::{find_executable, shell_command, shell_quote};
use crate::errors::{HotbuildError, Result};

/// Real supervisor backed by `tokio::process`.
///
/// On Unix the program is launched as `sh -c "exec <program> <args>"`, so the
/// shell handles quoting in `args` and then replaces itself: the pid we
/// record is the program's own. On Windows the binary is executed directly
/// with whitespace-split arguments (going through `cmd /C` would leave the
/// real program as an unsupervised grandchild).
///
/// The program is resolved before spawning, so a missing or non-executable
/// binary is a launch error rather than a shell that exits at once.
///
/// Children are spawned with `kill_on_drop`, so dropping the supervisor
/// takes them down too.
#[derive(Debug, Default)]
pub struct ChildSupervisor {
    children: HashMap<u32, Child>,
}

impl ChildSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    fn command(program: &Path, args: &str) -> Command {
        if cfg!(windows) {
            let mut c = Command::new(program);
            c.args(args.split_whitespace());
            c
        } else {
            let program = shell_quote(&program.to_string_lossy());
            let line = if args.trim().is_empty() {
                format!("exec {program}")
            } else {
                format!("exec {program} {}", args.trim())
            };
            shell_command(&line)
        }
    }
}

impl ProcessSupervisor for ChildSupervisor {
    fn start(&mut self, program: &Path, args: &str) -> Result<u32> {
        if find_executable(program).is_none() {
            return Err(HotbuildError::Process(format!(
                "launching {}: no executable file found",
                program.display()
            )));
        }

        let mut cmd = Self::command(program, args);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| {
            HotbuildError::Process(format!("launching {}: {e}", program.display()))
        })?;
        let pid = child.id().ok_or_else(|| {
            HotbuildError::Process(format!("{} exited immediately", program.display()))
        })?;

        debug!(pid, program = ?program, "spawned process");
        self.children.insert(pid, child);
        Ok(pid)
    }

    fn terminate(&mut self, pid: u32) -> BoxFuture<'_, Result<()>> {
        let child = self.children.remove(&pid);

        Box::pin(async move {
            let Some(mut child) = child else {
                return Err(HotbuildError::Process(format!(
                    "no supervised process with pid {pid}"
                )));
            };

            if let Ok(Some(status)) = child.try_wait() {
                return Err(HotbuildError::Process(format!(
                    "process {pid} already exited ({status})"
                )));
            }

            child
                .kill()
                .await
                .map_err(|e| HotbuildError::Process(format!("killing process {pid}: {e}")))
        })
    }

    fn stop(&mut self, pid: u32, grace: Duration) -> BoxFuture<'_, Result<bool>> {
        let child = self.children.remove(&pid);

        Box::pin(async move {
            let Some(mut child) = child else {
                return Err(HotbuildError::Process(format!(
                    "no supervised process with pid {pid}"
                )));
            };
            if let Ok(Some(status)) = child.try_wait() {
                return Err(HotbuildError::Process(format!(
                    "process {pid} already exited ({status})"
                )));
            }

            #[cfg(unix)]
            {
                // SAFETY: `pid` is our own child and has not been reaped yet,
                // so it cannot have been recycled for another process.
                let sent = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) } == 0;
                if sent {
                    match tokio::time::timeout(grace, child.wait()).await {
                        Ok(Ok(status)) => {
                            debug!(pid, %status, "process exited gracefully");
                            return Ok(true);
                        }
                        Ok(Err(err)) => tracing::warn!(pid, error = %err, "process wait error"),
                        Err(_) => tracing::warn!(pid, ?grace, "process did not exit in time; killing"),
                    }
                } else {
                    debug!(pid, "send signal to process failed; killing");
                }
            }
            #[cfg(not(unix))]
            {
                debug!(pid, ?grace, "no termination signal on this platform; killing");
            }

            child
                .kill()
                .await
                .map_err(|e| HotbuildError::Process(format!("killing process {pid}: {e}")))?;
            Ok(false)
        })
    }

    fn is_running(&mut self, pid: u32) -> bool {
        match self.children.get_mut(&pid) {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }
}
