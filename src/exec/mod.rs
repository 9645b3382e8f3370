// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] defines the [`Compiler`] and [`ProcessSupervisor`] traits the
//!   orchestrator talks to, so tests can swap in fakes.
//! - [`compiler`] runs the real toolchain through the platform shell.
//! - [`supervisor`] spawns and kills the built program with
//!   `tokio::process`.

pub mod backend;
pub mod compiler;
pub mod supervisor;

pub use backend::{BoxFuture, BuildOutput, BuildRequest, Compiler, ProcessSupervisor};
pub use compiler::ShellCompiler;
pub use supervisor::ChildSupervisor;

use std::path::{Path, PathBuf};

use tokio::process::Command;

/// Build a shell command appropriate for the platform.
pub(crate) fn shell_command(line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    }
}

/// Quote `arg` for the shell if it contains whitespace.
pub(crate) fn shell_quote(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Resolve `program` the way a shell would: anything with a directory part
/// is checked as given, a bare name is looked up on `PATH`.
pub fn find_executable(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return is_executable(program).then(|| program.to_path_buf());
    }
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path).find_map(|dir| {
        let candidate = dir.join(program);
        if is_executable(&candidate) {
            return Some(candidate);
        }
        let exe = candidate.with_extension("exe");
        (cfg!(windows) && is_executable(&exe)).then_some(exe)
    })
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
