// src/fs/platform.rs

//! Per-platform handling of the built binary.
//!
//! Windows refuses to overwrite an executable that is still running, so the
//! old binary is moved aside (`app.exe` -> `app.exe~`) before each build and
//! every output path gets an `.exe` suffix. Unix needs neither.

use std::ffi::OsString;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::debug;

use super::FileSystem;

/// Capability interface for platform-specific output handling.
pub trait PlatformFileOps: Send + Sync + Debug {
    /// Suffix appended to the built binary's file name (e.g. `".exe"`).
    fn executable_suffix(&self) -> &'static str;

    /// Whether a running executable blocks an in-place overwrite.
    fn locks_running_executables(&self) -> bool;

    /// Apply [`executable_suffix`](Self::executable_suffix) to `path`.
    fn executable_path(&self, path: &Path) -> PathBuf {
        let suffix = self.executable_suffix();
        if suffix.is_empty() {
            return path.to_path_buf();
        }
        let mut name = OsString::from(path.as_os_str());
        name.push(suffix);
        PathBuf::from(name)
    }

    /// Prepare `output` for a fresh build.
    ///
    /// Returns the path the old binary was moved to, if any.
    fn prepare_output(&self, fs: &dyn FileSystem, output: &Path) -> Result<Option<PathBuf>> {
        if !self.locks_running_executables() || !fs.exists(output) {
            return Ok(None);
        }
        let mut aside = OsString::from(output.as_os_str());
        aside.push("~");
        let aside = PathBuf::from(aside);
        fs.rename(output, &aside)?;
        debug!(from = ?output, to = ?aside, "moved previous binary aside");
        Ok(Some(aside))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UnixFileOps;

impl PlatformFileOps for UnixFileOps {
    fn executable_suffix(&self) -> &'static str {
        ""
    }

    fn locks_running_executables(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsFileOps;

impl PlatformFileOps for WindowsFileOps {
    fn executable_suffix(&self) -> &'static str {
        ".exe"
    }

    fn locks_running_executables(&self) -> bool {
        true
    }
}

/// The implementation for the platform we were compiled for.
pub fn native_file_ops() -> Box<dyn PlatformFileOps> {
    if cfg!(windows) {
        Box::new(WindowsFileOps)
    } else {
        Box::new(UnixFileOps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn windows_appends_exe_and_moves_old_binary_aside() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/bin/main.exe", b"old");
        let ops = WindowsFileOps;

        let output = ops.executable_path(Path::new("/proj/bin/main"));
        assert_eq!(output, PathBuf::from("/proj/bin/main.exe"));

        let moved = ops.prepare_output(&fs, &output).unwrap();
        assert_eq!(moved, Some(PathBuf::from("/proj/bin/main.exe~")));
        assert!(!fs.exists(&output));
        assert_eq!(fs.file_contents("/proj/bin/main.exe~"), Some(b"old".to_vec()));
    }

    #[test]
    fn unix_leaves_output_alone() {
        let fs = MockFileSystem::new();
        fs.add_file("/proj/main", b"old");
        let ops = UnixFileOps;

        let output = ops.executable_path(Path::new("/proj/main"));
        assert_eq!(output, PathBuf::from("/proj/main"));
        assert_eq!(ops.prepare_output(&fs, &output).unwrap(), None);
        assert!(fs.exists(&output));
    }

    #[test]
    fn nothing_to_move_when_no_binary_exists() {
        let fs = MockFileSystem::new();
        let ops = WindowsFileOps;
        assert_eq!(
            ops.prepare_output(&fs, Path::new("/proj/main.exe")).unwrap(),
            None
        );
    }
}
