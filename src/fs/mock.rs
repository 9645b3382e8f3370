// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    unreadable: HashSet<PathBuf>,
}

/// In-memory filesystem for tests. Paths are used verbatim as keys, so tests
/// should stick to one spelling (e.g. always `./src/...` or always `src/...`).
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut state = MockState::default();
        // Ensure root exists
        state
            .entries
            .insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state.lock().unwrap();
        state
            .entries
            .insert(path.clone(), MockEntry::File(content.into()));
        link_to_parent(&mut state.entries, &path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Make `read_dir` fail for `path`, as if permission were denied.
    pub fn deny_read(&self, path: impl AsRef<Path>) {
        let mut state = self.state.lock().unwrap();
        state.unreadable.insert(path.as_ref().to_path_buf());
    }

    pub fn file_contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        match state.entries.get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

fn link_to_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = parent_of(path) else {
        return;
    };
    if parent == path {
        return;
    }
    ensure_dir_entry(entries, parent);
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if !children.iter().any(|c| c == name) {
                children.push(name.to_string());
            }
        }
    }
}

fn unlink_from_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = parent_of(path) else {
        return;
    };
    if let Some(MockEntry::Dir(children)) = entries.get_mut(parent) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            children.retain(|c| c != name);
        }
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
    link_to_parent(entries, path);
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        matches!(state.entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // In mock, we just return the path as is.
        if self.exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(anyhow!("No such file or directory: {:?}", path))
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.entries.remove(from) {
            Some(entry @ MockEntry::File(_)) => {
                unlink_from_parent(&mut state.entries, from);
                state.entries.insert(to.to_path_buf(), entry);
                link_to_parent(&mut state.entries, to);
                Ok(())
            }
            Some(entry) => {
                state.entries.insert(from.to_path_buf(), entry);
                Err(anyhow!("Renaming directories is not supported: {:?}", from))
            }
            None => Err(anyhow!("File not found: {:?}", from)),
        }
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        match state.entries.get(path) {
            Some(MockEntry::File(_)) => {
                state.entries.remove(path);
                unlink_from_parent(&mut state.entries, path);
                Ok(())
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let state = self.state.lock().unwrap();
        if state.unreadable.contains(path) {
            return Err(anyhow!("Permission denied: {:?}", path));
        }
        match state.entries.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
