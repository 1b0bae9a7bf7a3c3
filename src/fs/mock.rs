// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File(Vec<u8>),
    Dir(Vec<String>), // List of child names
}

/// In-memory filesystem with simple fault injection.
///
/// Clones share the same underlying tree, so a test can keep one handle for
/// assertions while another is owned by the code under test.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
    denied_writes: Arc<Mutex<HashSet<PathBuf>>>,
    denied_renames: Arc<Mutex<HashSet<PathBuf>>>,
}

fn normalize_parent(path: &Path) -> Option<&Path> {
    path.parent().map(|parent| {
        if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        }
    })
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut files = HashMap::new();
        // Ensure root exists
        files.insert(PathBuf::from("."), MockEntry::Dir(Vec::new()));

        Self {
            files: Arc::new(Mutex::new(files)),
            denied_writes: Arc::default(),
            denied_renames: Arc::default(),
        }
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut files = lock(&self.files);
        files.insert(path.clone(), MockEntry::File(content.into()));
        Self::link_into_parent(&mut files, &path);
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut files = lock(&self.files);
        Self::ensure_dir_entry(&mut files, path.as_ref());
    }

    /// Make every subsequent `write` to `path` fail.
    pub fn deny_write(&self, path: impl AsRef<Path>) {
        lock(&self.denied_writes).insert(path.as_ref().to_path_buf());
    }

    /// Make every subsequent `rename` *onto* `path` fail.
    pub fn deny_rename(&self, path: impl AsRef<Path>) {
        lock(&self.denied_renames).insert(path.as_ref().to_path_buf());
    }

    /// Raw file bytes, for assertions.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        match lock(&self.files).get(path.as_ref()) {
            Some(MockEntry::File(content)) => Some(content.clone()),
            _ => None,
        }
    }

    fn link_into_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if let Some(parent) = normalize_parent(path) {
            if parent == path {
                return;
            }
            Self::ensure_dir_entry(files, parent);
            if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    if !children.iter().any(|c| c == name) {
                        children.push(name.to_string());
                    }
                }
            }
        }
    }

    fn unlink_from_parent(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if let Some(parent) = normalize_parent(path) {
            if let Some(MockEntry::Dir(children)) = files.get_mut(parent) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    children.retain(|c| c != name);
                }
            }
        }
    }

    fn ensure_dir_entry(files: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
        if files.contains_key(path) {
            return;
        }
        files.insert(path.to_path_buf(), MockEntry::Dir(Vec::new()));
        Self::link_into_parent(files, path);
    }
}

impl FileSystem for MockFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        let files = lock(&self.files);
        match files.get(path) {
            Some(MockEntry::File(content)) => {
                String::from_utf8(content.clone()).map_err(|e| anyhow!("Invalid UTF-8: {}", e))
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if lock(&self.denied_writes).contains(path) {
            return Err(anyhow!("Permission denied (mock): {:?}", path));
        }
        self.add_file(path, contents);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        if lock(&self.denied_renames).contains(to) {
            return Err(anyhow!("Permission denied (mock rename): {:?}", to));
        }
        let mut files = lock(&self.files);
        let entry = match files.remove(from) {
            Some(entry @ MockEntry::File(_)) => entry,
            Some(other) => {
                files.insert(from.to_path_buf(), other);
                return Err(anyhow!("Not a file: {:?}", from));
            }
            None => return Err(anyhow!("File not found: {:?}", from)),
        };
        Self::unlink_from_parent(&mut files, from);
        files.insert(to.to_path_buf(), entry);
        Self::link_into_parent(&mut files, to);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        let mut files = lock(&self.files);
        match files.get(path) {
            Some(MockEntry::File(_)) => {
                files.remove(path);
                Self::unlink_from_parent(&mut files, path);
                Ok(())
            }
            Some(MockEntry::Dir(_)) => Err(anyhow!("Is a directory: {:?}", path)),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        self.add_dir(path);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        lock(&self.files).contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(lock(&self.files).get(path), Some(MockEntry::File(_)))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(lock(&self.files).get(path), Some(MockEntry::Dir(_)))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let files = lock(&self.files);
        match files.get(path) {
            Some(MockEntry::Dir(children)) => {
                Ok(children.iter().map(|name| path.join(name)).collect())
            }
            _ => Err(anyhow!("Not a directory or not found: {:?}", path)),
        }
    }
}
