// src/fs/mock.rs

use super::FileSystem;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { executable: bool },
    Dir,
    /// Resolves to the target on `canonicalize`.
    Symlink(PathBuf),
}

/// In-memory filesystem for tests. Paths are used verbatim, so tests should
/// stick to absolute paths.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    entries: Arc<Mutex<HashMap<PathBuf, MockEntry>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        entries.insert(PathBuf::from("/"), MockEntry::Dir);

        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        insert_with_parents(&mut entries, path.as_ref(), MockEntry::Dir);
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        insert_with_parents(&mut entries, path.as_ref(), MockEntry::File { executable: false });
    }

    pub fn add_executable(&self, path: impl AsRef<Path>) {
        let mut entries = self.entries.lock().unwrap();
        insert_with_parents(&mut entries, path.as_ref(), MockEntry::File { executable: true });
    }

    pub fn add_symlink(&self, path: impl AsRef<Path>, target: impl Into<PathBuf>) {
        let mut entries = self.entries.lock().unwrap();
        insert_with_parents(&mut entries, path.as_ref(), MockEntry::Symlink(target.into()));
    }

    fn resolve(&self, path: &Path) -> Option<(PathBuf, MockEntry)> {
        let entries = self.entries.lock().unwrap();
        let mut current = path.to_path_buf();
        // Bounded so a symlink loop cannot hang a test.
        for _ in 0..32 {
            match entries.get(&current) {
                Some(MockEntry::Symlink(target)) => current = target.clone(),
                Some(entry) => return Some((current, entry.clone())),
                None => return None,
            }
        }
        None
    }
}

fn insert_with_parents(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path, entry: MockEntry) {
    let mut parent = path.parent();
    while let Some(p) = parent {
        if p.as_os_str().is_empty() {
            break;
        }
        entries.entry(p.to_path_buf()).or_insert(MockEntry::Dir);
        parent = p.parent();
    }
    entries.insert(path.to_path_buf(), entry);
}

impl FileSystem for MockFileSystem {
    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if let Some((_, entry)) = self.resolve(path) {
            return match entry {
                MockEntry::Dir => Ok(()),
                _ => Err(anyhow!("Not a directory: {:?}", path)),
            };
        }

        let mut entries = self.entries.lock().unwrap();
        let mut ancestor = path.parent();
        while let Some(p) = ancestor {
            if let Some(MockEntry::File { .. }) = entries.get(p) {
                return Err(anyhow!("Not a directory: {:?}", p));
            }
            ancestor = p.parent();
        }
        insert_with_parents(&mut entries, path, MockEntry::Dir);
        Ok(())
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.resolve(path), Some((_, MockEntry::Dir)))
    }

    fn is_executable(&self, path: &Path) -> bool {
        matches!(
            self.resolve(path),
            Some((_, MockEntry::File { executable: true }))
        )
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        if !path.is_absolute() {
            return Err(anyhow!("MockFileSystem only handles absolute paths: {:?}", path));
        }
        self.resolve(path)
            .map(|(p, _)| p)
            .ok_or_else(|| anyhow!("No such file or directory: {:?}", path))
    }
}
