//! In-memory filesystem adapter for tests and dry runs.

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use stamp_core::{
    application::{ApplicationError, ports::Filesystem},
    error::StampResult,
};

/// In-memory filesystem. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: HashSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file's content.
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// Every file with its size in bytes, sorted by path.
    pub fn list_files(&self) -> Vec<(PathBuf, usize)> {
        match self.inner.read() {
            Ok(inner) => inner
                .files
                .iter()
                .map(|(path, body)| (path.clone(), body.len()))
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> StampResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> StampResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        // Ensure parent exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason: "Parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        match self.inner.read() {
            Ok(inner) => inner.files.contains_key(path) || inner.directories.contains(path),
            Err(_) => false,
        }
    }

    fn remove_dir_all(&self, path: &Path) -> StampResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("out/a.txt"), "a").is_err());

        fs.create_dir_all(Path::new("out")).unwrap();
        fs.write_file(Path::new("out/a.txt"), "a").unwrap();
        assert_eq!(fs.read_file(Path::new("out/a.txt")).as_deref(), Some("a"));
        assert!(fs.exists(Path::new("out")));
    }

    #[test]
    fn remove_dir_all_removes_subtree() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("out/app")).unwrap();
        fs.write_file(Path::new("out/app/x"), "x").unwrap();

        fs.remove_dir_all(Path::new("out")).unwrap();
        assert!(!fs.exists(Path::new("out")));
        assert!(!fs.exists(Path::new("out/app")));
        assert!(fs.list_files().is_empty());
    }

    #[test]
    fn clones_share_contents() {
        let fs = MemoryFilesystem::new();
        let view = fs.clone();
        fs.create_dir_all(Path::new("d")).unwrap();
        fs.write_file(Path::new("d/f"), "body").unwrap();
        assert_eq!(view.list_files(), vec![(PathBuf::from("d/f"), 4)]);
    }
}
