use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::{check_name, DirHandle, EntryMetadata, FileHandle, StorageBackend};
use crate::error::{StorageError, StorageErrorCode, StorageResult};

const ROOT: &str = "/";

#[derive(Debug, Clone)]
struct MemEntry {
    text: String,
    modified: DateTime<Utc>,
}

/// In-memory storage backend for tests.
///
/// Uses `RefCell` for interior mutability since the pipeline is
/// single-threaded, so the `StorageBackend` trait can keep `&self` methods.
#[derive(Debug)]
pub struct MemoryBackend {
    dirs: RefCell<BTreeSet<PathBuf>>,
    files: RefCell<BTreeMap<PathBuf, MemEntry>>,
    simulate_write_error: RefCell<bool>,
    failing_names: RefCell<HashSet<String>>,
    remove_supported: RefCell<bool>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        let mut dirs = BTreeSet::new();
        dirs.insert(PathBuf::from(ROOT));
        Self {
            dirs: RefCell::new(dirs),
            files: RefCell::new(BTreeMap::new()),
            simulate_write_error: RefCell::new(false),
            failing_names: RefCell::new(HashSet::new()),
            remove_supported: RefCell::new(true),
        }
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail with `WriteFailed`
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make writes to entries called `name` fail, in any directory
    pub fn fail_writes_to(&self, name: impl Into<String>) {
        self.failing_names.borrow_mut().insert(name.into());
    }

    /// Toggle the optional `remove_entry` capability
    pub fn set_remove_supported(&self, supported: bool) {
        *self.remove_supported.borrow_mut() = supported;
    }

    /// Paths of every stored file, sorted
    pub fn file_paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    pub fn file_count(&self) -> usize {
        self.files.borrow().len()
    }

    fn require_dir(&self, dir: &DirHandle) -> StorageResult<()> {
        if self.dirs.borrow().contains(dir.path()) {
            Ok(())
        } else {
            Err(StorageError::new(
                StorageErrorCode::DirectoryNotFound,
                "directory does not exist",
            )
            .with_target(dir))
        }
    }

    fn has_children(&self, path: &Path) -> bool {
        self.files.borrow().keys().any(|p| p.parent() == Some(path))
            || self.dirs.borrow().iter().any(|p| p.parent() == Some(path))
    }
}

impl StorageBackend for MemoryBackend {
    fn select_root(&self) -> StorageResult<DirHandle> {
        Ok(DirHandle::new(ROOT))
    }

    fn list_entries(&self, dir: &DirHandle) -> StorageResult<Vec<FileHandle>> {
        self.require_dir(dir)?;
        Ok(self
            .files
            .borrow()
            .keys()
            .filter(|p| p.parent() == Some(dir.path()))
            .map(FileHandle::new)
            .collect())
    }

    fn read_entry(&self, file: &FileHandle) -> StorageResult<String> {
        self.files
            .borrow()
            .get(file.path())
            .map(|e| e.text.clone())
            .ok_or_else(|| {
                StorageError::new(StorageErrorCode::FileNotFound, "no such entry").with_target(file)
            })
    }

    fn write_entry(
        &self,
        dir: &DirHandle,
        name: &str,
        text: &str,
        create: bool,
    ) -> StorageResult<FileHandle> {
        check_name(dir, name)?;
        self.require_dir(dir)?;

        let target = dir.file(name);
        if *self.simulate_write_error.borrow() || self.failing_names.borrow().contains(name) {
            return Err(
                StorageError::new(StorageErrorCode::WriteFailed, "simulated write error")
                    .with_target(&target),
            );
        }

        let mut files = self.files.borrow_mut();
        if !create && !files.contains_key(target.path()) {
            return Err(StorageError::new(
                StorageErrorCode::FileNotFound,
                "entry does not exist and create was not requested",
            )
            .with_target(&target));
        }
        files.insert(
            target.path().to_path_buf(),
            MemEntry {
                text: text.to_string(),
                modified: Utc::now(),
            },
        );
        Ok(target)
    }

    fn entry_exists(&self, dir: &DirHandle, name: &str) -> StorageResult<bool> {
        check_name(dir, name)?;
        self.require_dir(dir)?;
        let path = dir.path().join(name);
        Ok(self.files.borrow().contains_key(&path) || self.dirs.borrow().contains(&path))
    }

    fn create_subdirectory(&self, dir: &DirHandle, name: &str) -> StorageResult<DirHandle> {
        check_name(dir, name)?;
        self.require_dir(dir)?;

        let child = dir.child(name);
        if self.files.borrow().contains_key(child.path()) {
            return Err(StorageError::new(
                StorageErrorCode::WriteFailed,
                "a file with that name already exists",
            )
            .with_target(&child));
        }
        self.dirs.borrow_mut().insert(child.path().to_path_buf());
        Ok(child)
    }

    fn entry_metadata(&self, file: &FileHandle) -> StorageResult<EntryMetadata> {
        let files = self.files.borrow();
        let entry = files.get(file.path()).ok_or_else(|| {
            StorageError::new(StorageErrorCode::FileNotFound, "no such entry").with_target(file)
        })?;
        Ok(EntryMetadata {
            name: file.name(),
            size: entry.text.len() as u64,
            last_modified: entry.modified,
        })
    }

    fn remove_entry(&self, dir: &DirHandle, name: &str) -> StorageResult<()> {
        if !*self.remove_supported.borrow() {
            return Err(StorageError::not_supported("remove_entry").with_target(dir.file(name)));
        }
        check_name(dir, name)?;

        let path = dir.path().join(name);
        if self.files.borrow_mut().remove(&path).is_some() {
            return Ok(());
        }
        if !self.dirs.borrow().contains(&path) {
            return Err(StorageError::new(StorageErrorCode::FileNotFound, "no such entry")
                .with_target(path.display()));
        }
        if self.has_children(&path) {
            return Err(
                StorageError::new(StorageErrorCode::WriteFailed, "directory is not empty")
                    .with_target(path.display()),
            );
        }
        self.dirs.borrow_mut().remove(&path);
        Ok(())
    }
}
