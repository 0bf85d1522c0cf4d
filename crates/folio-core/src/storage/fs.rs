use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use super::{check_name, DirHandle, EntryMetadata, FileHandle, StorageBackend};
use crate::error::{StorageError, StorageErrorCode, StorageResult};

/// Filesystem backend rooted at a directory.
///
/// Writes go to a temporary sibling first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FsBackend {
    root: PathBuf,
}

impl FsBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn require_dir(&self, dir: &DirHandle) -> StorageResult<()> {
        if dir.path().is_dir() {
            Ok(())
        } else {
            Err(StorageError::new(
                StorageErrorCode::DirectoryNotFound,
                "directory does not exist",
            )
            .with_target(dir))
        }
    }
}

fn map_io(err: io::Error, fallback: StorageErrorCode, target: impl std::fmt::Display) -> StorageError {
    let code = match err.kind() {
        io::ErrorKind::NotFound => StorageErrorCode::FileNotFound,
        io::ErrorKind::PermissionDenied => StorageErrorCode::PermissionDenied,
        io::ErrorKind::Unsupported => StorageErrorCode::NotSupported,
        _ => fallback,
    };
    StorageError::new(code, err.to_string()).with_target(target)
}

/// Leftovers of an interrupted atomic write
fn is_temp_name(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(".tmp")
}

impl StorageBackend for FsBackend {
    fn select_root(&self) -> StorageResult<DirHandle> {
        let root = DirHandle::new(&self.root);
        self.require_dir(&root)?;
        Ok(root)
    }

    fn list_entries(&self, dir: &DirHandle) -> StorageResult<Vec<FileHandle>> {
        self.require_dir(dir)?;

        let mut files = Vec::new();
        for entry in WalkDir::new(dir.path())
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| {
                let code = match e.io_error().map(io::Error::kind) {
                    Some(io::ErrorKind::PermissionDenied) => StorageErrorCode::PermissionDenied,
                    _ => StorageErrorCode::ReadFailed,
                };
                StorageError::new(code, e.to_string()).with_target(dir)
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if is_temp_name(&name) {
                continue;
            }
            files.push(FileHandle::new(entry.path()));
        }
        Ok(files)
    }

    fn read_entry(&self, file: &FileHandle) -> StorageResult<String> {
        fs::read_to_string(file.path()).map_err(|e| map_io(e, StorageErrorCode::ReadFailed, file))
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
        if !create && !target.path().is_file() {
            return Err(StorageError::new(
                StorageErrorCode::FileNotFound,
                "entry does not exist and create was not requested",
            )
            .with_target(&target));
        }

        let tmp_path = dir
            .path()
            .join(format!(".{}.{}.tmp", name, ulid::Ulid::new()));
        fs::write(&tmp_path, text).map_err(|e| map_io(e, StorageErrorCode::WriteFailed, &target))?;
        if let Err(e) = fs::rename(&tmp_path, target.path()) {
            let _ = fs::remove_file(&tmp_path);
            return Err(map_io(e, StorageErrorCode::WriteFailed, &target));
        }

        tracing::trace!(path = %target, bytes = text.len(), "entry written");
        Ok(target)
    }

    fn entry_exists(&self, dir: &DirHandle, name: &str) -> StorageResult<bool> {
        check_name(dir, name)?;
        self.require_dir(dir)?;
        Ok(dir.path().join(name).exists())
    }

    fn create_subdirectory(&self, dir: &DirHandle, name: &str) -> StorageResult<DirHandle> {
        check_name(dir, name)?;
        self.require_dir(dir)?;

        let child = dir.child(name);
        match fs::create_dir(child.path()) {
            Ok(()) => Ok(child),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && child.path().is_dir() => {
                Ok(child)
            }
            Err(e) => Err(map_io(e, StorageErrorCode::WriteFailed, &child)),
        }
    }

    fn entry_metadata(&self, file: &FileHandle) -> StorageResult<EntryMetadata> {
        let meta =
            fs::metadata(file.path()).map_err(|e| map_io(e, StorageErrorCode::ReadFailed, file))?;
        let modified = meta
            .modified()
            .map_err(|e| map_io(e, StorageErrorCode::ReadFailed, file))?;
        Ok(EntryMetadata {
            name: file.name(),
            size: meta.len(),
            last_modified: DateTime::<Utc>::from(modified),
        })
    }

    fn remove_entry(&self, dir: &DirHandle, name: &str) -> StorageResult<()> {
        check_name(dir, name)?;
        let path = dir.path().join(name);
        let result = if path.is_dir() {
            fs::remove_dir(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| map_io(e, StorageErrorCode::WriteFailed, path.display()))
    }
}
