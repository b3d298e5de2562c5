//! Durable storage for previews.
//!
//! A [`PreviewStore`] owns one flat directory. It hands out names through
//! [`naming`](crate::naming), writes encoded bytes without ever clobbering an
//! existing file, and maps caller-supplied locators back to paths inside the
//! root.
//!
//! ## Writes
//!
//! Encoding finishes in memory before the store is touched. The file is then
//! created with `create_new` (an existing name is a [`StorageError::Collision`],
//! not an overwrite), written, and synced. If the write fails the half-written
//! file is removed, so a failed operation leaves nothing behind.
//!
//! ## Locators
//!
//! [`PreviewStore::resolve`] accepts a URL (`http://host/uploads/<name>`), a
//! path (`/uploads/<name>`, `uploads/<name>`) or a bare name. Only the last
//! path component is kept and it must parse as a [`PreviewName`]; anything
//! else is rejected before the filesystem is consulted.

use crate::naming::{PreviewName, Role};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// URL path under which the store directory is served.
pub const PUBLIC_MOUNT: &str = "/uploads";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Preview name already taken: {0}")]
    Collision(String),
    #[error("Not a managed preview: {0}")]
    Foreign(String),
    #[error("Preview not found: {0}")]
    NotFound(String),
}

impl StorageError {
    /// True for errors that mean "the caller named something we do not have".
    pub fn is_unknown_source(&self) -> bool {
        matches!(self, Self::Foreign(_) | Self::NotFound(_))
    }
}

/// A preview written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPreview {
    /// File name inside the store, e.g. `temp-1760000000000-3fa2c1d9.png`.
    pub name: String,
    /// Absolute or root-relative path on disk.
    pub path: PathBuf,
    /// Public locator the static file server answers on.
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct PreviewStore {
    root: PathBuf,
    public_base_url: String,
}

impl PreviewStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the store directory if missing. Safe to call repeatedly and
    /// from concurrent callers.
    pub fn ensure_dir(&self) -> Result<(), StorageError> {
        match fs::create_dir_all(&self.root) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.root.is_dir() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Public URL for a stored file name.
    pub fn url_for(&self, name: &str) -> String {
        format!("{}{}/{}", self.public_base_url, PUBLIC_MOUNT, name)
    }

    /// Write `bytes` under a freshly generated name for `role`.
    pub fn persist(&self, role: Role, bytes: &[u8]) -> Result<StoredPreview, StorageError> {
        let name = PreviewName::generate(role).file_name();
        let path = self.root.join(&name);
        write_new(&path, bytes).map_err(|e| match e.kind() {
            io::ErrorKind::AlreadyExists => StorageError::Collision(name.clone()),
            _ => StorageError::Io(e),
        })?;

        Ok(StoredPreview {
            url: self.url_for(&name),
            name,
            path,
        })
    }

    /// Map a caller-supplied locator to a file inside the store.
    pub fn resolve(&self, locator: &str) -> Result<PathBuf, StorageError> {
        let name = locator_file_name(locator);
        if PreviewName::parse(name).is_none() {
            return Err(StorageError::Foreign(locator.to_string()));
        }
        let path = self.root.join(name);
        if !path.is_file() {
            return Err(StorageError::NotFound(locator.to_string()));
        }
        Ok(path)
    }
}

/// Last path component of a locator, with any query or fragment dropped.
fn locator_file_name(locator: &str) -> &str {
    let trimmed = locator.trim();
    let without_query = trimmed
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or(trimmed);
    without_query
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(without_query)
}

fn write_new(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let written = file.write_all(bytes).and_then(|()| file.sync_all());
    if let Err(e) = written {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(e);
    }
    Ok(())
}
