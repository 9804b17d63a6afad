//! Whole-record JSON persistence.
//!
//! A [`JsonRecord`] owns one file holding one serialized value. Each write
//! goes to a uniquely named sibling temp file that is renamed over the
//! target, so readers never observe a partial record, even when several
//! processes share the file. Writers within a process are also serialized
//! through a per-record lock.

use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};

/// A JSON file holding a single value of type `T`.
#[derive(Debug)]
pub struct JsonRecord<T> {
    path: PathBuf,
    write_gate: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonRecord<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_gate: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the record. A missing file yields `Ok(None)`.
    pub fn load(&self) -> ProviderResult<Option<T>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no persisted record");
                return Ok(None);
            }
            Err(e) => {
                return Err(ProviderError::storage(format!(
                    "failed to read {}",
                    self.path.display()
                ))
                .with_source(e));
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|e| {
            ProviderError::storage(format!("failed to parse {}", self.path.display()))
                .with_source(e)
        })
    }

    /// Replaces the record with `value`.
    pub fn save(&self, value: &T) -> ProviderResult<()> {
        let content = serde_json::to_string_pretty(value).map_err(|e| {
            ProviderError::internal(format!("failed to serialize {}", self.path.display()))
                .with_source(e)
        })?;

        let _guard = self
            .write_gate
            .lock()
            .map_err(|_| ProviderError::storage("record write lock poisoned"))?;

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(|e| {
            ProviderError::storage(format!("failed to create {}", parent.display())).with_source(e)
        })?;

        let write_failed = |e: std::io::Error| {
            ProviderError::storage(format!("failed to write {}", self.path.display()))
                .with_source(e)
        };

        let mut temp = NamedTempFile::new_in(parent).map_err(write_failed)?;
        temp.write_all(content.as_bytes()).map_err(write_failed)?;
        temp.as_file().sync_all().map_err(write_failed)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            temp.as_file()
                .set_permissions(fs::Permissions::from_mode(0o600))
                .map_err(|e| {
                    ProviderError::storage(format!(
                        "failed to restrict permissions on {}",
                        temp.path().display()
                    ))
                    .with_source(e)
                })?;
        }

        temp.persist(&self.path).map_err(|e| {
            ProviderError::storage(format!("failed to replace {}", self.path.display()))
                .with_source(e.error)
        })?;

        debug!(path = %self.path.display(), "saved record");
        Ok(())
    }

    /// Deletes the record. Removing a missing record succeeds.
    pub fn remove(&self) -> ProviderResult<()> {
        let _guard = self
            .write_gate
            .lock()
            .map_err(|_| ProviderError::storage("record write lock poisoned"))?;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "removed record");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ProviderError::storage(format!(
                "failed to remove {}",
                self.path.display()
            ))
            .with_source(e)),
        }
    }
}
