//! Persistence adapter: task lists and flat documents on disk
//!
//! Loading replaces the whole tree or nothing: the file is read and parsed
//! completely before the store is reset. Saving goes through the file
//! system's atomic write, so a failed save never leaves a partial file.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::codec::{self, FlatMap};
use crate::domain::TaskStore;
use crate::infrastructure::traits::FileSystem;

/// Service for reading and writing task documents.
pub struct PersistenceService {
    fs: Arc<dyn FileSystem>,
}

impl PersistenceService {
    /// Create a new persistence service.
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Replace the store's tree with the task list at `path`.
    ///
    /// # Errors
    /// - `FileNotFound` if `path` does not exist (store untouched)
    /// - `Io` if it cannot be read (store untouched)
    /// - `Codec` if the text does not parse at all (store untouched)
    pub fn load_tasklist(&self, path: &Path, store: &mut TaskStore) -> ApplicationResult<()> {
        let text = self.read_existing(path, "read task list")?;
        codec::decode_into(&text, store)?;
        info!(
            "loaded {} tasks from {}",
            store.node_count(),
            path.display()
        );
        Ok(())
    }

    /// Write the store's full tree to `path`.
    pub fn save_tasklist(&self, path: &Path, store: &TaskStore) -> ApplicationResult<()> {
        let text = codec::encode(store)?;
        self.fs
            .write(path, &text)
            .with_path_context("write task list", path)?;
        info!("saved {} tasks to {}", store.node_count(), path.display());
        Ok(())
    }

    /// Read a flat key/value document.
    pub fn load_flat(&self, path: &Path) -> ApplicationResult<FlatMap> {
        let text = self.read_existing(path, "read document")?;
        let values = codec::deserialize_flat(&text)?;
        debug!("load_flat: {} keys from {}", values.len(), path.display());
        Ok(values)
    }

    /// Write a flat key/value document.
    pub fn save_flat(&self, path: &Path, values: &FlatMap) -> ApplicationResult<()> {
        let text = codec::serialize_flat(values)?;
        self.fs
            .write(path, &text)
            .with_path_context("write document", path)?;
        debug!("save_flat: {} keys to {}", values.len(), path.display());
        Ok(())
    }

    fn read_existing(&self, path: &Path, action: &str) -> ApplicationResult<String> {
        debug!("{}: {}", action, path.display());
        if !self.fs.exists(path) {
            return Err(ApplicationError::FileNotFound(path.to_path_buf()));
        }
        self.fs.read_to_string(path).with_path_context(action, path)
    }
}
