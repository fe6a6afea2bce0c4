//! Loaded-table cache keyed by file path and modification time
//!
//! Only the validated task table is cached. Anything derived from today's
//! date (progress, buckets, visible range) is computed by the caller on
//! every run so a cached table never goes stale across midnight.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::{load, LoadError, LoadOptions, TaskTable};

#[derive(Debug)]
struct CacheEntry {
    modified: SystemTime,
    table: TaskTable,
}

/// Cache of loaded sheets
#[derive(Debug, Default)]
pub struct TaskCache {
    options: LoadOptions,
    entries: HashMap<PathBuf, CacheEntry>,
}

impl TaskCache {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            entries: HashMap::new(),
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Return the cached table for `path`, reloading it when the file's
    /// modification time differs from the cached one.
    ///
    /// A failed reload evicts the stale entry.
    pub fn get_or_load(&mut self, path: &Path) -> Result<&TaskTable, LoadError> {
        let modified = modified_time(path)?;

        match self.entries.entry(path.to_path_buf()) {
            Entry::Occupied(mut entry) => {
                if entry.get().modified == modified {
                    debug!(file = %path.display(), "task cache hit");
                } else {
                    debug!(file = %path.display(), "task cache stale, reloading");
                    match load(path, &self.options) {
                        Ok(table) => {
                            entry.insert(CacheEntry { modified, table });
                        }
                        Err(err) => {
                            entry.remove();
                            return Err(err);
                        }
                    }
                }
                Ok(&entry.into_mut().table)
            }
            Entry::Vacant(slot) => {
                let table = load(path, &self.options)?;
                Ok(&slot.insert(CacheEntry { modified, table }).table)
            }
        }
    }

    /// Drop the entry for `path`; returns whether one was cached
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn modified_time(path: &Path) -> Result<SystemTime, LoadError> {
    let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    })?;
    metadata.modified().map_err(|e| LoadError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
