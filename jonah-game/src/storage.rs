//! Durable layout of the progress aggregate and an in-memory backend.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

use crate::KeyValueStore;
use crate::progress::{Progress, ProgressState};

pub const PROGRESS_KEY: &str = "jonah-journey-progress";
pub const INTRO_SEEN_KEY: &str = "jonah-intro-seen";
const INTRO_SEEN_VALUE: &str = "true";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("reading {key} failed: {message}")]
    Read { key: &'static str, message: String },
    #[error("writing {key} failed: {message}")]
    Write { key: &'static str, message: String },
    #[error("removing {key} failed: {message}")]
    Remove { key: &'static str, message: String },
    #[error("progress could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read both entries. Never fails: unreadable or corrupt data falls back to
/// defaults and is logged.
pub fn read_state<S: KeyValueStore>(backend: &S) -> ProgressState {
    let progress = match backend.get_item(PROGRESS_KEY) {
        Ok(Some(raw)) => Progress::from_json(&raw).unwrap_or_else(|err| {
            log::error!("stored progress is corrupt, starting over: {err}");
            Progress::default()
        }),
        Ok(None) => Progress::default(),
        Err(err) => {
            log::error!(
                "{}",
                StorageError::Read {
                    key: PROGRESS_KEY,
                    message: err.to_string(),
                }
            );
            Progress::default()
        }
    };
    let intro_seen = match backend.get_item(INTRO_SEEN_KEY) {
        Ok(value) => value.as_deref() == Some(INTRO_SEEN_VALUE),
        Err(err) => {
            log::error!(
                "{}",
                StorageError::Read {
                    key: INTRO_SEEN_KEY,
                    message: err.to_string(),
                }
            );
            false
        }
    };
    log::info!(
        "loaded progress: current chapter {}, completed {:?}, {} answers, intro seen {intro_seen}",
        progress.current_chapter,
        progress.completed_chapters,
        progress.answers.len()
    );
    ProgressState {
        progress,
        intro_seen,
    }
}

/// Write the progress entry, plus the intro flag once it is set.
///
/// # Errors
///
/// Returns the first encode or backend failure.
pub fn write_state<S: KeyValueStore>(backend: &S, state: &ProgressState) -> Result<(), StorageError> {
    let json = state.progress.to_json()?;
    backend
        .set_item(PROGRESS_KEY, &json)
        .map_err(|err| StorageError::Write {
            key: PROGRESS_KEY,
            message: err.to_string(),
        })?;
    if state.intro_seen {
        backend
            .set_item(INTRO_SEEN_KEY, INTRO_SEEN_VALUE)
            .map_err(|err| StorageError::Write {
                key: INTRO_SEEN_KEY,
                message: err.to_string(),
            })?;
    }
    log::debug!(
        "saved progress: current chapter {}, completed {:?}, {} answers",
        state.progress.current_chapter,
        state.progress.completed_chapters,
        state.progress.answers.len()
    );
    Ok(())
}

/// Remove both entries, attempting each even if the first fails.
///
/// # Errors
///
/// Returns the first backend failure.
pub fn clear_state<S: KeyValueStore>(backend: &S) -> Result<(), StorageError> {
    let mut first_error = None;
    for key in [PROGRESS_KEY, INTRO_SEEN_KEY] {
        if let Err(err) = backend.remove_item(key) {
            first_error.get_or_insert(StorageError::Remove {
                key,
                message: err.to_string(),
            });
        }
    }
    first_error.map_or(Ok(()), Err)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryStoreError {
    #[error("storage disabled")]
    Disabled,
    #[error("quota exceeded")]
    QuotaExceeded,
}

/// Shared in-memory backend. Clones see the same entries, and reads or writes
/// can be switched to fail for exercising degraded persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    fail_reads: Rc<Cell<bool>>,
    fail_writes: Rc<Cell<bool>>,
    writes: Rc<Cell<usize>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn set_failing(&self, reads: bool, writes: bool) {
        self.fail_reads.set(reads);
        self.fail_writes.set(writes);
    }

    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    /// Successful `set_item` calls so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl KeyValueStore for MemoryStore {
    type Error = MemoryStoreError;

    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
        if self.fail_reads.get() {
            return Err(MemoryStoreError::Disabled);
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            return Err(MemoryStoreError::QuotaExceeded);
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
        if self.fail_writes.get() {
            return Err(MemoryStoreError::Disabled);
        }
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
