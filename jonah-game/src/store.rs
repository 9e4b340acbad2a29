//! Authoritative progress container with debounced persistence.

use crate::KeyValueStore;
use crate::chapter::ChapterId;
use crate::persist::SaveDebouncer;
use crate::progress::{Progress, ProgressAction, ProgressState};
use crate::storage::{self, StorageError};

/// Single owner of the progress state. Every mutation replaces the state
/// value and bumps a revision; persistence trails behind through
/// [`ProgressStore::poll_save`] or [`ProgressStore::flush`].
#[derive(Debug, Clone)]
pub struct ProgressStore<S: KeyValueStore> {
    backend: S,
    state: ProgressState,
    revision: u64,
    saved_revision: u64,
    /// A reset whose removal of the stored entries has not succeeded yet.
    clear_pending: bool,
    debouncer: SaveDebouncer,
}

impl<S: KeyValueStore> ProgressStore<S> {
    /// Load from `backend`, falling back to defaults on any failure.
    pub fn open(backend: S, save_debounce_ms: u32) -> Self {
        let state = storage::read_state(&backend);
        Self {
            backend,
            state,
            revision: 0,
            saved_revision: 0,
            clear_pending: false,
            debouncer: SaveDebouncer::new(save_debounce_ms),
        }
    }

    #[must_use]
    pub const fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub const fn progress(&self) -> &Progress {
        &self.state.progress
    }

    #[must_use]
    pub const fn intro_seen(&self) -> bool {
        self.state.intro_seen
    }

    /// Bumped on every state replacement.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    #[must_use]
    pub const fn has_unsaved_changes(&self) -> bool {
        self.clear_pending || self.revision != self.saved_revision
    }

    #[must_use]
    pub const fn backend(&self) -> &S {
        &self.backend
    }

    /// Apply `action`; returns whether the state changed.
    pub fn dispatch(&mut self, action: ProgressAction) -> bool {
        match self.state.reduce(action) {
            Some(next) => {
                self.state = next;
                self.revision += 1;
                true
            }
            None => false,
        }
    }

    pub fn complete_chapter(&mut self, chapter: ChapterId) -> bool {
        self.dispatch(ProgressAction::CompleteChapter(chapter))
    }

    pub fn save_answer(&mut self, question_id: &str, answer: &str) -> bool {
        self.dispatch(ProgressAction::SaveAnswer {
            question_id: question_id.to_string(),
            answer: answer.to_string(),
        })
    }

    pub fn mark_intro_seen(&mut self) -> bool {
        self.dispatch(ProgressAction::SetIntroSeen(true))
    }

    /// Clear both durable entries and return to the initial state.
    ///
    /// If the entries cannot be removed the store stays unsaved, and the next
    /// due [`ProgressStore::poll_save`] or [`ProgressStore::flush`] clears them
    /// again before writing.
    pub fn reset(&mut self) {
        self.dispatch(ProgressAction::Reset);
        self.debouncer.resync(self.revision);
        self.saved_revision = self.revision;
        match storage::clear_state(&self.backend) {
            Ok(()) => self.clear_pending = false,
            Err(err) => {
                log::error!("failed to clear stored progress, will retry: {err}");
                self.clear_pending = true;
            }
        }
        log::info!("progress reset");
    }

    /// Replace the in-memory state with whatever storage holds.
    pub fn reload(&mut self) {
        if self.clear_pending {
            log::warn!("stored progress is still awaiting a reset; keeping the reset state");
            return;
        }
        let loaded = storage::read_state(&self.backend);
        self.dispatch(ProgressAction::Load(loaded));
        self.saved_revision = self.revision;
        self.debouncer.resync(self.revision);
    }

    /// Drive the debounced write; returns whether a write succeeded.
    pub fn poll_save(&mut self, now_ms: u64) -> bool {
        if !self.has_unsaved_changes() {
            self.debouncer.settle();
            return false;
        }
        self.debouncer.observe(self.revision, now_ms);
        // Owed writes for an already observed revision: a failed write or a failed reset.
        self.debouncer.arm_if_idle(now_ms);
        if !self.debouncer.is_due(now_ms) {
            return false;
        }
        self.debouncer.settle();
        self.flush().is_ok()
    }

    /// Write the current snapshot immediately.
    ///
    /// # Errors
    ///
    /// Returns the storage failure; the in-memory state is kept either way.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        if self.clear_pending {
            if let Err(err) = storage::clear_state(&self.backend) {
                log::error!("failed to clear stored progress: {err}");
                return Err(err);
            }
            self.clear_pending = false;
        }
        match storage::write_state(&self.backend, &self.state) {
            Ok(()) => {
                self.saved_revision = self.revision;
                Ok(())
            }
            Err(err) => {
                log::error!("failed to save progress: {err}");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{INTRO_SEEN_KEY, MemoryStore, PROGRESS_KEY};

    fn chapter(n: u32) -> ChapterId {
        ChapterId::new(n).unwrap()
    }

    #[test]
    fn fresh_store_starts_at_defaults() {
        let store = ProgressStore::open(MemoryStore::new(), 50);
        assert_eq!(store.state(), &ProgressState::default());
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn repeated_completion_does_not_bump_revision() {
        let mut store = ProgressStore::open(MemoryStore::new(), 50);
        assert!(store.complete_chapter(chapter(1)));
        let revision = store.revision();
        let snapshot = store.progress().clone();
        assert!(!store.complete_chapter(chapter(1)));
        assert_eq!(store.revision(), revision);
        assert_eq!(store.progress(), &snapshot);
    }

    #[test]
    fn saves_are_coalesced_within_the_window() {
        let backend = MemoryStore::new();
        let mut store = ProgressStore::open(backend.clone(), 50);
        store.save_answer("chapter1", "마18:14");
        assert!(!store.poll_save(0));
        store.complete_chapter(chapter(1));
        assert!(!store.poll_save(30));
        store.save_answer("chapter2_verse", "요나1:3");
        assert!(!store.poll_save(60));
        assert!(store.poll_save(110));
        assert_eq!(backend.write_count(), 1);
        assert!(!store.poll_save(500));

        let stored = Progress::from_json(&backend.raw(PROGRESS_KEY).unwrap()).unwrap();
        assert_eq!(&stored, store.progress());
        assert_eq!(stored.answers.len(), 2);
    }

    #[test]
    fn write_failures_keep_memory_state() {
        let backend = MemoryStore::new();
        let mut store = ProgressStore::open(backend.clone(), 0);
        backend.set_failing(false, true);
        store.complete_chapter(chapter(1));
        assert!(!store.poll_save(10));
        assert!(store.has_unsaved_changes());
        assert!(store.progress().is_completed(chapter(1)));

        backend.set_failing(false, false);
        store.flush().unwrap();
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn reset_clears_storage_and_state() {
        let backend = MemoryStore::new();
        let mut store = ProgressStore::open(backend.clone(), 50);
        store.mark_intro_seen();
        for n in 1..=4 {
            store.complete_chapter(chapter(n));
        }
        store.flush().unwrap();
        assert_eq!(backend.raw(INTRO_SEEN_KEY).as_deref(), Some("true"));

        store.reset();
        assert_eq!(store.state(), &ProgressState::default());
        assert!(backend.raw(PROGRESS_KEY).is_none());
        assert!(backend.raw(INTRO_SEEN_KEY).is_none());
        assert!(!store.poll_save(1_000));
    }

    #[test]
    fn reload_picks_up_stored_state() {
        let backend = MemoryStore::new();
        let mut store = ProgressStore::open(backend.clone(), 50);
        store.complete_chapter(chapter(1));
        store.flush().unwrap();
        store.complete_chapter(chapter(2));
        store.reload();
        assert!(store.progress().is_completed(chapter(1)));
        assert!(!store.progress().is_completed(chapter(2)));
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn failed_write_is_retried_by_later_polls() {
        let backend = MemoryStore::new();
        let mut store = ProgressStore::open(backend.clone(), 50);
        backend.set_failing(false, true);
        for n in 1..=6 {
            store.complete_chapter(chapter(n));
        }
        assert!(!store.poll_save(0));
        assert!(!store.poll_save(60), "write is attempted and fails");
        assert!(store.has_unsaved_changes());

        backend.set_failing(false, false);
        let retried = (100..10_000).step_by(10).any(|t| store.poll_save(t));
        assert!(retried);
        assert!(!store.has_unsaved_changes());
        let stored = Progress::from_json(&backend.raw(PROGRESS_KEY).unwrap()).unwrap();
        assert!(stored.is_completed(chapter(6)));
    }

    #[test]
    fn failed_reset_is_finished_once_storage_recovers() {
        let backend = MemoryStore::new();
        let mut store = ProgressStore::open(backend.clone(), 50);
        store.mark_intro_seen();
        for n in 1..=3 {
            store.complete_chapter(chapter(n));
        }
        store.flush().unwrap();

        backend.set_failing(false, true);
        store.reset();
        assert_eq!(store.state(), &ProgressState::default());
        assert!(store.has_unsaved_changes());
        store.reload();
        assert_eq!(store.state(), &ProgressState::default(), "reload must not resurrect");

        backend.set_failing(false, false);
        let saved = (0..5_000).step_by(10).any(|t| store.poll_save(t));
        assert!(saved);
        assert!(!store.has_unsaved_changes());
        assert!(backend.raw(INTRO_SEEN_KEY).is_none());

        let reopened = ProgressStore::open(backend, 50);
        assert_eq!(reopened.state(), &ProgressState::default());
    }
}
