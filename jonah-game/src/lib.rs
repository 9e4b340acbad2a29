//! Jonah's Journey core
//!
//! Platform-agnostic progress and sequencing logic for the six-chapter Jonah
//! story quiz. This crate has no browser dependencies; hosts plug in a
//! [`KeyValueStore`] and render the [`JourneyView`] the controller hands out.

pub mod catalog;
pub mod chapter;
pub mod chapter_run;
pub mod config;
pub mod journey;
pub mod orchestrator;
pub mod persist;
pub mod preload;
pub mod progress;
pub mod storage;
pub mod store;
pub mod timeline;
pub mod unlock;
pub mod validation;

// Re-export commonly used types
pub use catalog::{CatalogError, ChapterCatalog, ChapterScript, ChapterStep, QuestionSpec};
pub use chapter::{CHAPTER_COUNT, ChapterError, ChapterId};
pub use chapter_run::{AcceptedAnswer, ChapterRun, Clearance, RunEvent};
pub use config::{ConfigError, IntroStep, JourneyConfig, TransitionImage};
pub use journey::{JourneyController, JourneyView};
pub use orchestrator::{
    Completion, CompletionError, CompletionOrchestrator, CompletionPhase, NextStep,
    TransitionRequest,
};
pub use persist::SaveDebouncer;
pub use preload::{PreloadError, PreloadStatus, PreloadTicket, Preloader};
pub use progress::{Progress, ProgressAction, ProgressState};
pub use storage::{INTRO_SEEN_KEY, MemoryStore, MemoryStoreError, PROGRESS_KEY, StorageError};
pub use store::ProgressStore;
pub use timeline::{IntroStage, Timeline, TimerKey, TransitionStage, TransitionTimeline};
pub use unlock::{ChapterStatus, NavEntry, is_selectable, is_unlocked, navigation_entries};
pub use validation::{
    AnswerCheck, normalize, validate_exact_numeric, validate_keyword, validate_verse_answer,
};

/// String key-value storage the progress store persists into.
/// Platform-specific implementations should provide this
pub trait KeyValueStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read a value
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Write a value, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Remove a value; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be modified.
    fn remove_item(&self, key: &str) -> Result<(), Self::Error>;
}
