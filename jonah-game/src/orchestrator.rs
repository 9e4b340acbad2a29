//! Chapter completion: mark complete, then decide what the user sees next.
//!
//! Completion is written to the store before any transition starts, so an
//! interrupted transition never loses a finished chapter.

use thiserror::Error;

use crate::KeyValueStore;
use crate::chapter::{ChapterError, ChapterId};
use crate::config::{JourneyConfig, TransitionImage};
use crate::preload::{PreloadError, PreloadStatus, PreloadTicket, Preloader};
use crate::store::ProgressStore;
use crate::unlock::is_unlocked;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CompletionError {
    #[error("invalid chapter number: {0}")]
    InvalidChapter(#[from] ChapterError),
    #[error("chapter {chapter} cannot be completed before chapter {required}")]
    Locked {
        chapter: ChapterId,
        required: ChapterId,
    },
    #[error("chapter {chapter} is not on screen")]
    NotDisplayed { chapter: ChapterId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionPhase {
    #[default]
    Idle,
    Validating,
    Completing,
    TransitioningOut,
    Advanced,
}

/// Illustrated interstitial blocking the reveal of `pending_chapter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    pub image: TransitionImage,
    pub completed: ChapterId,
    pub pending_chapter: ChapterId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Transition(TransitionRequest),
    /// No illustration registered; show the chapter straight away.
    Chapter(ChapterId),
    JourneyComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub chapter: ChapterId,
    /// False when the chapter had already been completed earlier.
    pub newly_completed: bool,
    pub next: NextStep,
}

#[derive(Debug, Clone, Default)]
pub struct CompletionOrchestrator {
    phase: CompletionPhase,
    pending: Option<TransitionRequest>,
    preloader: Preloader,
}

impl CompletionOrchestrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn phase(&self) -> CompletionPhase {
        self.phase
    }

    #[must_use]
    pub const fn pending_transition(&self) -> Option<&TransitionRequest> {
        self.pending.as_ref()
    }

    #[must_use]
    pub const fn preload_status(&self) -> PreloadStatus {
        self.preloader.status()
    }

    #[must_use]
    pub const fn preload_in_flight(&self) -> Option<PreloadTicket> {
        self.preloader.in_flight()
    }

    pub fn resolve_preload(
        &mut self,
        ticket: PreloadTicket,
        result: Result<(), PreloadError>,
    ) -> bool {
        self.preloader.resolve(ticket, result)
    }

    /// Validate `chapter`, record it in the store and pick the next step.
    ///
    /// # Errors
    ///
    /// `InvalidChapter` for numbers outside 1..=6 and `Locked` when the
    /// predecessor is not complete. Both leave progress untouched.
    pub fn complete_chapter<S: KeyValueStore>(
        &mut self,
        store: &mut ProgressStore<S>,
        config: &JourneyConfig,
        chapter: u32,
    ) -> Result<Completion, CompletionError> {
        self.phase = CompletionPhase::Validating;
        let chapter = match ChapterId::new(chapter) {
            Ok(chapter) => chapter,
            Err(err) => {
                log::error!("invalid chapter number: {chapter}");
                self.phase = CompletionPhase::Idle;
                return Err(err.into());
            }
        };
        let completed = &store.progress().completed_chapters;
        if !completed.contains(&chapter) && !is_unlocked(chapter, completed) {
            let required = chapter.previous().unwrap_or(ChapterId::FIRST);
            log::warn!("refusing to complete chapter {chapter} before chapter {required}");
            self.phase = CompletionPhase::Idle;
            return Err(CompletionError::Locked { chapter, required });
        }

        if let Some(pending) = self.pending.as_ref().filter(|p| p.completed == chapter) {
            log::debug!("chapter {chapter} completion repeated during its transition");
            self.phase = CompletionPhase::TransitioningOut;
            return Ok(Completion {
                chapter,
                newly_completed: false,
                next: NextStep::Transition(pending.clone()),
            });
        }

        self.phase = CompletionPhase::Completing;
        let newly_completed = store.complete_chapter(chapter);

        let next = match chapter.next() {
            None => {
                self.clear_pending();
                self.phase = CompletionPhase::Advanced;
                NextStep::JourneyComplete
            }
            Some(next_chapter) => match config.transition_for(chapter) {
                Some(image) => {
                    let request = TransitionRequest {
                        image: image.clone(),
                        completed: chapter,
                        pending_chapter: next_chapter,
                    };
                    self.preloader.begin(next_chapter);
                    self.pending = Some(request.clone());
                    self.phase = CompletionPhase::TransitioningOut;
                    NextStep::Transition(request)
                }
                None => {
                    self.clear_pending();
                    self.phase = CompletionPhase::Advanced;
                    NextStep::Chapter(store.progress().current_chapter)
                }
            },
        };
        Ok(Completion {
            chapter,
            newly_completed,
            next,
        })
    }

    /// Transition callback: drop bookkeeping only; progress was already written.
    pub fn transition_finished(&mut self) -> Option<TransitionRequest> {
        let finished = self.pending.take();
        if let Some(request) = &finished {
            log::debug!(
                "transition after chapter {} finished (already completed)",
                request.completed
            );
            self.phase = CompletionPhase::Advanced;
        }
        self.preloader.cancel();
        finished
    }

    pub fn reset(&mut self) {
        self.clear_pending();
        self.phase = CompletionPhase::Idle;
    }

    fn clear_pending(&mut self) {
        self.pending = None;
        self.preloader.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn setup() -> (CompletionOrchestrator, ProgressStore<MemoryStore>, JourneyConfig) {
        (
            CompletionOrchestrator::new(),
            ProgressStore::open(MemoryStore::new(), 50),
            JourneyConfig::load_from_static(),
        )
    }

    fn chapter(n: u32) -> ChapterId {
        ChapterId::new(n).unwrap()
    }

    #[test]
    fn first_completion_marks_then_transitions() {
        let (mut orchestrator, mut store, config) = setup();
        let completion = orchestrator.complete_chapter(&mut store, &config, 1).unwrap();
        assert!(completion.newly_completed);
        assert!(store.progress().is_completed(chapter(1)));
        assert_eq!(store.progress().current_chapter, chapter(2));
        match completion.next {
            NextStep::Transition(request) => {
                assert_eq!(request.pending_chapter, chapter(2));
                assert_eq!(request.image.alt, "예수님과 잃어버린 양");
            }
            other => panic!("expected transition, got {other:?}"),
        }
        assert_eq!(orchestrator.phase(), CompletionPhase::TransitioningOut);
        assert_eq!(
            orchestrator.preload_status(),
            PreloadStatus::Loading(chapter(2))
        );
    }

    #[test]
    fn out_of_range_numbers_are_rejected_without_change() {
        let (mut orchestrator, mut store, config) = setup();
        for bad in [0, 7] {
            let before = store.state().clone();
            let err = orchestrator.complete_chapter(&mut store, &config, bad).unwrap_err();
            assert_eq!(
                err,
                CompletionError::InvalidChapter(ChapterError::OutOfRange(bad))
            );
            assert_eq!(store.state(), &before);
            assert_eq!(store.revision(), 0);
            assert_eq!(orchestrator.phase(), CompletionPhase::Idle);
        }
    }

    struct CaptureLogger;

    thread_local! {
        static CAPTURED: std::cell::RefCell<Vec<(log::Level, String)>> =
            const { std::cell::RefCell::new(Vec::new()) };
    }

    static CAPTURE: CaptureLogger = CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata) -> bool {
            true
        }

        fn log(&self, record: &log::Record) {
            CAPTURED.with(|lines| {
                lines
                    .borrow_mut()
                    .push((record.level(), record.args().to_string()));
            });
        }

        fn flush(&self) {}
    }

    #[test]
    fn out_of_range_numbers_are_logged_as_errors() {
        let _ = log::set_logger(&CAPTURE);
        log::set_max_level(log::LevelFilter::Trace);
        let (mut orchestrator, mut store, config) = setup();
        for bad in [0, 7] {
            CAPTURED.with(|lines| lines.borrow_mut().clear());
            assert!(orchestrator.complete_chapter(&mut store, &config, bad).is_err());
            let logged = CAPTURED.with(|lines| lines.borrow().clone());
            assert!(
                logged.contains(&(log::Level::Error, format!("invalid chapter number: {bad}"))),
                "missing error for {bad}: {logged:?}"
            );
        }
    }

    #[test]
    fn locked_chapters_cannot_be_completed() {
        let (mut orchestrator, mut store, config) = setup();
        let err = orchestrator.complete_chapter(&mut store, &config, 3).unwrap_err();
        assert_eq!(
            err,
            CompletionError::Locked {
                chapter: chapter(3),
                required: chapter(2)
            }
        );
        assert!(store.progress().completed_chapters.is_empty());
    }

    #[test]
    fn repeated_completion_reuses_the_pending_transition() {
        let (mut orchestrator, mut store, config) = setup();
        let first = orchestrator.complete_chapter(&mut store, &config, 1).unwrap();
        let progress = store.progress().clone();
        let second = orchestrator.complete_chapter(&mut store, &config, 1).unwrap();
        assert!(!second.newly_completed);
        assert_eq!(first.next, second.next);
        assert_eq!(store.progress(), &progress);
    }

    #[test]
    fn transition_finish_clears_bookkeeping_only() {
        let (mut orchestrator, mut store, config) = setup();
        orchestrator.complete_chapter(&mut store, &config, 1).unwrap();
        let revision = store.revision();
        let finished = orchestrator.transition_finished().unwrap();
        assert_eq!(finished.completed, chapter(1));
        assert!(orchestrator.pending_transition().is_none());
        assert_eq!(orchestrator.preload_status(), PreloadStatus::Idle);
        assert_eq!(store.revision(), revision);
        assert_eq!(orchestrator.phase(), CompletionPhase::Advanced);
    }

    #[test]
    fn terminal_chapter_finishes_the_journey() {
        let (mut orchestrator, mut store, config) = setup();
        for n in 1..=5 {
            orchestrator.complete_chapter(&mut store, &config, n).unwrap();
            orchestrator.transition_finished();
        }
        assert_eq!(store.progress().current_chapter, chapter(6));
        let done = orchestrator.complete_chapter(&mut store, &config, 6).unwrap();
        assert_eq!(done.next, NextStep::JourneyComplete);
        assert_eq!(store.progress().current_chapter, chapter(6));
        assert!(store.progress().is_completed(chapter(6)));
        assert!(orchestrator.pending_transition().is_none());
    }

    #[test]
    fn missing_illustration_skips_the_transition() {
        let (mut orchestrator, mut store, mut config) = setup();
        config.transitions.remove(&1);
        let completion = orchestrator.complete_chapter(&mut store, &config, 1).unwrap();
        assert_eq!(completion.next, NextStep::Chapter(chapter(2)));
        assert_eq!(orchestrator.preload_status(), PreloadStatus::Idle);
    }
}
