//! Top-level journey state machine: intro, chapters, transitions, completion.
//!
//! The controller owns the progress store and decides which screen the host
//! renders. Timers are armed by the host from [`JourneyController::pending_timer`]
//! and reported back with [`JourneyController::fire_timer`]; leaving a screen
//! drops its timeline, so late timers are ignored.

use crate::KeyValueStore;
use crate::catalog::ChapterCatalog;
use crate::chapter::{CHAPTER_COUNT, ChapterId};
use crate::config::{JourneyConfig, TransitionImage};
use crate::orchestrator::{
    Completion, CompletionError, CompletionOrchestrator, NextStep, TransitionRequest,
};
use crate::preload::{PreloadError, PreloadStatus, PreloadTicket};
use crate::progress::Progress;
use crate::store::ProgressStore;
use crate::storage::StorageError;
use crate::timeline::{IntroStage, Timeline, TimerKey, TransitionStage, TransitionTimeline};
use crate::unlock::{NavEntry, is_selectable, navigation_entries};

/// What the host should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JourneyView {
    Intro(IntroStage),
    Chapter {
        chapter: ChapterId,
        /// Message of a contained chapter failure, if any.
        fault: Option<String>,
    },
    Transition {
        image: TransitionImage,
        pending_chapter: ChapterId,
        stage: TransitionStage,
    },
    Complete,
}

#[derive(Debug, Clone)]
enum Screen {
    Intro(Timeline<IntroStage>),
    Chapter,
    Transition {
        request: TransitionRequest,
        timeline: TransitionTimeline,
    },
    Complete,
}

pub struct JourneyController<S: KeyValueStore> {
    store: ProgressStore<S>,
    orchestrator: CompletionOrchestrator,
    config: JourneyConfig,
    catalog: ChapterCatalog,
    screen: Screen,
    displayed: ChapterId,
    fault: Option<String>,
    next_token: u64,
}

impl<S: KeyValueStore> JourneyController<S> {
    /// Load progress from `backend` and pick the opening screen.
    pub fn new(backend: S, config: JourneyConfig, catalog: ChapterCatalog) -> Self {
        let store = ProgressStore::open(backend, config.save_debounce_ms);
        let mut controller = Self {
            displayed: store.progress().current_chapter,
            store,
            orchestrator: CompletionOrchestrator::new(),
            config,
            catalog,
            screen: Screen::Complete,
            fault: None,
            next_token: 0,
        };
        controller.screen = controller.opening_screen();
        controller
    }

    /// Controller over the bundled configuration and chapter catalog.
    pub fn with_bundled_assets(backend: S) -> Self {
        Self::new(
            backend,
            JourneyConfig::load_from_static(),
            ChapterCatalog::shared().clone(),
        )
    }

    fn opening_screen(&mut self) -> Screen {
        if !self.store.intro_seen() {
            let token = self.issue_token();
            Screen::Intro(self.config.intro_timeline(token))
        } else if self.store.progress().is_completed(ChapterId::LAST) {
            Screen::Complete
        } else {
            Screen::Chapter
        }
    }

    fn issue_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    #[must_use]
    pub fn view(&self) -> JourneyView {
        match &self.screen {
            Screen::Intro(timeline) => {
                JourneyView::Intro(timeline.current().unwrap_or(IntroStage::Expanding))
            }
            Screen::Chapter => JourneyView::Chapter {
                chapter: self.displayed,
                fault: self.fault.clone(),
            },
            Screen::Transition { request, timeline } => JourneyView::Transition {
                image: request.image.clone(),
                pending_chapter: request.pending_chapter,
                stage: timeline.stage().unwrap_or(TransitionStage::FadingOut),
            },
            Screen::Complete => JourneyView::Complete,
        }
    }

    #[must_use]
    pub const fn displayed_chapter(&self) -> ChapterId {
        self.displayed
    }

    /// Timer the host should arm for the active screen, if it has one.
    #[must_use]
    pub fn pending_timer(&self) -> Option<(TimerKey, u32)> {
        match &self.screen {
            Screen::Intro(timeline) => timeline.pending_timer(),
            Screen::Transition { timeline, .. } => timeline.pending_timer(),
            Screen::Chapter | Screen::Complete => None,
        }
    }

    /// Deliver an expired host timer; returns whether anything advanced.
    pub fn fire_timer(&mut self, key: TimerKey) -> bool {
        let (fired, finished) = match &mut self.screen {
            Screen::Intro(timeline) => {
                let fired = timeline.fire(key);
                (fired, timeline.is_finished())
            }
            Screen::Transition { timeline, .. } => {
                let fired = timeline.fire(key);
                (fired, timeline.is_finished())
            }
            Screen::Chapter | Screen::Complete => {
                log::debug!("timer {key:?} fired with no timeline active");
                (false, false)
            }
        };
        if fired && finished {
            self.finish_active_timeline();
        }
        fired
    }

    /// Advance the active timeline by elapsed time instead of discrete timers.
    pub fn tick(&mut self, ms: u32) {
        let finished = match &mut self.screen {
            Screen::Intro(timeline) => {
                timeline.tick(ms);
                timeline.is_finished()
            }
            Screen::Transition { timeline, .. } => {
                timeline.tick(ms);
                timeline.is_finished()
            }
            Screen::Chapter | Screen::Complete => false,
        };
        if finished {
            self.finish_active_timeline();
        }
    }

    fn finish_active_timeline(&mut self) {
        match self.screen {
            Screen::Intro(_) => self.finish_intro(),
            Screen::Transition { .. } => self.transition_finished(),
            Screen::Chapter | Screen::Complete => {}
        }
    }

    /// Intro completion callback: remember the intro and show the current chapter.
    pub fn finish_intro(&mut self) {
        if !matches!(self.screen, Screen::Intro(_)) {
            return;
        }
        self.store.mark_intro_seen();
        self.displayed = self.store.progress().current_chapter;
        self.screen = Screen::Chapter;
        log::info!("intro finished; showing chapter {}", self.displayed);
    }

    /// The transition illustration finished loading; its display clock starts.
    pub fn image_loaded(&mut self) {
        if let Screen::Transition { timeline, .. } = &mut self.screen {
            timeline.image_loaded();
        }
    }

    /// Completion signal from the displayed chapter unit.
    ///
    /// # Errors
    ///
    /// `InvalidChapter` and `Locked` come from the orchestrator; `NotDisplayed`
    /// when the signal does not come from the chapter on screen. Progress is
    /// unchanged in every error case. A repeat from the chapter whose
    /// transition is playing returns that transition and leaves it running.
    pub fn chapter_completed(&mut self, chapter: u32) -> Result<Completion, CompletionError> {
        let mut repeat = false;
        if let Ok(id) = ChapterId::new(chapter) {
            repeat = matches!(
                &self.screen,
                Screen::Transition { request, .. } if request.completed == id
            );
            let on_screen = matches!(self.screen, Screen::Chapter) && id == self.displayed;
            if !on_screen && !repeat {
                log::warn!("ignoring completion of chapter {id}, which is not on screen");
                return Err(CompletionError::NotDisplayed { chapter: id });
            }
        }
        let completion = self
            .orchestrator
            .complete_chapter(&mut self.store, &self.config, chapter)?;
        if repeat {
            return Ok(completion);
        }
        self.fault = None;
        match &completion.next {
            NextStep::Transition(request) => {
                let token = self.issue_token();
                self.screen = Screen::Transition {
                    request: request.clone(),
                    timeline: self.config.transition_timeline(token),
                };
            }
            NextStep::Chapter(next) => {
                self.displayed = *next;
                self.screen = Screen::Chapter;
            }
            NextStep::JourneyComplete => {
                log::info!("journey complete");
                self.screen = Screen::Complete;
            }
        }
        Ok(completion)
    }

    /// Transition completion callback: reveal the chapter the store points at.
    pub fn transition_finished(&mut self) {
        if !matches!(self.screen, Screen::Transition { .. }) {
            return;
        }
        self.orchestrator.transition_finished();
        self.displayed = self.store.progress().current_chapter;
        self.screen = Screen::Chapter;
    }

    /// Manual navigation; only unlocked, unfinished chapters can be picked.
    pub fn select_chapter(&mut self, chapter: u32) -> bool {
        if !matches!(self.screen, Screen::Chapter) {
            return false;
        }
        let Ok(id) = ChapterId::new(chapter) else {
            log::warn!("navigation to invalid chapter {chapter}");
            return false;
        };
        if !is_selectable(id, &self.store.progress().completed_chapters) {
            log::debug!("chapter {id} is not selectable");
            return false;
        }
        if id != self.displayed {
            self.displayed = id;
            self.fault = None;
        }
        true
    }

    /// Reset progress and the intro flag, then replay the intro.
    pub fn restart(&mut self) {
        self.store.reset();
        self.orchestrator.reset();
        self.fault = None;
        self.displayed = self.store.progress().current_chapter;
        self.screen = self.opening_screen();
    }

    /// Contain a failure inside the displayed chapter unit.
    pub fn report_chapter_fault(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("chapter {} failed: {message}", self.displayed);
        self.fault = Some(message);
    }

    #[must_use]
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    /// Reload-equivalent recovery: persist what we have, then start over
    /// from storage.
    pub fn recover_from_fault(&mut self) {
        if self.store.has_unsaved_changes() && self.store.flush().is_err() {
            log::warn!("recovering chapter {} without unsaved changes", self.displayed);
        }
        self.store.reload();
        self.orchestrator.reset();
        self.fault = None;
        self.displayed = self.store.progress().current_chapter;
        self.screen = self.opening_screen();
    }

    /// Record an answer accepted by a chapter unit.
    pub fn record_answer(&mut self, question_id: &str, answer: &str) -> bool {
        self.store.save_answer(question_id, answer)
    }

    #[must_use]
    pub fn navigation(&self) -> Vec<NavEntry> {
        navigation_entries(self.store.progress(), self.displayed, &self.catalog)
    }

    /// Header counter text such as `2/6`.
    #[must_use]
    pub fn progress_label(&self) -> String {
        format!("{}/{CHAPTER_COUNT}", self.store.progress().completed_count())
    }

    #[must_use]
    pub const fn progress(&self) -> &Progress {
        self.store.progress()
    }

    #[must_use]
    pub const fn intro_seen(&self) -> bool {
        self.store.intro_seen()
    }

    #[must_use]
    pub const fn store(&self) -> &ProgressStore<S> {
        &self.store
    }

    #[must_use]
    pub const fn config(&self) -> &JourneyConfig {
        &self.config
    }

    #[must_use]
    pub const fn catalog(&self) -> &ChapterCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn preload_in_flight(&self) -> Option<PreloadTicket> {
        self.orchestrator.preload_in_flight()
    }

    #[must_use]
    pub const fn preload_status(&self) -> PreloadStatus {
        self.orchestrator.preload_status()
    }

    /// Apply a background preload result; stale tickets are dropped.
    pub fn resolve_preload(&mut self, ticket: PreloadTicket) -> bool {
        let result = if self.catalog.chapter(ticket.chapter()).is_some() {
            Ok(())
        } else {
            Err(PreloadError::Missing(ticket.chapter()))
        };
        self.orchestrator.resolve_preload(ticket, result)
    }

    /// Drive the debounced save; call on every revision change and timer.
    pub fn poll_save(&mut self, now_ms: u64) -> bool {
        self.store.poll_save(now_ms)
    }

    /// # Errors
    ///
    /// Returns the storage failure; in-memory progress is kept.
    pub fn flush(&mut self) -> Result<(), StorageError> {
        self.store.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{INTRO_SEEN_KEY, MemoryStore, PROGRESS_KEY};

    fn chapter(n: u32) -> ChapterId {
        ChapterId::new(n).unwrap()
    }

    fn fresh() -> (JourneyController<MemoryStore>, MemoryStore) {
        let backend = MemoryStore::new();
        (
            JourneyController::with_bundled_assets(backend.clone()),
            backend,
        )
    }

    fn past_intro() -> (JourneyController<MemoryStore>, MemoryStore) {
        let backend = MemoryStore::new().with_entry(INTRO_SEEN_KEY, "true");
        (
            JourneyController::with_bundled_assets(backend.clone()),
            backend,
        )
    }

    #[test]
    fn fresh_journey_opens_with_intro() {
        let (mut journey, _) = fresh();
        assert_eq!(journey.view(), JourneyView::Intro(IntroStage::Loading));
        journey.tick(1_500);
        assert_eq!(journey.view(), JourneyView::Intro(IntroStage::Appearing));
        journey.tick(6_500);
        assert_eq!(
            journey.view(),
            JourneyView::Chapter {
                chapter: chapter(1),
                fault: None
            }
        );
        assert!(journey.intro_seen());
    }

    #[test]
    fn intro_timers_advance_one_stage_each() {
        let (mut journey, backend) = fresh();
        let mut fired = 0;
        while let Some((key, _)) = journey.pending_timer() {
            assert!(journey.fire_timer(key));
            assert!(!journey.fire_timer(key), "a key fires once");
            fired += 1;
        }
        assert_eq!(fired, 6);
        assert!(matches!(journey.view(), JourneyView::Chapter { .. }));
        journey.flush().unwrap();
        assert_eq!(backend.raw(INTRO_SEEN_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn seen_intro_resumes_at_current_chapter() {
        let backend = MemoryStore::new()
            .with_entry(INTRO_SEEN_KEY, "true")
            .with_entry(
                PROGRESS_KEY,
                r#"{"currentChapter":3,"completedChapters":[1,2],"answers":{}}"#,
            );
        let journey = JourneyController::with_bundled_assets(backend);
        assert_eq!(journey.displayed_chapter(), chapter(3));
        assert_eq!(journey.progress_label(), "2/6");
    }

    #[test]
    fn completion_shows_transition_until_its_timers_run() {
        let (mut journey, _) = past_intro();
        journey.chapter_completed(1).unwrap();
        assert!(journey.progress().is_completed(chapter(1)));
        match journey.view() {
            JourneyView::Transition {
                pending_chapter,
                stage,
                ..
            } => {
                assert_eq!(pending_chapter, chapter(2));
                assert_eq!(stage, TransitionStage::Loading);
            }
            other => panic!("expected transition, got {other:?}"),
        }
        assert!(journey.pending_timer().is_none(), "waits for the image");
        journey.tick(10_000);
        assert!(matches!(journey.view(), JourneyView::Transition { .. }));

        journey.image_loaded();
        journey.tick(2_500);
        assert!(matches!(
            journey.view(),
            JourneyView::Transition {
                stage: TransitionStage::FadingOut,
                ..
            }
        ));
        journey.tick(500);
        assert_eq!(journey.displayed_chapter(), chapter(2));
        assert!(matches!(journey.view(), JourneyView::Chapter { .. }));
    }

    #[test]
    fn stale_transition_timer_is_ignored_after_exit() {
        let (mut journey, _) = past_intro();
        journey.chapter_completed(1).unwrap();
        journey.image_loaded();
        let (key, remaining) = journey.pending_timer().unwrap();
        assert_eq!(remaining, 2_500);
        journey.transition_finished();
        assert!(!journey.fire_timer(key));
        assert_eq!(journey.displayed_chapter(), chapter(2));
    }

    #[test]
    fn completion_from_a_hidden_chapter_is_rejected() {
        let (mut journey, _) = past_intro();
        assert_eq!(
            journey.chapter_completed(2),
            Err(CompletionError::NotDisplayed {
                chapter: chapter(2)
            })
        );
        assert!(journey.chapter_completed(9).is_err());
        assert!(journey.progress().completed_chapters.is_empty());
    }

    #[test]
    fn repeated_completion_keeps_the_running_transition() {
        let (mut journey, _) = past_intro();
        let first = journey.chapter_completed(1).unwrap();
        journey.image_loaded();
        let (key, _) = journey.pending_timer().unwrap();
        let revision = journey.store().revision();

        let again = journey.chapter_completed(1).unwrap();
        assert!(!again.newly_completed);
        assert_eq!(again.next, first.next);
        assert_eq!(journey.store().revision(), revision);
        assert_eq!(journey.pending_timer().map(|(k, _)| k), Some(key));

        assert_eq!(
            journey.chapter_completed(2),
            Err(CompletionError::NotDisplayed {
                chapter: chapter(2)
            })
        );
        journey.transition_finished();
        assert_eq!(journey.displayed_chapter(), chapter(2));
    }

    #[test]
    fn navigation_only_reaches_selectable_chapters() {
        let (mut journey, _) = past_intro();
        assert!(!journey.select_chapter(2));
        journey.chapter_completed(1).unwrap();
        assert!(!journey.select_chapter(2), "no navigation during a transition");
        journey.transition_finished();
        assert!(!journey.select_chapter(1), "completed chapters stay closed");
        assert!(!journey.select_chapter(3));
        assert!(journey.select_chapter(2));
        let revision = journey.store().revision();
        assert!(!journey.select_chapter(0));
        assert_eq!(journey.store().revision(), revision);
    }

    #[test]
    fn last_chapter_completes_the_journey_and_restart_replays_intro() {
        let (mut journey, backend) = past_intro();
        for n in 1..=5 {
            journey.chapter_completed(n).unwrap();
            journey.transition_finished();
        }
        let done = journey.chapter_completed(6).unwrap();
        assert_eq!(done.next, NextStep::JourneyComplete);
        assert_eq!(journey.view(), JourneyView::Complete);
        journey.flush().unwrap();

        let reopened = JourneyController::with_bundled_assets(backend.clone());
        assert_eq!(reopened.view(), JourneyView::Complete);

        journey.restart();
        assert_eq!(journey.view(), JourneyView::Intro(IntroStage::Loading));
        assert_eq!(journey.progress(), &Progress::default());
        assert!(backend.raw(PROGRESS_KEY).is_none());
        assert!(backend.raw(INTRO_SEEN_KEY).is_none());
    }

    #[test]
    fn fault_is_contained_and_recovered_from_storage() {
        let (mut journey, _) = past_intro();
        journey.record_answer("chapter1", "마18:14");
        journey.report_chapter_fault("render failed");
        assert_eq!(
            journey.view(),
            JourneyView::Chapter {
                chapter: chapter(1),
                fault: Some("render failed".into())
            }
        );
        assert_eq!(journey.navigation().len(), 6);
        journey.recover_from_fault();
        assert!(journey.fault().is_none());
        assert_eq!(
            journey.progress().answers.get("chapter1").map(String::as_str),
            Some("마18:14")
        );
    }

    #[test]
    fn preload_result_after_transition_is_discarded() {
        let (mut journey, _) = past_intro();
        journey.chapter_completed(1).unwrap();
        let ticket = journey.preload_in_flight().unwrap();
        assert_eq!(ticket.chapter(), chapter(2));
        journey.transition_finished();
        assert!(!journey.resolve_preload(ticket));

        journey.chapter_completed(2).unwrap();
        let live = journey.preload_in_flight().unwrap();
        assert!(journey.resolve_preload(live));
        assert_eq!(journey.preload_status(), PreloadStatus::Ready(chapter(3)));
    }
}
