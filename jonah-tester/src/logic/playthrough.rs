use jonah_game::{
    ChapterId, ChapterRun, ChapterStep, CompletionError, JourneyController, JourneyView,
    MemoryStore, RunEvent,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on host timers fired while waiting for a screen to settle.
const MAX_TIMERS: usize = 64;

/// Wrong input submitted before the accepted answer.
const WRONG_ANSWER: &str = "오답입니다";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnswerStrategy {
    /// Submit the first accepted answer for every question.
    #[default]
    Canonical,
    /// Submit a wrong answer first and expect it to bounce.
    WrongFirst,
}

impl AnswerStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Canonical => "canonical",
            Self::WrongFirst => "wrong-first",
        }
    }
}

#[derive(Debug, Error)]
pub enum PlaythroughError {
    #[error("chapter {0} is missing from the catalog")]
    MissingChapter(ChapterId),
    #[error("question {0} has no accepted answer to submit")]
    NoAcceptedAnswer(String),
    #[error("wrong answer to {0} was accepted")]
    WrongAnswerAccepted(String),
    #[error("question {question} did not accept its answer ({event:?})")]
    AnswerRefused { question: String, event: RunEvent },
    #[error("chapter {0} run did not finish")]
    Unfinished(ChapterId),
    #[error("expected chapter {expected} on screen, found {found}")]
    UnexpectedView { expected: ChapterId, found: String },
    #[error("screen did not settle after {MAX_TIMERS} timers")]
    TimelineStuck,
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaythroughStats {
    pub chapters_played: usize,
    pub answers_recorded: usize,
    pub rejected_answers: usize,
    pub timers_fired: usize,
}

/// Headless journey driven the way a player would drive the browser build.
pub struct Playthrough {
    backend: MemoryStore,
    journey: JourneyController<MemoryStore>,
    strategy: AnswerStrategy,
    stats: PlaythroughStats,
}

impl Playthrough {
    /// Open a journey over `backend`; clones of the backend observe every write.
    #[must_use]
    pub fn new(backend: MemoryStore, strategy: AnswerStrategy) -> Self {
        let journey = JourneyController::with_bundled_assets(backend.clone());
        Self {
            backend,
            journey,
            strategy,
            stats: PlaythroughStats::default(),
        }
    }

    #[must_use]
    pub fn fresh(strategy: AnswerStrategy) -> Self {
        Self::new(MemoryStore::new(), strategy)
    }

    #[must_use]
    pub const fn backend(&self) -> &MemoryStore {
        &self.backend
    }

    #[must_use]
    pub const fn journey(&self) -> &JourneyController<MemoryStore> {
        &self.journey
    }

    pub const fn journey_mut(&mut self) -> &mut JourneyController<MemoryStore> {
        &mut self.journey
    }

    #[must_use]
    pub const fn stats(&self) -> &PlaythroughStats {
        &self.stats
    }

    /// Fire host timers until neither the intro nor a transition is pending.
    ///
    /// # Errors
    /// `TimelineStuck` if the screen keeps asking for timers.
    pub fn settle(&mut self) -> Result<(), PlaythroughError> {
        for _ in 0..MAX_TIMERS {
            if matches!(self.journey.view(), JourneyView::Transition { .. }) {
                self.journey.image_loaded();
            }
            let Some((key, _)) = self.journey.pending_timer() else {
                return Ok(());
            };
            if self.journey.fire_timer(key) {
                self.stats.timers_fired += 1;
            }
        }
        Err(PlaythroughError::TimelineStuck)
    }

    /// Answer the displayed chapter through its step machine and report completion.
    ///
    /// # Errors
    /// Fails when the chapter is not on screen, an answer bounces, or the
    /// completion signal is rejected.
    pub fn play_displayed(&mut self) -> Result<jonah_game::Completion, PlaythroughError> {
        let chapter = self.journey.displayed_chapter();
        self.expect_chapter(chapter)?;
        let script = self
            .journey
            .catalog()
            .chapter(chapter)
            .cloned()
            .ok_or(PlaythroughError::MissingChapter(chapter))?;

        let mut run = ChapterRun::new(&script, true);
        for step in &script.steps {
            match step {
                ChapterStep::Acknowledge { id, .. } => {
                    let event = run.acknowledge(id);
                    log::debug!("acknowledged {id}: {event:?}");
                }
                other => {
                    for question in other.questions() {
                        self.answer(&mut run, &question.id, &question.check)?;
                    }
                }
            }
        }
        if !run.is_finished() {
            return Err(PlaythroughError::Unfinished(chapter));
        }

        let completion = self.journey.chapter_completed(chapter.number())?;
        self.stats.chapters_played += 1;
        Ok(completion)
    }

    /// Play from the displayed chapter through the final one.
    ///
    /// # Errors
    /// Propagates the first chapter that fails to play.
    pub fn play_to_end(&mut self) -> Result<(), PlaythroughError> {
        self.settle()?;
        while !matches!(self.journey.view(), JourneyView::Complete) {
            self.play_displayed()?;
            self.settle()?;
        }
        Ok(())
    }

    /// Play `count` chapters starting from the displayed one.
    ///
    /// # Errors
    /// Propagates the first chapter that fails to play.
    pub fn play_chapters(&mut self, count: usize) -> Result<(), PlaythroughError> {
        self.settle()?;
        for _ in 0..count {
            self.play_displayed()?;
            self.settle()?;
        }
        Ok(())
    }

    /// # Errors
    /// `UnexpectedView` unless `expected` is the chapter on screen.
    pub fn expect_chapter(&self, expected: ChapterId) -> Result<(), PlaythroughError> {
        match self.journey.view() {
            JourneyView::Chapter { chapter, .. } if chapter == expected => Ok(()),
            other => Err(PlaythroughError::UnexpectedView {
                expected,
                found: describe_view(&other),
            }),
        }
    }

    fn answer(
        &mut self,
        run: &mut ChapterRun,
        question_id: &str,
        check: &jonah_game::AnswerCheck,
    ) -> Result<(), PlaythroughError> {
        if self.strategy == AnswerStrategy::WrongFirst {
            match run.submit(question_id, WRONG_ANSWER) {
                RunEvent::Rejected => self.stats.rejected_answers += 1,
                _ => return Err(PlaythroughError::WrongAnswerAccepted(question_id.to_string())),
            }
        }

        let text = check
            .canonical()
            .ok_or_else(|| PlaythroughError::NoAcceptedAnswer(question_id.to_string()))?;
        match run.submit(question_id, text) {
            RunEvent::Accepted { answer, .. } => {
                self.journey.record_answer(&answer.question_id, &answer.answer);
                self.stats.answers_recorded += 1;
                Ok(())
            }
            event => Err(PlaythroughError::AnswerRefused {
                question: question_id.to_string(),
                event,
            }),
        }
    }
}

/// Short label for failure messages.
#[must_use]
pub fn describe_view(view: &JourneyView) -> String {
    match view {
        JourneyView::Intro(stage) => format!("intro ({stage:?})"),
        JourneyView::Chapter { chapter, fault } => match fault {
            Some(message) => format!("chapter {chapter} (fault: {message})"),
            None => format!("chapter {chapter}"),
        },
        JourneyView::Transition {
            pending_chapter,
            stage,
            ..
        } => format!("transition to {pending_chapter} ({stage:?})"),
        JourneyView::Complete => "journey complete".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_run_finishes_every_chapter() {
        let mut play = Playthrough::fresh(AnswerStrategy::Canonical);
        play.play_to_end().unwrap();
        assert_eq!(play.stats().chapters_played, 6);
        assert_eq!(play.stats().answers_recorded, 11);
        assert_eq!(play.stats().rejected_answers, 0);
        assert!(play.stats().timers_fired > 0);
    }

    #[test]
    fn wrong_first_counts_every_bounce() {
        let mut play = Playthrough::fresh(AnswerStrategy::WrongFirst);
        play.play_chapters(2).unwrap();
        assert_eq!(play.stats().rejected_answers, play.stats().answers_recorded);
        assert_eq!(play.journey().progress_label(), "2/6");
    }

    #[test]
    fn expect_chapter_reports_the_intro() {
        let play = Playthrough::fresh(AnswerStrategy::Canonical);
        let err = play.expect_chapter(ChapterId::FIRST).unwrap_err();
        assert!(err.to_string().contains("intro"));
    }
}
