//! Step machine behind a single chapter screen.

use std::collections::BTreeSet;

use crate::catalog::{ChapterScript, ChapterStep, QuestionSpec};
use crate::chapter::ChapterId;

/// Answer the host should persist with `save_answer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedAnswer {
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clearance {
    /// Other questions of the current group are still open.
    StepPending,
    StepCleared,
    ChapterFinished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Rejected,
    /// The run is hidden; nothing is reported.
    Suppressed,
    /// The id does not name an open question or acknowledgement.
    NotOpen,
    Accepted {
        answer: AcceptedAnswer,
        clearance: Clearance,
    },
    Acknowledged { clearance: Clearance },
}

impl RunEvent {
    /// True when the host should signal chapter completion.
    #[must_use]
    pub const fn finishes_chapter(&self) -> bool {
        matches!(
            self,
            Self::Accepted {
                clearance: Clearance::ChapterFinished,
                ..
            } | Self::Acknowledged {
                clearance: Clearance::ChapterFinished
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRun {
    chapter: ChapterId,
    steps: Vec<ChapterStep>,
    index: usize,
    answered: BTreeSet<String>,
    visible: bool,
}

impl ChapterRun {
    #[must_use]
    pub fn new(script: &ChapterScript, visible: bool) -> Self {
        Self {
            chapter: script.number,
            steps: script.steps.clone(),
            index: 0,
            answered: BTreeSet::new(),
            visible,
        }
    }

    #[must_use]
    pub const fn chapter(&self) -> ChapterId {
        self.chapter
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&ChapterStep> {
        self.steps.get(self.index)
    }

    #[must_use]
    pub const fn step_index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    #[must_use]
    pub fn is_answered(&self, question_id: &str) -> bool {
        self.answered.contains(question_id)
    }

    /// Unanswered questions of the current step.
    #[must_use]
    pub fn open_questions(&self) -> Vec<&QuestionSpec> {
        self.current_step()
            .map(|step| {
                step.questions()
                    .iter()
                    .filter(|q| !self.answered.contains(&q.id))
                    .collect()
            })
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn submit(&mut self, question_id: &str, text: &str) -> RunEvent {
        if !self.visible {
            return RunEvent::Suppressed;
        }
        let Some(question) = self
            .open_questions()
            .into_iter()
            .find(|q| q.id == question_id)
        else {
            log::debug!("chapter {}: {question_id} is not open", self.chapter);
            return RunEvent::NotOpen;
        };
        if !question.check.accepts(text) {
            return RunEvent::Rejected;
        }
        let id = question.id.clone();
        self.answered.insert(id.clone());
        let clearance = self.clear_step_if_done();
        RunEvent::Accepted {
            answer: AcceptedAnswer {
                question_id: id,
                answer: text.to_string(),
            },
            clearance,
        }
    }

    pub fn acknowledge(&mut self, id: &str) -> RunEvent {
        if !self.visible {
            return RunEvent::Suppressed;
        }
        match self.current_step() {
            Some(ChapterStep::Acknowledge { id: step_id, .. }) if step_id == id => {
                self.index += 1;
                RunEvent::Acknowledged {
                    clearance: self.clearance_after_step(),
                }
            }
            _ => RunEvent::NotOpen,
        }
    }

    fn clear_step_if_done(&mut self) -> Clearance {
        let done = self.current_step().is_some_and(|step| {
            step.questions()
                .iter()
                .all(|q| self.answered.contains(&q.id))
        });
        if !done {
            return Clearance::StepPending;
        }
        self.index += 1;
        self.clearance_after_step()
    }

    fn clearance_after_step(&self) -> Clearance {
        if self.is_finished() {
            log::debug!("chapter {} finished", self.chapter);
            Clearance::ChapterFinished
        } else {
            Clearance::StepCleared
        }
    }
}
