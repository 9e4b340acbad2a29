//! Persisted progress aggregate and the value-semantics reducer over it.

use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::chapter::ChapterId;

/// Chapter pointer, completed set and recorded answers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub current_chapter: ChapterId,
    pub completed_chapters: BTreeSet<ChapterId>,
    pub answers: BTreeMap<String, String>,
}

impl Progress {
    /// Rebuild progress from stored JSON text, defaulting per field.
    ///
    /// # Errors
    ///
    /// Only fails when `json` is not JSON at all; wrong shapes degrade to defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    /// Tolerant rehydration: out-of-range chapters are dropped, non-array
    /// completion lists become empty and non-string answers are skipped.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let current_chapter = value
            .get("currentChapter")
            .and_then(chapter_from_value)
            .unwrap_or_default();
        let completed_chapters = value
            .get("completedChapters")
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(chapter_from_value).collect())
            .unwrap_or_default();
        let answers = value
            .get("answers")
            .and_then(Value::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(key, answer)| {
                        answer.as_str().map(|text| (key.clone(), text.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            current_chapter,
            completed_chapters,
            answers,
        }
    }

    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    #[must_use]
    pub fn is_completed(&self, chapter: ChapterId) -> bool {
        self.completed_chapters.contains(&chapter)
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_chapters.len()
    }

    /// Progress with `chapter` completed, or `None` when it already was.
    ///
    /// The pointer moves to `max(current, chapter + 1)`; the terminal chapter
    /// never moves it.
    #[must_use]
    pub fn with_completed(&self, chapter: ChapterId) -> Option<Self> {
        if self.is_completed(chapter) {
            return None;
        }
        let mut completed_chapters = self.completed_chapters.clone();
        completed_chapters.insert(chapter);
        let current_chapter = chapter
            .next()
            .map_or(self.current_chapter, |next| self.current_chapter.max(next));
        Some(Self {
            current_chapter,
            completed_chapters,
            answers: self.answers.clone(),
        })
    }

    /// Progress with `answer` recorded, or `None` when nothing changes.
    #[must_use]
    pub fn with_answer(&self, question_id: &str, answer: &str) -> Option<Self> {
        if self.answers.get(question_id).is_some_and(|a| a == answer) {
            return None;
        }
        let mut answers = self.answers.clone();
        answers.insert(question_id.to_string(), answer.to_string());
        Some(Self {
            answers,
            ..self.clone()
        })
    }
}

fn chapter_from_value(value: &Value) -> Option<ChapterId> {
    let number = value
        .as_u64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        })
        .and_then(|n| u32::try_from(n).ok())?;
    ChapterId::new(number).ok()
}

/// Everything the store tracks: progress plus the intro flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub progress: Progress,
    pub intro_seen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressAction {
    CompleteChapter(ChapterId),
    SaveAnswer { question_id: String, answer: String },
    SetIntroSeen(bool),
    Reset,
    Load(ProgressState),
}

impl ProgressState {
    /// Apply `action`, returning the replacement state or `None` for a no-op.
    #[must_use]
    pub fn reduce(&self, action: ProgressAction) -> Option<Self> {
        match action {
            ProgressAction::CompleteChapter(chapter) => {
                let Some(progress) = self.progress.with_completed(chapter) else {
                    log::debug!("chapter {chapter} already completed");
                    return None;
                };
                log::info!(
                    "chapter {chapter} completed; current chapter {}, completed {:?}",
                    progress.current_chapter,
                    progress.completed_chapters
                );
                Some(Self {
                    progress,
                    intro_seen: self.intro_seen,
                })
            }
            ProgressAction::SaveAnswer {
                question_id,
                answer,
            } => self
                .progress
                .with_answer(&question_id, &answer)
                .map(|progress| Self {
                    progress,
                    intro_seen: self.intro_seen,
                }),
            ProgressAction::SetIntroSeen(seen) => (seen != self.intro_seen).then(|| Self {
                progress: self.progress.clone(),
                intro_seen: seen,
            }),
            ProgressAction::Reset => (*self != Self::default()).then(Self::default),
            ProgressAction::Load(state) => (state != *self).then_some(state),
        }
    }
}
