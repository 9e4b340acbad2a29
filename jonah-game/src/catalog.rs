//! Chapter scripts: titles and the ordered steps each chapter walks through.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

use crate::chapter::{CHAPTER_COUNT, ChapterId};
use crate::validation::AnswerCheck;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSpec {
    pub id: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub placeholder: String,
    pub check: AnswerCheck,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChapterStep {
    Question(QuestionSpec),
    /// Questions answerable in any order; the step clears once all are answered.
    Group { questions: Vec<QuestionSpec> },
    /// Cleared by an explicit confirmation rather than an answer.
    Acknowledge { id: String, label: String },
}

impl ChapterStep {
    #[must_use]
    pub fn questions(&self) -> &[QuestionSpec] {
        match self {
            Self::Question(question) => std::slice::from_ref(question),
            Self::Group { questions } => questions,
            Self::Acknowledge { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterScript {
    pub number: ChapterId,
    pub title: String,
    pub steps: Vec<ChapterStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ChapterCatalog {
    pub chapters: Vec<ChapterScript>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("chapter catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("chapter catalog must list chapters 1..={CHAPTER_COUNT} in order")]
    ChapterSequence,
    #[error("chapter {0} has no steps")]
    EmptyChapter(ChapterId),
    #[error("question id {0:?} is used more than once")]
    DuplicateQuestion(String),
    #[error("question {0:?} has nothing to compare against")]
    EmptyCheck(String),
}

static SHARED: OnceLock<ChapterCatalog> = OnceLock::new();

impl ChapterCatalog {
    /// # Errors
    ///
    /// Returns `CatalogError` for malformed JSON or a catalog that breaks
    /// the chapter/question invariants.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// # Errors
    ///
    /// Returns the bundled catalog's validation error, if any.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../assets/chapters.json"))
    }

    /// Process-wide bundled catalog; empty if the bundle failed to load.
    pub fn shared() -> &'static Self {
        SHARED.get_or_init(|| {
            Self::load_from_static().unwrap_or_else(|err| {
                log::error!("bundled chapter catalog rejected: {err}");
                Self::default()
            })
        })
    }

    /// # Errors
    ///
    /// Returns the first broken invariant.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let numbers: Vec<ChapterId> = self.chapters.iter().map(|c| c.number).collect();
        if !numbers.iter().copied().eq(ChapterId::all()) {
            return Err(CatalogError::ChapterSequence);
        }
        let mut seen = HashSet::new();
        for chapter in &self.chapters {
            if chapter.steps.is_empty() {
                return Err(CatalogError::EmptyChapter(chapter.number));
            }
            for step in &chapter.steps {
                let ids: Vec<&str> = match step {
                    ChapterStep::Acknowledge { id, .. } => vec![id.as_str()],
                    other => other.questions().iter().map(|q| q.id.as_str()).collect(),
                };
                for id in ids {
                    if !seen.insert(id) {
                        return Err(CatalogError::DuplicateQuestion(id.to_string()));
                    }
                }
                if let Some(empty) = step.questions().iter().find(|q| q.check.is_empty()) {
                    return Err(CatalogError::EmptyCheck(empty.id.clone()));
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn chapter(&self, chapter: ChapterId) -> Option<&ChapterScript> {
        self.chapters.iter().find(|script| script.number == chapter)
    }

    #[must_use]
    pub fn title(&self, chapter: ChapterId) -> &str {
        self.chapter(chapter).map_or("", |script| script.title.as_str())
    }

    /// Every question id across the catalog, in play order.
    pub fn question_ids(&self) -> impl Iterator<Item = &str> {
        self.chapters
            .iter()
            .flat_map(|chapter| chapter.steps.iter())
            .flat_map(|step| step.questions().iter().map(|q| q.id.as_str()))
    }
}
