use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::chapter::{CHAPTER_COUNT, ChapterId};
use crate::timeline::{IntroStage, Timeline, TransitionTimeline};

const MAX_SAVE_DEBOUNCE_MS: u32 = 1_000;

/// Illustration shown between a finished chapter and the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntroStep {
    pub stage: IntroStage,
    pub duration_ms: u32,
}

/// Timing and asset configuration for the journey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyConfig {
    #[serde(default = "JourneyConfig::default_save_debounce_ms")]
    pub save_debounce_ms: u32,
    #[serde(default = "JourneyConfig::default_intro_stages")]
    pub intro_stages: Vec<IntroStep>,
    #[serde(default = "JourneyConfig::default_transition_display_ms")]
    pub transition_display_ms: u32,
    #[serde(default = "JourneyConfig::default_transition_fade_ms")]
    pub transition_fade_ms: u32,
    /// Keyed by the chapter that was just completed.
    #[serde(default)]
    pub transitions: BTreeMap<u8, TransitionImage>,
}

/// Errors raised when the journey configuration is out of bounds.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("journey config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("save_debounce_ms must be at most {max} (got {value})")]
    DebounceTooLong { value: u32, max: u32 },
    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
    #[error("intro needs at least one stage")]
    NoIntroStages,
    #[error("transition registered for chapter {0}, outside 1..{CHAPTER_COUNT}")]
    TransitionChapter(u8),
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            save_debounce_ms: Self::default_save_debounce_ms(),
            intro_stages: Self::default_intro_stages(),
            transition_display_ms: Self::default_transition_display_ms(),
            transition_fade_ms: Self::default_transition_fade_ms(),
            transitions: BTreeMap::new(),
        }
    }
}

impl JourneyConfig {
    const fn default_save_debounce_ms() -> u32 {
        50
    }

    fn default_intro_stages() -> Vec<IntroStep> {
        [
            (IntroStage::Loading, 1500),
            (IntroStage::Appearing, 1000),
            (IntroStage::Shining, 1000),
            (IntroStage::Glowing, 1000),
            (IntroStage::Message, 2000),
            (IntroStage::Expanding, 1500),
        ]
        .into_iter()
        .map(|(stage, duration_ms)| IntroStep { stage, duration_ms })
        .collect()
    }

    const fn default_transition_display_ms() -> u32 {
        2500
    }

    const fn default_transition_fade_ms() -> u32 {
        500
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the JSON is malformed or a bound is violated.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Configuration bundled with the crate, falling back to defaults.
    #[must_use]
    pub fn load_from_static() -> Self {
        Self::from_json(include_str!("../assets/journey.json")).unwrap_or_else(|err| {
            log::error!("bundled journey config rejected: {err}");
            Self::default()
        })
    }

    /// # Errors
    ///
    /// Returns the first violated bound.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.save_debounce_ms > MAX_SAVE_DEBOUNCE_MS {
            return Err(ConfigError::DebounceTooLong {
                value: self.save_debounce_ms,
                max: MAX_SAVE_DEBOUNCE_MS,
            });
        }
        if self.intro_stages.is_empty() {
            return Err(ConfigError::NoIntroStages);
        }
        if self.intro_stages.iter().any(|step| step.duration_ms == 0) {
            return Err(ConfigError::ZeroDuration {
                field: "intro_stages",
            });
        }
        if self.transition_display_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "transition_display_ms",
            });
        }
        if self.transition_fade_ms == 0 {
            return Err(ConfigError::ZeroDuration {
                field: "transition_fade_ms",
            });
        }
        if let Some(bad) = self
            .transitions
            .keys()
            .copied()
            .find(|&chapter| chapter == 0 || chapter >= CHAPTER_COUNT)
        {
            return Err(ConfigError::TransitionChapter(bad));
        }
        Ok(())
    }

    /// Illustration registered for a freshly completed chapter.
    #[must_use]
    pub fn transition_for(&self, chapter: ChapterId) -> Option<&TransitionImage> {
        if chapter.is_terminal() {
            return None;
        }
        u8::try_from(chapter.number())
            .ok()
            .and_then(|key| self.transitions.get(&key))
    }

    #[must_use]
    pub fn intro_timeline(&self, token: u64) -> Timeline<IntroStage> {
        Timeline::new(
            self.intro_stages
                .iter()
                .map(|step| (step.stage, step.duration_ms))
                .collect(),
            token,
        )
    }

    #[must_use]
    pub fn transition_timeline(&self, token: u64) -> TransitionTimeline {
        TransitionTimeline::new(self.transition_display_ms, self.transition_fade_ms, token)
    }
}
