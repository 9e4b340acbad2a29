//! Timed stage sequences for the intro and chapter transitions.
//!
//! A timeline is a finite list of `(stage, duration)` pairs. Hosts schedule a
//! single cancelable timer for the active stage and report back with the
//! [`TimerKey`] they were handed; keys from a torn-down timeline or an earlier
//! stage no longer match and are ignored.

use serde::{Deserialize, Serialize};

/// Identifies one scheduled stage timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub token: u64,
    pub stage_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline<S> {
    steps: Vec<(S, u32)>,
    index: usize,
    elapsed_ms: u32,
    token: u64,
}

impl<S: Copy> Timeline<S> {
    #[must_use]
    pub fn new(steps: Vec<(S, u32)>, token: u64) -> Self {
        Self {
            steps,
            index: 0,
            elapsed_ms: 0,
            token,
        }
    }

    /// Active stage, or `None` once every stage has elapsed.
    #[must_use]
    pub fn current(&self) -> Option<S> {
        self.steps.get(self.index).map(|(stage, _)| *stage)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    #[must_use]
    pub const fn token(&self) -> u64 {
        self.token
    }

    /// Key and remaining duration for the timer the host should arm.
    #[must_use]
    pub fn pending_timer(&self) -> Option<(TimerKey, u32)> {
        self.steps.get(self.index).map(|(_, duration)| {
            (
                TimerKey {
                    token: self.token,
                    stage_index: self.index,
                },
                duration.saturating_sub(self.elapsed_ms),
            )
        })
    }

    /// Move past the active stage; returns the stage entered, if any.
    pub fn advance(&mut self) -> Option<S> {
        if self.is_finished() {
            return None;
        }
        self.index += 1;
        self.elapsed_ms = 0;
        self.current()
    }

    /// Advance only when `key` names the active stage.
    pub fn fire(&mut self, key: TimerKey) -> bool {
        if key.token != self.token || key.stage_index != self.index || self.is_finished() {
            log::debug!("ignoring stale timer {key:?}");
            return false;
        }
        self.advance();
        true
    }

    /// Consume `ms` of wall time, returning every stage entered along the way.
    pub fn tick(&mut self, ms: u32) -> Vec<S> {
        let mut entered = Vec::new();
        let mut budget = ms;
        while let Some((_, duration)) = self.steps.get(self.index).copied() {
            let remaining = duration.saturating_sub(self.elapsed_ms);
            if budget < remaining {
                self.elapsed_ms += budget;
                break;
            }
            budget -= remaining;
            if let Some(stage) = self.advance() {
                entered.push(stage);
            }
        }
        entered
    }

    /// Sum of all stage durations.
    #[must_use]
    pub fn total_ms(&self) -> u64 {
        self.steps.iter().map(|(_, d)| u64::from(*d)).sum()
    }
}

/// Stages of the one-time intro animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntroStage {
    Loading,
    Appearing,
    Shining,
    Glowing,
    Message,
    Expanding,
}

impl IntroStage {
    #[must_use]
    pub const fn shows_title(self) -> bool {
        matches!(
            self,
            Self::Shining | Self::Glowing | Self::Message | Self::Expanding
        )
    }

    #[must_use]
    pub const fn shows_subtitle(self) -> bool {
        matches!(self, Self::Message | Self::Expanding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionStage {
    /// Waiting for the illustration to finish loading; no timer runs.
    Loading,
    Showing,
    FadingOut,
}

/// Transition interstitial: hold until the image loads, show, then fade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTimeline {
    image_loaded: bool,
    timeline: Timeline<TransitionStage>,
}

impl TransitionTimeline {
    #[must_use]
    pub fn new(display_ms: u32, fade_ms: u32, token: u64) -> Self {
        Self {
            image_loaded: false,
            timeline: Timeline::new(
                vec![
                    (TransitionStage::Showing, display_ms),
                    (TransitionStage::FadingOut, fade_ms),
                ],
                token,
            ),
        }
    }

    #[must_use]
    pub fn stage(&self) -> Option<TransitionStage> {
        if self.image_loaded {
            self.timeline.current()
        } else {
            Some(TransitionStage::Loading)
        }
    }

    /// Starts the display clock; repeated load events are harmless.
    pub fn image_loaded(&mut self) {
        self.image_loaded = true;
    }

    #[must_use]
    pub const fn is_image_loaded(&self) -> bool {
        self.image_loaded
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.image_loaded && self.timeline.is_finished()
    }

    #[must_use]
    pub fn pending_timer(&self) -> Option<(TimerKey, u32)> {
        if self.image_loaded {
            self.timeline.pending_timer()
        } else {
            None
        }
    }

    pub fn fire(&mut self, key: TimerKey) -> bool {
        self.image_loaded && self.timeline.fire(key)
    }

    pub fn tick(&mut self, ms: u32) -> Vec<TransitionStage> {
        if self.image_loaded {
            self.timeline.tick(ms)
        } else {
            Vec::new()
        }
    }
}
