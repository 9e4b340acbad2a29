use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Number of chapters in the journey.
pub const CHAPTER_COUNT: u8 = 6;

/// Raised when a chapter number falls outside `1..=CHAPTER_COUNT`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ChapterError {
    #[error("chapter {0} is outside 1..={CHAPTER_COUNT}")]
    OutOfRange(u32),
}

/// Validated chapter number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct ChapterId(u8);

impl ChapterId {
    pub const FIRST: Self = Self(1);
    pub const LAST: Self = Self(CHAPTER_COUNT);

    /// # Errors
    ///
    /// Returns `ChapterError::OutOfRange` unless `1 <= number <= CHAPTER_COUNT`.
    pub fn new(number: u32) -> Result<Self, ChapterError> {
        match u8::try_from(number) {
            Ok(n) if (1..=CHAPTER_COUNT).contains(&n) => Ok(Self(n)),
            _ => Err(ChapterError::OutOfRange(number)),
        }
    }

    #[must_use]
    pub const fn number(self) -> u32 {
        self.0 as u32
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.0 == CHAPTER_COUNT
    }

    #[must_use]
    pub const fn next(self) -> Option<Self> {
        if self.is_terminal() {
            None
        } else {
            Some(Self(self.0 + 1))
        }
    }

    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        if self.0 == 1 { None } else { Some(Self(self.0 - 1)) }
    }

    /// Every chapter in journey order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=CHAPTER_COUNT).map(Self)
    }
}

impl Default for ChapterId {
    fn default() -> Self {
        Self::FIRST
    }
}

impl TryFrom<u32> for ChapterId {
    type Error = ChapterError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ChapterId> for u32 {
    fn from(value: ChapterId) -> Self {
        value.number()
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_enforced() {
        assert_eq!(ChapterId::new(0), Err(ChapterError::OutOfRange(0)));
        assert_eq!(ChapterId::new(7), Err(ChapterError::OutOfRange(7)));
        assert_eq!(ChapterId::new(300), Err(ChapterError::OutOfRange(300)));
        assert_eq!(ChapterId::new(1).unwrap(), ChapterId::FIRST);
        assert_eq!(ChapterId::new(6).unwrap(), ChapterId::LAST);
    }

    #[test]
    fn neighbours_stop_at_the_ends() {
        assert_eq!(ChapterId::FIRST.previous(), None);
        assert_eq!(ChapterId::LAST.next(), None);
        assert!(ChapterId::LAST.is_terminal());
        let third = ChapterId::new(3).unwrap();
        assert_eq!(third.next().map(ChapterId::number), Some(4));
        assert_eq!(third.previous().map(ChapterId::number), Some(2));
        assert_eq!(ChapterId::all().count(), usize::from(CHAPTER_COUNT));
    }

    #[test]
    fn serde_rejects_out_of_range_numbers() {
        let ok: ChapterId = serde_json::from_str("4").unwrap();
        assert_eq!(ok.number(), 4);
        assert!(serde_json::from_str::<ChapterId>("9").is_err());
        assert_eq!(serde_json::to_string(&ok).unwrap(), "4");
    }
}
