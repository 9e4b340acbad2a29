//! Best-effort background preparation of the next chapter.
//!
//! Every `begin` or `cancel` bumps a generation; a result carrying an older
//! ticket belongs to a view the user already left and is dropped.

use thiserror::Error;

use crate::chapter::ChapterId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreloadError {
    #[error("chapter {0} has no content to preload")]
    Missing(ChapterId),
    #[error("preloading chapter {chapter} failed: {message}")]
    Failed { chapter: ChapterId, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadTicket {
    chapter: ChapterId,
    generation: u64,
}

impl PreloadTicket {
    #[must_use]
    pub const fn chapter(&self) -> ChapterId {
        self.chapter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreloadStatus {
    #[default]
    Idle,
    Loading(ChapterId),
    Ready(ChapterId),
    /// Failed preloads only mean "not ready"; the chapter still renders on demand.
    Failed(ChapterId),
}

#[derive(Debug, Clone, Default)]
pub struct Preloader {
    generation: u64,
    status: PreloadStatus,
}

impl Preloader {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, chapter: ChapterId) -> PreloadTicket {
        self.generation += 1;
        self.status = PreloadStatus::Loading(chapter);
        log::debug!("preloading chapter {chapter}");
        PreloadTicket {
            chapter,
            generation: self.generation,
        }
    }

    /// Live ticket for an in-flight preload.
    #[must_use]
    pub const fn in_flight(&self) -> Option<PreloadTicket> {
        match self.status {
            PreloadStatus::Loading(chapter) => Some(PreloadTicket {
                chapter,
                generation: self.generation,
            }),
            _ => None,
        }
    }

    /// Apply a result; returns false when the ticket is stale.
    pub fn resolve(&mut self, ticket: PreloadTicket, result: Result<(), PreloadError>) -> bool {
        if ticket.generation != self.generation
            || self.status != PreloadStatus::Loading(ticket.chapter)
        {
            log::debug!("discarding stale preload of chapter {}", ticket.chapter);
            return false;
        }
        self.status = match result {
            Ok(()) => PreloadStatus::Ready(ticket.chapter),
            Err(err) => {
                log::warn!("{err}");
                PreloadStatus::Failed(ticket.chapter)
            }
        };
        true
    }

    pub fn cancel(&mut self) {
        self.generation += 1;
        self.status = PreloadStatus::Idle;
    }

    #[must_use]
    pub const fn status(&self) -> PreloadStatus {
        self.status
    }

    #[must_use]
    pub fn is_ready(&self, chapter: ChapterId) -> bool {
        self.status == PreloadStatus::Ready(chapter)
    }
}
