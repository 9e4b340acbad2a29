use std::collections::BTreeSet;

use crate::catalog::ChapterCatalog;
use crate::chapter::ChapterId;
use crate::progress::Progress;

/// Chapter 1 is always open; any later chapter opens once its predecessor is done.
#[must_use]
pub fn is_unlocked(chapter: ChapterId, completed: &BTreeSet<ChapterId>) -> bool {
    chapter
        .previous()
        .is_none_or(|previous| completed.contains(&previous))
}

/// Direct navigation targets: unlocked and not yet completed.
#[must_use]
pub fn is_selectable(chapter: ChapterId, completed: &BTreeSet<ChapterId>) -> bool {
    is_unlocked(chapter, completed) && !completed.contains(&chapter)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterStatus {
    Locked,
    Available,
    Completed,
}

/// One navigation affordance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    pub chapter: ChapterId,
    pub title: String,
    pub status: ChapterStatus,
    pub is_current: bool,
}

impl NavEntry {
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.status == ChapterStatus::Available
    }
}

#[must_use]
pub fn chapter_status(chapter: ChapterId, completed: &BTreeSet<ChapterId>) -> ChapterStatus {
    if completed.contains(&chapter) {
        ChapterStatus::Completed
    } else if is_unlocked(chapter, completed) {
        ChapterStatus::Available
    } else {
        ChapterStatus::Locked
    }
}

#[must_use]
pub fn navigation_entries(
    progress: &Progress,
    displayed: ChapterId,
    catalog: &ChapterCatalog,
) -> Vec<NavEntry> {
    ChapterId::all()
        .map(|chapter| NavEntry {
            chapter,
            title: catalog.title(chapter).to_string(),
            status: chapter_status(chapter, &progress.completed_chapters),
            is_current: chapter == displayed,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(n: u32) -> ChapterId {
        ChapterId::new(n).unwrap()
    }

    fn set(ns: &[u32]) -> BTreeSet<ChapterId> {
        ns.iter().map(|&n| chapter(n)).collect()
    }

    #[test]
    fn first_chapter_is_always_unlocked() {
        for completed in [set(&[]), set(&[1]), set(&[2, 4]), set(&[1, 2, 3, 4, 5, 6])] {
            assert!(is_unlocked(ChapterId::FIRST, &completed));
        }
    }

    #[test]
    fn later_chapters_need_their_predecessor() {
        let samples = [set(&[]), set(&[1]), set(&[1, 3]), set(&[2, 3, 5]), set(&[1, 2, 3, 4, 5])];
        for completed in &samples {
            for n in 2..=6 {
                assert_eq!(
                    is_unlocked(chapter(n), completed),
                    completed.contains(&chapter(n - 1)),
                    "chapter {n} with {completed:?}"
                );
            }
        }
    }

    #[test]
    fn completed_chapters_are_not_selectable() {
        let completed = set(&[1, 2]);
        assert!(!is_selectable(chapter(1), &completed));
        assert!(!is_selectable(chapter(2), &completed));
        assert!(is_selectable(chapter(3), &completed));
        assert!(!is_selectable(chapter(4), &completed));
    }

    #[test]
    fn navigation_marks_status_and_current() {
        let progress = Progress::default().with_completed(chapter(1)).unwrap();
        let entries = navigation_entries(&progress, chapter(2), ChapterCatalog::shared());
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].status, ChapterStatus::Completed);
        assert_eq!(entries[1].status, ChapterStatus::Available);
        assert!(entries[1].is_current && entries[1].is_selectable());
        assert_eq!(entries[2].status, ChapterStatus::Locked);
        assert_eq!(entries[5].title, "요나의 성냄");
    }
}
