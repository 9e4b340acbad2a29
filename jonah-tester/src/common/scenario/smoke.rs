use anyhow::{Context, Result, ensure};

use super::{ScenarioCtx, TestScenario};
use crate::logic::{AnswerStrategy, Playthrough, describe_view};
use jonah_game::{ChapterId, ChapterStatus, INTRO_SEEN_KEY, JourneyView};

pub fn smoke_scenario() -> TestScenario {
    TestScenario::new("smoke", "Smoke Test", smoke_expectation)
}

/// A fresh visitor sees the intro, lands on chapter 1 and can finish it.
fn smoke_expectation(ctx: &ScenarioCtx) -> Result<()> {
    let mut play = Playthrough::fresh(AnswerStrategy::Canonical);
    let opening = play.journey().view();
    ensure!(
        matches!(opening, JourneyView::Intro(_)),
        "fresh journey should open on the intro, found {}",
        describe_view(&opening)
    );

    play.settle()?;
    play.expect_chapter(ChapterId::FIRST)?;
    ensure!(play.journey().intro_seen(), "intro should be marked seen");
    ensure!(
        play.journey().progress_label() == "0/6",
        "fresh progress label was {}",
        play.journey().progress_label()
    );

    let nav = play.journey().navigation();
    let locked = nav
        .iter()
        .filter(|entry| entry.status == ChapterStatus::Locked)
        .count();
    ensure!(locked == 5, "expected 5 locked chapters, found {locked}");

    play.play_chapters(1)?;
    play.journey_mut().flush().context("flushing smoke progress")?;
    ensure!(
        play.backend().raw(INTRO_SEEN_KEY).as_deref() == Some("true"),
        "intro flag should be persisted"
    );
    if ctx.verbose {
        println!("  🚀 smoke reached {}", describe_view(&play.journey().view()));
    }
    Ok(())
}
