use anyhow::{Context, Result, ensure};

use super::{ScenarioCtx, TestScenario};
use crate::logic::{AnswerStrategy, Playthrough, describe_view};
use jonah_game::{JourneyView, PROGRESS_KEY, Progress};

pub fn full_journey_scenario() -> TestScenario {
    TestScenario::new("full-journey", "Full Journey Playthrough", full_journey_expectation)
}

/// Play all six chapters, then reopen on the same storage.
fn full_journey_expectation(ctx: &ScenarioCtx) -> Result<()> {
    let mut play = Playthrough::fresh(AnswerStrategy::Canonical);
    play.play_to_end()?;

    let journey = play.journey();
    ensure!(
        journey.view() == JourneyView::Complete,
        "journey ended on {}",
        describe_view(&journey.view())
    );
    ensure!(journey.progress_label() == "6/6", "label {}", journey.progress_label());
    ensure!(
        journey.progress().answers.len() == play.stats().answers_recorded,
        "recorded {} answers but progress holds {}",
        play.stats().answers_recorded,
        journey.progress().answers.len()
    );

    play.journey_mut().flush().context("flushing final progress")?;
    let raw = play
        .backend()
        .raw(PROGRESS_KEY)
        .context("progress entry missing after flush")?;
    let stored = Progress::from_json(&raw).context("stored progress is not valid JSON")?;
    ensure!(&stored == play.journey().progress(), "stored progress diverged");

    let reopened = Playthrough::new(play.backend().clone(), AnswerStrategy::Canonical);
    ensure!(
        reopened.journey().view() == JourneyView::Complete,
        "reopened journey showed {}",
        describe_view(&reopened.journey().view())
    );

    if ctx.verbose {
        let stats = play.stats();
        println!(
            "  🏁 {} chapters, {} answers, {} timers",
            stats.chapters_played, stats.answers_recorded, stats.timers_fired
        );
    }
    Ok(())
}
