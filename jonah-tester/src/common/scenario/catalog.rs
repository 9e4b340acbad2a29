use anyhow::{Context, Result, anyhow, ensure};

use super::{ScenarioCtx, TestScenario};
use crate::logic::{AnswerStrategy, Playthrough, describe_view};
use jonah_game::{
    CHAPTER_COUNT, ChapterCatalog, ChapterId, ChapterStatus, CompletionError,
    CompletionOrchestrator, INTRO_SEEN_KEY, JourneyConfig, JourneyView, MemoryStore,
    PROGRESS_KEY, ProgressStore,
};

pub fn wrong_answers_scenario() -> TestScenario {
    TestScenario::new("wrong-answers", "Wrong Answer Handling", wrong_answers_expectation)
}

pub fn resume_scenario() -> TestScenario {
    TestScenario::new("resume", "Resume From Storage", resume_expectation)
}

pub fn restart_scenario() -> TestScenario {
    TestScenario::new("restart", "Restart Journey", restart_expectation)
}

pub fn storage_failure_scenario() -> TestScenario {
    TestScenario::new(
        "storage-failure",
        "Degraded Storage",
        storage_failure_expectation,
    )
}

pub fn out_of_order_scenario() -> TestScenario {
    TestScenario::new(
        "out-of-order",
        "Out Of Order Completion",
        out_of_order_expectation,
    )
}

pub fn navigation_scenario() -> TestScenario {
    TestScenario::new("navigation", "Chapter Navigation", navigation_expectation)
}

fn chapter(n: u32) -> Result<ChapterId> {
    ChapterId::new(n).map_err(|err| anyhow!(err))
}

/// Chapters finished before the checkpoint; varies 1..=5 across iterations.
fn checkpoint(ctx: &ScenarioCtx) -> usize {
    ctx.iteration % (usize::from(CHAPTER_COUNT) - 1) + 1
}

fn wrong_answers_expectation(_ctx: &ScenarioCtx) -> Result<()> {
    let mut play = Playthrough::fresh(AnswerStrategy::WrongFirst);
    play.play_to_end()?;
    let stats = play.stats();
    ensure!(
        stats.rejected_answers == stats.answers_recorded,
        "{} wrong answers bounced for {} questions",
        stats.rejected_answers,
        stats.answers_recorded
    );

    let catalog = ChapterCatalog::shared();
    for script in &catalog.chapters {
        for question in script.steps.iter().flat_map(|step| step.questions()) {
            let accepted = question
                .check
                .canonical()
                .with_context(|| format!("{} has no accepted answer", question.id))?;
            ensure!(
                question.check.accepts(&format!("  {accepted} ")),
                "{} should ignore surrounding whitespace",
                question.id
            );
            ensure!(
                !question.check.accepts("   "),
                "{} accepted a blank answer",
                question.id
            );
        }
    }
    Ok(())
}

fn resume_expectation(ctx: &ScenarioCtx) -> Result<()> {
    let finished = checkpoint(ctx);
    let mut first = Playthrough::fresh(AnswerStrategy::Canonical);
    first.play_chapters(finished)?;
    first.journey_mut().flush().context("flushing before leaving")?;
    let answers = first.journey().progress().answers.clone();

    let mut second = Playthrough::new(first.backend().clone(), AnswerStrategy::Canonical);
    let resumed = chapter(u32::try_from(finished + 1)?)?;
    second
        .expect_chapter(resumed)
        .context("returning visitor should skip the intro")?;
    ensure!(
        second.journey().progress().answers == answers,
        "answers were not restored"
    );
    ensure!(
        second.journey().progress_label() == format!("{finished}/{CHAPTER_COUNT}"),
        "label after resume was {}",
        second.journey().progress_label()
    );

    second.play_to_end()?;
    ensure!(
        second.stats().chapters_played == usize::from(CHAPTER_COUNT) - finished,
        "resumed run replayed finished chapters"
    );
    if ctx.verbose {
        println!("  💾 resumed at {resumed} after {finished} chapters");
    }
    Ok(())
}

fn restart_expectation(_ctx: &ScenarioCtx) -> Result<()> {
    let mut play = Playthrough::fresh(AnswerStrategy::Canonical);
    play.play_to_end()?;
    play.journey_mut().flush().context("flushing finished journey")?;

    play.journey_mut().restart();
    let view = play.journey().view();
    ensure!(
        matches!(view, JourneyView::Intro(_)),
        "restart should replay the intro, found {}",
        describe_view(&view)
    );
    ensure!(!play.journey().intro_seen(), "intro flag survived restart");
    ensure!(
        play.journey().progress_label() == "0/6",
        "progress survived restart"
    );
    ensure!(
        play.backend().raw(PROGRESS_KEY).is_none() && play.backend().raw(INTRO_SEEN_KEY).is_none(),
        "stored entries survived restart"
    );

    play.settle()?;
    play.expect_chapter(ChapterId::FIRST)?;
    Ok(())
}

fn storage_failure_expectation(ctx: &ScenarioCtx) -> Result<()> {
    let backend = MemoryStore::new();
    backend.set_failing(false, true);
    let mut play = Playthrough::new(backend, AnswerStrategy::Canonical);
    play.play_to_end()?;
    ensure!(
        play.journey().view() == JourneyView::Complete,
        "session should finish without storage"
    );
    ensure!(
        play.journey_mut().flush().is_err(),
        "flush should report the rejected write"
    );
    ensure!(
        play.journey().store().has_unsaved_changes(),
        "unsaved changes should be kept after a failed write"
    );
    ensure!(
        play.backend().raw(PROGRESS_KEY).is_none(),
        "nothing should land in failing storage"
    );

    let corrupt = MemoryStore::new()
        .with_entry(PROGRESS_KEY, "{\"currentChapter\": ")
        .with_entry(INTRO_SEEN_KEY, "true");
    let recovered = Playthrough::new(corrupt, AnswerStrategy::Canonical);
    recovered
        .expect_chapter(ChapterId::FIRST)
        .context("corrupt progress should start fresh")?;
    ensure!(
        recovered.journey().progress_label() == "0/6",
        "corrupt progress leaked completed chapters"
    );

    if ctx.verbose {
        println!("  🧯 journey survived rejected writes and corrupt entries");
    }
    Ok(())
}

fn out_of_order_expectation(_ctx: &ScenarioCtx) -> Result<()> {
    let config = JourneyConfig::default();
    let mut store = ProgressStore::open(MemoryStore::new(), config.save_debounce_ms);
    let mut orchestrator = CompletionOrchestrator::new();

    let locked = orchestrator.complete_chapter(&mut store, &config, 3);
    ensure!(
        locked
            == Err(CompletionError::Locked {
                chapter: chapter(3)?,
                required: chapter(2)?,
            }),
        "chapter 3 should be locked, got {locked:?}"
    );
    for invalid in [0, 7, 42] {
        let result = orchestrator.complete_chapter(&mut store, &config, invalid);
        ensure!(
            matches!(result, Err(CompletionError::InvalidChapter(_))),
            "chapter {invalid} should be invalid, got {result:?}"
        );
    }
    ensure!(
        store.progress().completed_chapters.is_empty(),
        "rejected completions changed progress"
    );
    ensure!(
        !store.has_unsaved_changes(),
        "rejected completions scheduled a save"
    );

    let mut play = Playthrough::fresh(AnswerStrategy::Canonical);
    play.settle()?;
    let foreign = play.journey_mut().chapter_completed(4);
    ensure!(
        matches!(foreign, Err(CompletionError::NotDisplayed { .. })),
        "completion for a chapter off screen should be refused, got {foreign:?}"
    );
    ensure!(
        play.journey().progress().completed_chapters.is_empty(),
        "refused completion changed progress"
    );
    Ok(())
}

fn navigation_expectation(ctx: &ScenarioCtx) -> Result<()> {
    let finished = checkpoint(ctx);
    let mut play = Playthrough::fresh(AnswerStrategy::Canonical);
    play.play_chapters(finished)?;
    let frontier = chapter(u32::try_from(finished + 1)?)?;

    let nav = play.journey().navigation();
    ensure!(nav.len() == usize::from(CHAPTER_COUNT), "navigation has {} entries", nav.len());
    for entry in &nav {
        let n = usize::try_from(entry.chapter.number())?;
        let expected = if n <= finished {
            ChapterStatus::Completed
        } else if entry.chapter == frontier {
            ChapterStatus::Available
        } else {
            ChapterStatus::Locked
        };
        ensure!(
            entry.status == expected,
            "chapter {} is {:?}, expected {expected:?}",
            entry.chapter,
            entry.status
        );
        ensure!(
            entry.is_current == (entry.chapter == frontier),
            "chapter {} current flag is wrong",
            entry.chapter
        );
    }

    let journey = play.journey_mut();
    ensure!(!journey.select_chapter(1), "completed chapter 1 was selectable");
    ensure!(!journey.select_chapter(0), "chapter 0 was selectable");
    if let Some(locked) = frontier.next() {
        ensure!(
            !journey.select_chapter(locked.number()),
            "locked chapter {locked} was selectable"
        );
    }
    ensure!(
        journey.select_chapter(frontier.number()),
        "frontier chapter {frontier} was not selectable"
    );
    play.expect_chapter(frontier)?;
    Ok(())
}
