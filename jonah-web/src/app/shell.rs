//! Stateless layout of the whole journey for one [`JourneyView`].

use jonah_game::{AcceptedAnswer, ChapterScript, JourneyView, NavEntry};
use yew::prelude::*;

use crate::components::boundary::ChapterBoundary;
use crate::components::chapter_unit::ChapterUnit;
use crate::components::completion::CompletionOverlay;
use crate::components::header::Header;
use crate::components::intro::IntroScreen;
use crate::components::navigation::ChapterNavigation;
use crate::components::transition::TransitionScreen;

pub const JOURNEY_TITLE: &str = "요나의 여정";

#[derive(Properties, PartialEq, Clone)]
pub struct ShellProps {
    pub view: JourneyView,
    pub entries: Vec<NavEntry>,
    pub progress_label: AttrValue,
    /// Script for the chapter on screen.
    #[prop_or_default]
    pub script: Option<ChapterScript>,
    /// Next chapter rendered hidden while a transition plays.
    #[prop_or_default]
    pub preloaded: Option<ChapterScript>,
    pub on_select: Callback<u32>,
    pub on_answer: Callback<AcceptedAnswer>,
    pub on_complete: Callback<u32>,
    pub on_image_loaded: Callback<()>,
    pub on_recover: Callback<()>,
    pub on_restart: Callback<()>,
}

#[function_component(JourneyShell)]
pub fn journey_shell(p: &ShellProps) -> Html {
    let chrome = html! {
        <>
            <Header title={JOURNEY_TITLE} progress_label={p.progress_label.clone()} />
            <ChapterNavigation entries={p.entries.clone()} on_select={p.on_select.clone()} />
        </>
    };
    match &p.view {
        JourneyView::Intro(stage) => html! { <IntroScreen stage={*stage} /> },
        JourneyView::Chapter { chapter, fault } => {
            let unit = p.script.clone().map_or_else(Html::default, |script| {
                html! {
                    <ChapterUnit
                        key={chapter.number()}
                        {script}
                        on_answer={p.on_answer.clone()}
                        on_complete={p.on_complete.clone()}
                    />
                }
            });
            html! {
                <div class="journey">
                    { chrome }
                    <main id="main" role="main">
                        <ChapterBoundary
                            fault={fault.clone().map(AttrValue::from)}
                            on_recover={p.on_recover.clone()}
                        >
                            { unit }
                        </ChapterBoundary>
                    </main>
                </div>
            }
        }
        JourneyView::Transition { image, stage, .. } => html! {
            <div class="journey journey--transition">
                <TransitionScreen
                    image={image.clone()}
                    stage={*stage}
                    on_loaded={p.on_image_loaded.clone()}
                />
                { p.preloaded.clone().map_or_else(Html::default, |script| {
                    let key = script.number.number();
                    html! {
                    <ChapterUnit
                        key={key}
                        {script}
                        visible={false}
                        on_answer={Callback::noop()}
                        on_complete={Callback::noop()}
                    />
                    }
                }) }
            </div>
        },
        JourneyView::Complete => html! {
            <div class="journey">
                { chrome }
                <CompletionOverlay on_restart={p.on_restart.clone()} />
            </div>
        },
    }
}
