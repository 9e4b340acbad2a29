//! One chapter screen driven by a [`ChapterRun`].

use jonah_game::{AcceptedAnswer, ChapterRun, ChapterScript, ChapterStep, RunEvent};
use yew::prelude::*;

use super::question_input::QuestionInput;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub script: ChapterScript,
    /// Hidden units (background preloads) never report answers or completion.
    #[prop_or(true)]
    pub visible: bool,
    pub on_answer: Callback<AcceptedAnswer>,
    pub on_complete: Callback<u32>,
}

#[function_component(ChapterUnit)]
pub fn chapter_unit(p: &Props) -> Html {
    let run = use_mut_ref(|| ChapterRun::new(&p.script, p.visible));
    let rejected = use_state(|| None::<String>);
    let force_update = use_force_update();
    run.borrow_mut().set_visible(p.visible);

    let report = {
        let rejected = rejected.clone();
        let on_answer = p.on_answer.clone();
        let on_complete = p.on_complete.clone();
        let chapter = p.script.number.number();
        move |event: RunEvent, question_id: &str| {
            let finished = event.finishes_chapter();
            match event {
                RunEvent::Rejected => rejected.set(Some(question_id.to_string())),
                RunEvent::Accepted { answer, .. } => {
                    rejected.set(None);
                    on_answer.emit(answer);
                }
                RunEvent::Acknowledged { .. } | RunEvent::Suppressed | RunEvent::NotOpen => {}
            }
            if finished {
                on_complete.emit(chapter);
            }
        }
    };

    let on_submit = {
        let run = run.clone();
        let report = report.clone();
        let force_update = force_update.clone();
        Callback::from(move |(question_id, text): (String, String)| {
            let event = run.borrow_mut().submit(&question_id, &text);
            report(event, &question_id);
            force_update.force_update();
        })
    };

    let current = run.borrow().step_index();
    let steps = p.script.steps.iter().enumerate().take(current + 1).map(|(index, step)| {
        match step {
            ChapterStep::Acknowledge { id, label } => {
                let done = index < current;
                let onclick = {
                    let run = run.clone();
                    let report = report.clone();
                    let force_update = force_update.clone();
                    let id = id.clone();
                    Callback::from(move |_: MouseEvent| {
                        let event = run.borrow_mut().acknowledge(&id);
                        report(event, &id);
                        force_update.force_update();
                    })
                };
                html! {
                    <div key={id.clone()} class="chapter__ack">
                        <button type="button" data-ack={id.clone()} disabled={done} {onclick}>
                            { label.clone() }
                        </button>
                    </div>
                }
            }
            other => html! {
                <div key={format!("step-{index}")} class="chapter__step">
                    { for other.questions().iter().map(|question| {
                        let answered = run.borrow().is_answered(&question.id);
                        let is_rejected = rejected.as_deref() == Some(question.id.as_str());
                        html! {
                            <QuestionInput
                                key={question.id.clone()}
                                question={question.clone()}
                                {answered}
                                rejected={is_rejected}
                                on_submit={on_submit.clone()}
                            />
                        }
                    }) }
                </div>
            },
        }
    });

    html! {
        <section
            class={classes!("chapter", (!p.visible).then_some("chapter--hidden"))}
            aria-hidden={(!p.visible).then_some("true")}
            data-chapter={p.script.number.number().to_string()}
        >
            <h2 class="chapter__title">
                { format!("{}장. {}", p.script.number, p.script.title) }
            </h2>
            { for steps }
        </section>
    }
}
