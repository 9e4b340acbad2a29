use jonah_game::QuestionSpec;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub question: QuestionSpec,
    #[prop_or_default]
    pub answered: bool,
    /// The last submission for this question was wrong.
    #[prop_or_default]
    pub rejected: bool,
    /// Emits `(question_id, text)`; blank input is never submitted.
    pub on_submit: Callback<(String, String)>,
}

#[function_component(QuestionInput)]
pub fn question_input(p: &Props) -> Html {
    let value = use_state(String::new);

    let oninput = {
        let value = value.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            value.set(input.value());
        })
    };
    let submit = {
        let value = value.clone();
        let id = p.question.id.clone();
        let cb = p.on_submit.clone();
        Callback::from(move |()| {
            if !value.trim().is_empty() {
                cb.emit((id.clone(), (*value).clone()));
            }
        })
    };
    let onclick = {
        let submit = submit.clone();
        Callback::from(move |_: MouseEvent| submit.emit(()))
    };
    let onkeydown = Callback::from(move |e: KeyboardEvent| {
        if e.key() == "Enter" {
            submit.emit(());
        }
    });

    let placeholder = if p.question.placeholder.is_empty() {
        "답을 입력하세요".to_string()
    } else {
        p.question.placeholder.clone()
    };
    let input_class = classes!(
        "question__input",
        p.answered.then_some("question__input--correct"),
        p.rejected.then_some("question__input--wrong"),
    );
    html! {
        <div class="question" data-question={p.question.id.clone()}>
            if !p.question.prompt.is_empty() {
                <p class="question__prompt">{ p.question.prompt.clone() }</p>
            }
            <div class="question__row">
                <input
                    class={input_class}
                    type="text"
                    value={(*value).clone()}
                    {placeholder}
                    disabled={p.answered}
                    {oninput}
                    {onkeydown}
                />
                <button
                    type="button"
                    class="question__submit"
                    disabled={p.answered || value.trim().is_empty()}
                    {onclick}
                >
                    { if p.answered { "✔" } else { "확인" } }
                </button>
            </div>
            if p.rejected {
                <p class="question__feedback question__feedback--wrong" role="alert">
                    { "틀렸습니다. 다시 시도해주세요." }
                </p>
            }
            if p.answered {
                <p class="question__feedback question__feedback--correct">{ "정답입니다!" }</p>
            }
        </div>
    }
}
