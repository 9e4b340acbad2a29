use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub on_restart: Callback<()>,
}

#[function_component(CompletionOverlay)]
pub fn completion_overlay(p: &Props) -> Html {
    let onclick = {
        let cb = p.on_restart.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <div class="completion" role="dialog" aria-modal="true" aria-labelledby="completion-title">
            <h2 id="completion-title">{ "🎉 여정 완성!" }</h2>
            <p>{ "요나의 여정을 모두 완주하셨습니다!" }</p>
            <button id="restart-btn" type="button" {onclick}>{ "처음부터 다시 시작" }</button>
        </div>
    }
}
