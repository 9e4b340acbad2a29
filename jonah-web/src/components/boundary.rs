use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    /// Failure message for the chapter inside; `None` renders the children.
    #[prop_or_default]
    pub fault: Option<AttrValue>,
    pub on_recover: Callback<()>,
    #[prop_or_default]
    pub children: Children,
}

/// Keeps a failed chapter from taking the header and navigation down with it.
#[function_component(ChapterBoundary)]
pub fn chapter_boundary(p: &Props) -> Html {
    let Some(fault) = p.fault.as_ref() else {
        return html! { <>{ for p.children.iter() }</> };
    };
    let onclick = {
        let cb = p.on_recover.clone();
        Callback::from(move |_| cb.emit(()))
    };
    html! {
        <section class="chapter-fault" role="alert">
            <h2>{ "챕터 로딩 오류" }</h2>
            <p>{ "챕터를 불러오는 중 문제가 발생했습니다." }</p>
            <p class="chapter-fault__detail">{ fault.clone() }</p>
            <button id="recover-btn" type="button" {onclick}>{ "새로고침" }</button>
        </section>
    }
}
