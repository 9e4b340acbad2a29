use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub title: AttrValue,
    /// Completed chapters, e.g. `2/6`.
    pub progress_label: AttrValue,
}

#[function_component(Header)]
pub fn header(p: &Props) -> Html {
    html! {
        <header role="banner" class="journey-header">
            <h1 class="journey-header__title">{ p.title.clone() }</h1>
            <p class="journey-header__progress" aria-live="polite">
                { format!("{} 완료", p.progress_label) }
            </p>
        </header>
    }
}
