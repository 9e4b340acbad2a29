use jonah_game::{ChapterStatus, NavEntry};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub entries: Vec<NavEntry>,
    pub on_select: Callback<u32>,
}

fn status_class(status: ChapterStatus) -> &'static str {
    match status {
        ChapterStatus::Locked => "chapter-nav__item--locked",
        ChapterStatus::Available => "chapter-nav__item--available",
        ChapterStatus::Completed => "chapter-nav__item--completed",
    }
}

#[function_component(ChapterNavigation)]
pub fn chapter_navigation(p: &Props) -> Html {
    html! {
        <nav class="chapter-nav" aria-label="챕터 이동">
            <ol>
                { for p.entries.iter().map(|entry| {
                    let number = entry.chapter.number();
                    let onclick = {
                        let cb = p.on_select.clone();
                        Callback::from(move |_| cb.emit(number))
                    };
                    let class = classes!(
                        "chapter-nav__item",
                        status_class(entry.status),
                        entry.is_current.then_some("chapter-nav__item--current"),
                    );
                    html! {
                        <li key={number} class={class}>
                            <button
                                type="button"
                                data-chapter={number.to_string()}
                                disabled={!entry.is_selectable()}
                                aria-current={entry.is_current.then_some("step")}
                                {onclick}
                            >
                                <span class="chapter-nav__number">{ number.to_string() }</span>
                                <span class="chapter-nav__title">{ entry.title.clone() }</span>
                            </button>
                        </li>
                    }
                }) }
            </ol>
        </nav>
    }
}
