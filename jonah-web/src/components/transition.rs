use jonah_game::{TransitionImage, TransitionStage};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub image: TransitionImage,
    pub stage: TransitionStage,
    /// Fired when the illustration has loaded; the display clock starts then.
    pub on_loaded: Callback<()>,
}

#[function_component(TransitionScreen)]
pub fn transition_screen(p: &Props) -> Html {
    let onload = {
        let cb = p.on_loaded.clone();
        Callback::from(move |_: Event| cb.emit(()))
    };
    // Load failures start the display clock too.
    let onerror = {
        let cb = p.on_loaded.clone();
        Callback::from(move |_: Event| {
            log::warn!("transition image failed to load");
            cb.emit(());
        })
    };
    let class = classes!(
        "transition",
        match p.stage {
            TransitionStage::Loading => "transition--loading",
            TransitionStage::Showing => "transition--showing",
            TransitionStage::FadingOut => "transition--fading",
        }
    );
    html! {
        <div {class} role="presentation">
            if p.stage == TransitionStage::Loading {
                <p class="transition__loading">{ "불러오는 중..." }</p>
            }
            <img
                class="transition__image"
                src={p.image.src.clone()}
                alt={p.image.alt.clone()}
                {onload}
                {onerror}
            />
        </div>
    }
}
