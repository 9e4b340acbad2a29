use jonah_game::IntroStage;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub stage: IntroStage,
}

#[function_component(IntroScreen)]
pub fn intro_screen(p: &Props) -> Html {
    let expanding = (p.stage == IntroStage::Expanding).then_some("intro--expanding");
    let body = match p.stage {
        IntroStage::Loading => html! {
            <div class="intro__step">
                <div class="intro__spinner" aria-hidden="true"></div>
                <p>{ "여정을 시작합니다..." }</p>
            </div>
        },
        IntroStage::Appearing => html! {
            <div class="intro__step">
                <div class="intro__orb" aria-hidden="true"></div>
                <p>{ "어라? 이게 뭐지...?" }</p>
            </div>
        },
        stage => html! {
            <>
                if stage.shows_title() {
                    <h1 class={classes!(
                        "intro__title",
                        (stage == IntroStage::Glowing).then_some("intro__title--glow"),
                    )}>
                        { "요나의 흔적을 찾았다!" }
                    </h1>
                }
                if stage.shows_subtitle() {
                    <p class="intro__subtitle">{ "하나님의 부름으로 떠나는 여정..." }</p>
                }
            </>
        },
    };
    html! {
        <div class={classes!("intro", expanding)} data-stage={format!("{:?}", p.stage).to_lowercase()}>
            { body }
        </div>
    }
}
