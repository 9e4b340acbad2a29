#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use jonah_game::{JourneyController, JourneyView, PreloadStatus, PreloadTicket, TimerKey};
#[cfg(target_arch = "wasm32")]
use yew::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::{dom, storage::BrowserStore, timer::Timeout};

pub mod shell;

pub use shell::{JOURNEY_TITLE, JourneyShell, ShellProps};

#[cfg(target_arch = "wasm32")]
type Controller = Rc<RefCell<JourneyController<BrowserStore>>>;

#[cfg(target_arch = "wasm32")]
type Slot<T> = Rc<RefCell<Option<T>>>;

/// Root component: owns the journey controller and the browser timers.
#[cfg(target_arch = "wasm32")]
#[function_component(App)]
pub fn app() -> Html {
    let controller = use_mut_ref(|| JourneyController::with_bundled_assets(BrowserStore));
    let force_update = use_force_update();
    let stage_timer: Slot<(TimerKey, Timeout)> = use_mut_ref(|| None);
    let preload_timer: Slot<(PreloadTicket, Timeout)> = use_mut_ref(|| None);
    let save_timer: Slot<Timeout> = use_mut_ref(|| None);

    {
        let controller = controller.clone();
        let force_update = force_update.clone();
        use_effect(move || {
            if contain_missing_chapter(&controller) {
                force_update.force_update();
            }
            arm_stage_timer(&controller, &stage_timer, &force_update);
            arm_preload(&controller, &preload_timer, &force_update);
            schedule_save(&controller, &save_timer, &force_update);
            || {}
        });
    }
    {
        let controller = controller.clone();
        use_effect_with((), move |()| {
            move || {
                let mut ctrl = controller.borrow_mut();
                if ctrl.store().has_unsaved_changes() && ctrl.flush().is_err() {
                    log::warn!("progress not saved on unmount");
                }
            }
        });
    }

    let on_select = controller_callback(&controller, &force_update, |ctrl, chapter: u32| {
        ctrl.select_chapter(chapter);
    });
    let on_answer = controller_callback(&controller, &force_update, |ctrl, answer: jonah_game::AcceptedAnswer| {
        ctrl.record_answer(&answer.question_id, &answer.answer);
    });
    let on_complete = controller_callback(&controller, &force_update, |ctrl, chapter: u32| {
        if let Err(err) = ctrl.chapter_completed(chapter) {
            log::debug!("completion signal ignored: {err}");
        }
    });
    let on_image_loaded = controller_callback(&controller, &force_update, |ctrl, ()| ctrl.image_loaded());
    let on_recover = controller_callback(&controller, &force_update, |ctrl, ()| ctrl.recover_from_fault());
    let on_restart = controller_callback(&controller, &force_update, |ctrl, ()| ctrl.restart());

    let ctrl = controller.borrow();
    let view = ctrl.view();
    let script = match &view {
        JourneyView::Chapter { chapter, .. } => ctrl.catalog().chapter(*chapter).cloned(),
        _ => None,
    };
    let preloaded = match (&view, ctrl.preload_status()) {
        (JourneyView::Transition { pending_chapter, .. }, PreloadStatus::Ready(ready))
            if ready == *pending_chapter =>
        {
            ctrl.catalog().chapter(ready).cloned()
        }
        _ => None,
    };

    html! {
        <JourneyShell
            {view}
            entries={ctrl.navigation()}
            progress_label={ctrl.progress_label()}
            {script}
            {preloaded}
            {on_select}
            {on_answer}
            {on_complete}
            {on_image_loaded}
            {on_recover}
            {on_restart}
        />
    }
}

#[cfg(target_arch = "wasm32")]
fn controller_callback<T: 'static>(
    controller: &Controller,
    force_update: &UseForceUpdateHandle,
    apply: impl Fn(&mut JourneyController<BrowserStore>, T) + 'static,
) -> Callback<T> {
    let controller = controller.clone();
    let force_update = force_update.clone();
    Callback::from(move |value: T| {
        apply(&mut controller.borrow_mut(), value);
        force_update.force_update();
    })
}

#[cfg(target_arch = "wasm32")]
fn contain_missing_chapter(controller: &Controller) -> bool {
    let mut ctrl = controller.borrow_mut();
    if let JourneyView::Chapter { chapter, fault: None } = ctrl.view()
        && ctrl.catalog().chapter(chapter).is_none()
    {
        ctrl.report_chapter_fault(format!("{chapter}장 내용을 찾을 수 없습니다"));
        return true;
    }
    false
}

/// Keep exactly one timer armed for the active intro or transition stage.
#[cfg(target_arch = "wasm32")]
fn arm_stage_timer(
    controller: &Controller,
    slot: &Slot<(TimerKey, Timeout)>,
    force_update: &UseForceUpdateHandle,
) {
    let pending = controller.borrow().pending_timer();
    let mut armed = slot.borrow_mut();
    match pending {
        None => *armed = None,
        Some((key, _)) if armed.as_ref().is_some_and(|(current, _)| *current == key) => {}
        Some((key, millis)) => {
            let controller = controller.clone();
            let force_update = force_update.clone();
            let fire = move || {
                if controller.borrow_mut().fire_timer(key) {
                    force_update.force_update();
                }
            };
            *armed = match Timeout::new(millis, fire) {
                Ok(timeout) => Some((key, timeout)),
                Err(err) => {
                    log::error!("could not schedule stage timer: {}", dom::js_error_message(&err));
                    None
                }
            };
        }
    }
}

/// Resolve the next chapter's preload off the current event; stale tickets are dropped.
#[cfg(target_arch = "wasm32")]
fn arm_preload(
    controller: &Controller,
    slot: &Slot<(PreloadTicket, Timeout)>,
    force_update: &UseForceUpdateHandle,
) {
    let in_flight = controller.borrow().preload_in_flight();
    let mut armed = slot.borrow_mut();
    match in_flight {
        None => *armed = None,
        Some(ticket) if armed.as_ref().is_some_and(|(current, _)| *current == ticket) => {}
        Some(ticket) => {
            let controller = controller.clone();
            let force_update = force_update.clone();
            let resolve = move || {
                if controller.borrow_mut().resolve_preload(ticket) {
                    force_update.force_update();
                }
            };
            *armed = Timeout::new(0, resolve)
                .map(|timeout| (ticket, timeout))
                .map_err(|err| log::warn!("preload not scheduled: {}", dom::js_error_message(&err)))
                .ok();
        }
    }
}

/// Poll the debounced save now and again once the window has passed.
/// A write still owed after that poll re-renders, which schedules another.
#[cfg(target_arch = "wasm32")]
fn schedule_save(controller: &Controller, slot: &Slot<Timeout>, force_update: &UseForceUpdateHandle) {
    let window_ms = {
        let mut ctrl = controller.borrow_mut();
        ctrl.poll_save(dom::now_ms());
        if !ctrl.store().has_unsaved_changes() {
            *slot.borrow_mut() = None;
            return;
        }
        ctrl.config().save_debounce_ms
    };
    let controller = controller.clone();
    let force_update = force_update.clone();
    let poll = move || {
        let owed = {
            let mut ctrl = controller.borrow_mut();
            ctrl.poll_save(dom::now_ms());
            ctrl.store().has_unsaved_changes()
        };
        if owed {
            force_update.force_update();
        }
    };
    *slot.borrow_mut() = Timeout::new(window_ms.saturating_add(1), poll)
        .map_err(|err| log::warn!("save timer not scheduled: {}", dom::js_error_message(&err)))
        .ok();
}
