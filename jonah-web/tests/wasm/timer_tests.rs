use std::cell::Cell;
use std::rc::Rc;

use js_sys::Promise;
use jonah_web::timer::Timeout;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

async fn sleep_ms(millis: u32) {
    let promise = Promise::new(&mut |resolve, _reject| {
        let timeout = Timeout::new(millis, move || {
            let _ = resolve.call0(&JsValue::UNDEFINED);
        })
        .expect("schedule sleep");
        std::mem::forget(timeout);
    });
    JsFuture::from(promise).await.expect("sleep resolves");
}

#[wasm_bindgen_test]
async fn timeout_fires_once_armed() {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let _timeout = Timeout::new(5, move || counter.set(counter.get() + 1)).expect("schedule");
    sleep_ms(30).await;
    assert_eq!(fired.get(), 1);
}

#[wasm_bindgen_test]
async fn dropped_timeout_never_fires() {
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    let timeout = Timeout::new(5, move || flag.set(true)).expect("schedule");
    drop(timeout);
    sleep_ms(30).await;
    assert!(!fired.get());
}

#[wasm_bindgen_test]
fn dom_helpers_find_the_browser() {
    assert!(jonah_web::dom::window().is_some());
    assert!(jonah_web::dom::document().is_some());
    assert!(jonah_web::dom::now_ms() > 0);
}
