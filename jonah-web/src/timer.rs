use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::dom;

/// One-shot `setTimeout` that is cleared when dropped.
pub struct Timeout {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Timeout {
    /// Schedule `callback` after `millis`.
    ///
    /// # Errors
    /// Returns an error if there is no window or the timer cannot be scheduled.
    pub fn new(millis: u32, callback: impl FnOnce() + 'static) -> Result<Self, JsValue> {
        let mut callback = Some(callback);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(callback) = callback.take() {
                callback();
            }
        });
        let handle = dom::window()
            .ok_or_else(|| JsValue::from_str("window unavailable"))?
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                i32::try_from(millis).unwrap_or(i32::MAX),
            )?;
        Ok(Self {
            handle,
            _callback: closure,
        })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(win) = dom::window() {
            win.clear_timeout_with_handle(self.handle);
        }
    }
}
