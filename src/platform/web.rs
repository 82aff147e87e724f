//! `requestAnimationFrame` scheduling for the browser

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::FrameScheduler;

/// Shared slot for the frame callback, filled once the game is wired up
pub type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Schedules one shared closure through `window.requestAnimationFrame`
pub struct AnimationFrameScheduler {
    callback: FrameCallback,
}

impl AnimationFrameScheduler {
    pub fn new(callback: FrameCallback) -> Self {
        Self { callback }
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    type Handle = i32;

    fn request(&mut self) -> Option<i32> {
        let window = web_sys::window()?;
        let callback = self.callback.borrow();
        let closure = callback.as_ref()?;
        window
            .request_animation_frame(closure.as_ref().unchecked_ref())
            .ok()
    }

    fn cancel(&mut self, handle: i32) {
        if let Some(window) = web_sys::window() {
            let _ = window.cancel_animation_frame(handle);
        }
    }
}
