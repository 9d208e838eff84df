use hero_core::scheduler::{FrameScheduler, FrameToken};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

/// `requestAnimationFrame` behind the engine's scheduler trait.
#[derive(Default)]
pub struct RafScheduler;

impl FrameScheduler for RafScheduler {
    fn schedule_frame(&self, callback: Box<dyn FnOnce(f64)>) -> FrameToken {
        let Some(window) = web::window() else {
            log::error!("[hero] no window, frame dropped");
            return FrameToken(0);
        };
        // Frees itself after the call; a cancelled frame leaks this one closure.
        let js = Closure::once_into_js(move |now: f64| callback(now));
        match window.request_animation_frame(js.unchecked_ref()) {
            Ok(id) => FrameToken(id),
            Err(e) => {
                log::error!("[hero] requestAnimationFrame failed: {:?}", e);
                FrameToken(0)
            }
        }
    }

    fn cancel(&self, token: FrameToken) {
        if let Some(window) = web::window() {
            _ = window.cancel_animation_frame(token.0);
        }
    }
}
