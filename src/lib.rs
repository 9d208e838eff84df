#![cfg(target_arch = "wasm32")]
use hero_core::{AnimationConfig, Hero, HeroControls as _};
use render::WebRenderer;
use wasm_bindgen::prelude::*;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod fetch;
mod frame;
mod hero;
mod observer;
mod render;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("[hero] module loaded");
    observer::schedule_auto_init();
    Ok(())
}

/// Controls returned to JavaScript by `initHero`.
#[wasm_bindgen(js_name = HeroControls)]
pub struct HeroHandle {
    hero: Hero<WebRenderer>,
}

#[wasm_bindgen(js_class = HeroControls)]
impl HeroHandle {
    pub fn pause(&self) {
        self.hero.pause();
    }

    pub fn resume(&self) {
        self.hero.resume();
    }

    /// Stop the loop, release GPU resources and remove listeners. Safe to
    /// call more than once.
    pub fn destroy(&self) {
        self.hero.destroy();
    }
}

/// Start a hero on `canvas`. `options` is a plain object; unknown or
/// malformed fields fall back to their defaults.
#[wasm_bindgen(js_name = initHero)]
pub fn init_hero(canvas: web::HtmlCanvasElement, options: JsValue) -> HeroHandle {
    let config = options_to_config(&options);
    HeroHandle {
        hero: hero::create(&canvas, config),
    }
}

fn options_to_config(options: &JsValue) -> AnimationConfig {
    if options.is_undefined() || options.is_null() {
        return AnimationConfig::default();
    }
    match js_sys::JSON::stringify(options) {
        Ok(json) => AnimationConfig::from_json(&String::from(json)),
        Err(e) => {
            log::warn!("[hero] options not serializable: {:?}", e);
            AnimationConfig::default()
        }
    }
}
