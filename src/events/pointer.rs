use super::Listener;
use crate::render::WebRenderer;
use hero_core::Hero;
use web_sys as web;

/// Hover pauses the clock; a click skips to the next phase.
pub fn wire_pointer(
    canvas: &web::HtmlCanvasElement,
    hero: &Hero<WebRenderer>,
) -> anyhow::Result<Vec<Listener>> {
    let enter = {
        let hero = hero.clone();
        Listener::attach(canvas, "pointerenter", move |_| hero.set_hover(true))?
    };
    let leave = {
        let hero = hero.clone();
        Listener::attach(canvas, "pointerleave", move |_| hero.set_hover(false))?
    };
    let click = {
        let hero = hero.clone();
        Listener::attach(canvas, "click", move |_| {
            log::debug!("[hero] click");
            hero.skip();
        })?
    };
    Ok(vec![enter, leave, click])
}
