use super::Listener;
use crate::constants::REDUCED_MOTION_QUERY;
use crate::dom;
use crate::render::WebRenderer;
use hero_core::Hero;
use web_sys as web;

/// Keep the drawing buffer in step with the CSS size.
pub fn wire_resize(
    canvas: &web::HtmlCanvasElement,
    hero: &Hero<WebRenderer>,
) -> anyhow::Result<Listener> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let canvas = canvas.clone();
    let hero = hero.clone();
    Listener::attach(&window, "resize", move |_| {
        hero.resize(dom::canvas_viewport(&canvas));
    })
}

/// Follow `(prefers-reduced-motion: reduce)` changes. `None` when the
/// browser has no `matchMedia`.
pub fn wire_reduced_motion(hero: &Hero<WebRenderer>) -> anyhow::Result<Option<Listener>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let Some(mql) = window
        .match_media(REDUCED_MOTION_QUERY)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
    else {
        return Ok(None);
    };
    let hero = hero.clone();
    let query = mql.clone();
    let listener = Listener::attach(&mql, "change", move |_| {
        let reduced = query.matches();
        log::info!("[hero] reduced motion {}", if reduced { "on" } else { "off" });
        hero.set_host_reduced_motion(reduced);
    })?;
    Ok(Some(listener))
}
