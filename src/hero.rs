use crate::dom;
use crate::events::{self, Listener};
use crate::fetch::FetchLoader;
use crate::frame::RafScheduler;
use crate::render::WebRenderer;
use hero_core::{AnimationConfig, Hero};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

/// Build a hero on `canvas`. Returns immediately; the GPU and the assets
/// arrive asynchronously. Without WebGPU the canvas is swapped for a static
/// image and the handle only supports `destroy`.
pub fn create(canvas: &web::HtmlCanvasElement, config: AnimationConfig) -> Hero<WebRenderer> {
    dom::apply_accessibility(canvas);
    dom::apply_background_class(canvas, &config.background);
    let background = config.background;

    let hero = Hero::new(
        config,
        dom::host_prefers_reduced_motion(),
        Rc::new(RafScheduler),
        random_seed(),
    );

    if !dom::has_webgpu() {
        show_fallback(&hero, canvas);
        return hero;
    }

    let listeners = wire_listeners(canvas, &hero);
    hero.on_detach(move || {
        for listener in listeners {
            listener.detach();
        }
    });
    hero.resize(dom::canvas_viewport(canvas));

    let canvas = canvas.clone();
    let task = hero.clone();
    spawn_local(async move {
        let point_count = task.with_engine(|e| e.scene().particles.point_count());
        match WebRenderer::new(&canvas, &background, point_count).await {
            Ok(renderer) => {
                task.attach_renderer(renderer);
                task.load_assets(Rc::new(FetchLoader::new())).await;
            }
            Err(e) => {
                log::info!("[gpu] adapter unavailable: {e}");
                if !task.is_destroyed() {
                    show_fallback(&task, &canvas);
                }
            }
        }
    });
    hero
}

fn show_fallback(hero: &Hero<WebRenderer>, canvas: &web::HtmlCanvasElement) {
    let (background, accent) = hero.with_engine(|e| (e.config().background, e.config().accent));
    hero.fall_back();
    match dom::insert_fallback_image(canvas, &background, accent) {
        Ok(image) => hero.on_destroy(move || image.remove()),
        Err(e) => log::error!("[hero] fallback image: {e}"),
    }
}

fn wire_listeners(canvas: &web::HtmlCanvasElement, hero: &Hero<WebRenderer>) -> Vec<Listener> {
    let mut listeners = Vec::new();
    match events::wire_pointer(canvas, hero) {
        Ok(pointer) => listeners.extend(pointer),
        Err(e) => log::error!("[hero] pointer listeners: {e}"),
    }
    match events::wire_resize(canvas, hero) {
        Ok(resize) => listeners.push(resize),
        Err(e) => log::error!("[hero] resize listener: {e}"),
    }
    match events::wire_reduced_motion(hero) {
        Ok(Some(motion)) => listeners.push(motion),
        Ok(None) => {}
        Err(e) => log::error!("[hero] reduced-motion listener: {e}"),
    }
    listeners
}

fn random_seed() -> u64 {
    (js_sys::Math::random() * u32::MAX as f64) as u64
}
