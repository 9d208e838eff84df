//! Auto-initialization of `canvas[data-hero]` through the visibility gate.

use crate::constants::HERO_SELECTOR;
use crate::dom;
use crate::hero;
use crate::render::WebRenderer;
use hero_core::constants::VISIBILITY_THRESHOLD;
use hero_core::{AnimationConfig, Hero, VisibilityGate};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

type CanvasGate = VisibilityGate<web::HtmlCanvasElement, Hero<WebRenderer>>;

struct AutoInit {
    _observer: web::IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, web::IntersectionObserver)>,
    _gate: Rc<RefCell<CanvasGate>>,
}

thread_local! {
    static AUTO_INIT: RefCell<Option<AutoInit>> = const { RefCell::new(None) };
}

/// Observe every hero canvas once the document is parsed.
pub fn schedule_auto_init() {
    let Some(document) = dom::window_document() else {
        return;
    };
    if document.ready_state() != "loading" {
        run_auto_init();
        return;
    }
    let Some(window) = web::window() else {
        return;
    };
    let callback = Closure::once_into_js(run_auto_init);
    _ = window.add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref());
}

fn run_auto_init() {
    if AUTO_INIT.with(|slot| slot.borrow().is_some()) {
        return;
    }
    match ensure_auto_init() {
        Ok(Some(auto)) => AUTO_INIT.with(|slot| *slot.borrow_mut() = Some(auto)),
        Ok(None) => {}
        Err(e) => log::error!("[gate] auto-init failed: {e}"),
    }
}

fn ensure_auto_init() -> anyhow::Result<Option<AutoInit>> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let nodes = document
        .query_selector_all(HERO_SELECTOR)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let canvases: Vec<web::HtmlCanvasElement> = (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into().ok())
        .collect();
    if canvases.is_empty() {
        return Ok(None);
    }

    let gate = Rc::new(RefCell::new(CanvasGate::new(|canvas| {
        hero::create(canvas, AnimationConfig::default())
    })));
    for canvas in &canvases {
        gate.borrow_mut().register(canvas.clone());
    }

    let batch_gate = Rc::clone(&gate);
    let callback = Closure::wrap(Box::new(
        move |entries: js_sys::Array, _observer: web::IntersectionObserver| {
            let batch: Vec<(web::HtmlCanvasElement, bool)> = entries
                .iter()
                .filter_map(|value| value.dyn_into::<web::IntersectionObserverEntry>().ok())
                .filter_map(|entry| {
                    let intersecting = entry.is_intersecting();
                    entry
                        .target()
                        .dyn_into::<web::HtmlCanvasElement>()
                        .ok()
                        .map(|canvas| (canvas, intersecting))
                })
                .collect();
            match batch_gate.try_borrow_mut() {
                Ok(mut gate) => {
                    gate.handle_batch(batch);
                    log::trace!("[gate] running={}", gate.running_count());
                }
                Err(_) => log::warn!("[gate] batch dropped while the gate was busy"),
            }
        },
    )
        as Box<dyn FnMut(js_sys::Array, web::IntersectionObserver)>);

    let init = web::IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(VISIBILITY_THRESHOLD));
    let observer =
        web::IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    for canvas in &canvases {
        observer.observe(canvas);
    }
    log::info!("[gate] observing {} hero canvas(es)", canvases.len());

    Ok(Some(AutoInit {
        _observer: observer,
        _callback: callback,
        _gate: gate,
    }))
}
