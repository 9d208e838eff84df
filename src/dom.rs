use crate::constants::*;
use hero_core::color::Rgb;
use hero_core::config::Background;
use hero_core::constants::{FALLBACK_IMAGE_SIZE, HERO_ARIA_LABEL, TRANSPARENT_CLASS};
use hero_core::renderer::Viewport;
use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

/// Mark the canvas as a decorative image for assistive technology.
pub fn apply_accessibility(canvas: &web::HtmlCanvasElement) {
    _ = canvas.set_attribute("role", "img");
    _ = canvas.set_attribute("aria-hidden", "true");
    _ = canvas.set_attribute("aria-label", HERO_ARIA_LABEL);
}

pub fn apply_background_class(canvas: &web::HtmlCanvasElement, background: &Background) {
    if background.is_transparent() {
        _ = canvas.class_list().add_1(TRANSPARENT_CLASS);
    }
}

/// `navigator.gpu` is present.
pub fn has_webgpu() -> bool {
    let Some(window) = web::window() else {
        return false;
    };
    let navigator = window.navigator();
    js_sys::Reflect::get(&navigator, &"gpu".into())
        .map(|gpu| !gpu.is_undefined() && !gpu.is_null())
        .unwrap_or(false)
}

pub fn host_prefers_reduced_motion() -> bool {
    web::window()
        .and_then(|w| w.match_media(REDUCED_MOTION_QUERY).ok().flatten())
        .map(|mql| mql.matches())
        .unwrap_or(false)
}

/// Drawing-buffer size for the canvas CSS box at the current pixel ratio.
pub fn canvas_viewport(canvas: &web::HtmlCanvasElement) -> Viewport {
    let dpr = web::window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0);
    let viewport = Viewport::from_css(canvas.client_width() as f64, canvas.client_height() as f64, dpr);
    if canvas.width() != viewport.width || canvas.height() != viewport.height {
        canvas.set_width(viewport.width);
        canvas.set_height(viewport.height);
    }
    viewport
}

/// Replace the canvas with a small static image: background, dark gradient
/// square and an accent outline.
pub fn insert_fallback_image(
    canvas: &web::HtmlCanvasElement,
    background: &Background,
    accent: Rgb,
) -> anyhow::Result<web::HtmlImageElement> {
    let document = window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;
    let size = FALLBACK_IMAGE_SIZE as f64;
    let scratch: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    scratch.set_width(FALLBACK_IMAGE_SIZE);
    scratch.set_height(FALLBACK_IMAGE_SIZE);
    let ctx: web::CanvasRenderingContext2d = scratch
        .get_context("2d")
        .map_err(|e| anyhow::anyhow!("{:?}", e))?
        .ok_or_else(|| anyhow::anyhow!("2d context unavailable"))?
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;

    if let Background::Color(color) = background {
        ctx.set_fill_style_str(&color.to_css());
        ctx.fill_rect(0.0, 0.0, size, size);
    }
    let gradient = ctx.create_linear_gradient(0.0, 0.0, size, size);
    _ = gradient.add_color_stop(0.0, FALLBACK_GRADIENT_FROM);
    _ = gradient.add_color_stop(1.0, FALLBACK_GRADIENT_TO);
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill_rect(
        size * FALLBACK_SQUARE_INSET,
        size * FALLBACK_SQUARE_INSET,
        size * FALLBACK_SQUARE_SIZE,
        size * FALLBACK_SQUARE_SIZE,
    );
    ctx.set_stroke_style_str(&accent.to_css());
    ctx.set_line_width(size * FALLBACK_STROKE_WIDTH);
    ctx.stroke_rect(
        size * FALLBACK_STROKE_INSET,
        size * FALLBACK_STROKE_INSET,
        size * FALLBACK_STROKE_SIZE,
        size * FALLBACK_STROKE_SIZE,
    );

    let url = scratch
        .to_data_url()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let image = web::HtmlImageElement::new().map_err(|e| anyhow::anyhow!("{:?}", e))?;
    image.set_src(&url);
    image.set_alt(HERO_ARIA_LABEL);
    image.set_class_name(&canvas.class_name());
    _ = image.set_attribute("style", FALLBACK_IMAGE_STYLE);
    _ = image.set_attribute("role", "img");
    canvas
        .replace_with_with_node_1(&image)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(image)
}
