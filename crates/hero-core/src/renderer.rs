//! Boundary between the engine and a graphics backend.

use crate::assets::EnvironmentMap;
use crate::constants::DPR_LIMIT;
use crate::error::Result;
use crate::objects::HeroScene;
use crate::scene::ResourceSink;

/// Drawing-buffer size derived from the canvas CSS size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Physical size for a CSS box, with the pixel ratio clamped to
    /// [`DPR_LIMIT`]. Zero or missing sizes count as one pixel.
    pub fn from_css(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        let ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio.min(DPR_LIMIT)
        } else {
            1.0
        };
        let side = |css: f64| {
            let css = if css.is_finite() && css > 0.0 { css } else { 1.0 };
            ((css * ratio).round() as u32).max(1)
        };
        Self {
            width: side(css_width),
            height: side(css_height),
            pixel_ratio: ratio,
        }
    }
}

/// A backend that can draw a [`HeroScene`].
///
/// Released scene resources arrive through the [`ResourceSink`] supertrait.
pub trait SceneRenderer: ResourceSink {
    fn resize(&mut self, viewport: Viewport);

    fn set_environment(&mut self, environment: &EnvironmentMap);

    fn render(&mut self, scene: &HeroScene) -> Result<()>;

    /// Drop every GPU object. The renderer is not used afterwards.
    fn dispose(&mut self);
}
