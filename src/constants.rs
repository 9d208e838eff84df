//! Browser-side constants: selectors, queries and the fallback image palette.
//!
//! Animation tuning lives in `hero_core::constants`.

// Auto-initialization
pub const HERO_SELECTOR: &str = "canvas[data-hero]";
pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

// Fallback image layout, as fractions of its side
pub const FALLBACK_GRADIENT_FROM: &str = "#0a0d16";
pub const FALLBACK_GRADIENT_TO: &str = "#131a2c";
pub const FALLBACK_SQUARE_INSET: f64 = 0.15;
pub const FALLBACK_SQUARE_SIZE: f64 = 0.7;
pub const FALLBACK_STROKE_INSET: f64 = 0.18;
pub const FALLBACK_STROKE_SIZE: f64 = 0.64;
pub const FALLBACK_STROKE_WIDTH: f64 = 0.05;
/// The fallback fills the box the canvas occupied.
pub const FALLBACK_IMAGE_STYLE: &str = "width:100%;height:100%;object-fit:cover;display:block";

// Lighting
pub const AMBIENT_COLOR: u32 = 0x1b1f2a;
pub const AMBIENT_INTENSITY: f32 = 0.6;
pub const KEY_LIGHT_POSITION: [f32; 3] = [2.5, 4.2, 3.0];
pub const KEY_LIGHT_INTENSITY: f32 = 1.25;
pub const RIM_LIGHT_COLOR: u32 = 0x88aaff;
pub const RIM_LIGHT_POSITION: [f32; 3] = [-3.0, 2.2, -2.5];
pub const RIM_LIGHT_INTENSITY: f32 = 0.9;
pub const ENV_STRENGTH: f32 = 1.0; // scale of the environment reflection once loaded

// GPU buffers
pub const OBJECT_UNIFORM_STRIDE: u64 = 256; // default min_uniform_buffer_offset_alignment
pub const INITIAL_OBJECT_SLOTS: u64 = 64; // grows on demand
