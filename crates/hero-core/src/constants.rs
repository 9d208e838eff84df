//! Tuning constants for the hero animation.
//!
//! Values mirror the look of the marketing hero: timings, sizes and limits
//! that would otherwise appear as magic numbers in the applier and the
//! browser layer.

// Particles
pub const POINT_COUNT: usize = 1600;
pub const POINT_SIZE: f32 = 0.02; // sprite diameter in clip units at depth 1

// Display
pub const DPR_LIMIT: f64 = 1.5;
pub const FALLBACK_IMAGE_SIZE: u32 = 256;
pub const HERO_ARIA_LABEL: &str = "3D hero animation: design→print→scan cycle";
pub const TRANSPARENT_CLASS: &str = "hero--transparent";

// Timing
pub const MAX_FRAME_STEP_SEC: f64 = 0.1; // clamp for backgrounded tabs
pub const SKIP_EPSILON_SEC: f64 = 0.001; // nudge past a phase boundary on skip
pub const IDLE_TIME_OFFSET: f32 = 10.0;

// Configuration bounds
pub const CUBE_SIZE_MIN: f32 = 0.6;
pub const CUBE_SIZE_MAX: f32 = 1.5;
pub const ACCENT_TINT_AMOUNT: f32 = 0.6; // loaded materials lerp toward the accent

// Visibility gate
pub const MAX_RUNNING_HEROES: usize = 2;
pub const VISIBILITY_THRESHOLD: f64 = 0.25;

// Camera
pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.1;
pub const CAMERA_FAR: f32 = 30.0;
pub const CAMERA_BASE_EYE: [f32; 3] = [3.0, 2.3, 3.6];
pub const CAMERA_SCAN_EYE: [f32; 3] = [2.8, 2.4, 3.4];
pub const CAMERA_TARGET: [f32; 3] = [0.0, 0.7, 0.0];

// Part placement
pub const PART_GROUND_LIFT: f32 = 0.02;
pub const MIN_PART_HEIGHT: f32 = 0.001;
