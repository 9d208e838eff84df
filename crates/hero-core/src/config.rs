//! Hero configuration: JS-facing options and the immutable engine config.

use crate::assets::AssetKind;
use crate::color::Rgb;
use crate::constants::{CUBE_SIZE_MAX, CUBE_SIZE_MIN};
use crate::error::Result;
use crate::timeline::Phase;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

pub const DEFAULT_BACKGROUND: &str = "#05070b";
pub const DEFAULT_ACCENT: u32 = 0x7aa2ff;
pub const DEFAULT_CUBE_SIZE: f32 = 1.0;

/// Seconds spent in each phase.
#[derive(Clone, Debug, PartialEq)]
pub struct PhaseDurations {
    pub idle: f64,
    pub to_printer: f64,
    pub printing: f64,
    pub to_scanner: f64,
    pub scanning: f64,
    pub to_cube: f64,
    pub loop_pause: f64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            idle: 3.0,
            to_printer: 1.5,
            printing: 4.0,
            to_scanner: 1.2,
            scanning: 4.0,
            to_cube: 1.5,
            loop_pause: 1.0,
        }
    }
}

impl PhaseDurations {
    pub fn get(&self, phase: Phase) -> f64 {
        match phase {
            Phase::Idle => self.idle,
            Phase::ToPrinter => self.to_printer,
            Phase::Printing => self.printing,
            Phase::ToScanner => self.to_scanner,
            Phase::Scanning => self.scanning,
            Phase::ToCube => self.to_cube,
            Phase::LoopPause => self.loop_pause,
        }
    }

    /// Defaults with every present override applied.
    pub fn with_overrides(overrides: &DurationOverrides) -> Self {
        let base = Self::default();
        Self {
            idle: overrides.idle.unwrap_or(base.idle),
            to_printer: overrides.to_printer.unwrap_or(base.to_printer),
            printing: overrides.printing.unwrap_or(base.printing),
            to_scanner: overrides.to_scanner.unwrap_or(base.to_scanner),
            scanning: overrides.scanning.unwrap_or(base.scanning),
            to_cube: overrides.to_cube.unwrap_or(base.to_cube),
            loop_pause: overrides.loop_pause.unwrap_or(base.loop_pause),
        }
    }
}

/// Per-phase duration overrides. Missing or malformed entries keep the default.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DurationOverrides {
    #[serde(deserialize_with = "lenient")]
    pub idle: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub to_printer: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub printing: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub to_scanner: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub scanning: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub to_cube: Option<f64>,
    #[serde(deserialize_with = "lenient")]
    pub loop_pause: Option<f64>,
}

/// Optional asset locations. Absent entries keep their placeholder forever.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetUrls {
    #[serde(deserialize_with = "lenient")]
    pub printer: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub scanner: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub part: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub env: Option<String>,
}

impl AssetUrls {
    pub fn get(&self, kind: AssetKind) -> Option<&str> {
        let url = match kind {
            AssetKind::Printer => &self.printer,
            AssetKind::Scanner => &self.scanner,
            AssetKind::Part => &self.part,
            AssetKind::Environment => &self.env,
        };
        url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Present URLs in load order.
    pub fn entries(&self) -> impl Iterator<Item = (AssetKind, &str)> + '_ {
        AssetKind::ALL
            .iter()
            .filter_map(move |kind| self.get(*kind).map(|url| (*kind, url)))
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Number(u32),
    Css(String),
}

impl ColorValue {
    fn resolve(&self) -> Result<Rgb> {
        match self {
            ColorValue::Number(hex) => Ok(Rgb::from_hex(*hex)),
            ColorValue::Css(s) => Rgb::parse_css(s),
        }
    }
}

/// Options as passed from JavaScript (`initHero(canvas, options)`).
///
/// Each field is read on its own: a value of the wrong shape is logged and
/// dropped without affecting its neighbours.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HeroOptions {
    #[serde(deserialize_with = "lenient")]
    pub background: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub color_primary: Option<ColorValue>,
    #[serde(deserialize_with = "lenient")]
    pub cube_size: Option<f32>,
    #[serde(deserialize_with = "lenient")]
    pub durations: Option<DurationOverrides>,
    #[serde(deserialize_with = "lenient")]
    pub urls: Option<AssetUrls>,
    #[serde(deserialize_with = "lenient")]
    pub reduced_motion: Option<bool>,
    #[serde(deserialize_with = "lenient")]
    pub skip_on_click: Option<bool>,
}

impl HeroOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let trimmed = json.trim();
        if trimmed.is_empty() || trimmed == "null" || trimmed == "undefined" {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(trimmed)?)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Background {
    Color(Rgb),
    Transparent,
}

impl Background {
    pub fn is_transparent(&self) -> bool {
        matches!(self, Background::Transparent)
    }

    /// Clear color with alpha.
    pub fn clear_rgba(&self) -> [f32; 4] {
        match self {
            Background::Color(c) => [c.0.x, c.0.y, c.0.z, 1.0],
            Background::Transparent => [0.0, 0.0, 0.0, 0.0],
        }
    }
}

/// Immutable configuration of one hero instance.
#[derive(Clone, Debug)]
pub struct AnimationConfig {
    pub background: Background,
    pub accent: Rgb,
    pub cube_size: f32,
    pub durations: PhaseDurations,
    pub urls: AssetUrls,
    pub reduced_motion: Option<bool>,
    pub skip_on_click: bool,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self::from_options(HeroOptions::default())
    }
}

impl AnimationConfig {
    /// Merge options over the defaults, clamping and validating as needed.
    /// Invalid colors are logged and replaced by the default.
    pub fn from_options(options: HeroOptions) -> Self {
        let background = match options.background.as_deref().map(str::trim) {
            Some("transparent") => Background::Transparent,
            Some(css) => Background::Color(Rgb::parse_css(css).unwrap_or_else(|e| {
                log::warn!("[hero] {e}; using default background");
                default_background()
            })),
            None => Background::Color(default_background()),
        };
        let accent = options
            .color_primary
            .map(|c| {
                c.resolve().unwrap_or_else(|e| {
                    log::warn!("[hero] {e}; using default accent");
                    Rgb::from_hex(DEFAULT_ACCENT)
                })
            })
            .unwrap_or_else(|| Rgb::from_hex(DEFAULT_ACCENT));
        Self {
            background,
            accent,
            cube_size: clamp_cube_size(options.cube_size),
            durations: options
                .durations
                .as_ref()
                .map(PhaseDurations::with_overrides)
                .unwrap_or_default(),
            urls: options.urls.unwrap_or_default(),
            reduced_motion: options.reduced_motion,
            skip_on_click: options.skip_on_click.unwrap_or(true),
        }
    }

    pub fn from_json(json: &str) -> Self {
        match HeroOptions::from_json(json) {
            Ok(options) => Self::from_options(options),
            Err(e) => {
                log::warn!("[hero] {e}; falling back to default options");
                Self::default()
            }
        }
    }

    /// Effective reduced-motion flag given the host preference.
    pub fn prefers_reduced_motion(&self, host_preference: bool) -> bool {
        self.reduced_motion.unwrap_or(host_preference)
    }
}

fn default_background() -> Rgb {
    Rgb::parse_css(DEFAULT_BACKGROUND).unwrap_or(Rgb::BLACK)
}

fn clamp_cube_size(size: Option<f32>) -> f32 {
    match size {
        Some(s) if s.is_finite() => s.clamp(CUBE_SIZE_MIN, CUBE_SIZE_MAX),
        _ => DEFAULT_CUBE_SIZE,
    }
}

/// Read an optional value, treating `null` as absent and a value of the wrong
/// shape as absent too.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            log::warn!("[hero] ignoring malformed option: {e}");
            Ok(None)
        }
    }
}
