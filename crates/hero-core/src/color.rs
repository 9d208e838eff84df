use crate::error::HeroError;
use glam::Vec3;

/// Linear RGB triple in the 0..1 range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb(pub Vec3);

impl Rgb {
    pub const BLACK: Rgb = Rgb(Vec3::ZERO);
    pub const WHITE: Rgb = Rgb(Vec3::ONE);

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self(Vec3::new(r, g, b))
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self::new(r, g, b)
    }

    /// Parse `#rgb` or `#rrggbb` (the leading `#` is optional).
    pub fn parse_css(s: &str) -> Result<Self, HeroError> {
        let digits = s.trim().trim_start_matches('#');
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(HeroError::InvalidColor(s.to_string())),
        };
        u32::from_str_radix(&expanded, 16)
            .map(Self::from_hex)
            .map_err(|_| HeroError::InvalidColor(s.to_string()))
    }

    pub fn to_hex(self) -> u32 {
        let c = self.0.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
        ((c.x.round() as u32) << 16) | ((c.y.round() as u32) << 8) | c.z.round() as u32
    }

    pub fn to_css(self) -> String {
        format!("#{:06x}", self.to_hex())
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb(self.0.lerp(other.0, t))
    }

    pub fn scale(self, s: f32) -> Rgb {
        Rgb(self.0 * s)
    }

    pub fn to_array(self) -> [f32; 3] {
        self.0.to_array()
    }

    /// Shift hue, saturation and lightness by the given offsets.
    pub fn offset_hsl(self, dh: f32, ds: f32, dl: f32) -> Rgb {
        let (h, s, l) = self.to_hsl();
        Rgb::from_hsl(
            (h + dh).rem_euclid(1.0),
            (s + ds).clamp(0.0, 1.0),
            (l + dl).clamp(0.0, 1.0),
        )
    }

    fn to_hsl(self) -> (f32, f32, f32) {
        let Vec3 { x: r, y: g, z: b } = self.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;
        if max == min {
            return (0.0, 0.0, l);
        }
        let d = max - min;
        let s = if l <= 0.5 { d / (max + min) } else { d / (2.0 - max - min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        (h / 6.0, s, l)
    }

    fn from_hsl(h: f32, s: f32, l: f32) -> Rgb {
        if s == 0.0 {
            return Rgb::new(l, l, l);
        }
        let hi = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let lo = 2.0 * l - hi;
        Rgb::new(
            hue_to_rgb(lo, hi, h + 1.0 / 3.0),
            hue_to_rgb(lo, hi, h),
            hue_to_rgb(lo, hi, h - 1.0 / 3.0),
        )
    }
}

fn hue_to_rgb(lo: f32, hi: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        lo + (hi - lo) * 6.0 * t
    } else if t < 0.5 {
        hi
    } else if t < 2.0 / 3.0 {
        lo + (hi - lo) * 6.0 * (2.0 / 3.0 - t)
    } else {
        lo
    }
}
