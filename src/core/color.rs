//! RGBA colors
//!
//! Every color is fully specified; there is no "default" sentinel at this
//! level. Surfaces carry their own default foreground/background instead.

use serde::{Deserialize, Serialize};

/// A 32-bit RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Color::TRANSPARENT
    }
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 128, 0);
    pub const LIME: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const CYAN: Color = Color::rgb(0, 255, 255);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);
    pub const GRAY: Color = Color::rgb(128, 128, 128);
    pub const DARK_GRAY: Color = Color::rgb(169, 169, 169);
    pub const LIGHT_GRAY: Color = Color::rgb(211, 211, 211);
    pub const ORANGE: Color = Color::rgb(255, 165, 0);
    pub const PURPLE: Color = Color::rgb(128, 0, 128);
    pub const BROWN: Color = Color::rgb(165, 42, 42);
    pub const PINK: Color = Color::rgb(255, 192, 203);
    pub const NAVY: Color = Color::rgb(0, 0, 128);
    pub const TEAL: Color = Color::rgb(0, 128, 128);
    pub const MAROON: Color = Color::rgb(128, 0, 0);
    pub const OLIVE: Color = Color::rgb(128, 128, 0);
    pub const SILVER: Color = Color::rgb(192, 192, 192);
    pub const GOLD: Color = Color::rgb(255, 215, 0);
    pub const DARK_RED: Color = Color::rgb(139, 0, 0);
    pub const DARK_GREEN: Color = Color::rgb(0, 100, 0);
    pub const DARK_BLUE: Color = Color::rgb(0, 0, 139);
    pub const DARK_CYAN: Color = Color::rgb(0, 139, 139);
    pub const DARK_MAGENTA: Color = Color::rgb(139, 0, 139);
    pub const DARK_ORANGE: Color = Color::rgb(255, 140, 0);
    pub const ANSI_WHITE: Color = Color::rgb(229, 229, 229);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Components as an array in r, g, b, a order
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_array([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }

    /// Look up a color by its (case-insensitive) name
    pub fn from_name(name: &str) -> Option<Color> {
        let lowered = name.trim().to_ascii_lowercase();
        NAMED_COLORS
            .iter()
            .find(|(n, _)| *n == lowered)
            .map(|(_, c)| *c)
    }

    /// Linear interpolation between two colors, `amount` clamped to 0..=1
    pub fn lerp(self, other: Color, amount: f32) -> Color {
        let t = amount.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Names understood by [`Color::from_name`] and the markup parser
const NAMED_COLORS: &[(&str, Color)] = &[
    ("transparent", Color::TRANSPARENT),
    ("black", Color::BLACK),
    ("white", Color::WHITE),
    ("red", Color::RED),
    ("green", Color::GREEN),
    ("lime", Color::LIME),
    ("blue", Color::BLUE),
    ("yellow", Color::YELLOW),
    ("cyan", Color::CYAN),
    ("aqua", Color::CYAN),
    ("magenta", Color::MAGENTA),
    ("fuchsia", Color::MAGENTA),
    ("gray", Color::GRAY),
    ("grey", Color::GRAY),
    ("darkgray", Color::DARK_GRAY),
    ("lightgray", Color::LIGHT_GRAY),
    ("orange", Color::ORANGE),
    ("purple", Color::PURPLE),
    ("brown", Color::BROWN),
    ("pink", Color::PINK),
    ("navy", Color::NAVY),
    ("teal", Color::TEAL),
    ("maroon", Color::MAROON),
    ("olive", Color::OLIVE),
    ("silver", Color::SILVER),
    ("gold", Color::GOLD),
    ("darkred", Color::DARK_RED),
    ("darkgreen", Color::DARK_GREEN),
    ("darkblue", Color::DARK_BLUE),
    ("darkcyan", Color::DARK_CYAN),
    ("darkmagenta", Color::DARK_MAGENTA),
    ("darkorange", Color::DARK_ORANGE),
    ("ansiwhite", Color::ANSI_WHITE),
];

/// Evenly spaced color stops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorGradient {
    stops: Vec<Color>,
}

impl ColorGradient {
    pub fn new(stops: Vec<Color>) -> Self {
        Self { stops }
    }

    pub fn stops(&self) -> &[Color] {
        &self.stops
    }

    /// Color at position `t` (0..=1) along the ramp
    pub fn lerp(&self, t: f32) -> Color {
        match self.stops.len() {
            0 => Color::default(),
            1 => self.stops[0],
            n => {
                let t = t.clamp(0.0, 1.0);
                let segments = (n - 1) as f32;
                let scaled = t * segments;
                let index = (scaled.floor() as usize).min(n - 2);
                self.stops[index].lerp(self.stops[index + 1], scaled - index as f32)
            },
        }
    }

    /// Sample `index` of `count` evenly spaced samples, the first and last
    /// on the end stops
    pub fn sample_at(&self, index: usize, count: usize) -> Color {
        if count < 2 {
            return self.lerp(0.0);
        }
        self.lerp((index as f64 / (count - 1) as f64) as f32)
    }
}
