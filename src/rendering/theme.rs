//! Color palette for board and network rendering
//!
//! Colors are plain 8-bit sRGB triples serialized as `#rrggbb` in SVG
//! output. Board palettes follow the selectable [`BoardTheme`]s; UI accents
//! (selection, last move, activation extremes) live in [`UiColors`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex notation for SVG attributes (`#eeeed2`)
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation between two colors, `t` clamped to `[0, 1]`
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| -> u8 {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8
        };
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Board visual themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardTheme {
    #[default]
    Classic,
    Modern,
    Wood,
    Marble,
}

impl BoardTheme {
    pub fn name(&self) -> &'static str {
        match self {
            BoardTheme::Classic => "Classic",
            BoardTheme::Modern => "Modern",
            BoardTheme::Wood => "Wood",
            BoardTheme::Marble => "Marble",
        }
    }

    /// Returns (light_square_color, dark_square_color)
    pub fn colors(&self) -> (Rgb, Rgb) {
        match self {
            BoardTheme::Classic => (
                Rgb::new(238, 238, 210), // Cream
                Rgb::new(118, 150, 86),  // Green
            ),
            BoardTheme::Modern => (
                Rgb::new(230, 230, 230), // Light gray
                Rgb::new(77, 77, 77),    // Dark gray
            ),
            BoardTheme::Wood => (
                Rgb::new(217, 179, 140), // Light wood
                Rgb::new(140, 89, 51),   // Dark wood
            ),
            BoardTheme::Marble => (
                Rgb::new(242, 242, 242), // White marble
                Rgb::new(38, 38, 38),    // Black marble
            ),
        }
    }

    /// Label color that stays readable on the given square color
    pub fn label_color(&self, on_light: bool) -> Rgb {
        let (light, dark) = self.colors();
        if on_light {
            dark
        } else {
            light
        }
    }
}

/// Accent colors shared by the board and network views
pub struct UiColors;

impl UiColors {
    /// Selected square (gold)
    pub const SELECTED: Rgb = Rgb::new(218, 165, 32);

    /// Legal destination marker
    pub const HINT: Rgb = Rgb::new(70, 130, 220);

    /// Last move from/to squares (bronze)
    pub const LAST_MOVE: Rgb = Rgb::new(205, 127, 50);

    /// King in check
    pub const DANGER: Rgb = Rgb::new(220, 50, 50);

    pub const SUCCESS: Rgb = Rgb::new(40, 180, 40);

    pub const PIECE_WHITE: Rgb = Rgb::new(235, 235, 230);
    pub const PIECE_BLACK: Rgb = Rgb::new(45, 45, 50);

    /// Neuron fill before any snapshot arrived
    pub const NEURON_IDLE: Rgb = Rgb::new(204, 204, 204);

    /// Connection stroke before any snapshot arrived
    pub const CONNECTION_IDLE: Rgb = Rgb::new(221, 221, 221);

    /// Network labels and outlines
    pub const TEXT: Rgb = Rgb::new(60, 60, 65);
}
