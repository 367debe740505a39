//! Color math collaborator.
//!
//! The palette generator never does color-space math itself. It parses stop
//! colors and mixes them through a [`ColorMath`] implementation, so an
//! embedder can swap in a perceptual mixer. [`LinearRgb`] is the default:
//! channel-wise linear mixing in sRGB, rounded to 8 bits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the color as a lowercase `#rrggbb` string.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Returns the channels as an array, in `r, g, b` order.
    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Injected color parsing and mixing.
pub trait ColorMath: fmt::Debug + Send + Sync {
    /// Parse a color string. Returns `None` if the input is not a color.
    fn parse(&self, input: &str) -> Option<Rgb>;

    /// Mix `a` toward `b`. `ratio_percent` of 0 yields `a`, 100 yields `b`.
    fn mix(&self, a: Rgb, b: Rgb, ratio_percent: f64) -> Rgb;
}

/// Channel-wise linear sRGB mixing with hex and CSS named-color parsing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinearRgb;

impl ColorMath for LinearRgb {
    fn parse(&self, input: &str) -> Option<Rgb> {
        let raw = input.trim();
        if let Some(hex) = raw.strip_prefix('#') {
            return parse_hex(hex);
        }
        let lower = raw.to_ascii_lowercase();
        named_color(&lower).or_else(|| parse_hex(&lower))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn mix(&self, a: Rgb, b: Rgb, ratio_percent: f64) -> Rgb {
        let p = if ratio_percent.is_finite() {
            (ratio_percent / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let channel = |x: u8, y: u8| {
            let x = f64::from(x);
            let y = f64::from(y);
            ((y - x) * p + x).round().clamp(0.0, 255.0) as u8
        };
        Rgb::new(channel(a.r, b.r), channel(a.g, b.g), channel(a.b, b.b))
    }
}

fn parse_hex(s: &str) -> Option<Rgb> {
    if !s.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match s.len() {
        6 => {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Rgb::new(r, g, b))
        }
        3 => {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Rgb::new(r, g, b))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Rgb> {
    let rgb = match name {
        "black" => Rgb::new(0, 0, 0),
        "white" => Rgb::new(255, 255, 255),
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "lime" => Rgb::new(0, 255, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "cyan" | "aqua" => Rgb::new(0, 255, 255),
        "magenta" | "fuchsia" => Rgb::new(255, 0, 255),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        "silver" => Rgb::new(192, 192, 192),
        "maroon" => Rgb::new(128, 0, 0),
        "olive" => Rgb::new(128, 128, 0),
        "teal" => Rgb::new(0, 128, 128),
        "navy" => Rgb::new(0, 0, 128),
        "purple" => Rgb::new(128, 0, 128),
        "orange" => Rgb::new(255, 165, 0),
        "pink" => Rgb::new(255, 192, 203),
        "brown" => Rgb::new(165, 42, 42),
        "indigo" => Rgb::new(75, 0, 130),
        "violet" => Rgb::new(238, 130, 238),
        "gold" => Rgb::new(255, 215, 0),
        "coral" => Rgb::new(255, 127, 80),
        "salmon" => Rgb::new(250, 128, 114),
        "tomato" => Rgb::new(255, 99, 71),
        "crimson" => Rgb::new(220, 20, 60),
        "turquoise" => Rgb::new(64, 224, 208),
        "steelblue" => Rgb::new(70, 130, 180),
        "slategray" | "slategrey" => Rgb::new(112, 128, 144),
        "whitesmoke" => Rgb::new(245, 245, 245),
        _ => return None,
    };
    Some(rgb)
}
