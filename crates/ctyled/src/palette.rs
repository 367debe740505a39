//! Perceptual palette generation from gradient descriptors.
//!
//! A palette samples two stop sequences at fractions derived from luminance,
//! contrast, and inversion:
//!
//! - **foreground**: the primary stops at the primary fraction
//! - **background**: the secondary stops at the secondary fraction
//! - **accent**: the primary stops pushed past the secondary fraction by the
//!   fifth power of the gap between the two fractions
//!
//! Inversion negates the luminance and mirrors both fractions around the
//! middle of the gradient. It does not swap which color is called
//! foreground and which background.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ctyled::{ColorDescriptor, LinearRgb, generate};
//!
//! let descriptor = ColorDescriptor::new(["black", "white"]);
//! let palette = generate(&descriptor, Arc::new(LinearRgb)).unwrap();
//! assert_eq!(palette.foreground().to_hex(), "#404040");
//! assert_eq!(palette.background().to_hex(), "#bfbfbf");
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::color::ColorDescriptor;
use crate::error::ConfigError;
use crate::math::{ColorMath, Rgb};

/// Lower bound for a tentative accent fraction before it flips direction.
const ACCENT_LOWER: f64 = -0.2;
/// Upper bound for a tentative accent fraction before it flips direction.
const ACCENT_UPPER: f64 = 1.2;

/// A stop as written in a descriptor: a bare color or a positioned color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopInput {
    /// A color whose position is inferred from its neighbors.
    Color(String),
    /// A color pinned at an explicit position.
    At { color: String, pos: f64 },
}

impl StopInput {
    /// Create a positioned stop.
    pub fn at(color: impl Into<String>, pos: f64) -> Self {
        StopInput::At {
            color: color.into(),
            pos,
        }
    }

    /// Returns the color string.
    pub fn color(&self) -> &str {
        match self {
            StopInput::Color(color) | StopInput::At { color, .. } => color,
        }
    }

    /// Returns the explicit position, if any.
    pub fn position(&self) -> Option<f64> {
        match self {
            StopInput::Color(_) => None,
            StopInput::At { pos, .. } => Some(*pos),
        }
    }
}

impl Eq for StopInput {}

impl Hash for StopInput {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.color().hash(state);
        self.position().map(|p| (p + 0.0).to_bits()).hash(state);
    }
}

impl From<&str> for StopInput {
    fn from(s: &str) -> Self {
        StopInput::Color(s.to_string())
    }
}

impl From<String> for StopInput {
    fn from(s: String) -> Self {
        StopInput::Color(s)
    }
}

impl<S: Into<String>> From<(S, f64)> for StopInput {
    fn from((color, pos): (S, f64)) -> Self {
        StopInput::at(color, pos)
    }
}

/// A parsed stop with its resolved position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stop {
    pub color: Rgb,
    pub position: f64,
}

/// Infer a position for every stop.
///
/// Explicit stops are anchors. An implicit stop at index `i` is placed on
/// the line between the previous anchor and the next anchor, measured in
/// index distance. Missing anchors default to `(0, 0)` before the sequence
/// and `(len - 1, 1)` after it.
#[allow(clippy::cast_precision_loss)]
pub fn infer_positions(stops: &[StopInput]) -> Vec<f64> {
    let len = stops.len();
    let mut positions = Vec::with_capacity(len);
    let mut low_pos = 0.0;
    let mut low_index = 0usize;

    for (i, stop) in stops.iter().enumerate() {
        if let Some(pos) = stop.position() {
            low_pos = pos;
            low_index = i;
            positions.push(pos);
            continue;
        }

        let (high_index, high_pos) = stops[i + 1..]
            .iter()
            .enumerate()
            .find_map(|(offset, next)| next.position().map(|pos| (i + 1 + offset, pos)))
            .unwrap_or((len - 1, 1.0));

        let span = high_index - low_index;
        let pos = if span == 0 {
            low_pos
        } else {
            let slope = (high_pos - low_pos) / span as f64;
            low_pos + slope * (i - low_index) as f64
        };
        positions.push(pos);
    }

    positions
}

/// Validate explicit positions, infer the rest, and parse every color.
///
/// # Errors
/// Returns `ConfigError` for an empty sequence, a non-finite or
/// out-of-range explicit position, explicit positions that decrease, or a
/// color the collaborator cannot parse.
pub fn resolve_stops(
    stops: &[StopInput],
    math: &dyn ColorMath,
) -> Result<Arc<[Stop]>, ConfigError> {
    if stops.is_empty() {
        return Err(ConfigError::EmptyStops);
    }

    let mut previous: Option<f64> = None;
    for pos in stops.iter().filter_map(StopInput::position) {
        if !pos.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "stop position",
                value: pos,
            });
        }
        if !(0.0..=1.0).contains(&pos) {
            return Err(ConfigError::StopOutOfRange(pos));
        }
        if let Some(prev) = previous {
            if pos < prev {
                return Err(ConfigError::NonMonotonicStops {
                    previous: prev,
                    next: pos,
                });
            }
        }
        previous = Some(pos);
    }

    stops
        .iter()
        .zip(infer_positions(stops))
        .map(|(stop, position)| {
            let color = math
                .parse(stop.color())
                .ok_or_else(|| ConfigError::InvalidColor(stop.color().to_string()))?;
            Ok(Stop { color, position })
        })
        .collect()
}

/// Sample a resolved stop sequence at `value`, clipped to `[0, 1]`.
///
/// The bracketing pair is the first stop at or below `value` whose
/// successor lies above it. Past the last position the last stop wins;
/// before the first position the first stop wins.
pub fn interpolate_color(stops: &[Stop], value: f64, math: &dyn ColorMath) -> Rgb {
    let value = if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    };

    let Some(first) = stops.first() else {
        return Rgb::new(0, 0, 0);
    };
    if value < first.position {
        return first.color;
    }

    let index = stops
        .iter()
        .enumerate()
        .position(|(i, stop)| {
            stop.position <= value && stops.get(i + 1).is_none_or(|next| next.position > value)
        })
        .unwrap_or(stops.len() - 1);

    let low = stops[index];
    let Some(high) = stops.get(index + 1) else {
        return low.color;
    };

    let ratio = (value - low.position) / (high.position - low.position);
    math.mix(low.color, high.color, ratio * 100.0)
}

/// Map luminance, contrast, and inversion to `(primary, secondary)` sample
/// fractions, both clipped to `[0, 1]`.
///
/// The two fractions are `contrast` apart before clipping. Inversion
/// negates the luminance and mirrors both fractions around `0.5`, so
/// `sample_fractions(l, c, true)` is the mirror of
/// `sample_fractions(-l, c, false)`.
pub fn sample_fractions(luminance: f64, contrast: f64, inverted: bool) -> (f64, f64) {
    let inv = if inverted { -1.0 } else { 1.0 };
    let range = contrast * 2.0;
    let norm_lum = (luminance * inv + 1.0) / 2.0;
    let base = (2.0 - range) * norm_lum;
    let primary_lum = (base - 1.0) * inv;
    let secondary_lum = (base - 1.0 + range) * inv;
    (
        ((primary_lum + 1.0) / 2.0).clamp(0.0, 1.0),
        ((secondary_lum + 1.0) / 2.0).clamp(0.0, 1.0),
    )
}

/// Fraction at which the accent samples the primary stops.
///
/// The overshoot is `diff^5` with `diff = secondary - primary`. It is added
/// to the secondary fraction unless `diff` is positive or the sum leaves
/// `[-0.2, 1.2]`, in which case it is subtracted. The result is clipped.
pub fn accent_fraction(primary_frac: f64, secondary_frac: f64) -> f64 {
    let diff = secondary_frac - primary_frac;
    let overshoot = diff.powi(5);
    let tentative = secondary_frac + overshoot;
    let frac = if diff > 0.0 || !(ACCENT_LOWER..=ACCENT_UPPER).contains(&tentative) {
        secondary_frac - overshoot
    } else {
        tentative
    };
    frac.clamp(0.0, 1.0)
}

/// Concrete colors derived from a descriptor.
#[derive(Clone)]
pub struct ColorPalette {
    foreground: Rgb,
    background: Rgb,
    accent: Rgb,
    primary: Arc<[Stop]>,
    secondary: Arc<[Stop]>,
    primary_frac: f64,
    diff: f64,
    math: Arc<dyn ColorMath>,
}

impl ColorPalette {
    /// Build a palette from already-resolved stops.
    pub fn from_stops(
        primary: Arc<[Stop]>,
        secondary: Arc<[Stop]>,
        luminance: f64,
        contrast: f64,
        inverted: bool,
        math: Arc<dyn ColorMath>,
    ) -> Self {
        let (primary_frac, secondary_frac) = sample_fractions(luminance, contrast, inverted);
        let foreground = interpolate_color(&primary, primary_frac, math.as_ref());
        let background = interpolate_color(&secondary, secondary_frac, math.as_ref());
        let accent = interpolate_color(
            &primary,
            accent_fraction(primary_frac, secondary_frac),
            math.as_ref(),
        );

        Self {
            foreground,
            background,
            accent,
            primary,
            secondary,
            primary_frac,
            diff: secondary_frac - primary_frac,
            math,
        }
    }

    pub fn foreground(&self) -> Rgb {
        self.foreground
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn accent(&self) -> Rgb {
        self.accent
    }

    /// The resolved primary stops.
    pub fn primary_stops(&self) -> &[Stop] {
        &self.primary
    }

    /// The resolved secondary stops.
    pub fn secondary_stops(&self) -> &[Stop] {
        &self.secondary
    }

    /// The collaborator used for mixing.
    pub fn math(&self) -> &Arc<dyn ColorMath> {
        &self.math
    }

    pub(crate) fn shared_stops(&self) -> (Arc<[Stop]>, Arc<[Stop]>) {
        (Arc::clone(&self.primary), Arc::clone(&self.secondary))
    }

    /// Returns `(primary_frac, secondary_frac)`.
    pub fn fractions(&self) -> (f64, f64) {
        (self.primary_frac, self.primary_frac + self.diff)
    }

    /// Sample the gradient continuously. `value = 1` lands on the
    /// foreground fraction, `value = 0` on the background fraction.
    pub fn interpolate(&self, value: f64, use_secondary: bool) -> Rgb {
        let stops = if use_secondary {
            &self.secondary
        } else {
            &self.primary
        };
        interpolate_color(
            stops,
            self.primary_frac + (1.0 - value) * self.diff,
            self.math.as_ref(),
        )
    }
}

impl fmt::Debug for ColorPalette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorPalette")
            .field("foreground", &self.foreground)
            .field("background", &self.background)
            .field("accent", &self.accent)
            .field("primary_frac", &self.primary_frac)
            .field("diff", &self.diff)
            .finish_non_exhaustive()
    }
}

/// Generate the palette for a descriptor.
///
/// # Errors
/// Returns `ConfigError` if either stop sequence is malformed or a scalar is
/// not finite.
pub fn generate(
    descriptor: &ColorDescriptor,
    math: Arc<dyn ColorMath>,
) -> Result<ColorPalette, ConfigError> {
    descriptor.check_finite()?;
    let primary = resolve_stops(&descriptor.primary, math.as_ref())?;
    let secondary = match &descriptor.secondary {
        Some(stops) => resolve_stops(stops, math.as_ref())?,
        None => Arc::clone(&primary),
    };
    Ok(ColorPalette::from_stops(
        primary,
        secondary,
        descriptor.luminance.clamp(-1.0, 1.0),
        descriptor.contrast.clamp(0.0, 1.0),
        descriptor.inverted,
        math,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::LinearRgb;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn stops(inputs: &[StopInput]) -> Arc<[Stop]> {
        resolve_stops(inputs, &LinearRgb).unwrap()
    }

    #[test]
    fn test_infer_positions_evenly_spaced() {
        let inputs: Vec<StopInput> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(infer_positions(&inputs), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_infer_positions_around_anchor() {
        let inputs = vec![
            StopInput::from("red"),
            StopInput::at("blue", 0.8),
            StopInput::from("green"),
        ];
        let positions = infer_positions(&inputs);
        assert!(approx(positions[0], 0.0));
        assert!(approx(positions[1], 0.8));
        // No anchor follows green, so it runs to the implicit end at 1.
        assert!(approx(positions[2], 1.0));
    }

    #[test]
    fn test_infer_positions_between_anchors() {
        let inputs = vec![
            StopInput::at("black", 0.2),
            StopInput::from("gray"),
            StopInput::from("silver"),
            StopInput::at("white", 0.8),
        ];
        let positions = infer_positions(&inputs);
        assert!(approx(positions[1], 0.4));
        assert!(approx(positions[2], 0.6));
    }

    #[test]
    fn test_infer_positions_single_stop() {
        assert_eq!(infer_positions(&["red".into()]), vec![0.0]);
    }

    #[test]
    fn test_resolve_stops_rejects_bad_input() {
        assert_eq!(
            resolve_stops(&[], &LinearRgb).unwrap_err(),
            ConfigError::EmptyStops
        );
        assert_eq!(
            resolve_stops(&[StopInput::at("red", 0.6), StopInput::at("blue", 0.3)], &LinearRgb)
                .unwrap_err(),
            ConfigError::NonMonotonicStops {
                previous: 0.6,
                next: 0.3
            }
        );
        assert_eq!(
            resolve_stops(&[StopInput::at("red", 1.5)], &LinearRgb).unwrap_err(),
            ConfigError::StopOutOfRange(1.5)
        );
        assert_eq!(
            resolve_stops(&["chartreuse-ish".into()], &LinearRgb).unwrap_err(),
            ConfigError::InvalidColor("chartreuse-ish".into())
        );
    }

    #[test]
    fn test_interpolate_color_midpoint_and_clip() {
        let s = stops(&["black".into(), "white".into()]);
        assert_eq!(interpolate_color(&s, 0.5, &LinearRgb), Rgb::new(128, 128, 128));
        assert_eq!(interpolate_color(&s, -3.0, &LinearRgb), Rgb::new(0, 0, 0));
        assert_eq!(interpolate_color(&s, 7.0, &LinearRgb), Rgb::new(255, 255, 255));
    }

    #[test]
    fn test_interpolate_color_is_idempotent() {
        let s = stops(&["red".into(), StopInput::at("blue", 0.8), "green".into()]);
        let a = interpolate_color(&s, 0.37, &LinearRgb);
        let b = interpolate_color(&s, 0.37, &LinearRgb);
        assert_eq!(a, b);
    }

    #[test]
    fn test_interpolate_color_past_anchor_lands_on_last() {
        let s = stops(&["red".into(), StopInput::at("blue", 0.8), "green".into()]);
        assert_eq!(interpolate_color(&s, 1.0, &LinearRgb), Rgb::new(0, 128, 0));
        assert_eq!(interpolate_color(&s, 0.8, &LinearRgb), Rgb::new(0, 0, 255));
    }

    #[test]
    fn test_interpolate_color_below_first_stop() {
        let s = stops(&[StopInput::at("red", 0.4), StopInput::at("blue", 1.0)]);
        assert_eq!(interpolate_color(&s, 0.1, &LinearRgb), Rgb::new(255, 0, 0));
    }

    #[test]
    fn test_sample_fractions_contrast_separation() {
        let (p, s) = sample_fractions(0.0, 0.5, false);
        assert!(approx(p, 0.25));
        assert!(approx(s, 0.75));

        let (p, s) = sample_fractions(0.0, 0.8, false);
        assert!(approx(s - p, 0.8));

        let (p, s) = sample_fractions(0.0, 0.0, false);
        assert!(approx(p, s));
    }

    #[test]
    fn test_sample_fractions_inversion_mirrors() {
        // Inversion negates the luminance and mirrors the result.
        let (p, s) = sample_fractions(-0.3, 0.4, false);
        let (ip, is) = sample_fractions(0.3, 0.4, true);
        assert!(approx(ip, 1.0 - p));
        assert!(approx(is, 1.0 - s));

        // At zero luminance that is a plain mirror, so fg and bg trade places.
        let (p, s) = sample_fractions(0.0, 0.4, false);
        let (ip, is) = sample_fractions(0.0, 0.4, true);
        assert!(approx(ip, s));
        assert!(approx(is, p));
    }

    #[test]
    fn test_accent_fraction_positive_diff_subtracts() {
        let frac = accent_fraction(0.3, 0.9);
        assert!(approx(frac, 0.9 - 0.6_f64.powi(5)));
    }

    #[test]
    fn test_accent_fraction_negative_diff_adds() {
        // diff = -0.6, overshoot = -0.07776, tentative stays in range.
        let frac = accent_fraction(0.9, 0.3);
        assert!(approx(frac, 0.3 + (-0.6_f64).powi(5)));
    }

    #[test]
    fn test_accent_fraction_flips_when_out_of_range() {
        // diff = -1, tentative = 0 - 1 = -1 (outside [-0.2, 1.2]).
        let frac = accent_fraction(1.0, 0.0);
        assert!(approx(frac, 1.0));
    }

    #[test]
    fn test_generate_default_descriptor() {
        let palette = generate(&ColorDescriptor::default(), Arc::new(LinearRgb)).unwrap();
        assert_eq!(palette.foreground(), Rgb::new(64, 64, 64));
        assert_eq!(palette.background(), Rgb::new(191, 191, 191));
        // 0.75 - 0.5^5
        assert_eq!(palette.accent(), Rgb::new(183, 183, 183));
    }

    #[test]
    fn test_palette_interpolate_endpoints() {
        let palette = generate(&ColorDescriptor::default(), Arc::new(LinearRgb)).unwrap();
        assert_eq!(palette.interpolate(1.0, false), palette.foreground());
        assert_eq!(palette.interpolate(0.0, true), palette.background());
        assert_eq!(palette.interpolate(0.5, false), palette.interpolate(0.5, false));
    }
}
