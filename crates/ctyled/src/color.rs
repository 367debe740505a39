//! Color descriptors and derived colors.
//!
//! A [`ColorDescriptor`] is the serializable recipe: stop sequences plus
//! luminance, contrast, and inversion. A [`Color`] is a validated descriptor
//! together with its generated [`ColorPalette`]. Colors are immutable and
//! cheap to clone; every transform returns a new color.
//!
//! Transforms are free functions ([`nudge`], [`adjust_contrast`],
//! [`invert`], [`rebase`]) with method forms on [`Color`]. Memoizing them is
//! the job of a caller-owned [`ColorCache`](crate::ColorCache).
//!
//! # Example
//!
//! ```rust
//! use ctyled::{Color, ColorDescriptor};
//!
//! let base = Color::new(ColorDescriptor::new(["#1e1e2e", "#cdd6f4"])).unwrap();
//! let hover = base.nudge(0.1);
//! let border = base.invert().nudge(0.3);
//! assert_ne!(hover.foreground(), base.foreground());
//! assert!(border.descriptor().inverted);
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ThemeLoadError, ThemeSaveError};
use crate::math::{ColorMath, LinearRgb, Rgb};
use crate::palette::{ColorPalette, Stop, StopInput, resolve_stops};

fn default_primary() -> Vec<StopInput> {
    vec![StopInput::from("black"), StopInput::from("white")]
}

fn default_contrast() -> f64 {
    0.5
}

/// The recipe a [`Color`] is generated from.
///
/// When deserialized, `primary` is required and unknown keys are rejected,
/// so a misspelled table in a theme file fails to load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorDescriptor {
    /// Stops sampled for the foreground and accent.
    pub primary: Vec<StopInput>,
    /// Stops sampled for the background. `None` reuses `primary`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<Vec<StopInput>>,
    /// Position of the sampled pair along the gradient, in `[-1, 1]`.
    #[serde(default, alias = "lum")]
    pub luminance: f64,
    /// Separation between foreground and background, in `[0, 1]`.
    #[serde(default = "default_contrast")]
    pub contrast: f64,
    #[serde(default)]
    pub inverted: bool,
}

impl Default for ColorDescriptor {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: None,
            luminance: 0.0,
            contrast: default_contrast(),
            inverted: false,
        }
    }
}

impl ColorDescriptor {
    /// Creates a descriptor over a single stop sequence with default
    /// luminance and contrast.
    pub fn new<I, S>(primary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StopInput>,
    {
        Self {
            primary: primary.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets a separate secondary stop sequence.
    pub fn with_secondary<I, S>(mut self, secondary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<StopInput>,
    {
        self.secondary = Some(secondary.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_luminance(mut self, luminance: f64) -> Self {
        self.luminance = luminance;
        self
    }

    pub fn with_contrast(mut self, contrast: f64) -> Self {
        self.contrast = contrast;
        self
    }

    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// The secondary stops, falling back to the primary stops.
    pub fn secondary_stops(&self) -> &[StopInput] {
        self.secondary.as_deref().unwrap_or(&self.primary)
    }

    pub(crate) fn check_finite(&self) -> Result<(), ConfigError> {
        if !self.luminance.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "luminance",
                value: self.luminance,
            });
        }
        if !self.contrast.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "contrast",
                value: self.contrast,
            });
        }
        Ok(())
    }

    /// Clip luminance and contrast into their valid ranges.
    fn clamped(mut self) -> Self {
        self.luminance = self.luminance.clamp(-1.0, 1.0);
        self.contrast = self.contrast.clamp(0.0, 1.0);
        self
    }

    /// Load a descriptor from JSON text.
    ///
    /// # Errors
    /// Returns `ThemeLoadError` if parsing fails.
    pub fn from_json(json: &str) -> Result<Self, ThemeLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a descriptor from TOML text.
    ///
    /// # Errors
    /// Returns `ThemeLoadError` if parsing fails.
    pub fn from_toml(toml: &str) -> Result<Self, ThemeLoadError> {
        Ok(toml::from_str(toml)?)
    }

    /// Serialize this descriptor to JSON.
    ///
    /// # Errors
    /// Returns `ThemeSaveError` if serialization fails.
    pub fn to_json(&self) -> Result<String, ThemeSaveError> {
        serde_json::to_string_pretty(self).map_err(ThemeSaveError::Json)
    }

    /// Serialize this descriptor to TOML.
    ///
    /// # Errors
    /// Returns `ThemeSaveError` if serialization fails.
    pub fn to_toml(&self) -> Result<String, ThemeSaveError> {
        toml::to_string_pretty(self).map_err(ThemeSaveError::Toml)
    }
}

impl Eq for ColorDescriptor {}

impl Hash for ColorDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.primary.hash(state);
        self.secondary.hash(state);
        // `+ 0.0` folds -0.0 into 0.0 so equal descriptors hash alike.
        (self.luminance + 0.0).to_bits().hash(state);
        (self.contrast + 0.0).to_bits().hash(state);
        self.inverted.hash(state);
    }
}

struct ColorInner {
    descriptor: ColorDescriptor,
    palette: ColorPalette,
}

/// An immutable color: a validated descriptor plus its palette.
///
/// Equality compares descriptors. Use [`Color::ptr_eq`] to check whether two
/// handles share one derived instance.
#[derive(Clone)]
pub struct Color {
    inner: Arc<ColorInner>,
}

impl Color {
    /// Validate a descriptor and generate its palette with [`LinearRgb`].
    ///
    /// Luminance and contrast are clipped into range.
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed stops or non-finite scalars.
    pub fn new(descriptor: ColorDescriptor) -> Result<Self, ConfigError> {
        Self::with_math(descriptor, Arc::new(LinearRgb))
    }

    /// Like [`Color::new`], with an injected color math collaborator.
    ///
    /// # Errors
    /// Returns `ConfigError` for malformed stops or non-finite scalars.
    pub fn with_math(
        descriptor: ColorDescriptor,
        math: Arc<dyn ColorMath>,
    ) -> Result<Self, ConfigError> {
        descriptor.check_finite()?;
        let primary = resolve_stops(&descriptor.primary, math.as_ref())?;
        let secondary = match &descriptor.secondary {
            Some(stops) => resolve_stops(stops, math.as_ref())?,
            None => Arc::clone(&primary),
        };
        Ok(Self::from_resolved(descriptor, primary, secondary, math))
    }

    fn from_resolved(
        descriptor: ColorDescriptor,
        primary: Arc<[Stop]>,
        secondary: Arc<[Stop]>,
        math: Arc<dyn ColorMath>,
    ) -> Self {
        let descriptor = descriptor.clamped();
        let palette = ColorPalette::from_stops(
            primary,
            secondary,
            descriptor.luminance,
            descriptor.contrast,
            descriptor.inverted,
            math,
        );
        Self {
            inner: Arc::new(ColorInner {
                descriptor,
                palette,
            }),
        }
    }

    /// Derive a color that keeps this color's stops.
    fn derive(&self, descriptor: ColorDescriptor) -> Self {
        let palette = &self.inner.palette;
        let (primary, secondary) = palette.shared_stops();
        Self::from_resolved(descriptor, primary, secondary, Arc::clone(palette.math()))
    }

    pub fn descriptor(&self) -> &ColorDescriptor {
        &self.inner.descriptor
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.inner.palette
    }

    pub fn foreground(&self) -> Rgb {
        self.inner.palette.foreground()
    }

    pub fn background(&self) -> Rgb {
        self.inner.palette.background()
    }

    pub fn accent(&self) -> Rgb {
        self.inner.palette.accent()
    }

    /// Short alias for [`Color::foreground`], for use inside templates.
    pub fn fg(&self) -> Rgb {
        self.foreground()
    }

    /// Short alias for [`Color::background`], for use inside templates.
    pub fn bg(&self) -> Rgb {
        self.background()
    }

    /// Sample the gradient continuously. See [`ColorPalette::interpolate`].
    pub fn interpolate(&self, value: f64, use_secondary: bool) -> Rgb {
        self.inner.palette.interpolate(value, use_secondary)
    }

    /// Returns true if both handles point at the same derived instance.
    pub fn ptr_eq(a: &Color, b: &Color) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    pub fn nudge(&self, delta: f64) -> Color {
        nudge(self, delta)
    }

    pub fn adjust_contrast(&self, delta: f64) -> Color {
        adjust_contrast(self, delta)
    }

    pub fn invert(&self) -> Color {
        invert(self)
    }

    /// Replace the stop sequences.
    ///
    /// # Errors
    /// Returns `ConfigError` if the new stops are malformed.
    pub fn rebase(
        &self,
        primary: Vec<StopInput>,
        secondary: Option<Vec<StopInput>>,
    ) -> Result<Color, ConfigError> {
        rebase(self, primary, secondary)
    }

    pub fn with_luminance(&self, luminance: f64) -> Color {
        with_luminance(self, luminance)
    }

    pub fn with_contrast(&self, contrast: f64) -> Color {
        with_contrast(self, contrast)
    }
}

impl Default for Color {
    fn default() -> Self {
        let math: Arc<dyn ColorMath> = Arc::new(LinearRgb);
        let descriptor = ColorDescriptor::default();
        let stops: Arc<[Stop]> = Arc::from(
            [
                Stop {
                    color: Rgb::new(0, 0, 0),
                    position: 0.0,
                },
                Stop {
                    color: Rgb::new(255, 255, 255),
                    position: 1.0,
                },
            ]
            .as_slice(),
        );
        Self::from_resolved(descriptor, Arc::clone(&stops), stops, math)
    }
}

impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        Color::ptr_eq(self, other) || self.descriptor() == other.descriptor()
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Color")
            .field("descriptor", self.descriptor())
            .field("foreground", &self.foreground())
            .field("background", &self.background())
            .finish()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.foreground(), self.background())
    }
}

/// Shift luminance by `delta`, scaled by `1 + 3 * contrast`.
///
/// The direction flips when the color is inverted. If the shifted luminance
/// would leave `[-1, 1]` the shift is applied in the opposite direction
/// instead; the result is then clipped into range.
pub fn nudge(color: &Color, delta: f64) -> Color {
    let d = color.descriptor();
    let direction = if d.inverted { -1.0 } else { 1.0 };
    let scaled = delta * (1.0 + d.contrast * 3.0) * direction;
    let mut luminance = d.luminance + scaled;
    if !(-1.0..=1.0).contains(&luminance) {
        luminance = d.luminance - scaled;
    }
    color.derive(d.clone().with_luminance(luminance))
}

/// Add `delta` to the contrast, clipped to `[0, 1]`.
pub fn adjust_contrast(color: &Color, delta: f64) -> Color {
    let d = color.descriptor();
    let contrast = (d.contrast + delta).clamp(0.0, 1.0);
    color.derive(d.clone().with_contrast(contrast))
}

/// Flip the inversion flag.
pub fn invert(color: &Color) -> Color {
    let d = color.descriptor();
    color.derive(d.clone().with_inverted(!d.inverted))
}

/// Replace the stop sequences, keeping luminance, contrast, and inversion.
///
/// # Errors
/// Returns `ConfigError` if the new stops are malformed.
pub fn rebase(
    color: &Color,
    primary: Vec<StopInput>,
    secondary: Option<Vec<StopInput>>,
) -> Result<Color, ConfigError> {
    let descriptor = ColorDescriptor {
        primary,
        secondary,
        ..color.descriptor().clone()
    };
    Color::with_math(descriptor, Arc::clone(color.palette().math()))
}

/// Set an absolute luminance, clipped to `[-1, 1]`.
pub fn with_luminance(color: &Color, luminance: f64) -> Color {
    let luminance = if luminance.is_finite() { luminance } else { 0.0 };
    color.derive(color.descriptor().clone().with_luminance(luminance))
}

/// Set an absolute contrast, clipped to `[0, 1]`.
pub fn with_contrast(color: &Color, contrast: f64) -> Color {
    let contrast = if contrast.is_finite() {
        contrast
    } else {
        default_contrast()
    };
    color.derive(color.descriptor().clone().with_contrast(contrast))
}
