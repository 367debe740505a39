//! Caller-owned memoization for colors and color transforms.
//!
//! [`Color`] values are immutable and every transform builds a new one.
//! Hot paths (hover states, nested nudges) repeat the same transforms, so
//! a [`ColorCache`] keys them by `(source descriptor, op, args)` and hands
//! back the same `Arc`-backed instance on a hit.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tracing::trace;

use crate::color::{self, Color, ColorDescriptor};
use crate::error::ConfigError;
use crate::math::{ColorMath, LinearRgb};
use crate::palette::StopInput;

/// Default number of entries kept per table.
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TransformOp {
    Nudge(u64),
    AdjustContrast(u64),
    Invert,
    WithLuminance(u64),
    WithContrast(u64),
    Rebase {
        primary: Vec<StopInput>,
        secondary: Option<Vec<StopInput>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TransformKey {
    source: ColorDescriptor,
    math: usize,
    op: TransformOp,
}

impl TransformKey {
    fn new(color: &Color, op: TransformOp) -> Self {
        Self {
            source: color.descriptor().clone(),
            math: Arc::as_ptr(color.palette().math()).cast::<()>() as usize,
            op,
        }
    }
}

/// Hit and miss counters for a [`ColorCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// LRU cache of constructed colors and transform results.
///
/// # Example
///
/// ```rust
/// use ctyled::{Color, ColorCache, ColorDescriptor};
///
/// let mut cache = ColorCache::default();
/// let base = cache.color(ColorDescriptor::default()).unwrap();
/// let a = cache.nudge(&base, 0.2);
/// let b = cache.nudge(&base, 0.2);
/// assert!(Color::ptr_eq(&a, &b));
/// ```
#[derive(Debug)]
pub struct ColorCache {
    colors: LruCache<ColorDescriptor, Color>,
    transforms: LruCache<TransformKey, Color>,
    math: Arc<dyn ColorMath>,
    stats: CacheStats,
}

impl Default for ColorCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ColorCache {
    /// Create a cache holding up to `capacity` colors and `capacity`
    /// transform results. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        Self::with_math(capacity, Arc::new(LinearRgb))
    }

    /// Like [`ColorCache::new`], constructing colors with `math`.
    pub fn with_math(capacity: usize, math: Arc<dyn ColorMath>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            colors: LruCache::new(capacity),
            transforms: LruCache::new(capacity),
            math,
            stats: CacheStats::default(),
        }
    }

    /// Returns the cached color for `descriptor`, constructing it on a miss.
    ///
    /// # Errors
    /// Returns `ConfigError` if the descriptor is malformed. Failures are
    /// not cached.
    pub fn color(&mut self, descriptor: ColorDescriptor) -> Result<Color, ConfigError> {
        if let Some(color) = self.colors.get(&descriptor) {
            self.stats.hits += 1;
            trace!(cache.table = "colors", cache.hit = true, "Color cache lookup");
            return Ok(color.clone());
        }
        self.stats.misses += 1;
        trace!(cache.table = "colors", cache.hit = false, "Color cache lookup");
        let color = Color::with_math(descriptor.clone(), Arc::clone(&self.math))?;
        self.colors.put(descriptor, color.clone());
        Ok(color)
    }

    pub fn nudge(&mut self, color: &Color, delta: f64) -> Color {
        self.transform(color, TransformOp::Nudge(delta.to_bits()), |c| {
            color::nudge(c, delta)
        })
    }

    pub fn adjust_contrast(&mut self, color: &Color, delta: f64) -> Color {
        self.transform(color, TransformOp::AdjustContrast(delta.to_bits()), |c| {
            color::adjust_contrast(c, delta)
        })
    }

    pub fn invert(&mut self, color: &Color) -> Color {
        self.transform(color, TransformOp::Invert, color::invert)
    }

    pub fn with_luminance(&mut self, color: &Color, luminance: f64) -> Color {
        self.transform(color, TransformOp::WithLuminance(luminance.to_bits()), |c| {
            color::with_luminance(c, luminance)
        })
    }

    pub fn with_contrast(&mut self, color: &Color, contrast: f64) -> Color {
        self.transform(color, TransformOp::WithContrast(contrast.to_bits()), |c| {
            color::with_contrast(c, contrast)
        })
    }

    /// Cached [`color::rebase`].
    ///
    /// # Errors
    /// Returns `ConfigError` if the new stops are malformed.
    pub fn rebase(
        &mut self,
        color: &Color,
        primary: Vec<StopInput>,
        secondary: Option<Vec<StopInput>>,
    ) -> Result<Color, ConfigError> {
        let key = TransformKey::new(
            color,
            TransformOp::Rebase {
                primary: primary.clone(),
                secondary: secondary.clone(),
            },
        );
        if let Some(hit) = self.lookup(&key) {
            return Ok(hit);
        }
        let rebased = color::rebase(color, primary, secondary)?;
        self.transforms.put(key, rebased.clone());
        Ok(rebased)
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of cached entries across both tables.
    pub fn len(&self) -> usize {
        self.colors.len() + self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.colors.clear();
        self.transforms.clear();
    }

    fn transform(&mut self, color: &Color, op: TransformOp, f: impl FnOnce(&Color) -> Color) -> Color {
        let key = TransformKey::new(color, op);
        if let Some(hit) = self.lookup(&key) {
            return hit;
        }
        let out = f(color);
        self.transforms.put(key, out.clone());
        out
    }

    fn lookup(&mut self, key: &TransformKey) -> Option<Color> {
        let hit = self.transforms.get(key).cloned();
        if hit.is_some() {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        trace!(
            cache.table = "transforms",
            cache.op = ?key.op,
            cache.hit = hit.is_some(),
            "Color cache lookup"
        );
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hit_returns_same_instance() {
        let mut cache = ColorCache::new(8);
        let a = cache.color(ColorDescriptor::new(["navy", "white"])).unwrap();
        let b = cache.color(ColorDescriptor::new(["navy", "white"])).unwrap();
        assert!(Color::ptr_eq(&a, &b));
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_invalid_descriptor_not_cached() {
        let mut cache = ColorCache::new(8);
        assert!(cache.color(ColorDescriptor::new(["nope"])).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_transform_memoized_by_args() {
        let mut cache = ColorCache::new(8);
        let base = cache.color(ColorDescriptor::default()).unwrap();
        let a = cache.nudge(&base, 0.1);
        let b = cache.nudge(&base, 0.1);
        let c = cache.nudge(&base, 0.2);
        assert!(Color::ptr_eq(&a, &b));
        assert!(!Color::ptr_eq(&a, &c));
        assert_eq!(a, color::nudge(&base, 0.1));
    }

    #[test]
    fn test_transforms_match_free_functions() {
        let mut cache = ColorCache::default();
        let base = cache.color(ColorDescriptor::default()).unwrap();
        assert_eq!(cache.invert(&base), color::invert(&base));
        assert_eq!(cache.adjust_contrast(&base, 0.2), color::adjust_contrast(&base, 0.2));
        assert_eq!(cache.with_luminance(&base, -0.4), color::with_luminance(&base, -0.4));
        assert_eq!(cache.with_contrast(&base, 0.9), color::with_contrast(&base, 0.9));
    }

    #[test]
    fn test_rebase_cached_and_validated() {
        let mut cache = ColorCache::default();
        let base = cache.color(ColorDescriptor::default()).unwrap();
        let stops = vec![StopInput::from("red"), StopInput::from("blue")];
        let a = cache.rebase(&base, stops.clone(), None).unwrap();
        let b = cache.rebase(&base, stops, None).unwrap();
        assert!(Color::ptr_eq(&a, &b));
        assert!(cache.rebase(&base, vec![StopInput::from("bogus")], None).is_err());
    }

    #[test]
    fn test_lru_evicts_oldest() {
        let mut cache = ColorCache::new(1);
        let first = cache.color(ColorDescriptor::new(["red", "blue"])).unwrap();
        cache.color(ColorDescriptor::new(["green", "blue"])).unwrap();
        let again = cache.color(ColorDescriptor::new(["red", "blue"])).unwrap();
        assert!(!Color::ptr_eq(&first, &again));
        assert_eq!(first, again);
    }

    #[test]
    fn test_zero_capacity_is_one() {
        let mut cache = ColorCache::new(0);
        cache.color(ColorDescriptor::default()).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
