//! The cascading theme context.
//!
//! A [`ThemeContext`] is the ambient state a component resolves against:
//! the property values its ancestors computed, and the inheritable inline
//! styles they already applied. Contexts are persistent. [`ThemeContext::overlay`]
//! returns a child context and leaves the parent untouched, so sibling
//! subtrees never observe each other's values.
//!
//! Contexts can be loaded from JSON or TOML. Values are bools, numbers,
//! strings, or color descriptor tables:
//!
//! ```toml
//! size = 16
//! justify = "center"
//!
//! [color]
//! primary = ["navy", "white"]
//! contrast = 0.7
//! ```

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::ThemeLoadError;
use crate::value::{PropertySet, Value};

/// Inline style declarations, keyed by camelCased CSS property name.
pub type InlineStyle = PropertySet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThemeContext {
    values: Arc<PropertySet>,
    inline: Arc<InlineStyle>,
}

impl ThemeContext {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// A root context holding `values`.
    pub fn from_values(values: PropertySet) -> Self {
        Self {
            values: Arc::new(values),
            inline: Arc::default(),
        }
    }

    /// Returns the value for `name` unless it is absent or unset.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.lookup(name)
    }

    pub fn values(&self) -> &PropertySet {
        &self.values
    }

    /// Inheritable inline styles already applied by ancestors.
    pub fn inline(&self) -> &InlineStyle {
        &self.inline
    }

    /// Returns a child context with `values` laid over this one's.
    pub fn overlay(&self, values: &PropertySet) -> Self {
        if values.is_empty() {
            return self.clone();
        }
        Self {
            values: Arc::new(self.values.overlaid(values)),
            inline: Arc::clone(&self.inline),
        }
    }

    /// Returns a copy of this context with the applied inline styles replaced.
    pub fn with_inline(&self, inline: InlineStyle) -> Self {
        Self {
            values: Arc::clone(&self.values),
            inline: Arc::new(inline),
        }
    }

    /// Load a context from JSON text.
    ///
    /// # Errors
    /// Returns `ThemeLoadError` if JSON parsing fails or a color descriptor
    /// is invalid.
    pub fn from_json(json: &str) -> Result<Self, ThemeLoadError> {
        let values: PropertySet = serde_json::from_str(json)?;
        debug!(theme.format = "json", theme.values = values.len(), "Theme context loaded");
        Ok(Self::from_values(values))
    }

    /// Load a context from TOML text.
    ///
    /// # Errors
    /// Returns `ThemeLoadError` if TOML parsing fails or a color descriptor
    /// is invalid.
    pub fn from_toml(toml: &str) -> Result<Self, ThemeLoadError> {
        let values: PropertySet = toml::from_str(toml)?;
        debug!(theme.format = "toml", theme.values = values.len(), "Theme context loaded");
        Ok(Self::from_values(values))
    }

    /// Load a context from a file (format inferred by extension).
    ///
    /// # Errors
    /// Returns `ThemeLoadError` if reading or parsing fails, or the
    /// extension is not `json` or `toml`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ThemeLoadError> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&fs::read_to_string(path)?),
            Some("toml") => Self::from_toml(&fs::read_to_string(path)?),
            Some(ext) => Err(ThemeLoadError::UnsupportedFormat(ext.into())),
            None => Err(ThemeLoadError::UnsupportedFormat("unknown".into())),
        }
    }
}

impl From<PropertySet> for ThemeContext {
    fn from(values: PropertySet) -> Self {
        Self::from_values(values)
    }
}
