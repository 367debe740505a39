//! Error types for style definitions, resolution, and theme loading.
//!
//! Two kinds of failure exist:
//! - [`ConfigError`]: a definition is malformed (cyclic `extends`, bad stops,
//!   unknown property). Raised when the definition is constructed.
//! - [`ValueError`]: a user callback (override, transform, producer) failed.
//!   Raised during resolution and never swallowed.
//!
//! [`StyleError`] is what resolution and evaluation return; it wraps both.

use thiserror::Error;

/// A style definition or color descriptor is malformed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("cyclic extends chain: {}", chain.join(" -> "))]
    CyclicExtends { chain: Vec<String> },
    #[error("undeclared property '{0}'")]
    UndeclaredProperty(String),
    #[error("property '{property}' extends undeclared property '{target}'")]
    UndeclaredExtends { property: String, target: String },
    #[error("property '{0}' has a derived default but no extends target")]
    DerivedDefaultWithoutExtends(String),
    #[error("stop sequence is empty")]
    EmptyStops,
    #[error("stop position {0} is outside [0, 1]")]
    StopOutOfRange(f64),
    #[error("stop positions must be non-decreasing, got {previous} then {next}")]
    NonMonotonicStops { previous: f64, next: f64 },
    #[error("unrecognized color '{0}'")]
    InvalidColor(String),
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("template has {chunks} text chunks for {values} values")]
    MalformedTemplate { chunks: usize, values: usize },
}

/// A user-supplied override, transform, or producer failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValueError {
    message: String,
}

impl ValueError {
    /// Create a new value error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error raised while resolving properties or evaluating templates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StyleError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("property '{property}': {source}")]
    Value {
        property: String,
        #[source]
        source: ValueError,
    },
    #[error("template value {index}: {source}")]
    Template {
        index: usize,
        #[source]
        source: ValueError,
    },
    #[error("inline rule '{rule}': {source}")]
    Inline {
        rule: String,
        #[source]
        source: ValueError,
    },
}

impl StyleError {
    /// Returns the configuration error, if this is one.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            StyleError::Config(err) => Some(err),
            _ => None,
        }
    }
}

/// Error loading a theme context or color descriptor.
#[derive(Error, Debug)]
pub enum ThemeLoadError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Error saving a color descriptor.
#[derive(Error, Debug)]
pub enum ThemeSaveError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyclic_message_lists_chain() {
        let err = ConfigError::CyclicExtends {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "cyclic extends chain: a -> b -> a");
    }

    #[test]
    fn test_value_error_wrapped_with_property() {
        let err = StyleError::Value {
            property: "size".into(),
            source: ValueError::new("negative size"),
        };
        assert_eq!(err.to_string(), "property 'size': negative size");
        assert!(err.as_config().is_none());
    }

    #[test]
    fn test_config_error_is_transparent() {
        let err: StyleError = ConfigError::UndeclaredProperty("gap".into()).into();
        assert_eq!(err.to_string(), "undeclared property 'gap'");
        assert_eq!(
            err.as_config(),
            Some(&ConfigError::UndeclaredProperty("gap".into()))
        );
    }
}
