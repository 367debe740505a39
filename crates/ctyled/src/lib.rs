#![forbid(unsafe_code)]
// Allow these clippy lints for builder-heavy style definitions
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::use_self)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::new_without_default)]
#![allow(clippy::collapsible_if)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::items_after_test_module)]

//! # Ctyled
//!
//! Data-driven styling: components declare their style rules as property
//! tables and template fragments, and those rules are resolved at render
//! time against a cascading theme context and per-instance overrides.
//!
//! The crate has two engines:
//! - **Property resolution**: layered defaults, theme inheritance,
//!   `extends` chains, overrides, and transforms, merged into one
//!   [`PropertySet`] per pass.
//! - **Color palettes**: a [`Color`] turns gradient stops plus luminance,
//!   contrast, and inversion into concrete foreground, background, and
//!   accent colors.
//!
//! Rendering is out of scope. A computed style is plain data: resolved
//! properties, CSS text, and an inline style map.
//!
//! ## Quick Start
//!
//! ```rust
//! use ctyled::{Instance, Overrides, Styled, ThemeContext, classes};
//!
//! let button = Styled::new("button", classes::core())
//!     .and_then(|s| s.class(&classes::inline()))
//!     .and_then(|s| s.class(&classes::active()))
//!     .unwrap()
//!     .styles(Overrides::new().set("border", true));
//!
//! let computed = button.compute(&ThemeContext::new(), &Instance::new()).unwrap();
//! assert!(computed.css.contains("border: 1px solid"));
//! assert_eq!(computed.inline.str("fontSize"), Some("14px"));
//! ```
//!
//! ## Colors
//!
//! ```rust
//! use ctyled::{Color, ColorDescriptor};
//!
//! let navy = Color::new(ColorDescriptor::new(["navy", "white"]).with_contrast(0.8)).unwrap();
//! let hover = navy.nudge(-0.15);
//! assert_ne!(navy.bg(), hover.bg());
//! println!("{navy}");
//! ```
//!
//! ## Themes
//!
//! Theme contexts load from JSON or TOML:
//!
//! ```rust
//! use ctyled::ThemeContext;
//!
//! let theme = ThemeContext::from_json(r#"{ "size": 16 }"#).unwrap();
//! assert_eq!(theme.get("size").and_then(|v| v.as_number()), Some(16.0));
//! ```

pub mod cache;
pub mod class;
pub mod classes;
pub mod color;
pub mod error;
pub mod math;
pub mod palette;
pub mod resolve;
pub mod styled;
pub mod template;
pub mod theme;
pub mod util;
pub mod value;

// Re-exports
pub use cache::{CacheStats, ColorCache};
pub use class::{DefaultValue, InlineRule, PropertyConfig, StyleClass, compose};
pub use color::{Color, ColorDescriptor};
pub use error::{ConfigError, StyleError, ThemeLoadError, ThemeSaveError, ValueError};
pub use math::{ColorMath, LinearRgb, Rgb};
pub use palette::{ColorPalette, Stop, StopInput, generate};
pub use resolve::{Override, Overrides, ResolveMemo, resolve, resolve_all};
pub use styled::{Computed, INHERITED_INLINE_PROPERTIES, Instance, StyleSheet, Styled};
pub use template::{Interpolation, TemplateBuilder, TemplateFragment, evaluate, merge};
pub use theme::{InlineStyle, ThemeContext};
pub use value::{Attrs, Callback, PropertySet, Value};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::class::{PropertyConfig, StyleClass};
    pub use crate::classes;
    pub use crate::color::{Color, ColorDescriptor};
    pub use crate::error::{ConfigError, StyleError, ValueError};
    pub use crate::resolve::{Override, Overrides};
    pub use crate::styled::{Computed, Instance, StyleSheet, Styled};
    pub use crate::template::TemplateFragment;
    pub use crate::theme::ThemeContext;
    pub use crate::value::{Attrs, PropertySet, Value};
}
