//! Styled definitions and their computed output.
//!
//! A [`Styled`] bundles a style class with component-level overrides,
//! default attrs, and extra inline and sheet templates. Computing it
//! against a [`ThemeContext`] and an [`Instance`] yields a [`Computed`]:
//! the resolved properties, the stylesheet text and its class name, the
//! inline style map, and the context children should resolve against.
//!
//! Stylesheet text is collected in an explicit [`StyleSheet`] the embedder
//! owns; nothing is injected globally.
//!
//! # Example
//!
//! ```rust
//! use ctyled::{Instance, Overrides, StyleSheet, Styled, ThemeContext, classes};
//!
//! let card = Styled::new("card", classes::core())
//!     .unwrap()
//!     .styles(Overrides::new().set("bg", true).set("padd", 1));
//!
//! let computed = card.compute(&ThemeContext::new(), &Instance::new()).unwrap();
//! assert!(computed.class_name.starts_with("css-"));
//! assert_eq!(computed.inline.str("padding"), Some("7px"));
//!
//! let mut sheet = StyleSheet::new();
//! sheet.install_base_styles();
//! sheet.register(&computed);
//! assert!(sheet.to_css().contains(&computed.class_name));
//! ```

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::class::StyleClass;
use crate::classes::BASE_STYLES;
use crate::error::{ConfigError, StyleError};
use crate::resolve::{Overrides, ResolveMemo, resolve_all};
use crate::template::{TemplateFragment, evaluate, merge};
use crate::theme::{InlineStyle, ThemeContext};
use crate::util::css_to_inline;
use crate::value::{Attrs, PropertySet};

/// Inline properties that descendants inherit through CSS.
///
/// An element does not repeat one of these when its nearest styled
/// ancestor already applied the same value.
pub const INHERITED_INLINE_PROPERTIES: &[&str] = &[
    "color",
    "cursor",
    "direction",
    "fontFamily",
    "fontSize",
    "fontStyle",
    "fontVariant",
    "fontWeight",
    "letterSpacing",
    "lineHeight",
    "textAlign",
    "textIndent",
    "textTransform",
    "visibility",
    "whiteSpace",
    "wordSpacing",
];

fn is_inherited(name: &str) -> bool {
    INHERITED_INLINE_PROPERTIES.contains(&name)
}

/// Per-instance inputs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    pub overrides: Overrides,
    pub attrs: Attrs,
    /// Inline styles applied last, over everything the class computes.
    pub style: InlineStyle,
}

impl Instance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }

    pub fn style(mut self, style: InlineStyle) -> Self {
        self.style = style;
        self
    }
}

/// The result of computing a [`Styled`] definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Computed {
    pub props: Arc<PropertySet>,
    /// `css-` followed by a hash of `css`.
    pub class_name: String,
    pub css: String,
    pub inline: InlineStyle,
    /// The context children resolve against.
    pub child_context: ThemeContext,
}

/// A style class plus component-level customization.
#[derive(Debug, Clone, PartialEq)]
pub struct Styled {
    name: String,
    class: StyleClass,
    overrides: Overrides,
    inline_template: TemplateFragment,
    sheet_template: TemplateFragment,
    attrs: Attrs,
}

impl Styled {
    /// Wrap a validated class.
    ///
    /// # Errors
    /// Returns `ConfigError` if the class fails [`StyleClass::validate`].
    pub fn new(name: impl Into<String>, class: StyleClass) -> Result<Self, ConfigError> {
        class.validate()?;
        Ok(Self {
            name: name.into(),
            class,
            overrides: Overrides::new(),
            inline_template: TemplateFragment::empty(),
            sheet_template: TemplateFragment::empty(),
            attrs: Attrs::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style_class(&self) -> &StyleClass {
        &self.class
    }

    /// Add component-level overrides. Later calls win.
    pub fn styles(mut self, overrides: Overrides) -> Self {
        self.overrides = Overrides::layered(&self.overrides, &overrides);
        self
    }

    /// Append declarations to the inline template.
    pub fn extend(mut self, fragment: TemplateFragment) -> Self {
        self.inline_template = merge(&self.inline_template, &fragment);
        self
    }

    /// Prepend declarations to the sheet template.
    pub fn extend_sheet(mut self, fragment: TemplateFragment) -> Self {
        self.sheet_template = merge(&fragment, &self.sheet_template);
        self
    }

    /// Compose another class over this one.
    ///
    /// # Errors
    /// Returns `ConfigError` if the composed class is invalid.
    pub fn class(mut self, other: &StyleClass) -> Result<Self, ConfigError> {
        self.class = self.class.compose(other)?;
        Ok(self)
    }

    /// Merge default attrs. Later calls win.
    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = self.attrs.overlaid(&attrs);
        self
    }

    /// Resolve and render against `theme` for one instance.
    ///
    /// # Errors
    /// Returns `StyleError` if resolution, a template producer, or an inline
    /// rule fails.
    pub fn compute(&self, theme: &ThemeContext, instance: &Instance) -> Result<Computed, StyleError> {
        let overrides = Overrides::layered(&self.overrides, &instance.overrides);
        let attrs = self.attrs.overlaid(&instance.attrs);
        let props = Arc::new(resolve_all(&self.class, theme, &overrides, &attrs)?);
        self.render(props, theme, instance, &attrs)
    }

    /// Like [`Styled::compute`], reusing `memo`'s resolved properties while
    /// the inputs are unchanged.
    ///
    /// # Errors
    /// See [`Styled::compute`].
    pub fn compute_with(
        &self,
        memo: &mut ResolveMemo,
        theme: &ThemeContext,
        instance: &Instance,
    ) -> Result<Computed, StyleError> {
        let overrides = Overrides::layered(&self.overrides, &instance.overrides);
        let attrs = self.attrs.overlaid(&instance.attrs);
        let props = memo.resolve(&self.class, theme, &overrides, &attrs)?;
        self.render(props, theme, instance, &attrs)
    }

    fn render(
        &self,
        props: Arc<PropertySet>,
        theme: &ThemeContext,
        instance: &Instance,
        attrs: &Attrs,
    ) -> Result<Computed, StyleError> {
        let sheet = merge(self.class.sheet(), &self.sheet_template);
        let css = evaluate(&sheet, &props, attrs)?;
        let class_name = class_name(&css);

        let mut computed_inline = InlineStyle::new();
        for (name, rule) in self.class.inline() {
            let value = rule.apply(&props).map_err(|source| StyleError::Inline {
                rule: name.clone(),
                source,
            })?;
            if !value.is_unset() {
                computed_inline.insert(name.as_str(), value);
            }
        }
        let extended = css_to_inline(&evaluate(&self.inline_template, &props, attrs)?);
        let merged = computed_inline.overlaid(&extended).overlaid(&instance.style);

        let parent_inline = theme.inline();
        let inline: InlineStyle = merged
            .iter()
            .filter(|(name, value)| !is_inherited(name) || parent_inline.get(name) != *value)
            .map(|(name, value)| (name, value.clone()))
            .collect();

        let applied: InlineStyle = inline
            .iter()
            .filter(|(name, _)| is_inherited(name))
            .map(|(name, value)| (name, value.clone()))
            .collect();
        let child_context = theme.overlay(&props).with_inline(parent_inline.overlaid(&applied));

        debug!(
            styled.name = %self.name,
            styled.class_name = %class_name,
            styled.props = props.len(),
            styled.inline = inline.len(),
            "Styled computed"
        );

        Ok(Computed {
            props,
            class_name,
            css,
            inline,
            child_context,
        })
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// `css-` plus the 64-bit FNV-1a hash of `css` in hex.
fn class_name(css: &str) -> String {
    let hash = css
        .bytes()
        .fold(FNV_OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME));
    format!("css-{hash:x}")
}

/// Collected stylesheet rules.
///
/// The embedder owns one sheet per document, calls
/// [`StyleSheet::install_base_styles`] once, and registers every computed
/// style it renders.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    base_installed: bool,
    rules: Vec<(String, String)>,
    registered: BTreeSet<String>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the document-level base rules. Returns `false` if they were
    /// already installed.
    pub fn install_base_styles(&mut self) -> bool {
        if self.base_installed {
            return false;
        }
        self.base_installed = true;
        debug!("Base styles installed");
        true
    }

    pub fn has_base_styles(&self) -> bool {
        self.base_installed
    }

    /// Record a computed style's rule. Returns `false` if a rule with the
    /// same class name is already present.
    pub fn register(&mut self, computed: &Computed) -> bool {
        if !self.registered.insert(computed.class_name.clone()) {
            trace!(sheet.class_name = %computed.class_name, "Rule already registered");
            return false;
        }
        self.rules.push((computed.class_name.clone(), computed.css.clone()));
        trace!(sheet.class_name = %computed.class_name, sheet.rules = self.rules.len(), "Rule registered");
        true
    }

    pub fn contains(&self, class_name: &str) -> bool {
        self.registered.contains(class_name)
    }

    /// Number of registered rules, not counting the base styles.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Base styles (if installed) followed by every rule in registration
    /// order.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        if self.base_installed {
            out.push_str(BASE_STYLES);
        }
        for (name, css) in &self.rules {
            out.push('.');
            out.push_str(name);
            out.push_str(" {");
            out.push_str(css);
            out.push_str("}\n");
        }
        out
    }
}
