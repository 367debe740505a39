//! Style class definitions and composition.
//!
//! A [`StyleClass`] declares the properties a component understands, the
//! inline rules computed from them, and a sheet template. Classes are
//! values: [`compose`] layers one over another and validates the result,
//! so a broken `extends` chain is reported when the definition is built
//! rather than when it is first rendered.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConfigError, ValueError};
use crate::template::{self, TemplateFragment};
use crate::value::{Callback, PropertySet, Value};

/// Maps an extended property's value to a default.
pub type DeriveFn = dyn Fn(&Value) -> Result<Value, ValueError> + Send + Sync;

/// Post-processes a resolved property value.
pub type TransformFn = dyn Fn(&Value) -> Result<Value, ValueError> + Send + Sync;

/// Computes an inline style value from the resolved properties.
pub type InlineFn = dyn Fn(&PropertySet) -> Result<Value, ValueError> + Send + Sync;

/// Where a property's default comes from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DefaultValue {
    #[default]
    Unset,
    Literal(Value),
    /// Computed from the `extends` target. Requires `extends`.
    Derived(Callback<DeriveFn>),
}

/// Declaration of a single property.
///
/// # Example
///
/// ```rust
/// use ctyled::{PropertyConfig, Value};
///
/// let size = PropertyConfig::new().with_default(14).inherit();
/// let border_color = PropertyConfig::new()
///     .extends("color")
///     .derive(|color: &Value| color.clone());
/// # let _ = (size, border_color);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyConfig {
    pub default: DefaultValue,
    /// Read the value from the theme context when present.
    pub inherit: bool,
    /// Property whose resolved value seeds this one's default.
    pub extends: Option<String>,
    pub transform: Option<Callback<TransformFn>>,
}

impl PropertyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a literal default.
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Literal(value.into());
        self
    }

    pub fn inherit(mut self) -> Self {
        self.inherit = true;
        self
    }

    pub fn extends(mut self, target: impl Into<String>) -> Self {
        self.extends = Some(target.into());
        self
    }

    /// Derive the default from the `extends` target.
    pub fn derive<F, V>(self, f: F) -> Self
    where
        F: Fn(&Value) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.try_derive(move |v: &Value| Ok(f(v).into()))
    }

    pub fn try_derive<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ValueError> + Send + Sync + 'static,
    {
        self.default = DefaultValue::Derived(Callback::from_arc(Arc::new(f)));
        self
    }

    /// Map every resolved value through `f`.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ValueError> + Send + Sync + 'static,
    {
        self.transform = Some(Callback::from_arc(Arc::new(f)));
        self
    }
}

/// An inline style entry.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineRule {
    Literal(Value),
    Computed(Callback<InlineFn>),
}

impl InlineRule {
    pub fn computed<F, V>(f: F) -> Self
    where
        F: Fn(&PropertySet) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        InlineRule::Computed(Callback::from_arc(Arc::new(move |p: &PropertySet| {
            Ok(f(p).into())
        })))
    }

    pub fn try_computed<F>(f: F) -> Self
    where
        F: Fn(&PropertySet) -> Result<Value, ValueError> + Send + Sync + 'static,
    {
        InlineRule::Computed(Callback::from_arc(Arc::new(f)))
    }

    pub(crate) fn apply(&self, props: &PropertySet) -> Result<Value, ValueError> {
        match self {
            InlineRule::Literal(value) => Ok(value.clone()),
            InlineRule::Computed(f) => f(props),
        }
    }
}

/// A style class: property table, inline rules, and sheet template.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleClass {
    props: BTreeMap<String, PropertyConfig>,
    inline: BTreeMap<String, InlineRule>,
    template: TemplateFragment,
}

impl StyleClass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare (or replace) a property.
    pub fn prop(mut self, name: impl Into<String>, config: PropertyConfig) -> Self {
        self.props.insert(name.into(), config);
        self
    }

    pub fn inline_rule(mut self, name: impl Into<String>, rule: InlineRule) -> Self {
        self.inline.insert(name.into(), rule);
        self
    }

    /// Shorthand for a constant inline rule.
    pub fn inline_literal(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.inline_rule(name, InlineRule::Literal(value.into()))
    }

    /// Shorthand for an infallible computed inline rule.
    pub fn inline_fn<F, V>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&PropertySet) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.inline_rule(name, InlineRule::computed(f))
    }

    /// Append to the sheet template.
    pub fn template(mut self, fragment: TemplateFragment) -> Self {
        self.template = template::merge(&self.template, &fragment);
        self
    }

    pub fn props(&self) -> &BTreeMap<String, PropertyConfig> {
        &self.props
    }

    pub fn config(&self, name: &str) -> Option<&PropertyConfig> {
        self.props.get(name)
    }

    pub fn inline(&self) -> &BTreeMap<String, InlineRule> {
        &self.inline
    }

    pub fn sheet(&self) -> &TemplateFragment {
        &self.template
    }

    /// Check the property table.
    ///
    /// # Errors
    /// - `DerivedDefaultWithoutExtends` for a derived default with no target
    /// - `UndeclaredExtends` when a target is not declared in this class
    /// - `CyclicExtends` when `extends` links form a loop
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, config) in &self.props {
            match &config.extends {
                Some(target) if !self.props.contains_key(target) => {
                    return Err(ConfigError::UndeclaredExtends {
                        property: name.clone(),
                        target: target.clone(),
                    });
                }
                None if matches!(config.default, DefaultValue::Derived(_)) => {
                    return Err(ConfigError::DerivedDefaultWithoutExtends(name.clone()));
                }
                _ => {}
            }
        }

        for name in self.props.keys() {
            let mut chain = vec![name.clone()];
            let mut current = name;
            while let Some(next) = self.props.get(current).and_then(|c| c.extends.as_ref()) {
                let seen = chain.iter().any(|n| n == next);
                chain.push(next.clone());
                if seen {
                    return Err(ConfigError::CyclicExtends { chain });
                }
                current = next;
            }
        }
        Ok(())
    }

    /// Layer `other` over this class. See [`compose`].
    ///
    /// # Errors
    /// Returns `ConfigError` if the combined class is invalid.
    pub fn compose(&self, other: &StyleClass) -> Result<StyleClass, ConfigError> {
        compose(self, other)
    }
}

/// Layer `b` over `a`.
///
/// Properties and inline rules from `b` replace those of `a` with the same
/// name; templates are concatenated with `a` first. The result is
/// validated.
///
/// # Errors
/// Returns `ConfigError` if the combined class is invalid.
pub fn compose(a: &StyleClass, b: &StyleClass) -> Result<StyleClass, ConfigError> {
    let mut props = a.props.clone();
    props.extend(b.props.iter().map(|(k, v)| (k.clone(), v.clone())));
    let mut inline = a.inline.clone();
    inline.extend(b.inline.iter().map(|(k, v)| (k.clone(), v.clone())));

    let composed = StyleClass {
        props,
        inline,
        template: template::merge(&a.template, &b.template),
    };
    composed.validate()?;
    debug!(
        class.props = composed.props.len(),
        class.inline = composed.inline.len(),
        class.holes = composed.template.values().len(),
        "Style classes composed"
    );
    Ok(composed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal(v: impl Into<Value>) -> PropertyConfig {
        PropertyConfig::new().with_default(v)
    }

    #[test]
    fn test_validate_accepts_extends_chain() {
        let class = StyleClass::new()
            .prop("color", literal("black").inherit())
            .prop("borderColor", PropertyConfig::new().extends("color"))
            .prop(
                "outline",
                PropertyConfig::new().extends("borderColor").derive(Value::clone),
            );
        assert_eq!(class.validate(), Ok(()));
    }

    #[test]
    fn test_validate_detects_cycle() {
        let class = StyleClass::new()
            .prop("a", PropertyConfig::new().extends("b"))
            .prop("b", PropertyConfig::new().extends("a"));
        assert_eq!(
            class.validate(),
            Err(ConfigError::CyclicExtends {
                chain: vec!["a".into(), "b".into(), "a".into()]
            })
        );
    }

    #[test]
    fn test_validate_detects_self_cycle() {
        let class = StyleClass::new().prop("a", PropertyConfig::new().extends("a"));
        assert!(matches!(
            class.validate(),
            Err(ConfigError::CyclicExtends { .. })
        ));
    }

    #[test]
    fn test_validate_undeclared_extends() {
        let class = StyleClass::new().prop("bgColor", PropertyConfig::new().extends("color"));
        assert_eq!(
            class.validate(),
            Err(ConfigError::UndeclaredExtends {
                property: "bgColor".into(),
                target: "color".into()
            })
        );
    }

    #[test]
    fn test_validate_derived_requires_extends() {
        let class = StyleClass::new().prop("x", PropertyConfig::new().derive(Value::clone));
        assert_eq!(
            class.validate(),
            Err(ConfigError::DerivedDefaultWithoutExtends("x".into()))
        );
    }

    #[test]
    fn test_compose_right_wins_and_templates_concatenate() {
        let a = StyleClass::new()
            .prop("bg", literal(false))
            .prop("size", literal(14))
            .inline_literal("display", "flex")
            .template(TemplateFragment::text("a;"));
        let b = StyleClass::new()
            .prop("bg", literal(true))
            .inline_literal("display", "inline-flex")
            .template(TemplateFragment::text("b;"));

        let ab = compose(&a, &b).unwrap();
        assert_eq!(
            ab.config("bg").map(|c| &c.default),
            Some(&DefaultValue::Literal(Value::Bool(true)))
        );
        assert!(ab.config("size").is_some());
        assert_eq!(
            ab.inline().get("display"),
            Some(&InlineRule::Literal("inline-flex".into()))
        );
        assert_eq!(ab.sheet().chunks(), ["a;b;"]);

        let ba = compose(&b, &a).unwrap();
        assert_eq!(ba.sheet().chunks(), ["b;a;"]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_compose_rejects_cycle_introduced_by_overlay() {
        let a = StyleClass::new()
            .prop("a", PropertyConfig::new().extends("b"))
            .prop("b", literal(1));
        let b = StyleClass::new().prop("b", PropertyConfig::new().extends("a"));
        assert!(matches!(
            compose(&a, &b),
            Err(ConfigError::CyclicExtends { .. })
        ));
    }

    #[test]
    fn test_inline_rule_apply() {
        let rule = InlineRule::computed(|p: &PropertySet| p.get("size").clone());
        let props = PropertySet::new().with("size", 12);
        assert_eq!(rule.apply(&props), Ok(Value::Number(12.0)));
    }
}
