//! Property resolution.
//!
//! Every declared property resolves through the same precedence chain:
//!
//! 1. **Base default**: the literal default, or, for a property that
//!    `extends` another, a value derived from the target's resolved value.
//! 2. **Theme value**: for `inherit` properties, the ambient theme value,
//!    falling back to the base default when the theme has none.
//! 3. **Override**: a literal replaces the theme value, [`Override::Inherit`]
//!    forces the theme lookup, and [`Override::Computed`] maps the theme
//!    value.
//! 4. **Transform**: applied last, to whatever the chain produced.
//!
//! Each property is computed at most once per pass; the pass-local
//! [`PropertySet`] doubles as the cache, and a stack of in-flight names
//! turns a cyclic `extends` chain into an error instead of a stack
//! overflow.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::class::{DefaultValue, PropertyConfig, StyleClass};
use crate::error::{ConfigError, StyleError, ValueError};
use crate::theme::ThemeContext;
use crate::value::{Attrs, Callback, PropertySet, Value};

/// Signature of a computed override: `(theme value, attrs) -> value`.
pub type OverrideFn = dyn Fn(&Value, &Attrs) -> Result<Value, ValueError> + Send + Sync;

/// A component-level or instance-level property override.
#[derive(Debug, Clone, PartialEq)]
pub enum Override {
    /// Use this value.
    Literal(Value),
    /// Read the theme, falling back to the base default.
    Inherit,
    /// Map the theme value (with attrs) to a new value.
    Computed(Callback<OverrideFn>),
}

impl Override {
    pub fn literal(value: impl Into<Value>) -> Self {
        Override::Literal(value.into())
    }

    pub fn computed<F, V>(f: F) -> Self
    where
        F: Fn(&Value, &Attrs) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Override::Computed(Callback::from_arc(Arc::new(
            move |value: &Value, attrs: &Attrs| Ok(f(value, attrs).into()),
        )))
    }

    pub fn try_computed<F>(f: F) -> Self
    where
        F: Fn(&Value, &Attrs) -> Result<Value, ValueError> + Send + Sync + 'static,
    {
        Override::Computed(Callback::from_arc(Arc::new(f)))
    }
}

/// Overrides keyed by property name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    map: BTreeMap<String, Override>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Override) {
        self.map.insert(name.into(), value);
    }

    /// Builder form of [`Overrides::insert`].
    pub fn with(mut self, name: impl Into<String>, value: Override) -> Self {
        self.insert(name, value);
        self
    }

    /// Shorthand for a literal override.
    pub fn set(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(name, Override::Literal(value.into()))
    }

    pub fn get(&self, name: &str) -> Option<&Override> {
        self.map.get(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Override)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Component-level overrides with instance-level ones taking priority.
    pub fn layered(component: &Overrides, instance: &Overrides) -> Overrides {
        if instance.is_empty() {
            return component.clone();
        }
        let mut map = component.map.clone();
        map.extend(instance.map.iter().map(|(k, v)| (k.clone(), v.clone())));
        Overrides { map }
    }
}

impl<K: Into<String>> FromIterator<(K, Override)> for Overrides {
    fn from_iter<I: IntoIterator<Item = (K, Override)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

struct Resolver<'a> {
    class: &'a StyleClass,
    theme: &'a ThemeContext,
    overrides: &'a Overrides,
    attrs: &'a Attrs,
    computed: &'a mut PropertySet,
    in_flight: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn value(&mut self, name: &str) -> Result<Value, StyleError> {
        if self.computed.contains(name) {
            return Ok(self.computed.get(name).clone());
        }
        if self.in_flight.iter().any(|n| n == name) {
            let mut chain = self.in_flight.clone();
            chain.push(name.to_string());
            return Err(ConfigError::CyclicExtends { chain }.into());
        }
        let class: &'a StyleClass = self.class;
        let config = class
            .config(name)
            .ok_or_else(|| ConfigError::UndeclaredProperty(name.to_string()))?;

        self.in_flight.push(name.to_string());
        let result = self.compute(name, config);
        self.in_flight.pop();
        let value = result?;

        trace!(resolve.property = name, resolve.value = %value, "Property resolved");
        self.computed.insert(name, value.clone());
        Ok(value)
    }

    fn compute(&mut self, name: &str, config: &PropertyConfig) -> Result<Value, StyleError> {
        let base = self.base_default(name, config)?;
        let from_theme = |base: Value| self.theme.get(name).cloned().unwrap_or(base);

        let value = match self.overrides.get(name) {
            None if config.inherit => from_theme(base),
            None => base,
            Some(Override::Inherit) => from_theme(base),
            Some(Override::Literal(value)) => value.clone(),
            Some(Override::Computed(f)) => {
                let theme_value = if config.inherit { from_theme(base) } else { base };
                f(&theme_value, self.attrs).map_err(|source| value_error(name, source))?
            }
        };

        match &config.transform {
            Some(transform) => transform(&value).map_err(|source| value_error(name, source)),
            None => Ok(value),
        }
    }

    fn base_default(&mut self, name: &str, config: &PropertyConfig) -> Result<Value, StyleError> {
        let Some(target) = &config.extends else {
            return match &config.default {
                DefaultValue::Unset => Ok(Value::Unset),
                DefaultValue::Literal(value) => Ok(value.clone()),
                DefaultValue::Derived(_) => {
                    Err(ConfigError::DerivedDefaultWithoutExtends(name.to_string()).into())
                }
            };
        };

        let extended = self.value(target)?;
        match &config.default {
            DefaultValue::Unset => Ok(extended),
            DefaultValue::Literal(value) => Ok(value.clone()),
            DefaultValue::Derived(f) => f(&extended).map_err(|source| value_error(name, source)),
        }
    }
}

fn value_error(property: &str, source: ValueError) -> StyleError {
    StyleError::Value {
        property: property.to_string(),
        source,
    }
}

/// Resolve a single property, reusing and extending `computed`.
///
/// Values already present in `computed` are returned as is; everything
/// resolved along the way (including `extends` targets) is recorded there.
///
/// # Errors
/// - `ConfigError::UndeclaredProperty` if `name` (or a target) is not declared
/// - `ConfigError::CyclicExtends` if the `extends` chain loops
/// - `StyleError::Value` if an override, derived default, or transform fails
pub fn resolve(
    class: &StyleClass,
    theme: &ThemeContext,
    overrides: &Overrides,
    attrs: &Attrs,
    computed: &mut PropertySet,
    name: &str,
) -> Result<Value, StyleError> {
    Resolver {
        class,
        theme,
        overrides,
        attrs,
        computed,
        in_flight: Vec::new(),
    }
    .value(name)
}

/// Resolve every property the class declares.
///
/// # Errors
/// Returns the first error encountered; see [`resolve`].
pub fn resolve_all(
    class: &StyleClass,
    theme: &ThemeContext,
    overrides: &Overrides,
    attrs: &Attrs,
) -> Result<PropertySet, StyleError> {
    let mut computed = PropertySet::new();
    let mut resolver = Resolver {
        class,
        theme,
        overrides,
        attrs,
        computed: &mut computed,
        in_flight: Vec::new(),
    };
    for name in class.props().keys() {
        resolver.value(name)?;
    }
    debug!(
        resolve.properties = computed.len(),
        resolve.overrides = overrides.len(),
        "Resolution pass complete"
    );
    Ok(computed)
}

#[derive(Debug)]
struct MemoEntry {
    class: StyleClass,
    theme: ThemeContext,
    overrides: Overrides,
    attrs: Attrs,
    props: Arc<PropertySet>,
}

/// Remembers the last resolution pass.
///
/// Re-rendering with unchanged inputs returns the previous result without
/// running any callbacks. Callbacks compare by identity, so a class rebuilt
/// from fresh closures counts as changed.
#[derive(Debug, Default)]
pub struct ResolveMemo {
    last: Option<MemoEntry>,
    hits: u64,
}

impl ResolveMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve all properties, reusing the previous result when every input
    /// is equal to the last call's.
    ///
    /// # Errors
    /// See [`resolve_all`]. Failed passes are not remembered.
    pub fn resolve(
        &mut self,
        class: &StyleClass,
        theme: &ThemeContext,
        overrides: &Overrides,
        attrs: &Attrs,
    ) -> Result<Arc<PropertySet>, StyleError> {
        if let Some(entry) = &self.last {
            if entry.class == *class
                && entry.theme == *theme
                && entry.overrides == *overrides
                && entry.attrs == *attrs
            {
                self.hits += 1;
                trace!(memo.hits = self.hits, "Resolution memo reused");
                return Ok(Arc::clone(&entry.props));
            }
        }

        let props = Arc::new(resolve_all(class, theme, overrides, attrs)?);
        self.last = Some(MemoEntry {
            class: class.clone(),
            theme: theme.clone(),
            overrides: overrides.clone(),
            attrs: attrs.clone(),
            props: Arc::clone(&props),
        });
        Ok(props)
    }

    /// Number of calls answered from the memo.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}
