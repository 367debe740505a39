//! Dynamic property values and property maps.
//!
//! Style properties are heterogeneous: sizes, flags, keywords, and colors
//! all live in the same table. [`Value`] is the closed set of shapes a
//! property can take, and [`PropertySet`] is an ordered map of them.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::color::{Color, ColorDescriptor};

/// A property value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// No value. This is the only nullish value: theme and default
    /// fallbacks replace it.
    #[default]
    Unset,
    Bool(bool),
    Number(f64),
    Str(String),
    Color(Color),
}

impl Value {
    pub fn is_unset(&self) -> bool {
        matches!(self, Value::Unset)
    }

    /// Truthiness used by templates and conditional rules.
    ///
    /// `Unset`, `false`, `0`, `NaN`, and the empty string are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Unset => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Color(_) => true,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Value::Color(c) => Some(c),
            _ => None,
        }
    }

    /// Returns `self`, or `fallback` when `self` is unset.
    pub fn or(self, fallback: Value) -> Value {
        if self.is_unset() { fallback } else { self }
    }
}

/// Format a number the way a stylesheet expects: integers without a
/// fractional part.
#[allow(clippy::cast_possible_truncation)]
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unset => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            Value::Color(c) => write!(f, "{c}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Unset, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Unset => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Color(c) => c.descriptor().serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawValue {
    Bool(bool),
    Number(f64),
    Str(String),
    Color(ColorDescriptor),
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<RawValue>::deserialize(deserializer)?;
        Ok(match raw {
            None => Value::Unset,
            Some(RawValue::Bool(b)) => Value::Bool(b),
            Some(RawValue::Number(n)) => Value::Number(n),
            Some(RawValue::Str(s)) => Value::Str(s),
            Some(RawValue::Color(descriptor)) => {
                Value::Color(Color::new(descriptor).map_err(de::Error::custom)?)
            }
        })
    }
}

static UNSET: Value = Value::Unset;

/// An ordered map from property name to [`Value`].
///
/// Lookups of missing names yield [`Value::Unset`], so producers can read
/// optional properties without unwrapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySet {
    values: BTreeMap<String, Value>,
}

/// Extra values visible to override callbacks and template producers.
pub type Attrs = PropertySet;

impl PropertySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value for `name`, or `Unset` if absent.
    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&UNSET)
    }

    /// Returns the value for `name` unless it is absent or unset.
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_unset())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder form of [`PropertySet::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns a new set with `other`'s entries laid over this one's.
    pub fn overlaid(&self, other: &PropertySet) -> PropertySet {
        let mut values = self.values.clone();
        values.extend(other.values.iter().map(|(k, v)| (k.clone(), v.clone())));
        PropertySet { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn is_truthy(&self, name: &str) -> bool {
        self.get(name).is_truthy()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).as_number()
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).as_str()
    }

    pub fn color(&self, name: &str) -> Option<&Color> {
        self.get(name).as_color()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PropertySet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PropertySet {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// A shared closure compared by identity.
///
/// Style definitions hold user callbacks (defaults, overrides, producers).
/// Wrapping them in `Callback` lets definitions be cloned cheaply and
/// compared: two callbacks are equal only if they are the same allocation.
pub struct Callback<F: ?Sized>(Arc<F>);

impl<F: ?Sized> Callback<F> {
    pub fn from_arc(f: Arc<F>) -> Self {
        Self(f)
    }
}

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> PartialEq for Callback<F> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<F: ?Sized> Deref for Callback<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness_matches_stylesheet_rules() {
        assert!(!Value::Unset.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(Value::Number(-2.0).is_truthy());
        assert!(Value::from("none").is_truthy());
        assert!(Value::Color(Color::default()).is_truthy());
    }

    #[test]
    fn test_number_display() {
        assert_eq!(Value::from(14).to_string(), "14");
        assert_eq!(Value::from(1.5).to_string(), "1.5");
        assert_eq!(Value::from(-0.0).to_string(), "0");
        assert_eq!(Value::Unset.to_string(), "");
    }

    #[test]
    fn test_property_set_missing_is_unset() {
        let props = PropertySet::new().with("size", 14);
        assert_eq!(props.get("size"), &Value::Number(14.0));
        assert!(props.get("gutter").is_unset());
        assert!(props.lookup("gutter").is_none());
        assert_eq!(props.number("size"), Some(14.0));
    }

    #[test]
    fn test_property_set_lookup_skips_unset() {
        let props = PropertySet::new().with("width", Value::Unset);
        assert!(props.contains("width"));
        assert!(props.lookup("width").is_none());
    }

    #[test]
    fn test_overlaid_prefers_other() {
        let base = PropertySet::new().with("a", 1).with("b", 2);
        let top = PropertySet::new().with("b", 3);
        let merged = base.overlaid(&top);
        assert_eq!(merged.number("a"), Some(1.0));
        assert_eq!(merged.number("b"), Some(3.0));
        assert_eq!(base.number("b"), Some(2.0));
    }

    #[test]
    fn test_value_deserialize_shapes() {
        let props: PropertySet = serde_json::from_str(
            r#"{ "size": 16, "bg": true, "justify": "center", "width": null,
                 "color": { "primary": ["navy", "white"], "contrast": 0.7 } }"#,
        )
        .unwrap();
        assert_eq!(props.number("size"), Some(16.0));
        assert!(props.is_truthy("bg"));
        assert_eq!(props.str("justify"), Some("center"));
        assert!(props.get("width").is_unset());
        let color = props.color("color").unwrap();
        assert!((color.descriptor().contrast - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_value_deserialize_rejects_bad_color() {
        let result: Result<PropertySet, _> =
            serde_json::from_str(r#"{ "color": { "primary": ["nope"] } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_callback_identity_equality() {
        let f: Arc<dyn Fn() -> i32 + Send + Sync> = Arc::new(|| 1);
        let a = Callback::from_arc(Arc::clone(&f));
        let b = a.clone();
        let c: Callback<dyn Fn() -> i32 + Send + Sync> = Callback::from_arc(Arc::new(|| 1));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!((*a)(), 1);
    }
}
