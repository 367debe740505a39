//! Template fragments: text chunks interleaved with value producers.
//!
//! A fragment is a partially applied stylesheet. Its text is fixed; the
//! holes between chunks are filled at evaluation time from the resolved
//! property set. Fragments concatenate with [`merge`], which joins the
//! boundary chunks so the `chunks = values + 1` shape is preserved.
//!
//! # Example
//!
//! ```rust
//! use ctyled::{Attrs, PropertySet, TemplateFragment, Value, evaluate, merge};
//!
//! let head = TemplateFragment::builder()
//!     .text("font-size: ")
//!     .value(|p: &PropertySet, _: &Attrs| p.get("size").clone())
//!     .text("px;")
//!     .build();
//! let tail = TemplateFragment::text(" display: flex;");
//!
//! let props = PropertySet::new().with("size", 14);
//! let css = evaluate(&merge(&head, &tail), &props, &Attrs::new()).unwrap();
//! assert_eq!(css, "font-size: 14px; display: flex;");
//! ```

use std::sync::Arc;

use tracing::trace;

use crate::error::{ConfigError, StyleError, ValueError};
use crate::value::{Attrs, Callback, PropertySet, Value};

/// Signature of a template value producer.
pub type ProducerFn = dyn Fn(&PropertySet, &Attrs) -> Result<Value, ValueError> + Send + Sync;

/// One hole in a template.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolation {
    /// A constant.
    Literal(Value),
    /// Computed from the resolved properties and attrs.
    Producer(Callback<ProducerFn>),
}

impl Interpolation {
    /// Wrap an infallible producer.
    pub fn producer<F, V>(f: F) -> Self
    where
        F: Fn(&PropertySet, &Attrs) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        Interpolation::Producer(Callback::from_arc(Arc::new(
            move |props: &PropertySet, attrs: &Attrs| Ok(f(props, attrs).into()),
        )))
    }

    /// Wrap a producer that can fail.
    pub fn try_producer<F>(f: F) -> Self
    where
        F: Fn(&PropertySet, &Attrs) -> Result<Value, ValueError> + Send + Sync + 'static,
    {
        Interpolation::Producer(Callback::from_arc(Arc::new(f)))
    }

    fn produce(&self, props: &PropertySet, attrs: &Attrs) -> Result<Value, ValueError> {
        match self {
            Interpolation::Literal(value) => Ok(value.clone()),
            Interpolation::Producer(f) => f(props, attrs),
        }
    }
}

/// Alternating text chunks and interpolations.
///
/// Always holds exactly one more chunk than values.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateFragment {
    chunks: Vec<String>,
    values: Vec<Interpolation>,
}

impl Default for TemplateFragment {
    fn default() -> Self {
        Self::empty()
    }
}

impl TemplateFragment {
    /// The identity for [`merge`]: a single empty chunk.
    pub fn empty() -> Self {
        Self {
            chunks: vec![String::new()],
            values: Vec::new(),
        }
    }

    /// A fragment with no holes.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            chunks: vec![text.into()],
            values: Vec::new(),
        }
    }

    /// Build a fragment from raw parts.
    ///
    /// # Errors
    /// Returns `ConfigError::MalformedTemplate` unless there is exactly one
    /// more chunk than values.
    pub fn new(chunks: Vec<String>, values: Vec<Interpolation>) -> Result<Self, ConfigError> {
        if chunks.len() != values.len() + 1 {
            return Err(ConfigError::MalformedTemplate {
                chunks: chunks.len(),
                values: values.len(),
            });
        }
        Ok(Self { chunks, values })
    }

    pub fn builder() -> TemplateBuilder {
        TemplateBuilder {
            fragment: Self::empty(),
        }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn values(&self) -> &[Interpolation] {
        &self.values
    }

    /// True if the fragment has no text and no holes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.chunks.iter().all(String::is_empty)
    }
}

/// Incremental builder that keeps the chunk invariant by construction.
#[derive(Debug)]
pub struct TemplateBuilder {
    fragment: TemplateFragment,
}

impl TemplateBuilder {
    /// Append text to the current chunk.
    pub fn text(mut self, text: &str) -> Self {
        if let Some(last) = self.fragment.chunks.last_mut() {
            last.push_str(text);
        }
        self
    }

    /// Append a hole filled by an infallible producer.
    pub fn value<F, V>(self, f: F) -> Self
    where
        F: Fn(&PropertySet, &Attrs) -> V + Send + Sync + 'static,
        V: Into<Value>,
    {
        self.interpolation(Interpolation::producer(f))
    }

    /// Append a hole filled by a producer that can fail.
    pub fn try_value<F>(self, f: F) -> Self
    where
        F: Fn(&PropertySet, &Attrs) -> Result<Value, ValueError> + Send + Sync + 'static,
    {
        self.interpolation(Interpolation::try_producer(f))
    }

    /// Append a constant hole.
    pub fn literal(self, value: impl Into<Value>) -> Self {
        self.interpolation(Interpolation::Literal(value.into()))
    }

    pub fn interpolation(mut self, interpolation: Interpolation) -> Self {
        self.fragment.values.push(interpolation);
        self.fragment.chunks.push(String::new());
        self
    }

    pub fn build(self) -> TemplateFragment {
        self.fragment
    }
}

/// Concatenate two fragments, joining `a`'s last chunk with `b`'s first.
///
/// Associative, with [`TemplateFragment::empty`] as identity.
pub fn merge(a: &TemplateFragment, b: &TemplateFragment) -> TemplateFragment {
    let mut chunks = Vec::with_capacity(a.chunks.len() + b.chunks.len() - 1);
    chunks.extend_from_slice(&a.chunks[..a.chunks.len() - 1]);

    let a_end = a.chunks.last().map_or("", String::as_str);
    let b_start = b.chunks.first().map_or("", String::as_str);
    chunks.push(format!("{a_end}{b_start}"));
    chunks.extend(b.chunks.iter().skip(1).cloned());

    let mut values = Vec::with_capacity(a.values.len() + b.values.len());
    values.extend(a.values.iter().cloned());
    values.extend(b.values.iter().cloned());

    TemplateFragment { chunks, values }
}

/// Fill every hole and join the result.
///
/// Producers run in sequence order. A falsy result contributes an empty
/// string; every chunk is always emitted.
///
/// # Errors
/// Returns `StyleError::Template` with the hole index if a producer fails.
pub fn evaluate(
    fragment: &TemplateFragment,
    props: &PropertySet,
    attrs: &Attrs,
) -> Result<String, StyleError> {
    let mut out = String::with_capacity(fragment.chunks.iter().map(String::len).sum());
    let mut chunks = fragment.chunks.iter();
    if let Some(first) = chunks.next() {
        out.push_str(first);
    }

    for (index, (interpolation, chunk)) in fragment.values.iter().zip(chunks).enumerate() {
        let value = interpolation
            .produce(props, attrs)
            .map_err(|source| StyleError::Template { index, source })?;
        if value.is_truthy() {
            out.push_str(&value.to_string());
        }
        out.push_str(chunk);
    }

    trace!(template.holes = fragment.values.len(), template.len = out.len(), "Template evaluated");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size_px() -> TemplateFragment {
        TemplateFragment::builder()
            .text("font-size: ")
            .value(|p: &PropertySet, _: &Attrs| p.get("size").clone())
            .text("px;")
            .build()
    }

    #[test]
    fn test_builder_keeps_invariant() {
        let fragment = size_px();
        assert_eq!(fragment.chunks().len(), fragment.values().len() + 1);
        assert_eq!(fragment.chunks(), ["font-size: ", "px;"]);
    }

    #[test]
    fn test_new_rejects_malformed() {
        let err = TemplateFragment::new(vec!["a".into(), "b".into()], vec![]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::MalformedTemplate {
                chunks: 2,
                values: 0
            }
        );
    }

    #[test]
    fn test_merge_joins_boundary_chunks() {
        let a = TemplateFragment::builder().text("a").literal(1).text("b").build();
        let b = TemplateFragment::builder().text("c").literal(2).text("d").build();
        let merged = merge(&a, &b);
        assert_eq!(merged.chunks(), ["a", "bc", "d"]);
        assert_eq!(merged.values().len(), 2);
    }

    #[test]
    fn test_merge_identity() {
        let fragment = size_px();
        assert_eq!(merge(&TemplateFragment::empty(), &fragment), fragment);
        assert_eq!(merge(&fragment, &TemplateFragment::empty()), fragment);
    }

    #[test]
    fn test_merge_is_associative() {
        let a = size_px();
        let b = TemplateFragment::builder().text(" x:").literal("y").build();
        let c = TemplateFragment::text(";");
        assert_eq!(merge(&merge(&a, &b), &c), merge(&a, &merge(&b, &c)));
    }

    #[test]
    fn test_evaluate_interleaves() {
        let props = PropertySet::new().with("size", 12);
        let css = evaluate(&size_px(), &props, &Attrs::new()).unwrap();
        assert_eq!(css, "font-size: 12px;");
    }

    #[test]
    fn test_evaluate_falsy_contributes_nothing() {
        let fragment = TemplateFragment::builder()
            .text("[")
            .literal(false)
            .text("|")
            .literal(0)
            .text("|")
            .literal(Value::Unset)
            .text("|")
            .literal("")
            .text("]")
            .build();
        let css = evaluate(&fragment, &PropertySet::new(), &Attrs::new()).unwrap();
        assert_eq!(css, "[|||]");
    }

    #[test]
    fn test_evaluate_reads_attrs() {
        let fragment = TemplateFragment::builder()
            .text("cursor: ")
            .value(|_: &PropertySet, a: &Attrs| {
                if a.is_truthy("href") { "pointer" } else { "default" }
            })
            .build();
        let attrs = Attrs::new().with("href", "/home");
        let css = evaluate(&fragment, &PropertySet::new(), &attrs).unwrap();
        assert_eq!(css, "cursor: pointer");
    }

    #[test]
    fn test_evaluate_propagates_producer_error() {
        let fragment = TemplateFragment::builder()
            .literal("ok")
            .try_value(|_: &PropertySet, _: &Attrs| Err(ValueError::new("boom")))
            .build();
        let err = evaluate(&fragment, &PropertySet::new(), &Attrs::new()).unwrap_err();
        assert_eq!(
            err,
            StyleError::Template {
                index: 1,
                source: ValueError::new("boom")
            }
        );
    }
}
