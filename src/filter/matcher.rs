//! Generic per-field filter evaluation.

use regex::Regex;
use std::fmt;
use std::sync::Arc;

use crate::band::Band;
use crate::record::Speed;

/// Boxed predicate over a field value.
pub type PredicateFn<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

/// The string form of a field value, used by [`Filter::Pattern`].
pub trait FieldText {
    fn field_text(&self) -> String;
}

macro_rules! field_text_via_display {
    ($($ty:ty),*) => {
        $(impl FieldText for $ty {
            fn field_text(&self) -> String {
                self.to_string()
            }
        })*
    };
}

field_text_via_display!(String, i32, u32, Band, Speed);

impl FieldText for f64 {
    // Keeps the fractional part: 14025.0 renders as "14025.0", not "14025".
    fn field_text(&self) -> String {
        format!("{:?}", self)
    }
}

impl FieldText for Option<Band> {
    fn field_text(&self) -> String {
        self.map(|b| b.to_string()).unwrap_or_default()
    }
}

/// A regex that only matches at the start of the value.
///
/// `W1` matches `W1AW` but not `KW1AW`.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})", source))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The pattern as written by the user, without the anchor.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// A filter over a single field of type `V`.
///
/// Lists and inversions nest freely; evaluation always bottoms out in
/// equality, a pattern or a predicate.
pub enum Filter<V> {
    /// No constraint.
    Any,
    /// Equal to the value.
    Exact(V),
    /// At least one alternative matches. An empty list matches nothing.
    AnyOf(Vec<Filter<V>>),
    /// Evaluate `inner`, negating the result when `invert` is set.
    Invert { inner: Box<Filter<V>>, invert: bool },
    /// Arbitrary predicate over the value.
    Predicate(PredicateFn<V>),
    /// Anchored regex against the value's [`FieldText`].
    Pattern(Pattern),
}

impl<V> Default for Filter<V> {
    fn default() -> Self {
        Filter::Any
    }
}

impl<V: fmt::Debug> fmt::Debug for Filter<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Any => write!(f, "Any"),
            Filter::Exact(v) => f.debug_tuple("Exact").field(v).finish(),
            Filter::AnyOf(list) => f.debug_tuple("AnyOf").field(list).finish(),
            Filter::Invert { inner, invert } => f
                .debug_struct("Invert")
                .field("inner", inner)
                .field("invert", invert)
                .finish(),
            Filter::Predicate(_) => write!(f, "Predicate(..)"),
            Filter::Pattern(p) => f.debug_tuple("Pattern").field(&p.as_str()).finish(),
        }
    }
}

impl<V: Clone> Clone for Filter<V> {
    fn clone(&self) -> Self {
        match self {
            Filter::Any => Filter::Any,
            Filter::Exact(v) => Filter::Exact(v.clone()),
            Filter::AnyOf(list) => Filter::AnyOf(list.clone()),
            Filter::Invert { inner, invert } => Filter::Invert {
                inner: inner.clone(),
                invert: *invert,
            },
            Filter::Predicate(p) => Filter::Predicate(Arc::clone(p)),
            Filter::Pattern(p) => Filter::Pattern(p.clone()),
        }
    }
}

impl<V> Filter<V> {
    pub fn any_of(alternatives: impl IntoIterator<Item = Filter<V>>) -> Self {
        Filter::AnyOf(alternatives.into_iter().collect())
    }

    /// Alternatives of exact values.
    pub fn one_of(values: impl IntoIterator<Item = V>) -> Self {
        Filter::AnyOf(values.into_iter().map(Filter::Exact).collect())
    }

    pub fn predicate(f: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        Filter::Predicate(Arc::new(f))
    }

    pub fn pattern(source: &str) -> Result<Self, regex::Error> {
        Pattern::new(source).map(Filter::Pattern)
    }

    /// Wrap this filter, negating it when `invert` is true.
    pub fn inverted(self, invert: bool) -> Self {
        Filter::Invert {
            inner: Box::new(self),
            invert,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Filter::Any)
    }
}

impl<V: PartialEq + FieldText> Filter<V> {
    /// Check whether `value` passes this filter.
    pub fn matches(&self, value: &V) -> bool {
        match self {
            Filter::Any => true,
            Filter::Exact(expected) => expected == value,
            Filter::AnyOf(alternatives) => alternatives.iter().any(|f| f.matches(value)),
            Filter::Invert { inner, invert } => inner.matches(value) != *invert,
            Filter::Predicate(predicate) => predicate(value),
            Filter::Pattern(pattern) => pattern.matches(&value.field_text()),
        }
    }
}
