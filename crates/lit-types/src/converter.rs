//! Converter registry
//!
//! Provides [`Converter`], a registered mapping from one semantic type to
//! another, and [`ConverterRegistry`] with batch conversion.

use crate::tag::TypeTag;
use crate::value::{Element, Value};
use dashmap::DashMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

/// Type-erased conversion function
///
/// Maps one source value to zero or one target value.
pub type ConverterFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Registered conversion between two semantic types
#[derive(Clone)]
pub struct Converter {
    from: TypeTag,
    to: TypeTag,
    func: ConverterFn,
}

impl Converter {
    /// Create a typed converter from `F` to `T`
    ///
    /// Values that are not exactly of type `F` are declined.
    #[must_use]
    pub fn new<F, T, C>(convert: C) -> Self
    where
        F: Element,
        T: Element,
        C: Fn(&F) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            from: TypeTag::of::<F>(),
            to: TypeTag::of::<T>(),
            func: Arc::new(move |value: &Value| {
                value.downcast_ref::<F>().and_then(&convert).map(Value::new)
            }),
        }
    }

    /// Create a type-erased converter between two tags
    ///
    /// Used for converters registered on abstract supertypes, where the
    /// concrete source type is only known at runtime.
    #[must_use]
    pub fn dynamic<C>(from: TypeTag, to: TypeTag, convert: C) -> Self
    where
        C: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            from,
            to,
            func: Arc::new(convert),
        }
    }

    #[inline]
    #[must_use]
    pub fn from(&self) -> TypeTag {
        self.from
    }

    #[inline]
    #[must_use]
    pub fn to(&self) -> TypeTag {
        self.to
    }

    /// Convert one value
    #[inline]
    #[must_use]
    pub fn convert(&self, value: &Value) -> Option<Value> {
        (self.func)(value)
    }
}

impl Debug for Converter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

/// What batch conversion does with declined elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConversionPolicy {
    /// Any declined element invalidates the whole batch
    #[default]
    AllOrNothing,
    /// Declined elements are left out of the result
    DropFailures,
}

/// Table of converters keyed by `(source, target)`
///
/// Lookups that need type hierarchy knowledge go through
/// [`crate::Registry::converter`], which memoizes its answers in this
/// registry's cache.
#[derive(Debug, Default)]
pub struct ConverterRegistry {
    converters: Vec<Converter>,
    cache: DashMap<(TypeTag, TypeTag), Option<Converter>>,
}

impl ConverterRegistry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a converter
    ///
    /// Converters registered earlier win when several could serve a lookup.
    pub fn register(&mut self, converter: Converter) {
        self.cache.clear();
        self.converters.push(converter);
    }

    /// Converter registered for exactly `(from, to)`
    #[must_use]
    pub fn exact(&self, from: TypeTag, to: TypeTag) -> Option<&Converter> {
        self.converters
            .iter()
            .find(|c| c.from == from && c.to == to)
    }

    /// Iterate over registered converters in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Converter> {
        self.converters.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.converters.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    pub(crate) fn cached(&self, key: (TypeTag, TypeTag)) -> Option<Option<Converter>> {
        self.cache.get(&key).map(|entry| entry.value().clone())
    }

    pub(crate) fn remember(&self, key: (TypeTag, TypeTag), converter: Option<Converter>) {
        self.cache.insert(key, converter);
    }

    /// Convert every value with `converter`
    ///
    /// Returns `None` under [`ConversionPolicy::AllOrNothing`] if any value
    /// is declined.
    #[must_use]
    pub fn convert_batch(
        values: &[Value],
        converter: &Converter,
        policy: ConversionPolicy,
    ) -> Option<Vec<Value>> {
        apply_policy(values, |v| converter.convert(v), policy)
    }
}

pub(crate) fn apply_policy<F>(
    values: &[Value],
    convert: F,
    policy: ConversionPolicy,
) -> Option<Vec<Value>>
where
    F: Fn(&Value) -> Option<Value>,
{
    match policy {
        ConversionPolicy::AllOrNothing => values.iter().map(convert).collect(),
        ConversionPolicy::DropFailures => Some(values.iter().filter_map(convert).collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_converter() -> Converter {
        Converter::new(|s: &String| s.parse::<i64>().ok())
    }

    #[test]
    fn typed_converter_tags() {
        let conv = parse_converter();
        assert_eq!(conv.from(), TypeTag::of::<String>());
        assert_eq!(conv.to(), TypeTag::of::<i64>());
    }

    #[test]
    fn typed_converter_declines_other_types() {
        let conv = parse_converter();
        assert!(conv.convert(&Value::new(3i64)).is_none());
        let out = conv.convert(&Value::new("3".to_string())).unwrap();
        assert_eq!(out.downcast_ref::<i64>(), Some(&3));
    }

    #[test]
    fn dynamic_converter() {
        let conv = Converter::dynamic(TypeTag::object(), TypeTag::of::<String>(), |v| {
            Some(Value::new(format!("{v:?}")))
        });
        let out = conv.convert(&Value::new(7u8)).unwrap();
        assert_eq!(out.downcast_ref::<String>().map(String::as_str), Some("7"));
    }

    #[test]
    fn exact_lookup() {
        let mut registry = ConverterRegistry::new();
        registry.register(parse_converter());
        assert!(registry.exact(TypeTag::of::<String>(), TypeTag::of::<i64>()).is_some());
        assert!(registry.exact(TypeTag::of::<i64>(), TypeTag::of::<String>()).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn batch_all_or_nothing() {
        let conv = parse_converter();
        let values: Vec<Value> = ["1", "2", "x"]
            .iter()
            .map(|s| Value::new(s.to_string()))
            .collect();
        let policy = ConversionPolicy::AllOrNothing;

        assert!(ConverterRegistry::convert_batch(&values, &conv, policy).is_none());
        let full = ConverterRegistry::convert_batch(&values[..2], &conv, policy).unwrap();
        assert_eq!(full.len(), 2);
    }

    #[test]
    fn batch_drop_failures() {
        let conv = parse_converter();
        let values: Vec<Value> = ["1", "x", "3"]
            .iter()
            .map(|s| Value::new(s.to_string()))
            .collect();

        let kept =
            ConverterRegistry::convert_batch(&values, &conv, ConversionPolicy::DropFailures)
                .unwrap();
        let ints: Vec<i64> = kept.iter().filter_map(|v| v.downcast_ref::<i64>().copied()).collect();
        assert_eq!(ints, vec![1, 3]);
    }

    #[test]
    fn register_clears_cache() {
        let mut registry = ConverterRegistry::new();
        let key = (TypeTag::of::<String>(), TypeTag::of::<i64>());
        registry.remember(key, None);
        assert!(registry.cached(key).is_some());

        registry.register(parse_converter());
        assert!(registry.cached(key).is_none());
    }
}
