//! Literal value container
//!
//! Provides [`SimpleLiteral`], the owning implementation of [`Literal`].

use crate::error::LiteralError;
use crate::expression::{convert_literal, pick_single, Literal, LiteralRef, Quantifier};
use crate::unparsed::{Source, UnparsedLiteral};
use lit_types::{ChangeError, ChangeMode, Changer, Element, Registry, TypeTag, Value};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use rand::Rng;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, Weak};
use tracing::trace;

/// One or more values of a single semantic type
///
/// Built once by the layer that parsed or computed the values. Element
/// handles are fixed after construction apart from [`Literal::change`],
/// which swaps them only when the element type's changer succeeds.
///
/// # Invariants
/// - `values` is never empty
/// - Every element is assignable to `element_type`
/// - `quantifier` is `And` whenever there is exactly one element
pub struct SimpleLiteral {
    registry: Arc<Registry>,
    element_type: TypeTag,
    values: RwLock<Vec<Value>>,
    quantifier: Quantifier,
    is_default: bool,
    source: Option<Weak<UnparsedLiteral>>,
    changer: OnceCell<Option<Arc<dyn Changer>>>,
}

impl SimpleLiteral {
    /// Create a literal holding `values` of `element_type`
    ///
    /// # Errors
    /// Returns error if `values` is empty or an element is not assignable to
    /// `element_type`
    pub fn new(
        registry: Arc<Registry>,
        values: Vec<Value>,
        element_type: TypeTag,
        quantifier: Quantifier,
    ) -> Result<Self, LiteralError> {
        if values.is_empty() {
            return Err(LiteralError::Empty);
        }
        if let Some((index, value)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !registry.is_assignable(v.tag(), element_type))
        {
            return Err(LiteralError::ElementTypeMismatch {
                expected: element_type,
                actual: value.tag(),
                index,
            });
        }

        let quantifier = quantifier.normalized(values.len());
        Ok(Self {
            registry,
            element_type,
            values: RwLock::new(values),
            quantifier,
            is_default: false,
            source: None,
            changer: OnceCell::new(),
        })
    }

    /// Create a literal holding one value of its own concrete type
    #[must_use]
    pub fn single(registry: Arc<Registry>, value: Value, is_default: bool) -> Self {
        Self {
            registry,
            element_type: value.tag(),
            values: RwLock::new(vec![value]),
            quantifier: Quantifier::And,
            is_default,
            source: None,
            changer: OnceCell::new(),
        }
    }

    /// Create a literal from typed elements
    ///
    /// # Errors
    /// Returns error if `elements` is empty
    pub fn of<T: Element>(
        registry: Arc<Registry>,
        elements: impl IntoIterator<Item = T>,
        quantifier: Quantifier,
    ) -> Result<Self, LiteralError> {
        let values = elements.into_iter().map(Value::new).collect();
        Self::new(registry, values, TypeTag::of::<T>(), quantifier)
    }

    /// Create a literal from slots that may be absent
    ///
    /// # Errors
    /// Returns error if any slot is absent, in addition to the errors of
    /// [`SimpleLiteral::new`]
    pub fn from_slots(
        registry: Arc<Registry>,
        slots: Vec<Option<Value>>,
        element_type: TypeTag,
        quantifier: Quantifier,
    ) -> Result<Self, LiteralError> {
        let values = slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.ok_or(LiteralError::AbsentElement { index }))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(registry, values, element_type, quantifier)
    }

    /// Record the raw token this literal was parsed from
    ///
    /// Only a weak link is kept; once the token is dropped the literal
    /// reports itself as its source.
    #[inline]
    #[must_use]
    pub fn with_source(mut self, raw: &Arc<UnparsedLiteral>) -> Self {
        self.source = Some(Arc::downgrade(raw));
        self
    }

    /// Mark as a substituted default
    #[inline]
    #[must_use]
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }

    /// [`Literal::single_value`] with a caller-supplied random source
    pub fn single_value_with<R: Rng>(&self, rng: &mut R) -> Value {
        pick_single(&self.values.read(), rng)
    }

    /// Reduce to the simplest equivalent literal
    ///
    /// A literal is already as simple as it gets.
    #[inline]
    #[must_use]
    pub fn simplify(self: Arc<Self>) -> LiteralRef {
        self
    }

    fn resolve_changer(&self) -> Option<&Arc<dyn Changer>> {
        self.changer
            .get_or_init(|| {
                let changer = self.registry.changer_for(self.element_type);
                trace!(
                    element_type = %self.element_type,
                    found = changer.is_some(),
                    "resolved changer"
                );
                changer
            })
            .as_ref()
    }

    fn type_name(&self) -> String {
        self.registry.types().user_name(self.element_type)
    }
}

impl Literal for SimpleLiteral {
    #[inline]
    fn element_type(&self) -> TypeTag {
        self.element_type
    }

    #[inline]
    fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    #[inline]
    fn quantifier(&self) -> Quantifier {
        self.quantifier
    }

    #[inline]
    fn is_default(&self) -> bool {
        self.is_default
    }

    fn len(&self) -> usize {
        self.values.read().len()
    }

    fn all_values(&self) -> Vec<Value> {
        self.values.read().clone()
    }

    fn single_value(&self) -> Value {
        self.single_value_with(&mut rand::rng())
    }

    fn convert_to(self: Arc<Self>, target: TypeTag) -> Option<LiteralRef> {
        convert_literal(self, target)
    }

    fn accept_change(&self, mode: ChangeMode) -> Option<Vec<TypeTag>> {
        self.resolve_changer()?.accept_change(mode)
    }

    /// Elements are handed to the changer as a copy of the handle list and
    /// written back only if the changer succeeds and every element still
    /// fits the element type. Changes made through an element's interior
    /// mutability are visible immediately.
    fn change(&self, delta: &[Value], mode: ChangeMode) -> Result<(), LiteralError> {
        let unsupported = || LiteralError::UnsupportedChange {
            type_name: self.type_name(),
            mode,
        };
        let changer = self.resolve_changer().ok_or_else(unsupported)?;
        let accepted = changer.accept_change(mode).ok_or_else(unsupported)?;

        if let Some(rejected) = delta.iter().find(|d| {
            !accepted
                .iter()
                .any(|t| self.registry.is_assignable(d.tag(), *t))
        }) {
            return Err(LiteralError::RejectedDelta {
                type_name: self.type_name(),
                mode,
                delta: rejected.tag(),
            });
        }

        let mut values = self.values.write();
        let mut scratch = values.clone();
        changer.change(&mut scratch, delta, mode)?;

        if let Some(bad) = scratch
            .iter()
            .find(|v| !self.registry.is_assignable(v.tag(), self.element_type))
        {
            return Err(ChangeError::WrongElementType {
                expected: self.element_type,
                actual: bad.tag(),
            }
            .into());
        }

        *values = scratch;
        Ok(())
    }

    fn source(&self) -> Source {
        match self.source.as_ref().and_then(Weak::upgrade) {
            Some(raw) => Source::Unparsed(raw),
            None => Source::Itself,
        }
    }
}

impl Display for SimpleLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string(false))
    }
}

impl Debug for SimpleLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleLiteral")
            .field("element_type", &self.element_type)
            .field("values", &*self.values.read())
            .field("quantifier", &self.quantifier)
            .field("is_default", &self.is_default)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::LiteralExt;
    use lit_types::TypeInfo;
    use pretty_assertions::assert_eq;

    /// Adds the delta to every `i64` element
    #[derive(Debug)]
    struct AddChanger;

    impl Changer for AddChanger {
        fn accept_change(&self, mode: ChangeMode) -> Option<Vec<TypeTag>> {
            match mode {
                ChangeMode::Add => Some(vec![TypeTag::of::<i64>()]),
                ChangeMode::Reset => Some(Vec::new()),
                _ => None,
            }
        }

        fn change(
            &self,
            elements: &mut [Value],
            delta: &[Value],
            mode: ChangeMode,
        ) -> Result<(), ChangeError> {
            let by: i64 = delta.iter().filter_map(|d| d.downcast_ref::<i64>()).sum();
            for (i, element) in elements.iter_mut().enumerate() {
                let current = *element.downcast_ref::<i64>().ok_or(ChangeError::WrongElementType {
                    expected: TypeTag::of::<i64>(),
                    actual: element.tag(),
                })?;
                if current == 13 {
                    return Err(ChangeError::Failed(format!("element {i} is unlucky")));
                }
                *element = match mode {
                    ChangeMode::Add => Value::new(current + by),
                    _ => Value::new(0i64),
                };
            }
            Ok(())
        }
    }

    /// Replaces elements with text, which breaks the element type
    #[derive(Debug)]
    struct BrokenChanger;

    impl Changer for BrokenChanger {
        fn accept_change(&self, _mode: ChangeMode) -> Option<Vec<TypeTag>> {
            Some(Vec::new())
        }

        fn change(
            &self,
            elements: &mut [Value],
            _delta: &[Value],
            _mode: ChangeMode,
        ) -> Result<(), ChangeError> {
            for element in elements {
                *element = Value::new("oops".to_string());
            }
            Ok(())
        }
    }

    fn registry() -> Arc<Registry> {
        Registry::builder()
            .register_type(TypeInfo::new::<i64>("integer").with_changer(AddChanger))
            .register_type(TypeInfo::new::<String>("text").with_user_name("text"))
            .register_type(TypeInfo::new::<u8>("byte").with_changer(BrokenChanger))
            .build_shared()
            .unwrap()
    }

    fn ints(values: &[i64], quantifier: Quantifier) -> SimpleLiteral {
        SimpleLiteral::of(registry(), values.iter().copied(), quantifier).unwrap()
    }

    fn as_ints(literal: &SimpleLiteral) -> Vec<i64> {
        literal
            .all_values()
            .iter()
            .filter_map(|v| v.downcast_ref::<i64>().copied())
            .collect()
    }

    #[test]
    fn empty_literal_rejected() {
        let result =
            SimpleLiteral::new(registry(), Vec::new(), TypeTag::of::<i64>(), Quantifier::And);
        assert!(matches!(result, Err(LiteralError::Empty)));
    }

    #[test]
    fn absent_slot_rejected() {
        let slots = vec![Some(Value::new(1i64)), None, Some(Value::new(3i64))];
        let result =
            SimpleLiteral::from_slots(registry(), slots, TypeTag::of::<i64>(), Quantifier::And);
        assert!(matches!(result, Err(LiteralError::AbsentElement { index: 1 })));
    }

    #[test]
    fn mismatched_element_rejected() {
        let values = vec![Value::new(1i64), Value::new("x".to_string())];
        let result = SimpleLiteral::new(registry(), values, TypeTag::of::<i64>(), Quantifier::And);
        assert!(matches!(
            result,
            Err(LiteralError::ElementTypeMismatch { index: 1, .. })
        ));
    }

    #[test]
    fn object_type_holds_anything() {
        let values = vec![Value::new(1i64), Value::new("x".to_string())];
        let literal =
            SimpleLiteral::new(registry(), values, TypeTag::object(), Quantifier::Or).unwrap();
        assert_eq!(literal.len(), 2);
    }

    #[test]
    fn singleton_is_always_and() {
        let literal = ints(&[4], Quantifier::Or);
        assert_eq!(literal.quantifier(), Quantifier::And);
        assert!(literal.is_single());
        assert!(!ints(&[1, 2, 3], Quantifier::Or).is_single());
    }

    #[test]
    fn display_joins_by_quantifier() {
        assert_eq!(ints(&[1, 2, 3], Quantifier::And).to_string(), "1, 2 and 3");
        assert_eq!(ints(&[1, 2, 3], Quantifier::Or).to_string(), "1, 2 or 3");
        assert_eq!(ints(&[1, 2], Quantifier::Or).to_display_string(true), "[1 or 2]");
    }

    #[test]
    fn iteration_is_restartable() {
        let literal = ints(&[1, 2, 3], Quantifier::And);
        assert_eq!(literal.iter().count(), 3);
        assert_eq!(literal.iter().count(), 3);
    }

    #[test]
    fn source_falls_back_to_itself() {
        let raw = Arc::new(UnparsedLiteral::new("1, 2 and 3"));
        let literal = ints(&[1, 2, 3], Quantifier::And).with_source(&raw);
        assert!(matches!(literal.source(), Source::Unparsed(r) if r.text() == "1, 2 and 3"));

        drop(raw);
        assert!(literal.source().is_itself());
    }

    #[test]
    fn default_flag() {
        let literal = SimpleLiteral::single(registry(), Value::new(0i64), true);
        assert!(literal.is_default());
        assert!(!literal.with_default(false).is_default());
    }

    #[test]
    fn change_commits_on_success() {
        let literal = ints(&[1, 2], Quantifier::And);
        literal.change(&[Value::new(10i64)], ChangeMode::Add).unwrap();
        assert_eq!(as_ints(&literal), vec![11, 12]);

        literal.change(&[], ChangeMode::Reset).unwrap();
        assert_eq!(as_ints(&literal), vec![0, 0]);
    }

    #[test]
    fn failed_change_leaves_elements() {
        let literal = ints(&[1, 13], Quantifier::And);
        let err = literal.change(&[Value::new(1i64)], ChangeMode::Add).unwrap_err();
        assert!(matches!(err, LiteralError::Change(ChangeError::Failed(_))));
        assert_eq!(as_ints(&literal), vec![1, 13]);
    }

    #[test]
    fn unsupported_mode_reported() {
        let literal = ints(&[1], Quantifier::And);
        assert!(literal.accept_change(ChangeMode::Delete).is_none());
        let err = literal.change(&[], ChangeMode::Delete).unwrap_err();
        assert!(matches!(err, LiteralError::UnsupportedChange { mode: ChangeMode::Delete, .. }));
    }

    #[test]
    fn type_without_changer_reported() {
        let literal = SimpleLiteral::single(registry(), Value::new("a".to_string()), false);
        assert!(literal.accept_change(ChangeMode::Set).is_none());
        let err = literal.change(&[], ChangeMode::Set).unwrap_err();
        assert_eq!(err.to_string(), "cannot set values of type 'text'");
    }

    #[test]
    fn wrong_delta_type_rejected() {
        let literal = ints(&[1], Quantifier::And);
        let err = literal
            .change(&[Value::new("1".to_string())], ChangeMode::Add)
            .unwrap_err();
        assert!(matches!(err, LiteralError::RejectedDelta { .. }));
        assert_eq!(as_ints(&literal), vec![1]);
    }

    #[test]
    fn change_cannot_break_element_type() {
        let literal = SimpleLiteral::single(registry(), Value::new(7u8), false);
        let err = literal.change(&[], ChangeMode::Reset).unwrap_err();
        assert!(matches!(err, LiteralError::Change(ChangeError::WrongElementType { .. })));
        assert_eq!(literal.single_as::<u8>(), Some(7));
    }

    #[test]
    fn shared_across_threads() {
        let literal = Arc::new(ints(&[1, 2, 3], Quantifier::Or));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let literal = Arc::clone(&literal);
                std::thread::spawn(move || {
                    literal.check(&|v: &Value| v.downcast_ref::<i64>() == Some(&2), false)
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
