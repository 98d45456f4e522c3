//! The literal contract
//!
//! Defines the [`Literal`] trait shared by [`crate::SimpleLiteral`] and
//! [`crate::ConvertedLiteral`], the [`Quantifier`] that drives multi-value
//! checks, and the helpers both implementations build on.

use crate::converted::ConvertedLiteral;
use crate::error::LiteralError;
use crate::iter::LiteralIter;
use crate::unparsed::Source;
use lit_types::{ChangeMode, ConversionPolicy, Element, Registry, StringMode, TypeTag, Value};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// Shared, type-erased literal
pub type LiteralRef = Arc<dyn Literal>;

/// How multi-value checks combine per-element results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    /// Every element must satisfy
    #[default]
    And,
    /// At least one element must satisfy
    Or,
}

impl Quantifier {
    #[inline]
    #[must_use]
    pub fn from_and(and: bool) -> Self {
        if and {
            Self::And
        } else {
            Self::Or
        }
    }

    #[inline]
    #[must_use]
    pub fn is_and(self) -> bool {
        self == Self::And
    }

    /// Quantifier a literal of `len` elements actually uses
    ///
    /// A single element cannot be disjoined, so it is always `And`.
    #[inline]
    #[must_use]
    pub fn normalized(self, len: usize) -> Self {
        if len == 1 {
            Self::And
        } else {
            self
        }
    }

    /// Word joining the last two elements in lists
    #[inline]
    #[must_use]
    pub fn conjunction(self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

/// A statically-known value of one semantic type
///
/// Holds one or more elements of a single element type. Consumers read it
/// uniformly whether one or many values were produced, convert it to other
/// types through the [`Registry`], and mutate its elements through the
/// element type's changer.
///
/// # Invariants
/// - At least one element, none absent
/// - Every element is assignable to [`Literal::element_type`]
/// - A single-element literal always uses [`Quantifier::And`]
pub trait Literal: Send + Sync + Debug {
    /// Semantic type of every element
    fn element_type(&self) -> TypeTag;

    /// Registry used for rendering, conversion and mutation
    fn registry(&self) -> &Arc<Registry>;

    /// Combination rule for checks and display
    fn quantifier(&self) -> Quantifier;

    /// Check if this literal was substituted because nothing was supplied
    fn is_default(&self) -> bool;

    /// Number of elements
    fn len(&self) -> usize;

    /// Every element, in order
    fn all_values(&self) -> Vec<Value>;

    /// The only element, or a uniformly random one if there are several
    fn single_value(&self) -> Value;

    /// Convert to `target`
    ///
    /// Returns `self` if the element type is already assignable to
    /// `target`, a [`ConvertedLiteral`] if every element converts, and
    /// `None` if there is no converter or any element is declined.
    fn convert_to(self: Arc<Self>, target: TypeTag) -> Option<LiteralRef>;

    /// Delta types accepted by the element type's changer for `mode`
    ///
    /// `None` if the type has no changer or the changer refuses the mode.
    fn accept_change(&self, mode: ChangeMode) -> Option<Vec<TypeTag>>;

    /// Apply `delta` to the elements through the element type's changer
    ///
    /// # Errors
    /// Returns error if the change is not supported or the changer fails;
    /// the elements are left untouched in that case
    fn change(&self, delta: &[Value], mode: ChangeMode) -> Result<(), LiteralError>;

    /// Where this literal came from
    fn source(&self) -> Source;

    /// Render the elements as a list joined by the quantifier
    fn to_display_string(&self, debug: bool) -> String {
        render_literal(self.registry(), &self.all_values(), self.quantifier(), debug)
    }

    #[inline]
    fn is_and(&self) -> bool {
        self.quantifier().is_and()
    }

    /// Check if the literal holds exactly one element
    #[inline]
    fn is_single(&self) -> bool {
        self.len() == 1
    }

    /// Evaluate `predicate` over the elements, combined by the quantifier
    ///
    /// `negated` flips each element's result before combining: with `And`
    /// every element must then fail, with `Or` at least one must fail.
    fn check(&self, predicate: &dyn Fn(&Value) -> bool, negated: bool) -> bool {
        check_values(&self.all_values(), predicate, negated, self.quantifier())
    }

    /// Iterate over the elements
    ///
    /// Each call starts a fresh traversal.
    fn iter(&self) -> LiteralIter {
        LiteralIter::new(self.all_values())
    }

    /// Literals always initialize
    #[inline]
    fn init(&self) -> bool {
        true
    }
}

/// Typed conveniences over [`Literal`]
pub trait LiteralExt: Literal {
    /// Random element downcast to `T`
    fn single_as<T: Element + Clone>(&self) -> Option<T> {
        self.single_value().downcast_ref::<T>().cloned()
    }

    /// Every element downcast to `T`
    ///
    /// `None` if any element is not a `T`.
    fn values_as<T: Element + Clone>(&self) -> Option<Vec<T>> {
        self.all_values()
            .iter()
            .map(|v| v.downcast_ref::<T>().cloned())
            .collect()
    }

    /// [`Literal::check`] with a typed predicate
    ///
    /// Elements that are not a `T` fail the predicate.
    fn check_as<T: Element>(&self, predicate: impl Fn(&T) -> bool, negated: bool) -> bool {
        self.check(&|v: &Value| v.downcast_ref::<T>().is_some_and(&predicate), negated)
    }
}

impl<L: Literal + ?Sized> LiteralExt for L {}

/// Combine per-element results by quantifier
#[must_use]
pub fn check_values(
    values: &[Value],
    predicate: &dyn Fn(&Value) -> bool,
    negated: bool,
    quantifier: Quantifier,
) -> bool {
    let holds = |v: &Value| predicate(v) != negated;
    match quantifier {
        Quantifier::And => values.iter().all(holds),
        Quantifier::Or => values.iter().any(holds),
    }
}

/// Pick one element uniformly at random
///
/// `values` must not be empty.
pub(crate) fn pick_single<R: Rng>(values: &[Value], rng: &mut R) -> Value {
    if values.len() == 1 {
        return values[0].clone();
    }
    values[rng.random_range(0..values.len())].clone()
}

pub(crate) fn render_literal(
    registry: &Registry,
    values: &[Value],
    quantifier: Quantifier,
    debug: bool,
) -> String {
    if debug {
        format!(
            "[{}]",
            registry.render_list(values, quantifier.is_and(), StringMode::Debug)
        )
    } else {
        registry.render_list(values, quantifier.is_and(), StringMode::Message)
    }
}

/// Shared conversion path for every literal implementation
pub(crate) fn convert_literal(this: LiteralRef, target: TypeTag) -> Option<LiteralRef> {
    let registry = Arc::clone(this.registry());
    let from = this.element_type();
    if registry.is_assignable(from, target) {
        return Some(this);
    }

    let Some(converter) = registry.converter(from, target) else {
        debug!(from = %from, to = %target, "no conversion path");
        return None;
    };

    let values = this.all_values();
    let Some(converted) =
        registry.convert_values(&values, &converter, target, ConversionPolicy::AllOrNothing)
    else {
        debug!(from = %from, to = %target, len = values.len(), "conversion declined an element");
        return None;
    };

    match ConvertedLiteral::new(this, converted, target) {
        Ok(view) => Some(Arc::new(view)),
        Err(e) => {
            debug!(from = %from, to = %target, error = %e, "converted literal rejected");
            None
        }
    }
}
