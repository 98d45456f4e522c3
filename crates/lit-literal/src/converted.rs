//! Converted view
//!
//! Provides [`ConvertedLiteral`], the result of converting a literal to
//! another element type.

use crate::error::LiteralError;
use crate::expression::{convert_literal, Literal, LiteralRef, Quantifier};
use crate::simple::SimpleLiteral;
use crate::unparsed::Source;
use lit_types::{ChangeMode, Registry, TypeTag, Value};
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Literal derived from another by element-wise conversion
///
/// Keeps its origin alive and reports it as its source. Holds exactly as
/// many elements as the origin, combined by the origin's quantifier.
pub struct ConvertedLiteral {
    inner: SimpleLiteral,
    origin: LiteralRef,
}

impl ConvertedLiteral {
    /// Wrap `values` converted from `origin` to `target`
    ///
    /// # Errors
    /// Returns error if `values` does not line up with the origin's
    /// elements or an element is not assignable to `target`
    pub fn new(
        origin: LiteralRef,
        values: Vec<Value>,
        target: TypeTag,
    ) -> Result<Self, LiteralError> {
        let expected = origin.len();
        if values.len() != expected {
            return Err(LiteralError::LengthMismatch {
                expected,
                actual: values.len(),
            });
        }
        let inner = SimpleLiteral::new(
            Arc::clone(origin.registry()),
            values,
            target,
            origin.quantifier(),
        )?
        .with_default(origin.is_default());
        Ok(Self { inner, origin })
    }

    /// Literal this one was converted from
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &LiteralRef {
        &self.origin
    }
}

impl Literal for ConvertedLiteral {
    #[inline]
    fn element_type(&self) -> TypeTag {
        self.inner.element_type()
    }

    #[inline]
    fn registry(&self) -> &Arc<Registry> {
        self.inner.registry()
    }

    #[inline]
    fn quantifier(&self) -> Quantifier {
        self.inner.quantifier()
    }

    #[inline]
    fn is_default(&self) -> bool {
        self.inner.is_default()
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn all_values(&self) -> Vec<Value> {
        self.inner.all_values()
    }

    fn single_value(&self) -> Value {
        self.inner.single_value()
    }

    fn convert_to(self: Arc<Self>, target: TypeTag) -> Option<LiteralRef> {
        convert_literal(self, target)
    }

    fn accept_change(&self, mode: ChangeMode) -> Option<Vec<TypeTag>> {
        self.inner.accept_change(mode)
    }

    /// Changes the converted elements only; the origin is not touched
    fn change(&self, delta: &[Value], mode: ChangeMode) -> Result<(), LiteralError> {
        self.inner.change(delta, mode)
    }

    fn source(&self) -> Source {
        Source::Origin(Arc::clone(&self.origin))
    }

    fn to_display_string(&self, debug: bool) -> String {
        let own = self.inner.to_display_string(debug);
        if debug {
            format!("{own} (converted from {})", self.origin.to_display_string(true))
        } else {
            own
        }
    }
}

impl Display for ConvertedLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string(false))
    }
}

impl Debug for ConvertedLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertedLiteral")
            .field("inner", &self.inner)
            .field("origin", &self.origin)
            .finish()
    }
}
