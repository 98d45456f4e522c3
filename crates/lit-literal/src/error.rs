//! Literal errors

use lit_types::{ChangeError, ChangeMode, TypeTag};

/// Errors related to literal construction and mutation
#[derive(Debug, thiserror::Error)]
pub enum LiteralError {
    /// Literal built without elements
    #[error("a literal needs at least one element")]
    Empty,

    /// Absent element handed to the constructor
    #[error("element {index} is absent")]
    AbsentElement { index: usize },

    /// Element not assignable to the literal's element type
    #[error("element {index} has type {actual}, expected {expected}")]
    ElementTypeMismatch {
        expected: TypeTag,
        actual: TypeTag,
        index: usize,
    },

    /// Converted elements do not line up with their origin
    #[error("converted literal has {actual} elements, origin has {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Element type has no changer, or the changer refuses the mode
    #[error("cannot {mode} values of type '{type_name}'")]
    UnsupportedChange { type_name: String, mode: ChangeMode },

    /// Delta value of a type the changer does not accept
    #[error("cannot {mode} '{type_name}' with a value of type {delta}")]
    RejectedDelta {
        type_name: String,
        mode: ChangeMode,
        delta: TypeTag,
    },

    /// Changer failed
    #[error("change failed: {0}")]
    Change(#[from] ChangeError),
}

impl LiteralError {
    /// Check if the error is a construction error
    ///
    /// Construction errors signal a bug in the producing layer.
    #[inline]
    #[must_use]
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::Empty
                | Self::AbsentElement { .. }
                | Self::ElementTypeMismatch { .. }
                | Self::LengthMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_errors_classified() {
        assert!(LiteralError::Empty.is_construction());
        assert!(LiteralError::AbsentElement { index: 1 }.is_construction());
        let change = LiteralError::UnsupportedChange {
            type_name: "text".to_string(),
            mode: ChangeMode::Add,
        };
        assert!(!change.is_construction());
    }

    #[test]
    fn unsupported_change_message() {
        let err = LiteralError::UnsupportedChange {
            type_name: "text".to_string(),
            mode: ChangeMode::RemoveAll,
        };
        assert_eq!(err.to_string(), "cannot remove all values of type 'text'");
    }
}
