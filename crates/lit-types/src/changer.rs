//! In-place mutation of literal elements
//!
//! A [`Changer`] is registered per semantic type and performs
//! set/add/remove/reset/delete on the elements of a literal.

use crate::tag::TypeTag;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display, Formatter};

/// Kind of mutation requested on a literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeMode {
    /// Add the delta to every element
    Add,
    /// Replace every element with the delta
    Set,
    /// Remove the delta from every element
    Remove,
    /// Remove every occurrence of the delta
    RemoveAll,
    /// Delete the elements
    Delete,
    /// Reset the elements to their type's default
    Reset,
}

impl ChangeMode {
    /// All modes, in declaration order
    pub const ALL: [ChangeMode; 6] = [
        Self::Add,
        Self::Set,
        Self::Remove,
        Self::RemoveAll,
        Self::Delete,
        Self::Reset,
    ];

    /// Check if the mode carries a delta
    ///
    /// `Delete` and `Reset` are applied without one.
    #[inline]
    #[must_use]
    pub fn takes_delta(self) -> bool {
        !matches!(self, Self::Delete | Self::Reset)
    }
}

impl Display for ChangeMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Add => "add",
            Self::Set => "set",
            Self::Remove => "remove",
            Self::RemoveAll => "remove all",
            Self::Delete => "delete",
            Self::Reset => "reset",
        };
        f.write_str(s)
    }
}

/// Mutation handler for one semantic type
///
/// Implement this for types whose literals may be modified by scripts.
/// Callers must query [`Changer::accept_change`] before calling
/// [`Changer::change`].
pub trait Changer: Send + Sync + Debug {
    /// Delta types accepted for `mode`
    ///
    /// Returns `None` if the mode is not supported at all. An empty list
    /// means the mode is supported without a delta.
    fn accept_change(&self, mode: ChangeMode) -> Option<Vec<TypeTag>>;

    /// Apply `delta` to `elements`
    ///
    /// Elements may be mutated through interior mutability or replaced in
    /// the slice. The slice length never changes.
    ///
    /// # Errors
    /// Returns error if the mode, delta or an element is not supported
    fn change(
        &self,
        elements: &mut [Value],
        delta: &[Value],
        mode: ChangeMode,
    ) -> Result<(), ChangeError>;
}

/// Errors raised by changers
#[derive(Debug, thiserror::Error)]
pub enum ChangeError {
    /// Mode not supported by this changer
    #[error("change mode '{0}' is not supported")]
    UnsupportedMode(ChangeMode),

    /// Delta missing or of the wrong shape
    #[error("invalid delta: {0}")]
    InvalidDelta(String),

    /// Element of a type the changer cannot handle
    #[error("cannot change element of type {actual}, expected {expected}")]
    WrongElementType { expected: TypeTag, actual: TypeTag },

    /// Generic failure
    #[error("{0}")]
    Failed(String),
}
