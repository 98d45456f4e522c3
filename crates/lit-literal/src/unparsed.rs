//! Provenance of literals
//!
//! Provides [`UnparsedLiteral`], the raw token a literal was parsed from,
//! and [`Source`], what a literal reports as its origin.

use crate::expression::LiteralRef;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

/// Raw source token a literal was derived from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnparsedLiteral {
    text: String,
    line: Option<usize>,
}

impl UnparsedLiteral {
    /// Create from token text
    #[inline]
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            line: None,
        }
    }

    /// Attach the source line
    #[inline]
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.line
    }
}

impl Display for UnparsedLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// What a literal reports as its provenance
#[derive(Clone)]
pub enum Source {
    /// The literal is its own source
    Itself,
    /// Parsed from a raw token that is still reachable
    Unparsed(Arc<UnparsedLiteral>),
    /// Derived by conversion from another literal
    Origin(LiteralRef),
}

impl Source {
    /// Check if the literal is its own source
    #[inline]
    #[must_use]
    pub fn is_itself(&self) -> bool {
        matches!(self, Self::Itself)
    }
}

impl Debug for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Itself => f.write_str("Itself"),
            Self::Unparsed(raw) => f.debug_tuple("Unparsed").field(&raw.text).finish(),
            Self::Origin(origin) => f
                .debug_tuple("Origin")
                .field(&origin.to_display_string(true))
                .finish(),
        }
    }
}
