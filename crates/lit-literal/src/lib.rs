//! Literal values
//!
//! Containers for statically-known values of one semantic type, as produced
//! by a script parser. A literal holds one or many elements, combined by an
//! AND/OR [`Quantifier`], and can be checked, rendered, converted, mutated
//! and saved through the capabilities registered on a
//! [`lit_types::Registry`].
//!
//! # Core Concepts
//!
//! - [`Literal`]: Shared contract for every literal
//! - [`SimpleLiteral`]: Owning container built by the producing layer
//! - [`ConvertedLiteral`]: View produced by converting a literal to another type
//! - [`codec`]: All-or-nothing persistence of literals
//!
//! # Example
//!
//! ```rust
//! use lit_literal::{Literal, Quantifier, SimpleLiteral};
//! use lit_types::{Registry, TypeInfo, Value};
//!
//! let registry = Registry::builder()
//!     .register_type(TypeInfo::new::<i64>("integer"))
//!     .build_shared()
//!     .unwrap();
//!
//! let literal = SimpleLiteral::of(registry, [1i64, 2, 3], Quantifier::Or).unwrap();
//! assert_eq!(literal.to_string(), "1, 2 or 3");
//! assert!(literal.check(&|v: &Value| v.downcast_ref::<i64>() == Some(&2), false));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod codec;
mod converted;
mod error;
mod expression;
mod iter;
mod simple;
mod unparsed;

// Re-exports
pub use codec::{CodecError, SerializedElement, SerializedLiteral};
pub use converted::ConvertedLiteral;
pub use error::LiteralError;
pub use expression::{check_values, Literal, LiteralExt, LiteralRef, Quantifier};
pub use iter::LiteralIter;
pub use simple::SimpleLiteral;
pub use unparsed::{Source, UnparsedLiteral};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
