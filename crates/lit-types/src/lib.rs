//! Literal type system
//!
//! Semantic type identities, dynamically-typed element handles, and the
//! registries a literal consults for rendering, persistence, conversion and
//! mutation.
//!
//! # Core Concepts
//!
//! - [`TypeTag`]: Identity of a semantic type
//! - [`Value`]: Cheap-clone handle to one element of some concrete type
//! - [`TypeInfo`]: Capabilities registered for one semantic type
//! - [`Converter`]: Registered mapping from one semantic type to another
//! - [`Changer`]: In-place mutation handler for one semantic type
//! - [`Registry`]: Type and converter tables shared by every literal
//!
//! # Example
//!
//! ```rust
//! use lit_types::{Converter, Registry, TypeInfo, TypeTag, Value};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Meters(f64);
//!
//! let registry = Registry::builder()
//!     .register_type(
//!         TypeInfo::new::<Meters>("meters").with_renderer(|m: &Meters, _| format!("{}m", m.0)),
//!     )
//!     .register_type(TypeInfo::new::<String>("string"))
//!     .register_converter(Converter::new(|m: &Meters| Some(m.0.to_string())))
//!     .build()
//!     .unwrap();
//!
//! let value = Value::new(Meters(2.5));
//! assert_eq!(registry.render(&value, Default::default()), "2.5m");
//! assert!(registry.converter(TypeTag::of::<Meters>(), TypeTag::of::<String>()).is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod changer;
mod converter;
mod registry;
mod serializer;
mod tag;
mod types;
mod value;

// Re-exports
pub use changer::{ChangeError, ChangeMode, Changer};
pub use converter::{ConversionPolicy, Converter, ConverterFn, ConverterRegistry};
pub use registry::{Registry, RegistryBuilder, RegistryError};
pub use serializer::{FnSerializer, SerdeSerializer, SerializeError, Serializer};
pub use tag::TypeTag;
pub use types::{join_list, Renderer, StringMode, TypeInfo, TypeRegistry};
pub use value::{Element, Value};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
