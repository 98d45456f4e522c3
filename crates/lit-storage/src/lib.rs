//! Variable storage
//!
//! The boundary between the script engine and whatever keeps its variables,
//! the per-storage configuration, and an in-memory backend.
//!
//! # Example
//!
//! ```rust
//! use lit_storage::{MemoryStorage, StorageConfiguration, VariableStorage};
//! use lit_types::Value;
//!
//! let text = "name = \"default\"\nbackend = \"memory\"";
//! let config = StorageConfiguration::from_toml_str(text).unwrap();
//! let mut storage = MemoryStorage::new(config).unwrap();
//! storage.initialize().unwrap();
//!
//! storage.set_variable("score", None, false, Some(Value::new(10i64))).unwrap();
//! assert!(storage.get_variable("score", None, false).is_some());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod config;
mod error;
mod memory;
mod storage;

// Re-exports
pub use config::StorageConfiguration;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use storage::{ScopeId, VariableStorage};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
