//! Variable storage boundary
//!
//! [`VariableStorage`] is implemented by every backend that keeps script
//! variables. Lifecycle calls take `&mut self`; variable access goes
//! through `&self` so one storage can serve concurrent readers.

use crate::config::StorageConfiguration;
use crate::error::StorageError;
use lit_types::Value;
use std::fmt::{self, Display, Formatter};
use tracing::info;

/// Identity of the scope local variables belong to
///
/// One scope per triggering event; locals vanish when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for ScopeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "scope#{}", self.0)
    }
}

/// Backend keeping script variables
///
/// # Lifecycle
/// 1. Construct with a [`StorageConfiguration`]
/// 2. [`VariableStorage::initialize`] once
/// 3. Serve [`VariableStorage::get_variable`] / [`VariableStorage::set_variable`]
/// 4. [`VariableStorage::flush`] on shutdown
pub trait VariableStorage: Send + Sync {
    /// Current configuration
    fn configuration(&self) -> &StorageConfiguration;

    /// Mutable access used by [`VariableStorage::reload_configuration`]
    fn configuration_mut(&mut self) -> &mut StorageConfiguration;

    /// React to a new configuration
    ///
    /// Called before the new configuration replaces the current one, so
    /// implementations can compare the two.
    ///
    /// # Errors
    /// Returns error if the new configuration cannot be applied
    fn load_configuration(
        &mut self,
        configuration: &StorageConfiguration,
    ) -> Result<(), StorageError>;

    /// Check if this backend needs a backing file
    fn requires_file(&self) -> bool;

    /// Prepare the storage for use
    ///
    /// # Errors
    /// Returns error if the storage cannot be used
    fn initialize(&mut self) -> Result<(), StorageError>;

    /// Re-establish the connection after [`VariableStorage::disconnect`]
    ///
    /// # Errors
    /// Returns error if the connection cannot be re-established
    fn connect(&mut self) -> Result<(), StorageError>;

    fn disconnect(&mut self);

    /// Variable named `name`, if set
    ///
    /// Local variables are looked up in `scope`; without a scope they are
    /// never found.
    fn get_variable(&self, name: &str, scope: Option<ScopeId>, local: bool) -> Option<Value>;

    /// Set or, with `None`, delete a variable
    ///
    /// # Errors
    /// Returns error if the storage is not connected or a local variable
    /// has no scope
    fn set_variable(
        &self,
        name: &str,
        scope: Option<ScopeId>,
        local: bool,
        value: Option<Value>,
    ) -> Result<(), StorageError>;

    /// Write every pending variable to the backing store
    ///
    /// # Errors
    /// Returns error if writing fails
    fn flush(&self) -> Result<(), StorageError>;

    /// Apply a new configuration
    ///
    /// # Errors
    /// Returns error if the backend needs a file the configuration lacks,
    /// or [`VariableStorage::load_configuration`] rejects it; the current
    /// configuration is kept in that case
    fn reload_configuration(
        &mut self,
        configuration: StorageConfiguration,
    ) -> Result<(), StorageError> {
        if self.requires_file() && configuration.file.is_none() {
            return Err(StorageError::MissingFile(configuration.name));
        }
        self.load_configuration(&configuration)?;
        info!(
            storage = %configuration.name,
            backend = %configuration.backend,
            "storage configuration reloaded"
        );
        *self.configuration_mut() = configuration;
        Ok(())
    }
}
