//! In-memory storage backend
//!
//! Keeps globals in one concurrent map and locals in one map per scope.
//! Nothing survives the process, so flushing only reports what is held.

use crate::config::StorageConfiguration;
use crate::error::StorageError;
use crate::storage::{ScopeId, VariableStorage};
use dashmap::DashMap;
use lit_types::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

/// Variable storage held entirely in memory
#[derive(Debug)]
pub struct MemoryStorage {
    configuration: StorageConfiguration,
    globals: DashMap<String, Value>,
    locals: DashMap<ScopeId, DashMap<String, Value>>,
    connected: AtomicBool,
}

impl MemoryStorage {
    /// Backend name configurations must use
    pub const BACKEND: &'static str = "memory";

    /// Create an unconnected storage
    ///
    /// # Errors
    /// Returns error if `configuration` names another backend
    pub fn new(configuration: StorageConfiguration) -> Result<Self, StorageError> {
        check_backend(&configuration)?;
        Ok(Self {
            configuration,
            globals: DashMap::new(),
            locals: DashMap::new(),
            connected: AtomicBool::new(false),
        })
    }

    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn global_count(&self) -> usize {
        self.globals.len()
    }

    #[must_use]
    pub fn local_count(&self, scope: ScopeId) -> usize {
        self.locals.get(&scope).map_or(0, |vars| vars.len())
    }

    /// Drop every local of `scope`
    ///
    /// Returns how many variables were dropped.
    pub fn end_scope(&self, scope: ScopeId) -> usize {
        let dropped = self.locals.remove(&scope).map_or(0, |(_, vars)| vars.len());
        debug!(storage = %self.configuration.name, %scope, dropped, "scope ended");
        dropped
    }

    fn ensure_connected(&self) -> Result<(), StorageError> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(StorageError::NotConnected(self.configuration.name.clone()))
        }
    }
}

fn check_backend(configuration: &StorageConfiguration) -> Result<(), StorageError> {
    if configuration.backend.eq_ignore_ascii_case(MemoryStorage::BACKEND) {
        Ok(())
    } else {
        Err(StorageError::BackendMismatch {
            name: configuration.name.clone(),
            expected: MemoryStorage::BACKEND.to_string(),
            actual: configuration.backend.clone(),
        })
    }
}

impl VariableStorage for MemoryStorage {
    fn configuration(&self) -> &StorageConfiguration {
        &self.configuration
    }

    fn configuration_mut(&mut self) -> &mut StorageConfiguration {
        &mut self.configuration
    }

    fn load_configuration(
        &mut self,
        configuration: &StorageConfiguration,
    ) -> Result<(), StorageError> {
        check_backend(configuration)?;
        if self.configuration.enabled && !configuration.enabled {
            warn!(storage = %configuration.name, "storage disabled by reload");
            self.disconnect();
        }
        if self.configuration.flush_interval_secs != configuration.flush_interval_secs {
            debug!(
                storage = %configuration.name,
                from = self.configuration.flush_interval_secs,
                to = configuration.flush_interval_secs,
                "flush interval changed"
            );
        }
        Ok(())
    }

    fn requires_file(&self) -> bool {
        false
    }

    fn initialize(&mut self) -> Result<(), StorageError> {
        if !self.configuration.enabled {
            return Err(StorageError::Disabled(self.configuration.name.clone()));
        }
        self.connected.store(true, Ordering::Release);
        info!(storage = %self.configuration.name, backend = Self::BACKEND, "storage initialized");
        Ok(())
    }

    fn connect(&mut self) -> Result<(), StorageError> {
        if !self.configuration.enabled {
            return Err(StorageError::Disabled(self.configuration.name.clone()));
        }
        self.connected.store(true, Ordering::Release);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected.store(false, Ordering::Release);
    }

    fn get_variable(&self, name: &str, scope: Option<ScopeId>, local: bool) -> Option<Value> {
        if local {
            let vars = self.locals.get(&scope?)?;
            let value = vars.get(name)?.value().clone();
            Some(value)
        } else {
            self.globals.get(name).map(|entry| entry.value().clone())
        }
    }

    fn set_variable(
        &self,
        name: &str,
        scope: Option<ScopeId>,
        local: bool,
        value: Option<Value>,
    ) -> Result<(), StorageError> {
        self.ensure_connected()?;
        if local {
            let scope = scope.ok_or_else(|| StorageError::MissingScope(name.to_string()))?;
            match value {
                Some(value) => {
                    self.locals.entry(scope).or_default().insert(name.to_string(), value);
                }
                None => {
                    if let Some(vars) = self.locals.get(&scope) {
                        vars.remove(name);
                    }
                }
            }
        } else {
            match value {
                Some(value) => {
                    self.globals.insert(name.to_string(), value);
                }
                None => {
                    self.globals.remove(name);
                }
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        info!(
            storage = %self.configuration.name,
            globals = self.globals.len(),
            scopes = self.locals.len(),
            "storage flushed"
        );
        Ok(())
    }
}
