//! Storage errors

/// Errors related to variable storage
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading a configuration file failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration text is not valid TOML for a storage
    #[error("invalid storage configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration names a different backend
    #[error("storage '{name}' is a {expected} storage, configuration asks for '{actual}'")]
    BackendMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    /// Backend needs a file but the configuration has none
    #[error("storage '{0}' requires a file")]
    MissingFile(String),

    /// Storage is disabled by its configuration
    #[error("storage '{0}' is disabled")]
    Disabled(String),

    /// Storage has not been initialized or was disconnected
    #[error("storage '{0}' is not connected")]
    NotConnected(String),

    /// Local variable accessed without a scope
    #[error("local variable '{0}' needs a scope")]
    MissingScope(String),
}
