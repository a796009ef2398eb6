use thiserror::Error;

use crate::types::DynError;

/// Errors when trying to acquire or inject a key
#[derive(Error, Debug)]
pub enum AcquireError {
    /// The key was requested again while it is still being built
    #[error("Circular dependency detected with '{key}' through {chain:?} - Consider marking it cycle tolerant")]
    CircularDependency { key: String, chain: Vec<String> },

    /// The key holds a value of a different type than the one requested
    #[error("Type mismatch for '{key}', required: '{requested}' actual: '{stored}'")]
    TypeMismatch {
        key: String,
        requested: &'static str,
        stored: &'static str,
    },

    /// Injection into a key which already has a record
    #[error("The key '{0}' is already registered")]
    DuplicateKey(String),

    /// The constructor failed, the key was rolled back and may be retried
    #[error("Constructor for '{key}' failed - error: {error}")]
    ConstructorFailed {
        key: String,
        #[source]
        error: DynError,
    },

    /// A post-build callback failed, the key itself stays built
    #[error("Callback #{index} for '{key}' failed - error: {error}")]
    CallbackFailed {
        key: String,
        index: usize,
        #[source]
        error: DynError,
    },

    /// A registry method was called while this thread already runs a build chain on it
    #[error("Registry accessed for '{key}' while this thread holds its lock, use the BuildChain instead")]
    NestedLock { key: String },
}

impl AcquireError {
    /// The key this error concerns
    pub fn key(&self) -> &str {
        match self {
            AcquireError::CircularDependency { key, .. }
            | AcquireError::TypeMismatch { key, .. }
            | AcquireError::ConstructorFailed { key, .. }
            | AcquireError::CallbackFailed { key, .. }
            | AcquireError::NestedLock { key } => key,
            AcquireError::DuplicateKey(key) => key,
        }
    }
}
