use lazy_di::{AcquireError, TypeInfo};

/// Errors when registering or retrieving configs
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The required Config is not known
    #[error("The required Config type '{0}' is not known")]
    Missing(TypeInfo),

    /// The Config type is already registered
    #[error("The Config type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),

    /// No ConfigProvider was installed in the registry
    #[error("No ConfigProvider installed, call `ConfigProvider::install` first")]
    ProviderMissing,

    #[error(transparent)]
    Registry(#[from] AcquireError),
}
