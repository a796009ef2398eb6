use std::{ops::Deref, sync::Arc};

use lazy_di::BuildChain;

use crate::{
    errors::ConfigError,
    provider::{ConfigProvider, CONFIG_PROVIDER_KEY},
};

/// A wrapper type to read configs from inside constructors
///
/// This provides a simple way to retrieve configs from the [`ConfigProvider`] installed in the
/// registry, while a value is being built.
///
/// # Example
/// ```rust
/// use std::convert::Infallible;
///
/// use lazy_di::Registry;
/// use lazy_di_config::{config::Config, provider::ConfigProvider};
///
/// pub struct MyModuleConfig {
///     enabled: bool,
/// }
///
/// pub struct MyModule {
///     enabled: bool,
/// }
///
/// let registry = Registry::new();
/// let mut provider = ConfigProvider::new();
/// provider.add_config(MyModuleConfig { enabled: true }).unwrap();
/// provider.install(&registry).unwrap();
///
/// let module = registry
///     .try_get("my_module", |chain| {
///         let config = Config::<MyModuleConfig>::resolve(chain)?;
///         Ok::<_, lazy_di_config::errors::ConfigError>(MyModule {
///             enabled: config.enabled,
///         })
///     })
///     .unwrap();
///
/// assert!(module.enabled);
/// ```
pub struct Config<T> {
    inner: Arc<T>,
}
impl<T> Deref for Config<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl<T> Config<T> {
    pub fn inner(&self) -> Arc<T> {
        self.inner.clone()
    }

    pub fn into_inner(self) -> Arc<T> {
        self.inner
    }
}

impl<T: Send + Sync + 'static> Config<T> {
    /// Reads the config `T` from the provider installed in the registry
    pub fn resolve(chain: &mut BuildChain) -> Result<Self, ConfigError> {
        if !chain.is_built(CONFIG_PROVIDER_KEY) {
            return Err(ConfigError::ProviderMissing);
        }

        let provider = chain.try_get(CONFIG_PROVIDER_KEY, |_| {
            Err::<ConfigProvider, _>(ConfigError::ProviderMissing)
        })?;

        Ok(Config {
            inner: provider.get_config()?,
        })
    }
}
