use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt::Debug,
    sync::Arc,
};

use lazy_di::{BuildChain, Registry, TypeInfo};

use crate::errors::ConfigError;

/// Key the [`ConfigProvider`] is stored under in the registry
pub const CONFIG_PROVIDER_KEY: &str = "lazy_di_config::provider";

/// A provider to register all configs.
///
/// Configs can be registered and retrieved based on type.
#[derive(Default)]
pub struct ConfigProvider {
    configs: HashMap<TypeId, (TypeInfo, Arc<dyn Any + Send + Sync + 'static>)>,
}

impl Debug for ConfigProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.configs.values().map(|(info, _)| info.type_name))
            .finish()
    }
}

impl ConfigProvider {
    /// Initializes an empty Config Provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve a config with specified type.
    ///
    /// If the config type is not available, it will return [`ConfigError::Missing`]
    pub fn get_config<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ConfigError> {
        let info = TypeInfo::of::<T>();

        self.configs
            .get(&info.type_id)
            .and_then(|(_, entry)| entry.clone().downcast().ok())
            .ok_or(ConfigError::Missing(info))
    }

    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.configs.contains_key(&TypeId::of::<T>())
    }

    /// Add a config to the registry.
    ///
    /// If the config type is already registered, it will return [`ConfigError::AlreadyRegistered`]
    pub fn add_config<T: Send + Sync + 'static>(
        &mut self,
        config: T,
    ) -> Result<&mut Self, ConfigError> {
        let info = TypeInfo::of::<T>();

        if self.configs.contains_key(&info.type_id) {
            return Err(ConfigError::AlreadyRegistered(info));
        }

        tracing::debug!("Registered config {}", info);
        self.configs.insert(info.type_id, (info, Arc::new(config)));
        Ok(self)
    }

    /// Can optionally add a config to the registry.
    ///
    /// If the config provided is `Some(T)`, it will be the same as calling [`ConfigProvider::add_config`]
    /// If the config provided is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add_config<T: Send + Sync + 'static>(
        &mut self,
        config: Option<T>,
    ) -> Result<&mut Self, ConfigError> {
        match config {
            Some(c) => self.add_config(c),
            None => Ok(self),
        }
    }

    /// Stores the provider in the registry under [`CONFIG_PROVIDER_KEY`]
    pub fn install(self, registry: &Registry) -> Result<(), ConfigError> {
        registry.inject(CONFIG_PROVIDER_KEY, self, &["config"])?;
        Ok(())
    }

    /// Like [`ConfigProvider::install`], from inside a running build
    pub fn install_in(self, chain: &mut BuildChain) -> Result<(), ConfigError> {
        chain.inject(CONFIG_PROVIDER_KEY, self, &["config"])?;
        Ok(())
    }
}
