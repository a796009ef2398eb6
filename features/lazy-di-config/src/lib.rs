//! Lazy DI Config provides a store of typed configs which constructors read through the registry.
//!
//! Lazy DI Config is split into two major parts:
//! 1. ConfigProvider: Used to collect all configs and install them into a [`lazy_di::Registry`]
//! 2. Config<T>: A wrapper type to retrieve a config while building a value
//!
//! # Examples
//!
//! ```rust
//! use lazy_di_config::provider::ConfigProvider;
//!
//! struct AppConfig {
//!     host: String,
//!     port: u16,
//! }
//!
//! let mut config_provider = ConfigProvider::new();
//! config_provider
//!     .add_config(AppConfig {
//!         host: "localhost".to_string(),
//!         port: 8080,
//!     })
//!     .unwrap();
//!
//! let retrieved = config_provider.get_config::<AppConfig>().unwrap();
//! assert_eq!(retrieved.host, "localhost");
//! assert_eq!(retrieved.port, 8080);
//! ```

pub mod config;
pub mod errors;
pub mod provider;

pub use config::Config;
pub use errors::ConfigError;
pub use provider::{ConfigProvider, CONFIG_PROVIDER_KEY};
