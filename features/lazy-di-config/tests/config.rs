use std::{convert::Infallible, sync::Arc};

use lazy_di::{AcquireError, Registry};
use lazy_di_config::{Config, ConfigError, ConfigProvider, CONFIG_PROVIDER_KEY};

#[derive(Debug, PartialEq)]
struct ServerConfig {
    host: String,
    port: u16,
}

struct Server {
    address: String,
}

fn server(registry: &Registry) -> Result<Arc<Server>, AcquireError> {
    registry.try_get("server", |chain| {
        let config = Config::<ServerConfig>::resolve(chain)?;
        Ok::<_, ConfigError>(Server {
            address: format!("{}:{}", config.host, config.port),
        })
    })
}

#[test]
fn constructor_reads_installed_config() {
    let registry = Registry::new();
    let mut provider = ConfigProvider::new();
    provider
        .add_config(ServerConfig {
            host: "localhost".to_string(),
            port: 8080,
        })
        .unwrap();
    provider.install(&registry).unwrap();

    let server = server(&registry).unwrap();

    assert_eq!(server.address, "localhost:8080");
    assert_eq!(registry.keys_tagged("config"), vec![CONFIG_PROVIDER_KEY]);
}

#[test]
fn missing_provider_fails_the_build() {
    let registry = Registry::new();

    match server(&registry) {
        Err(AcquireError::ConstructorFailed { key, error }) => {
            assert_eq!(key, "server");
            assert!(matches!(
                error.downcast_ref::<ConfigError>(),
                Some(ConfigError::ProviderMissing)
            ));
        }
        other => panic!("expected constructor failure, got {:?}", other.map(|_| ())),
    }
    assert!(!registry.contains("server"));
}

#[test]
fn missing_config_fails_the_build_and_can_be_retried() {
    let registry = Registry::new();
    ConfigProvider::new().install(&registry).unwrap();

    match server(&registry) {
        Err(AcquireError::ConstructorFailed { error, .. }) => {
            assert!(matches!(
                error.downcast_ref::<ConfigError>(),
                Some(ConfigError::Missing(_))
            ));
        }
        other => panic!("expected constructor failure, got {:?}", other.map(|_| ())),
    }

    let server = registry
        .try_get("server", |_| {
            Ok::<_, Infallible>(Server {
                address: "fallback:1".to_string(),
            })
        })
        .unwrap();
    assert_eq!(server.address, "fallback:1");
}

#[test]
fn provider_can_only_be_installed_once() {
    let registry = Registry::new();
    ConfigProvider::new().install(&registry).unwrap();

    assert!(matches!(
        ConfigProvider::new().install(&registry),
        Err(ConfigError::Registry(AcquireError::DuplicateKey(_)))
    ));
}

#[test]
fn provider_installed_during_build() {
    let registry = Registry::new();

    let port = registry
        .try_get("port", |chain| {
            let mut provider = ConfigProvider::new();
            provider.add_config(ServerConfig {
                host: "inner".to_string(),
                port: 9000,
            })?;
            provider.install_in(chain)?;

            let config = Config::<ServerConfig>::resolve(chain)?;
            Ok::<_, ConfigError>(config.port)
        })
        .unwrap();

    assert_eq!(*port, 9000);
    assert!(registry.is_built(CONFIG_PROVIDER_KEY));
}
