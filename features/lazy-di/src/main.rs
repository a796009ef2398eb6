use std::{convert::Infallible, error::Error, sync::Arc};

use lazy_di::{Blueprint, BuildChain, Registry};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let registry = Registry::new();
    registry.inject("greeting", "hello".to_string(), &["config"])?;

    let test = registry.try_acquire(
        "test",
        Blueprint::new(test).on_built(|_, test: &Arc<Test>| {
            tracing::info!("Built {:?}", test);
            Ok::<_, Infallible>(())
        }),
    )?;

    println!("{:?}", registry);
    println!("{:?}", test);
    Ok(())
}

#[derive(Debug)]
struct Test {
    a: Arc<String>,
}

fn test(chain: &mut BuildChain) -> Result<Test, Box<dyn Error + Send + Sync>> {
    let greeting = chain.try_get("greeting", |_| -> Result<String, Infallible> {
        Ok("fallback".to_string())
    })?;
    Ok(Test { a: greeting })
}
