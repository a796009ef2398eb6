use std::{
    fmt::Debug,
    sync::Arc,
    thread::{self, ThreadId},
};

use parking_lot::Mutex;

use crate::{
    blueprint::Blueprint,
    chain::BuildChain,
    errors::AcquireError,
    record::{BuildState, Table},
    types::{DynError, Injectable},
};

/// Registry building and memoizing values by key
///
/// Cloning the registry gives another handle to the same table.
/// All calls are serialized: the outermost call locks the registry for its whole [`BuildChain`].
#[derive(Clone, Default)]
pub struct Registry {
    table: Arc<Mutex<Table>>,
    /// Thread which currently runs a chain
    holder: Arc<Mutex<Option<ThreadId>>>,
}

impl Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(table) = self.table.try_lock() else {
            return f.write_str("Registry { <locked> }");
        };

        let mut keys: Vec<_> = table.keys().collect();
        keys.sort();

        let mut map = f.debug_struct("Registry");
        for key in keys {
            let record = &table[key];
            let val = match record.state {
                BuildState::Built => format!("built {}", record.info),
                BuildState::Building => format!("building {}", record.info),
            };
            map.field(key, &val);
        }
        map.finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the registry and opens a new chain
    fn open(&self, key: &str) -> Result<BuildChain, AcquireError> {
        if self.held_by_current_thread() {
            return Err(AcquireError::NestedLock {
                key: key.to_string(),
            });
        }

        let table = self.table.lock_arc();
        Ok(BuildChain::open(table, self.holder.clone(), key))
    }

    fn held_by_current_thread(&self) -> bool {
        *self.holder.lock() == Some(thread::current().id())
    }

    /// Read access for introspection
    ///
    /// # Panics
    /// If called from inside a build chain of this registry
    fn inspect<R>(&self, f: impl FnOnce(&Table) -> R) -> R {
        assert!(
            !self.held_by_current_thread(),
            "Registry inspected while this thread holds its lock, use the BuildChain instead"
        );
        f(&self.table.lock())
    }

    /// Returns the value of `key`, building it from `blueprint` if it has no record yet
    ///
    /// The registry stays locked until the value and everything it depends on are built.
    pub fn try_acquire<T: Injectable>(
        &self,
        key: &str,
        blueprint: Blueprint<'_, T>,
    ) -> Result<Arc<T>, AcquireError> {
        self.open(key)?.try_acquire(key, blueprint)
    }

    /// Like [`Registry::try_acquire`]
    ///
    /// # Panics
    /// If acquiring the key fails
    pub fn acquire<T: Injectable>(&self, key: &str, blueprint: Blueprint<'_, T>) -> Arc<T> {
        self.try_acquire(key, blueprint)
            .unwrap_or_else(|error| panic!("{error}"))
    }

    /// Shorthand for acquiring with an untagged, cycle intolerant [`Blueprint`]
    pub fn try_get<T, F, E>(&self, key: &str, constructor: F) -> Result<Arc<T>, AcquireError>
    where
        T: Injectable,
        F: FnOnce(&mut BuildChain) -> Result<T, E>,
        E: Into<DynError>,
    {
        self.try_acquire(key, Blueprint::new(constructor))
    }

    /// Like [`Registry::try_get`]
    ///
    /// # Panics
    /// If acquiring the key fails
    pub fn get<T, F, E>(&self, key: &str, constructor: F) -> Arc<T>
    where
        T: Injectable,
        F: FnOnce(&mut BuildChain) -> Result<T, E>,
        E: Into<DynError>,
    {
        self.acquire(key, Blueprint::new(constructor))
    }

    /// Stores an already constructed value under `key`
    ///
    /// Meant for seeding the registry before the key is first acquired, e.g. with test doubles.
    /// Fails if the key already has a record.
    pub fn inject<T: Injectable>(
        &self,
        key: &str,
        value: T,
        tags: &[&str],
    ) -> Result<(), AcquireError> {
        self.open(key)?.inject(key, value, tags)
    }

    /// Number of keys with a record
    ///
    /// # Panics
    /// If called from inside a build chain of this registry, use the [`BuildChain`] there
    pub fn len(&self) -> usize {
        self.inspect(|table| table.len())
    }

    /// # Panics
    /// Like [`Registry::len`]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `key` has a record, built or not
    ///
    /// # Panics
    /// If called from inside a build chain of this registry, use the [`BuildChain`] there
    pub fn contains(&self, key: &str) -> bool {
        self.inspect(|table| table.contains_key(key))
    }

    /// # Panics
    /// Like [`Registry::state`]
    pub fn is_built(&self, key: &str) -> bool {
        self.state(key) == Some(BuildState::Built)
    }

    /// Build state of `key`, None if it has no record
    ///
    /// # Panics
    /// If called from inside a build chain of this registry, use the [`BuildChain`] there
    pub fn state(&self, key: &str) -> Option<BuildState> {
        self.inspect(|table| table.get(key).map(|record| record.state))
    }

    /// All keys with a record, sorted
    ///
    /// # Panics
    /// If called from inside a build chain of this registry, use the [`BuildChain`] there
    pub fn keys(&self) -> Vec<String> {
        let mut keys = self.inspect(|table| table.keys().cloned().collect::<Vec<_>>());
        keys.sort();
        keys
    }

    /// Tags the key was created with
    ///
    /// # Panics
    /// If called from inside a build chain of this registry, use the [`BuildChain`] there
    pub fn tags(&self, key: &str) -> Option<Vec<String>> {
        self.inspect(|table| table.get(key).map(|record| record.tags.clone()))
    }

    /// All keys carrying `tag`, sorted
    ///
    /// # Panics
    /// If called from inside a build chain of this registry, use the [`BuildChain`] there
    pub fn keys_tagged(&self, tag: &str) -> Vec<String> {
        let mut keys = self.inspect(|table| {
            table
                .iter()
                .filter(|(_, record)| record.tags.iter().any(|t| t == tag))
                .map(|(key, _)| key.clone())
                .collect::<Vec<_>>()
        });
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;

    #[test]
    fn memoizes_by_key() {
        let registry = Registry::new();
        let mut calls = 0;

        let first = registry
            .try_get("answer", |_| {
                calls += 1;
                Ok::<_, Infallible>(42_u32)
            })
            .unwrap();
        let second = registry
            .try_get("answer", |_| Ok::<_, Infallible>(0_u32))
            .unwrap();

        assert_eq!(calls, 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.is_built("answer"));
    }

    #[test]
    fn nested_registry_call_is_refused() {
        let registry = Registry::new();
        let inner = registry.clone();

        let result = registry.try_get("outer", |_| {
            match inner.try_get("inner", |_| Ok::<_, Infallible>(1_u8)) {
                Err(AcquireError::NestedLock { key }) => Ok(key),
                other => Err(format!("expected nested lock, got {:?}", other.map(|_| ()))),
            }
        });

        assert_eq!(*result.unwrap(), "inner");
        assert!(!registry.contains("inner"));
    }

    #[test]
    fn nested_inject_through_registry_is_refused() {
        let registry = Registry::new();
        let inner = registry.clone();

        let result = registry.try_get("outer", |_| inner.inject("seed", 1_u8, &[]));

        match result {
            Err(AcquireError::ConstructorFailed { key, error }) => {
                assert_eq!(key, "outer");
                assert!(error.to_string().contains("'seed'"));
            }
            other => panic!("expected constructor failure, got {:?}", other.map(|_| ())),
        }
        assert!(registry.is_empty());
    }

    #[test]
    #[should_panic(expected = "Registry inspected while this thread holds its lock")]
    fn inspecting_from_inside_a_chain_panics() {
        let registry = Registry::new();
        let inner = registry.clone();

        registry.get("outer", |_| Ok::<_, Infallible>(inner.len()));
    }

    #[test]
    fn debug_lists_states() {
        let registry = Registry::new();
        registry.inject("name", "svc".to_string(), &[]).unwrap();

        let debug = format!("{registry:?}");
        assert!(debug.contains("name"));
        assert!(debug.contains("built alloc::string::String"));
    }

    #[test]
    fn tags_are_queryable() {
        let registry = Registry::new();
        registry
            .try_acquire(
                "db",
                Blueprint::infallible(|_| 5_u16).tags(["storage", "io"]),
            )
            .unwrap();
        registry.inject("cache", 1_u8, &["storage"]).unwrap();

        assert_eq!(
            registry.tags("db"),
            Some(vec!["storage".to_string(), "io".to_string()])
        );
        assert_eq!(registry.keys_tagged("storage"), vec!["cache", "db"]);
        assert_eq!(registry.keys(), vec!["cache", "db"]);
        assert_eq!(registry.tags("missing"), None);
    }
}
