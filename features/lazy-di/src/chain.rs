use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, ThreadId},
};

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

use crate::{
    blueprint::Blueprint,
    errors::AcquireError,
    record::{BuildState, Record, Table},
    types::{DynError, Injectable, Instance},
};

/// A logical build chain holding the registry lock
///
/// Opened by the outermost [`Registry`](crate::Registry) call and handed to every constructor
/// and callback of that chain. Nested requests go through the chain, so they see the same table
/// without locking it a second time. The lock is released when the outermost call returns.
pub struct BuildChain {
    table: ArcMutexGuard<RawMutex, Table>,
    holder: Arc<Mutex<Option<ThreadId>>>,
    origin: String,
    /// Keys currently building, outermost first
    path: Vec<String>,
}

impl BuildChain {
    pub(crate) fn open(
        table: ArcMutexGuard<RawMutex, Table>,
        holder: Arc<Mutex<Option<ThreadId>>>,
        origin: &str,
    ) -> Self {
        *holder.lock() = Some(thread::current().id());
        BuildChain {
            table,
            holder,
            origin: origin.to_string(),
            path: Vec::new(),
        }
    }

    /// The key the outermost call of this chain asked for
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Keys which are currently being built by this chain, outermost first
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Returns the value of `key`, building it from `blueprint` if it has no record yet
    pub fn try_acquire<T: Injectable>(
        &mut self,
        key: &str,
        blueprint: Blueprint<'_, T>,
    ) -> Result<Arc<T>, AcquireError> {
        if let Some(record) = self.table.get(key) {
            return match record.state {
                BuildState::Built => {
                    tracing::debug!(key, "Serving built value");
                    record.extract(key)
                }
                BuildState::Building if record.cycle_tolerant => {
                    tracing::warn!(
                        key,
                        path = ?self.path,
                        "Tolerated circular request, handing out placeholder"
                    );
                    record.extract(key)
                }
                BuildState::Building => {
                    let mut chain = self.path.clone();
                    chain.push(key.to_string());
                    Err(AcquireError::CircularDependency {
                        key: key.to_string(),
                        chain,
                    })
                }
            };
        }

        let Blueprint {
            constructor,
            tags,
            placeholder,
            callbacks,
        } = blueprint;

        tracing::debug!(key, origin = %self.origin, "Building {}", std::any::type_name::<T>());
        self.table.insert(
            key.to_string(),
            Record::building(placeholder.map(|zero| zero()), tags),
        );

        self.path.push(key.to_string());
        let result = panic::catch_unwind(AssertUnwindSafe(|| constructor(&mut *self)));
        self.path.pop();

        let result = match result {
            Ok(result) => result,
            Err(payload) => {
                // The constructor's panic may be caught further up, the key must stay retryable
                self.table.remove(key);
                tracing::debug!(key, "Constructor panicked, record removed");
                panic::resume_unwind(payload);
            }
        };

        let value = match result {
            Ok(value) => Arc::new(value),
            Err(error) => {
                // Drop the record so a later request can retry from scratch
                self.table.remove(key);
                tracing::debug!(key, "Constructor failed, record removed");
                return Err(AcquireError::ConstructorFailed {
                    key: key.to_string(),
                    error,
                });
            }
        };

        let instance = Instance::from_arc(value.clone());
        // Records are only removed by failed builds, so the one inserted above is still there
        if let Some(record) = self.table.get_mut(key) {
            record.complete(instance);
        }
        tracing::debug!(key, "Built {}", std::any::type_name::<T>());

        for (index, callback) in callbacks.into_iter().enumerate() {
            callback(&mut *self, &value).map_err(|error: DynError| AcquireError::CallbackFailed {
                key: key.to_string(),
                index,
                error,
            })?;
        }

        Ok(value)
    }

    /// Like [`BuildChain::try_acquire`]
    ///
    /// # Panics
    /// If acquiring the key fails
    pub fn acquire<T: Injectable>(&mut self, key: &str, blueprint: Blueprint<'_, T>) -> Arc<T> {
        self.try_acquire(key, blueprint)
            .unwrap_or_else(|error| panic!("{error}"))
    }

    /// Shorthand for acquiring with an untagged, cycle intolerant [`Blueprint`]
    pub fn try_get<T, F, E>(&mut self, key: &str, constructor: F) -> Result<Arc<T>, AcquireError>
    where
        T: Injectable,
        F: FnOnce(&mut BuildChain) -> Result<T, E>,
        E: Into<DynError>,
    {
        self.try_acquire(key, Blueprint::new(constructor))
    }

    /// Like [`BuildChain::try_get`]
    ///
    /// # Panics
    /// If acquiring the key fails
    pub fn get<T, F, E>(&mut self, key: &str, constructor: F) -> Arc<T>
    where
        T: Injectable,
        F: FnOnce(&mut BuildChain) -> Result<T, E>,
        E: Into<DynError>,
    {
        self.acquire(key, Blueprint::new(constructor))
    }

    /// Stores an already constructed value under `key`
    ///
    /// Fails if the key already has a record, including one that is still being built.
    pub fn inject<T: Injectable>(
        &mut self,
        key: &str,
        value: T,
        tags: &[&str],
    ) -> Result<(), AcquireError> {
        if self.table.contains_key(key) {
            return Err(AcquireError::DuplicateKey(key.to_string()));
        }

        tracing::debug!(key, "Injecting {}", std::any::type_name::<T>());
        let tags = tags.iter().map(|tag| tag.to_string()).collect();
        self.table
            .insert(key.to_string(), Record::built(Instance::new(value), tags));
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn is_built(&self, key: &str) -> bool {
        self.state(key) == Some(BuildState::Built)
    }

    pub fn state(&self, key: &str) -> Option<BuildState> {
        self.table.get(key).map(|record| record.state)
    }
}

impl Drop for BuildChain {
    fn drop(&mut self) {
        *self.holder.lock() = None;
    }
}
