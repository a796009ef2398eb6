use std::{convert::Infallible, sync::Arc};

use crate::{
    chain::BuildChain,
    types::{DynError, Injectable},
};

pub(crate) type Constructor<'f, T> = Box<dyn FnOnce(&mut BuildChain) -> Result<T, DynError> + 'f>;
pub(crate) type Callback<'f, T> =
    Box<dyn FnOnce(&mut BuildChain, &Arc<T>) -> Result<(), DynError> + 'f>;

/// Describes how to build the value of a key
///
/// Only used if the key has no record yet, otherwise the blueprint is dropped unused.
///
/// # Example
/// ```rust
/// use std::convert::Infallible;
/// use lazy_di::{Blueprint, Registry};
///
/// let registry = Registry::new();
/// let port = registry
///     .try_acquire(
///         "port",
///         Blueprint::new(|_| Ok::<_, Infallible>(8080_u16))
///             .tag("config")
///             .on_built(|_, port| {
///                 assert_eq!(**port, 8080);
///                 Ok::<_, Infallible>(())
///             }),
///     )
///     .unwrap();
///
/// assert_eq!(*port, 8080);
/// ```
pub struct Blueprint<'f, T: Injectable> {
    pub(crate) constructor: Constructor<'f, T>,
    pub(crate) tags: Vec<String>,
    pub(crate) placeholder: Option<fn() -> T>,
    pub(crate) callbacks: Vec<Callback<'f, T>>,
}

impl<'f, T: Injectable> Blueprint<'f, T> {
    /// Blueprint from a fallible constructor
    pub fn new<F, E>(constructor: F) -> Self
    where
        F: FnOnce(&mut BuildChain) -> Result<T, E> + 'f,
        E: Into<DynError>,
    {
        Blueprint {
            constructor: Box::new(move |chain: &mut BuildChain| -> Result<T, DynError> {
                constructor(chain).map_err(Into::into)
            }),
            tags: Vec::new(),
            placeholder: None,
            callbacks: Vec::new(),
        }
    }

    /// Blueprint from a constructor which can not fail
    pub fn infallible<F>(constructor: F) -> Self
    where
        F: FnOnce(&mut BuildChain) -> T + 'f,
    {
        Self::new(move |chain: &mut BuildChain| Ok::<_, Infallible>(constructor(chain)))
    }

    /// Attach a tag to the record, tags are informational only
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Run `callback` once the value was built
    ///
    /// Callbacks run in the order they were added, the first failing one stops the sequence.
    /// They do not run when the value is served from the registry.
    pub fn on_built<F, E>(mut self, callback: F) -> Self
    where
        F: FnOnce(&mut BuildChain, &Arc<T>) -> Result<(), E> + 'f,
        E: Into<DynError>,
    {
        self.callbacks
            .push(Box::new(
                move |chain: &mut BuildChain, value: &Arc<T>| -> Result<(), DynError> {
                    callback(chain, value).map_err(Into::into)
                },
            ));
        self
    }
}

impl<'f, T: Injectable + Default> Blueprint<'f, T> {
    /// Allow the key to be requested again while it is being built
    ///
    /// Such requests receive `T::default()` instead of failing with a circular dependency.
    /// The placeholder is a separate value: it never turns into the finished one.
    pub fn cycle_tolerant(mut self) -> Self {
        self.placeholder = Some(T::default);
        self
    }
}
