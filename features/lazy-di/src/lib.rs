//! Lazy DI provides a registry which builds values on demand, memoizes them by key and detects
//! circular construction.
//!
//! Values are requested with a key and a [`Blueprint`] describing how to build them. If the key was
//! built before the stored value is returned, otherwise the constructor runs. Constructors receive
//! the [`BuildChain`] of the request and use it to acquire their own dependencies, so no build order
//! has to be known up front.
//!
//! # Examples
//!
//! ```rust
//! use std::{convert::Infallible, sync::Arc};
//!
//! use lazy_di::{BuildChain, Registry};
//!
//! struct Database {
//!     url: String,
//! }
//!
//! struct UserService {
//!     db: Arc<Database>,
//! }
//!
//! fn database(chain: &mut BuildChain) -> Arc<Database> {
//!     chain.get("database", |_| {
//!         Ok::<_, Infallible>(Database {
//!             url: "postgres://localhost".to_string(),
//!         })
//!     })
//! }
//!
//! let registry = Registry::new();
//! let users = registry.get("users", |chain| {
//!     Ok::<_, Infallible>(UserService { db: database(chain) })
//! });
//!
//! let db = registry.get("database", |_| -> Result<Database, Infallible> {
//!     unreachable!("already built")
//! });
//! assert!(Arc::ptr_eq(&users.db, &db));
//! assert_eq!(db.url, "postgres://localhost");
//! ```
//!
//! Lazy DI consists of the following components:
//!
//! 1. Registry - owns the table of keys and the lock serializing all builds
//! 2. BuildChain - handed to constructors, carries the held lock through nested requests
//! 3. Blueprint - constructor, tags, cycle tolerance and post-build callbacks of a key
//! 4. Errors - everything that can go wrong while acquiring or injecting

pub mod blueprint;
pub mod chain;
pub mod errors;
mod record;
pub mod registry;
pub mod types;

pub use blueprint::Blueprint;
pub use chain::BuildChain;
pub use errors::AcquireError;
pub use record::BuildState;
pub use registry::Registry;
pub use types::{DynError, Injectable, Instance, TypeInfo};
