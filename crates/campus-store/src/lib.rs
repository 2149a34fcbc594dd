//! Campus Store - durable async key-value persistence
//!
//! Every piece of local app state is a string value under a string key.
//! Backends:
//! - [`MemoryStore`]: concurrent in-process map
//! - [`FileStore`]: one JSON document on disk, atomically replaced on write
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_store::{FileStore, KeyValueStore};
//!
//! # async fn example() -> Result<(), campus_store::StoreError> {
//! let store = FileStore::in_dir("/var/lib/campus");
//! store.set("@joined_classes", "[]".to_string()).await?;
//! assert_eq!(store.get("@joined_classes").await?.as_deref(), Some("[]"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod file;
pub mod memory;

pub use error::StoreError;
pub use file::{FileStore, DEFAULT_FILE_NAME};
pub use memory::MemoryStore;

use async_trait::async_trait;
use std::sync::Arc;

/// Async key-value store
///
/// Both reads and writes are fallible. Values are opaque strings; callers
/// own their encoding.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read value for `key`, `None` if never set
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace value for `key`
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete `key`; deleting an absent key succeeds
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key).await
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
