//! Entity store for CareDesk Engine
//!
//! Every entity lives in a [`Collection`] as a JSON document. Two backends
//! implement [`DocumentStore`]:
//!
//! - [`MemoryStore`] keeps everything in process, for tests and demos
//! - [`SqliteStore`] keeps one table per collection in a SQLite file
//!
//! Writes are grouped into a [`WriteBatch`] and committed atomically.
//! Operations that read an entity, decide, and write it back hold the
//! entity's lock from [`EntityLocks`] for the whole sequence.
//!
//! ```rust
//! use database_layer::{Database, ListQuery};
//!
//! let db = Database::in_memory();
//! assert_eq!(db.backend(), "memory");
//! let _everything = ListQuery::new();
//! ```

pub mod batch;
pub mod collection;
pub mod entity;
pub mod error;
pub mod identifiers;
pub mod locks;
pub mod memory;
pub mod query;
pub mod repository;
pub mod sqlite;
pub mod store;

pub use batch::*;
pub use collection::*;
pub use entity::*;
pub use error::*;
pub use identifiers::*;
pub use locks::*;
pub use memory::*;
pub use query::*;
pub use repository::*;
pub use sqlite::*;
pub use store::*;

use std::fmt;
use std::sync::Arc;

/// Store handle plus the lock registry, shared by all services
#[derive(Clone)]
pub struct Database {
    store: SharedStore,
    locks: EntityLocks,
}

impl Database {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            locks: EntityLocks::new(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub async fn sqlite(config: &SqliteConfig) -> DatabaseResult<Self> {
        Ok(Self::new(Arc::new(SqliteStore::connect(config).await?)))
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn locks(&self) -> &EntityLocks {
        &self.locks
    }

    pub fn repository<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.store.clone(), self.locks.clone())
    }

    pub async fn commit(&self, batch: WriteBatch) -> DatabaseResult<()> {
        self.store.commit(batch).await
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("backend", &self.store.backend())
            .field("locks", &self.locks.len())
            .finish()
    }
}
