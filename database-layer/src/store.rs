use crate::batch::WriteBatch;
use crate::collection::Collection;
use crate::error::DatabaseResult;
use crate::query::ListQuery;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Backend-neutral document store.
///
/// Reads return the stored JSON documents; all writes go through
/// [`DocumentStore::commit`], which applies a batch atomically: either every
/// operation is visible afterwards or none is.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short name for logs and the health endpoint
    fn backend(&self) -> &'static str;

    async fn get(&self, collection: Collection, id: Uuid) -> DatabaseResult<Option<Value>>;

    /// Matching documents in insertion order
    async fn list(&self, collection: Collection, query: &ListQuery) -> DatabaseResult<Vec<Value>>;

    /// Number of matching documents, ignoring paging
    async fn count(&self, collection: Collection, query: &ListQuery) -> DatabaseResult<u64>;

    async fn commit(&self, batch: WriteBatch) -> DatabaseResult<()>;

    async fn health_check(&self) -> DatabaseResult<()> {
        Ok(())
    }
}

pub type SharedStore = Arc<dyn DocumentStore>;
