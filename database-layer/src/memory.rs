// In-process store used for tests and single-node deployments
use crate::batch::{WriteBatch, WriteOp};
use crate::collection::Collection;
use crate::error::{DatabaseError, DatabaseResult};
use crate::query::ListQuery;
use crate::store::DocumentStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredDocument {
    seq: u64,
    document: Value,
}

#[derive(Debug, Default)]
struct MemoryState {
    next_seq: u64,
    collections: HashMap<Collection, HashMap<Uuid, StoredDocument>>,
}

impl MemoryState {
    fn contains(&self, collection: Collection, id: Uuid) -> bool {
        self.collections
            .get(&collection)
            .is_some_and(|docs| docs.contains_key(&id))
    }

    fn matching(&self, collection: Collection, query: &ListQuery) -> Vec<&StoredDocument> {
        let mut docs: Vec<&StoredDocument> = self
            .collections
            .get(&collection)
            .map(|docs| docs.values().filter(|d| query.matches(&d.document)).collect())
            .unwrap_or_default();
        docs.sort_by_key(|d| d.seq);
        docs
    }

    /// Reject the batch before anything is applied
    fn check(&self, batch: &WriteBatch) -> DatabaseResult<()> {
        let mut pending: HashMap<(Collection, Uuid), bool> = HashMap::new();
        for op in batch.ops() {
            let (collection, id) = (op.collection(), op.id());
            let exists = pending
                .get(&(collection, id))
                .copied()
                .unwrap_or_else(|| self.contains(collection, id));
            match op {
                WriteOp::Insert { .. } if exists => {
                    return Err(DatabaseError::Conflict { collection, id })
                }
                WriteOp::Update { .. } | WriteOp::Delete { .. } if !exists => {
                    return Err(DatabaseError::NotFound { collection, id })
                }
                _ => {}
            }
            pending.insert((collection, id), !matches!(op, WriteOp::Delete { .. }));
        }
        Ok(())
    }

    fn apply(&mut self, op: WriteOp) {
        match op {
            WriteOp::Insert {
                collection,
                id,
                document,
                ..
            } => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.collections
                    .entry(collection)
                    .or_default()
                    .insert(id, StoredDocument { seq, document });
            }
            WriteOp::Update {
                collection,
                id,
                document,
                ..
            } => {
                if let Some(existing) = self
                    .collections
                    .get_mut(&collection)
                    .and_then(|docs| docs.get_mut(&id))
                {
                    existing.document = document;
                }
            }
            WriteOp::Delete { collection, id } => {
                if let Some(docs) = self.collections.get_mut(&collection) {
                    docs.remove(&id);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: Collection, id: Uuid) -> DatabaseResult<Option<Value>> {
        let state = self.state.read();
        Ok(state
            .collections
            .get(&collection)
            .and_then(|docs| docs.get(&id))
            .map(|d| d.document.clone()))
    }

    async fn list(&self, collection: Collection, query: &ListQuery) -> DatabaseResult<Vec<Value>> {
        query.validate()?;
        let state = self.state.read();
        let offset = usize::try_from(query.offset()).unwrap_or(usize::MAX);
        let limit = query.limit().map_or(usize::MAX, |l| l as usize);
        Ok(state
            .matching(collection, query)
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|d| d.document.clone())
            .collect())
    }

    async fn count(&self, collection: Collection, query: &ListQuery) -> DatabaseResult<u64> {
        query.validate()?;
        let state = self.state.read();
        Ok(state.matching(collection, query).len() as u64)
    }

    async fn commit(&self, batch: WriteBatch) -> DatabaseResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut state = self.state.write();
        state.check(&batch)?;
        let applied = batch.len();
        for op in batch.into_ops() {
            state.apply(op);
        }
        tracing::trace!(operations = applied, "Committed batch to memory store");
        Ok(())
    }
}
