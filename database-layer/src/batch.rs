// Atomic write batches
use crate::collection::Collection;
use crate::entity::{to_document, Entity};
use crate::error::DatabaseResult;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Fails with `Conflict` if the id already exists
    Insert {
        collection: Collection,
        id: Uuid,
        business_id: Option<String>,
        document: Value,
    },
    /// Fails with `NotFound` if the id does not exist
    Update {
        collection: Collection,
        id: Uuid,
        business_id: Option<String>,
        document: Value,
    },
    /// Fails with `NotFound` if the id does not exist
    Delete { collection: Collection, id: Uuid },
}

impl WriteOp {
    pub fn collection(&self) -> Collection {
        match self {
            WriteOp::Insert { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Delete { collection, .. } => *collection,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            WriteOp::Insert { id, .. } | WriteOp::Update { id, .. } | WriteOp::Delete { id, .. } => {
                *id
            }
        }
    }
}

/// Writes that a store applies all together or not at all
#[derive(Debug, Clone, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<T: Entity>(&mut self, entity: &T) -> DatabaseResult<()> {
        self.ops.push(WriteOp::Insert {
            collection: T::COLLECTION,
            id: entity.id(),
            business_id: entity.business_id().map(str::to_string),
            document: to_document(entity)?,
        });
        Ok(())
    }

    pub fn update<T: Entity>(&mut self, entity: &T) -> DatabaseResult<()> {
        self.ops.push(WriteOp::Update {
            collection: T::COLLECTION,
            id: entity.id(),
            business_id: entity.business_id().map(str::to_string),
            document: to_document(entity)?,
        });
        Ok(())
    }

    pub fn delete<T: Entity>(&mut self, id: Uuid) {
        self.ops.push(WriteOp::Delete {
            collection: T::COLLECTION,
            id,
        });
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
