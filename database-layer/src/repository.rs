// Typed access to one collection
use crate::batch::WriteBatch;
use crate::entity::{from_document, merge_patch, to_document, Entity};
use crate::error::{DatabaseError, DatabaseResult};
use crate::locks::EntityLocks;
use crate::query::ListQuery;
use crate::store::SharedStore;
use chrono::{NaiveDate, Utc};
use itertools::Itertools;
use serde_json::Value;
use std::marker::PhantomData;
use uuid::Uuid;

/// CRUD over the collection of `T`.
///
/// `patch` and `delete` take the entity lock themselves; callers already
/// holding it must build a [`WriteBatch`] instead.
pub struct Repository<T> {
    store: SharedStore,
    locks: EntityLocks,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            locks: self.locks.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: SharedStore, locks: EntityLocks) -> Self {
        Self {
            store,
            locks,
            _entity: PhantomData,
        }
    }

    /// Date-dependent fields are brought up to today before the record is returned
    pub async fn find(&self, id: Uuid) -> DatabaseResult<Option<T>> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(|document| current(document, today()))
            .transpose()
    }

    pub async fn get(&self, id: Uuid) -> DatabaseResult<T> {
        self.find(id).await?.ok_or(DatabaseError::NotFound {
            collection: T::COLLECTION,
            id,
        })
    }

    /// Records matching `query`, evaluated against today's derived values
    pub async fn list(&self, query: &ListQuery) -> DatabaseResult<Vec<T>> {
        query.validate()?;
        let (stored, derived) = query.partition(T::DATE_DERIVED_FIELDS);
        if derived.filters().is_empty() {
            return self.load(&stored).await;
        }

        let matching = self.load_matching(&stored, &derived).await?;
        let page = matching.into_iter().skip(usize::try_from(stored.offset()).unwrap_or(usize::MAX));
        Ok(match stored.limit() {
            Some(limit) => page.take(limit as usize).collect(),
            None => page.collect(),
        })
    }

    pub async fn all(&self) -> DatabaseResult<Vec<T>> {
        self.list(&ListQuery::new()).await
    }

    pub async fn count(&self, query: &ListQuery) -> DatabaseResult<u64> {
        query.validate()?;
        let (stored, derived) = query.partition(T::DATE_DERIVED_FIELDS);
        if derived.filters().is_empty() {
            return self.store.count(T::COLLECTION, &stored).await;
        }
        Ok(self.load_matching(&stored, &derived).await?.len() as u64)
    }

    async fn load(&self, query: &ListQuery) -> DatabaseResult<Vec<T>> {
        let today = today();
        self.store
            .list(T::COLLECTION, query)
            .await?
            .into_iter()
            .map(|document| current(document, today))
            .collect()
    }

    /// Every record passing the stored filters, then the date-derived ones
    async fn load_matching(&self, stored: &ListQuery, derived: &ListQuery) -> DatabaseResult<Vec<T>> {
        self.load(&stored.unpaged())
            .await?
            .into_iter()
            .map(|record| to_document(&record).map(|document| (document, record)))
            .filter_ok(|(document, _)| derived.matches(document))
            .map_ok(|(_, record)| record)
            .collect()
    }

    pub async fn create(&self, mut entity: T) -> DatabaseResult<T> {
        entity.prepare_insert();
        derive_and_check(&mut entity)?;

        let mut batch = WriteBatch::new();
        batch.insert(&entity)?;
        self.store.commit(batch).await?;
        tracing::debug!(collection = %T::COLLECTION, id = %entity.id(), "Created record");
        Ok(entity)
    }

    /// Apply a JSON merge patch and write the result back
    pub async fn patch(&self, id: Uuid, patch: &Value) -> DatabaseResult<T> {
        let fields = patch.as_object().ok_or_else(|| DatabaseError::InvalidRecord {
            collection: T::COLLECTION,
            message: "patch must be a JSON object".to_string(),
        })?;
        if let Some(field) = fields
            .keys()
            .find(|k| k.as_str() == "id" || T::READ_ONLY_FIELDS.contains(&k.as_str()))
        {
            return Err(DatabaseError::ReadOnlyField {
                collection: T::COLLECTION,
                field: field.clone(),
            });
        }

        let _lock = self.locks.acquire(T::COLLECTION, id).await;
        let current = self.get(id).await?;
        let mut document = to_document(&current)?;
        merge_patch(&mut document, patch);

        let mut updated: T = from_document(document)?;
        derive_and_check(&mut updated)?;

        let mut batch = WriteBatch::new();
        batch.update(&updated)?;
        self.store.commit(batch).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let _lock = self.locks.acquire(T::COLLECTION, id).await;
        let mut batch = WriteBatch::new();
        batch.delete::<T>(id);
        self.store.commit(batch).await
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn current<T: Entity>(document: Value, today: NaiveDate) -> DatabaseResult<T> {
    let mut record: T = from_document(document)?;
    record.refresh_for_date(today);
    Ok(record)
}

fn derive_and_check<T: Entity>(entity: &mut T) -> DatabaseResult<()> {
    entity
        .refresh_derived()
        .and_then(|()| entity.validate())
        .map_err(|message| DatabaseError::InvalidRecord {
            collection: T::COLLECTION,
            message,
        })
}
