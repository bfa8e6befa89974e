// Typed records and their mapping to stored JSON documents
use crate::collection::Collection;
use crate::error::{DatabaseError, DatabaseResult};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// A record type stored in exactly one [`Collection`].
///
/// Documents are stored as the entity's serde representation, so the JSON
/// the API returns is the JSON the store holds.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;

    /// Fields a generic patch must not change; the owning service maintains them
    const READ_ONLY_FIELDS: &'static [&'static str] = &[];

    /// Fields whose value depends on the calendar date. Stored values can be
    /// stale, so list filters on these run after [`Entity::refresh_for_date`].
    const DATE_DERIVED_FIELDS: &'static [&'static str] = &[];

    fn id(&self) -> Uuid;

    fn business_id(&self) -> Option<&str> {
        None
    }

    /// Assign generated identifiers before the first write
    fn prepare_insert(&mut self) {}

    /// Recompute fields derived from other fields. An error rejects the write.
    fn refresh_derived(&mut self) -> Result<(), String> {
        Ok(())
    }

    /// Bring date-dependent fields up to `today`; applied to every read
    fn refresh_for_date(&mut self, _today: NaiveDate) {}

    /// Field-level checks run before every write through a repository
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

pub fn to_document<T: Entity>(entity: &T) -> DatabaseResult<Value> {
    Ok(serde_json::to_value(entity)?)
}

pub fn from_document<T: Entity>(document: Value) -> DatabaseResult<T> {
    serde_json::from_value(document).map_err(|e| DatabaseError::InvalidRecord {
        collection: T::COLLECTION,
        message: e.to_string(),
    })
}

/// JSON merge patch: objects merge recursively, `null` removes a key,
/// anything else replaces the target value
pub fn merge_patch(target: &mut Value, patch: &Value) {
    match patch {
        Value::Object(patch_map) => {
            if !target.is_object() {
                *target = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(target_map) = target {
                for (key, value) in patch_map {
                    if value.is_null() {
                        target_map.remove(key);
                    } else {
                        merge_patch(target_map.entry(key.clone()).or_insert(Value::Null), value);
                    }
                }
            }
        }
        other => *target = other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_patch_nested() {
        let mut doc = json!({"name": "Ward A", "contact": {"phone": "1", "email": "a@b.io"}, "notes": "x"});
        merge_patch(&mut doc, &json!({"contact": {"phone": "2"}, "notes": null}));
        assert_eq!(doc, json!({"name": "Ward A", "contact": {"phone": "2", "email": "a@b.io"}}));
    }

    #[test]
    fn test_merge_patch_replaces_arrays() {
        let mut doc = json!({"items": [1, 2, 3]});
        merge_patch(&mut doc, &json!({"items": [4]}));
        assert_eq!(doc, json!({"items": [4]}));
    }
}
