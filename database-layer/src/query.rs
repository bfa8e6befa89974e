// List queries: equality filters on top-level document fields plus paging
use crate::error::{DatabaseError, DatabaseResult};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    filters: Vec<(String, String)>,
    limit: Option<u32>,
    offset: u64,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match documents whose `field` equals `value`. Strings compare as-is,
    /// booleans as `true`/`false` and numbers in their JSON form.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn paginate(mut self, limit: u32, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn limit(&self) -> Option<u32> {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Same filters, no paging
    pub fn unpaged(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            limit: None,
            offset: 0,
        }
    }

    /// Split off the filters on `fields`. The first query keeps the other
    /// filters and the paging; the second holds the split-off filters, unpaged.
    pub fn partition(&self, fields: &[&str]) -> (ListQuery, ListQuery) {
        let (split, kept): (Vec<_>, Vec<_>) = self
            .filters
            .iter()
            .cloned()
            .partition(|(field, _)| fields.contains(&field.as_str()));
        (
            Self {
                filters: kept,
                limit: self.limit,
                offset: self.offset,
            },
            Self {
                filters: split,
                limit: None,
                offset: 0,
            },
        )
    }

    pub fn validate(&self) -> DatabaseResult<()> {
        for (field, _) in &self.filters {
            let valid = !field.is_empty()
                && field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
            if !valid {
                return Err(DatabaseError::InvalidQuery(format!(
                    "cannot filter on field '{field}'"
                )));
            }
        }
        Ok(())
    }

    pub fn matches(&self, document: &Value) -> bool {
        self.filters.iter().all(|(field, expected)| {
            document
                .get(field)
                .and_then(filter_text)
                .is_some_and(|actual| &actual == expected)
        })
    }
}

/// Text form of a scalar used for filter comparison
pub fn filter_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_scalars() {
        let doc = json!({"status": "unpaid", "isActive": true, "quantity": 12, "notes": null});
        assert!(ListQuery::new().filter("status", "unpaid").matches(&doc));
        assert!(ListQuery::new().filter("isActive", "true").matches(&doc));
        assert!(ListQuery::new().filter("quantity", "12").matches(&doc));
        assert!(!ListQuery::new().filter("notes", "null").matches(&doc));
        assert!(!ListQuery::new().filter("missing", "x").matches(&doc));
        assert!(!ListQuery::new()
            .filter("status", "unpaid")
            .filter("quantity", "13")
            .matches(&doc));
    }

    #[test]
    fn test_partition_keeps_paging_on_stored_part() {
        let query = ListQuery::new()
            .filter("status", "overdue")
            .filter("patientId", "p-1")
            .paginate(10, 20);
        let (stored, derived) = query.partition(&["status"]);
        assert_eq!(stored.filters(), &[("patientId".to_string(), "p-1".to_string())]);
        assert_eq!((stored.limit(), stored.offset()), (Some(10), 20));
        assert_eq!(derived.filters(), &[("status".to_string(), "overdue".to_string())]);
        assert_eq!(derived.limit(), None);
        assert_eq!(stored.unpaged().limit(), None);
    }

    #[test]
    fn test_rejects_unsafe_field_names() {
        assert!(ListQuery::new().filter("patient_id", "x").validate().is_ok());
        assert!(ListQuery::new().filter("a.b", "x").validate().is_err());
        assert!(ListQuery::new().filter("x'); DROP", "x").validate().is_err());
        assert!(ListQuery::new().filter("", "x").validate().is_err());
    }
}
