//! Filter extraction and application.
//!
//! # Responsibilities
//! - Classify a path segment as an id filter (24 hex characters)
//! - Narrow a queryset by a list of filters, in order
//!
//! # Design Decisions
//! - No regex: a byte scan decides the match
//! - Only `_id` filters exist today; `FilterSpec` is keyed so others can follow

use serde::Serialize;

use crate::store::{ObjectId, Queryset};

/// Key every id filter constrains.
pub const ID_KEY: &str = "_id";

/// One equality constraint extracted from the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub key: String,
    pub val: Option<String>,
}

impl FilterSpec {
    pub fn id(val: impl Into<String>) -> Self {
        Self {
            key: ID_KEY.to_string(),
            val: Some(val.into()),
        }
    }
}

/// Filters carried by `segment`: one `_id` filter for a hex id, else none.
pub fn classify_filters(segment: Option<&str>) -> Vec<FilterSpec> {
    match segment {
        Some(s) if ObjectId::is_valid(s) => vec![FilterSpec::id(s)],
        _ => Vec::new(),
    }
}

/// Narrow `queryset` by every filter that carries a value.
pub fn apply_filters(filters: &[FilterSpec], queryset: Queryset) -> Queryset {
    filters.iter().fold(queryset, |qs, filter| match &filter.val {
        Some(val) => qs.where_eq(filter.key.clone(), val.clone()),
        None => qs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DocumentStore, MemoryStore, Model, Schema};
    use serde_json::json;
    use std::sync::Arc;

    const ID: &str = "507f191e810c19729de860ea";

    fn all() -> Queryset {
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        Model::register(&store, "widget", Schema::default())
            .unwrap()
            .find_all()
    }

    #[test]
    fn test_hex_segment_yields_id_filter() {
        assert_eq!(classify_filters(Some(ID)), vec![FilterSpec::id(ID)]);
        assert_eq!(
            classify_filters(Some("507F191E810C19729DE860EA")),
            vec![FilterSpec::id("507F191E810C19729DE860EA")]
        );
    }

    #[test]
    fn test_other_segments_yield_nothing() {
        assert!(classify_filters(None).is_empty());
        assert!(classify_filters(Some("")).is_empty());
        assert!(classify_filters(Some("schema")).is_empty());
        assert!(classify_filters(Some(&ID[..23])).is_empty());
        assert!(classify_filters(Some("zzzzzzzzzzzzzzzzzzzzzzzz")).is_empty());
    }

    #[test]
    fn test_apply_in_order() {
        let filters = vec![
            FilterSpec::id(ID),
            FilterSpec {
                key: "name".into(),
                val: Some("x".into()),
            },
        ];
        let qs = apply_filters(&filters, all());
        let applied: Vec<_> = qs
            .constraints()
            .iter()
            .map(|c| (c.key.as_str(), c.value.clone()))
            .collect();
        assert_eq!(applied, vec![("_id", json!(ID)), ("name", json!("x"))]);
    }

    #[test]
    fn test_valueless_filter_skipped() {
        let filters = vec![FilterSpec {
            key: "name".into(),
            val: None,
        }];
        assert!(apply_filters(&filters, all()).constraints().is_empty());
    }

    #[test]
    fn test_empty_filters_leave_queryset_untouched() {
        assert!(apply_filters(&[], all()).constraints().is_empty());
    }
}
