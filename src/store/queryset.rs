//! Narrowable, not-yet-executed document sets.

use std::sync::Arc;

use serde_json::Value;

use crate::store::object_id::ObjectId;
use crate::store::{Document, DocumentStore, StoreResult};

/// A single equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub key: String,
    pub value: Value,
}

impl Constraint {
    fn matches(&self, document: &Document) -> bool {
        document.get(&self.key) == Some(&self.value)
    }
}

/// Handle over "documents of one collection matching every constraint so far".
///
/// Narrowing consumes the handle and returns a new one; constraints only
/// accumulate, so a narrowed queryset never matches more than its source.
#[derive(Clone)]
pub struct Queryset {
    store: Arc<dyn DocumentStore>,
    collection: String,
    constraints: Vec<Constraint>,
}

impl Queryset {
    pub(crate) fn new(store: Arc<dyn DocumentStore>, collection: String) -> Self {
        Self {
            store,
            collection,
            constraints: Vec::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Add an equality constraint. `_id` values are normalized to lowercase hex.
    pub fn where_eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = match value.into() {
            Value::String(s) if key == "_id" => match s.parse::<ObjectId>() {
                Ok(id) => Value::String(id.to_string()),
                Err(_) => Value::String(s),
            },
            other => other,
        };
        self.constraints.push(Constraint { key, value });
        self
    }

    /// Empty queryset over another collection of the same store.
    pub fn rebase(&self, collection: impl Into<String>) -> Self {
        Self::new(Arc::clone(&self.store), collection.into())
    }

    /// True if `document` satisfies every constraint.
    pub fn matches(&self, document: &Document) -> bool {
        self.constraints.iter().all(|c| c.matches(document))
    }

    /// Execute as a list query.
    pub async fn find(&self) -> StoreResult<Vec<Document>> {
        self.store.find(self).await
    }

    pub async fn find_one_and_update(
        &self,
        match_spec: Document,
        update: Value,
    ) -> StoreResult<Option<Document>> {
        self.store.find_one_and_update(self, match_spec, update).await
    }

    pub async fn find_one_and_remove(&self, match_spec: Document) -> StoreResult<Option<Document>> {
        self.store.find_one_and_remove(self, match_spec).await
    }
}

impl std::fmt::Debug for Queryset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Queryset")
            .field("collection", &self.collection)
            .field("constraints", &self.constraints)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde_json::json;

    fn queryset() -> Queryset {
        Queryset::new(Arc::new(MemoryStore::new()), "widget".into())
    }

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_constraints_accumulate_in_order() {
        let qs = queryset().where_eq("a", 1).where_eq("b", "x");
        let keys: Vec<_> = qs.constraints().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_narrowing_is_monotonic() {
        let docs = [
            doc(json!({"a": 1, "b": 1})),
            doc(json!({"a": 1, "b": 2})),
            doc(json!({"a": 2, "b": 1})),
        ];
        let one = queryset().where_eq("a", 1);
        let two = one.clone().where_eq("b", 2);

        let count = |qs: &Queryset| docs.iter().filter(|d| qs.matches(d)).count();
        assert_eq!(count(&queryset()), 3);
        assert_eq!(count(&one), 2);
        assert_eq!(count(&two), 1);
    }

    #[test]
    fn test_same_key_twice_never_widens() {
        let qs = queryset().where_eq("a", 1).where_eq("a", 2);
        assert!(!qs.matches(&doc(json!({"a": 1}))));
        assert!(!qs.matches(&doc(json!({"a": 2}))));
    }

    #[test]
    fn test_id_constraint_is_lowercased() {
        let qs = queryset().where_eq("_id", "507F191E810C19729DE860EA");
        assert_eq!(qs.constraints()[0].value, json!("507f191e810c19729de860ea"));
    }

    #[test]
    fn test_rebase_drops_constraints() {
        let qs = queryset().where_eq("a", 1).rebase("gadget");
        assert_eq!(qs.collection(), "gadget");
        assert!(qs.constraints().is_empty());
    }
}
