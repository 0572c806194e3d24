//! In-memory document store.
//!
//! # Responsibilities
//! - Hold one schema and one ordered document list per collection
//! - Execute querysets against those lists
//!
//! # Design Decisions
//! - One `DashMap` shard lock per collection; never held across an `.await`
//! - Documents kept in insertion order, so "first match" is deterministic
//! - Updates overwrite the cast fields and keep every other field

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::Value;

use crate::store::error::StoreError;
use crate::store::queryset::Queryset;
use crate::store::schema::Schema;
use crate::store::{Document, DocumentStore, StoreResult};

#[derive(Debug, Default)]
struct Collection {
    schema: Schema,
    documents: Vec<Document>,
}

impl Collection {
    fn position(&self, queryset: &Queryset, match_spec: &Document) -> Option<usize> {
        self.documents.iter().position(|d| {
            queryset.matches(d) && match_spec.iter().all(|(k, v)| d.get(k) == Some(v))
        })
    }
}

/// Process-local [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl MemoryStore {
    /// Number of documents in a collection (0 if unknown).
    fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }

    fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn register_schema(&self, name: &str, schema: Schema) -> StoreResult<()> {
        match self.collections.entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::SchemaExists(name.to_string())),
            Entry::Vacant(slot) => {
                tracing::debug!(collection = %name, fields = schema.fields().len(), "Schema registered");
                slot.insert(Collection {
                    schema,
                    documents: Vec::new(),
                });
                Ok(())
            }
        }
    }

    async fn insert(&self, collection: &str, body: Value) -> StoreResult<Document> {
        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.to_string()))?;

        let document = entry.schema.build_document(collection, &body)?;
        let id = document.get("_id").cloned().unwrap_or(Value::Null);
        if entry.documents.iter().any(|d| d.get("_id") == Some(&id)) {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                id: id.as_str().unwrap_or_default().to_string(),
            });
        }

        entry.documents.push(document.clone());
        Ok(document)
    }

    async fn find(&self, queryset: &Queryset) -> StoreResult<Vec<Document>> {
        let entry = self
            .collections
            .get(queryset.collection())
            .ok_or_else(|| StoreError::UnknownCollection(queryset.collection().to_string()))?;

        Ok(entry
            .documents
            .iter()
            .filter(|d| queryset.matches(d))
            .cloned()
            .collect())
    }

    async fn find_one_and_update(
        &self,
        queryset: &Queryset,
        match_spec: Document,
        update: Value,
    ) -> StoreResult<Option<Document>> {
        let mut entry = self
            .collections
            .get_mut(queryset.collection())
            .ok_or_else(|| StoreError::UnknownCollection(queryset.collection().to_string()))?;

        let changes = entry.schema.cast_update(&update)?;
        let Some(index) = entry.position(queryset, &match_spec) else {
            return Ok(None);
        };

        let document = &mut entry.documents[index];
        for (key, value) in changes {
            document.insert(key, value);
        }
        Ok(Some(document.clone()))
    }

    async fn find_one_and_remove(
        &self,
        queryset: &Queryset,
        match_spec: Document,
    ) -> StoreResult<Option<Document>> {
        let mut entry = self
            .collections
            .get_mut(queryset.collection())
            .ok_or_else(|| StoreError::UnknownCollection(queryset.collection().to_string()))?;

        let Some(index) = entry.position(queryset, &match_spec) else {
            return Ok(None);
        };
        Ok(Some(entry.documents.remove(index)))
    }
}
