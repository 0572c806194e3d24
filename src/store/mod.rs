//! Document storage subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     Schema (fields, kinds, required)
//!     → Model::register (store rejects duplicate names)
//!     → Model handle kept by the resource descriptor
//!
//! Per request:
//!     Model::find_all()
//!     → Queryset::where_eq (narrow, nothing executed yet)
//!     → find / find_one_and_update / find_one_and_remove
//!     → DocumentStore driver
//! ```
//!
//! # Design Decisions
//! - The store is an explicit object owned by the application root
//! - Querysets are plain values: narrowing returns a new handle
//! - Driver errors keep their JSON payload so handlers can return it verbatim

pub mod error;
pub mod memory;
pub mod object_id;
pub mod queryset;
pub mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

pub use error::{FieldError, StoreError};
pub use memory::MemoryStore;
pub use object_id::ObjectId;
pub use queryset::{Constraint, Queryset};
pub use schema::{FieldDef, FieldKind, Schema};

/// A stored document. Always carries an `_id` once persisted.
pub type Document = Map<String, Value>;

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Storage driver contract used by resources.
///
/// Every terminal operation receives the queryset that scopes it; the
/// `match_spec` of the find-one operations adds further equality
/// constraints on top of that scope.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Register a schema under a collection name. Fails on a name collision.
    fn register_schema(&self, name: &str, schema: Schema) -> StoreResult<()>;

    /// Build and persist a new document from a request body.
    async fn insert(&self, collection: &str, body: Value) -> StoreResult<Document>;

    /// List every document matching the queryset, in insertion order.
    async fn find(&self, queryset: &Queryset) -> StoreResult<Vec<Document>>;

    /// Apply `update` to the first matching document and return the updated
    /// document, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        queryset: &Queryset,
        match_spec: Document,
        update: Value,
    ) -> StoreResult<Option<Document>>;

    /// Remove the first matching document and return it, or `None`.
    async fn find_one_and_remove(
        &self,
        queryset: &Queryset,
        match_spec: Document,
    ) -> StoreResult<Option<Document>>;
}

/// Document constructor for one registered collection.
#[derive(Clone)]
pub struct Model {
    store: Arc<dyn DocumentStore>,
    name: String,
}

impl Model {
    /// Register `schema` under `name` and return the constructor for it.
    pub fn register(
        store: &Arc<dyn DocumentStore>,
        name: impl Into<String>,
        schema: Schema,
    ) -> StoreResult<Self> {
        let name = name.into();
        store.register_schema(&name, schema)?;
        Ok(Self {
            store: Arc::clone(store),
            name,
        })
    }

    /// Collection name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queryset over every document of this collection.
    pub fn find_all(&self) -> Queryset {
        Queryset::new(Arc::clone(&self.store), self.name.clone())
    }

    /// Construct a document from `body` under this schema and persist it.
    pub async fn create(&self, body: Value) -> StoreResult<Document> {
        self.store.insert(&self.name, body).await
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("name", &self.name).finish()
    }
}
