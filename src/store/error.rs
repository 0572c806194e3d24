//! Storage driver errors and their wire payloads.

use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::store::schema::FieldKind;

/// A single failing path inside a validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub path: String,
    /// `required` or the kind a cast was attempted to.
    pub kind: String,
    pub message: String,
    /// `ValidatorError` or `CastError`.
    pub name: &'static str,
}

impl FieldError {
    pub fn required(path: &str) -> Self {
        Self {
            path: path.to_string(),
            kind: "required".to_string(),
            message: format!("Path `{}` is required.", path),
            name: "ValidatorError",
        }
    }

    pub fn cast(path: &str, kind: FieldKind, value: &Value) -> Self {
        Self {
            path: path.to_string(),
            kind: kind.to_string(),
            message: cast_message(&kind, value, path),
            name: "CastError",
        }
    }
}

/// Errors raised by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A schema is already registered under this collection name.
    #[error("Cannot overwrite `{0}` model once compiled.")]
    SchemaExists(String),

    /// No schema was registered for the collection.
    #[error("Schema hasn't been registered for model \"{0}\".")]
    UnknownCollection(String),

    /// Document failed schema validation on construction.
    #[error("{collection} validation failed: {}", summarize(.errors))]
    Validation {
        collection: String,
        errors: Vec<FieldError>,
    },

    /// A value could not be cast to its schema kind.
    #[error("{}", cast_message(.kind, .value, .path))]
    Cast {
        kind: FieldKind,
        value: Value,
        path: String,
    },

    /// An insert reused an existing `_id`.
    #[error("E11000 duplicate key error collection: {collection} index: _id_ dup key: {{ _id: \"{id}\" }}")]
    DuplicateKey { collection: String, id: String },

    /// The request body was not a JSON object.
    #[error("Parameter \"obj\" to Document() must be an object, got {0}")]
    NotAnObject(Value),
}

impl StoreError {
    /// Driver-shaped JSON error, returned to clients as-is.
    pub fn payload(&self) -> Value {
        let message = self.to_string();
        match self {
            StoreError::SchemaExists(_) => json!({
                "name": "OverwriteModelError",
                "message": message,
            }),
            StoreError::UnknownCollection(_) => json!({
                "name": "MissingSchemaError",
                "message": message,
            }),
            StoreError::Validation { errors, .. } => {
                let mut by_path = Map::new();
                for error in errors {
                    by_path.insert(
                        error.path.clone(),
                        json!({
                            "message": error.message,
                            "name": error.name,
                            "kind": error.kind,
                            "path": error.path,
                        }),
                    );
                }
                json!({
                    "message": message,
                    "name": "ValidationError",
                    "errors": by_path,
                })
            }
            StoreError::Cast { kind, value, path } => json!({
                "message": message,
                "name": "CastError",
                "kind": kind.to_string(),
                "value": value,
                "path": path,
            }),
            StoreError::DuplicateKey { .. } => json!({
                "name": "MongoError",
                "code": 11000,
                "message": message,
            }),
            StoreError::NotAnObject(_) => json!({
                "name": "ObjectParameterError",
                "message": message,
            }),
        }
    }
}

fn cast_message(kind: &FieldKind, value: &Value, path: &str) -> String {
    format!(
        "Cast to {} failed for value {} at path \"{}\"",
        kind, value, path
    )
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}
