//! Collection schemas and value casting.
//!
//! # Responsibilities
//! - Describe the fields of a collection (name, kind, required)
//! - Build new documents from request bodies (cast, drop unknown, check required)
//! - Cast update documents (no required checks on update)
//!
//! # Design Decisions
//! - Strict mode only: fields absent from the schema are silently dropped
//! - Casting is lenient in the usual document-store way ("42" → 42, 1 → true)
//! - `_id` is never taken from an update body

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::store::error::{FieldError, StoreError};
use crate::store::object_id::ObjectId;
use crate::store::Document;

/// Type of a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    ObjectId,
    Array,
    Object,
    #[default]
    Mixed,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "String",
            FieldKind::Number => "Number",
            FieldKind::Boolean => "Boolean",
            FieldKind::ObjectId => "ObjectId",
            FieldKind::Array => "Array",
            FieldKind::Object => "Object",
            FieldKind::Mixed => "Mixed",
        };
        f.write_str(name)
    }
}

/// One field of a schema.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(default)]
    pub kind: FieldKind,

    #[serde(default)]
    pub required: bool,
}

/// Ordered field definitions for one collection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// Add an optional field.
    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
            required: false,
        });
        self
    }

    /// Add a required field.
    pub fn required(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
            required: true,
        });
        self
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Construct a new document for `collection` from a request body.
    ///
    /// Collects every cast and required failure into one validation error.
    pub fn build_document(&self, collection: &str, body: &Value) -> Result<Document, StoreError> {
        let body = body
            .as_object()
            .ok_or_else(|| StoreError::NotAnObject(body.clone()))?;

        let id = match body.get("_id") {
            None | Some(Value::Null) => ObjectId::new().to_string(),
            Some(raw) => cast(FieldKind::ObjectId, raw)
                .and_then(|v| v.as_str().map(str::to_string))
                .ok_or_else(|| StoreError::Cast {
                    kind: FieldKind::ObjectId,
                    value: raw.clone(),
                    path: "_id".to_string(),
                })?,
        };

        let mut document = Map::new();
        document.insert("_id".to_string(), Value::String(id));

        let mut errors = Vec::new();
        for def in self.fields.iter().filter(|f| f.name != "_id") {
            match body.get(&def.name) {
                Some(raw) => match cast(def.kind, raw) {
                    Some(value) if def.required && is_blank(&value) => {
                        errors.push(FieldError::required(&def.name));
                    }
                    Some(value) => {
                        document.insert(def.name.clone(), value);
                    }
                    None => errors.push(FieldError::cast(&def.name, def.kind, raw)),
                },
                None if def.required => errors.push(FieldError::required(&def.name)),
                None => {}
            }
        }

        if errors.is_empty() {
            Ok(document)
        } else {
            Err(StoreError::Validation {
                collection: collection.to_string(),
                errors,
            })
        }
    }

    /// Cast an update body into the set of fields to overwrite.
    pub fn cast_update(&self, update: &Value) -> Result<Document, StoreError> {
        let update = update
            .as_object()
            .ok_or_else(|| StoreError::NotAnObject(update.clone()))?;

        let mut changes = Map::new();
        for (key, raw) in update.iter().filter(|(k, _)| k.as_str() != "_id") {
            let Some(def) = self.get(key) else {
                continue;
            };
            let value = cast(def.kind, raw).ok_or_else(|| StoreError::Cast {
                kind: def.kind,
                value: raw.clone(),
                path: key.clone(),
            })?;
            changes.insert(key.clone(), value);
        }
        Ok(changes)
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Cast `raw` to `kind`. `None` means the cast failed. Null always passes.
fn cast(kind: FieldKind, raw: &Value) -> Option<Value> {
    if raw.is_null() {
        return Some(Value::Null);
    }
    match kind {
        FieldKind::Mixed => Some(raw.clone()),
        FieldKind::String => match raw {
            Value::String(_) => Some(raw.clone()),
            Value::Number(n) => Some(Value::String(n.to_string())),
            Value::Bool(b) => Some(Value::String(b.to_string())),
            _ => None,
        },
        FieldKind::Number => match raw {
            Value::Number(_) => Some(raw.clone()),
            Value::String(s) => parse_number(s.trim()),
            Value::Bool(b) => Some(Value::from(u8::from(*b))),
            _ => None,
        },
        FieldKind::Boolean => match raw {
            Value::Bool(_) => Some(raw.clone()),
            Value::String(s) => match s.as_str() {
                "true" | "1" | "yes" => Some(Value::Bool(true)),
                "false" | "0" | "no" => Some(Value::Bool(false)),
                _ => None,
            },
            Value::Number(n) => match n.as_i64() {
                Some(1) => Some(Value::Bool(true)),
                Some(0) => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        FieldKind::ObjectId => match raw {
            Value::String(s) => s
                .parse::<ObjectId>()
                .ok()
                .map(|id| Value::String(id.to_string())),
            _ => None,
        },
        FieldKind::Array => match raw {
            Value::Array(_) => Some(raw.clone()),
            other => Some(Value::Array(vec![other.clone()])),
        },
        FieldKind::Object => match raw {
            Value::Object(_) => Some(raw.clone()),
            _ => None,
        },
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if s.is_empty() {
        return None;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Some(Value::from(i));
    }
    s.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn widget_schema() -> Schema {
        Schema::default()
            .required("name", FieldKind::String)
            .field("size", FieldKind::Number)
            .field("active", FieldKind::Boolean)
            .field("tags", FieldKind::Array)
    }

    #[test]
    fn test_build_document_casts_and_drops_unknown() {
        let doc = widget_schema()
            .build_document(
                "widget",
                &json!({"name": "x", "size": "42", "active": 1, "tags": "a", "extra": true}),
            )
            .unwrap();

        assert_eq!(doc["name"], "x");
        assert_eq!(doc["size"], 42);
        assert_eq!(doc["active"], true);
        assert_eq!(doc["tags"], json!(["a"]));
        assert!(!doc.contains_key("extra"));
        assert!(ObjectId::is_valid(doc["_id"].as_str().unwrap()));
    }

    #[test]
    fn test_build_document_collects_errors() {
        let err = widget_schema()
            .build_document("widget", &json!({"size": "big"}))
            .unwrap_err();

        match err {
            StoreError::Validation { collection, errors } => {
                assert_eq!(collection, "widget");
                let paths: Vec<_> = errors.iter().map(|e| e.path.as_str()).collect();
                assert_eq!(paths, vec!["name", "size"]);
                assert_eq!(errors[1].name, "CastError");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_required_rejects_empty_string() {
        let err = widget_schema()
            .build_document("widget", &json!({"name": ""}))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn test_explicit_id_is_kept_lowercase() {
        let doc = widget_schema()
            .build_document("widget", &json!({"_id": "507F191E810C19729DE860EA", "name": "x"}))
            .unwrap();
        assert_eq!(doc["_id"], "507f191e810c19729de860ea");

        let err = widget_schema()
            .build_document("widget", &json!({"_id": "nope", "name": "x"}))
            .unwrap_err();
        assert!(matches!(err, StoreError::Cast { ref path, .. } if path == "_id"));
    }

    #[test]
    fn test_non_object_body() {
        let err = widget_schema().build_document("widget", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, StoreError::NotAnObject(_)));
    }

    #[test]
    fn test_cast_update_skips_id_and_unknown() {
        let changes = widget_schema()
            .cast_update(&json!({"_id": "507f191e810c19729de860ea", "size": 3, "bogus": 1}))
            .unwrap();
        assert_eq!(Value::Object(changes), json!({"size": 3}));
    }

    #[test]
    fn test_cast_update_rejects_bad_value() {
        let err = widget_schema()
            .cast_update(&json!({"active": "maybe"}))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Cast {
                kind: FieldKind::Boolean,
                value: json!("maybe"),
                path: "active".into(),
            }
        );
    }

    #[test]
    fn test_schema_from_toml_style_config() {
        let schema: Schema =
            serde_json::from_value(json!([{"name": "name", "kind": "string", "required": true}]))
                .unwrap();
        assert_eq!(schema.fields()[0].kind, FieldKind::String);
        assert!(schema.fields()[0].required);
    }
}
