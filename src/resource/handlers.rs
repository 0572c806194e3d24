//! Verb handlers bound into every resource's route table.
//!
//! Status codes are limited to 200, 201 and 400. Driver errors are returned
//! verbatim with 400. Only PUT reports a missing document; DELETE answers
//! OK whether or not something was removed, and a failing GET still
//! answers 200 (with an empty list) because its status is fixed before the
//! query runs.

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use serde_json::{json, Value};

use crate::http::response::respond;
use crate::resource::descriptor::ResourceDescriptor;
use crate::resource::routes::{HandlerContext, ResourceHandlers};
use crate::store::Document;

impl ResourceDescriptor {
    /// Drop excluded fields before a document leaves the service.
    fn project(&self, mut document: Document) -> Document {
        for field in self.excludes() {
            document.remove(field);
        }
        document
    }
}

/// Payload PUT answers with when its queryset matched nothing.
pub fn object_not_found() -> Value {
    json!({
        "message": "Object not found",
        "name": "ObjectNotFound",
        "errors": {
            "_id": {
                "message": "Could not find object with specified attributes",
            }
        }
    })
}

#[async_trait]
impl ResourceHandlers for ResourceDescriptor {
    async fn get(&self, ctx: HandlerContext) -> Response {
        tracing::debug!(request_id = %ctx.request_id, resource = %self.name(), "GET");

        let documents = match ctx.queryset.find().await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::warn!(
                    request_id = %ctx.request_id,
                    resource = %self.name(),
                    error = %e,
                    "List query failed, answering with an empty list"
                );
                Vec::new()
            }
        };

        let documents: Vec<Document> = documents.into_iter().map(|d| self.project(d)).collect();
        respond(StatusCode::OK, documents)
    }

    async fn post(&self, ctx: HandlerContext) -> Response {
        tracing::debug!(request_id = %ctx.request_id, resource = %self.name(), "POST");

        let body = ctx.body.unwrap_or_else(|| json!({}));
        match self.model().create(body).await {
            Ok(document) => respond(StatusCode::CREATED, self.project(document)),
            Err(e) => {
                tracing::debug!(request_id = %ctx.request_id, error = %e, "Create rejected by store");
                respond(StatusCode::BAD_REQUEST, e.payload())
            }
        }
    }

    async fn put(&self, ctx: HandlerContext) -> Response {
        tracing::debug!(request_id = %ctx.request_id, resource = %self.name(), "PUT");

        let update = ctx.body.unwrap_or_else(|| json!({}));
        match ctx
            .queryset
            .find_one_and_update(Document::new(), update)
            .await
        {
            Err(e) => {
                tracing::debug!(request_id = %ctx.request_id, error = %e, "Update rejected by store");
                respond(StatusCode::BAD_REQUEST, e.payload())
            }
            Ok(None) => respond(StatusCode::BAD_REQUEST, object_not_found()),
            Ok(Some(document)) => respond(StatusCode::OK, self.project(document)),
        }
    }

    async fn delete(&self, ctx: HandlerContext) -> Response {
        tracing::debug!(request_id = %ctx.request_id, resource = %self.name(), "DELETE");

        match ctx.queryset.find_one_and_remove(Document::new()).await {
            Err(e) => {
                tracing::debug!(request_id = %ctx.request_id, error = %e, "Remove rejected by store");
                respond(StatusCode::BAD_REQUEST, e.payload())
            }
            Ok(removed) => {
                if removed.is_none() {
                    tracing::debug!(request_id = %ctx.request_id, "Nothing matched, answering OK anyway");
                }
                respond(StatusCode::OK, json!({ "status": "OK" }))
            }
        }
    }

    async fn schema(&self, _ctx: HandlerContext) -> Response {
        respond(
            StatusCode::OK,
            json!({
                "resource": self.name(),
                "fields": self.fields(),
                "methods": self.methods(),
                "GET": self.detail_url(),
                "POST": self.base_url(),
                "PUT": self.detail_url(),
                "DELETE": self.detail_url(),
            }),
        )
    }
}
