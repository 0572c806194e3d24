//! Per-request dispatch.
//!
//! # States
//! ```text
//! Entry (lowercase path + verb)
//!     → Parse (filters, route)
//!     → Scope (all documents, or seeded from the parent's scope)
//!     → Apply filters
//!     → Route: verb handler | named handler | child resource | Next
//! ```
//!
//! # Design Decisions
//! - Single pass, no retries, no state revisited
//! - The scoped queryset is passed down as an argument, never stored
//! - Handlers produce the response; the dispatcher only selects one
//! - An unknown route name is not an error: it falls through as `Next`

use std::sync::Arc;

use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;

use crate::resource::descriptor::ResourceDescriptor;
use crate::resource::filter::{apply_filters, ID_KEY};
use crate::resource::routes::{HandlerContext, RouteTable, Verb};
use crate::resource::url::parse_url;
use crate::store::Queryset;

/// A request as seen by a resource: path relative to its mount point.
#[derive(Debug, Clone)]
pub struct ResourceRequest {
    pub method: String,
    pub path: String,
    pub body: Option<Value>,
    pub request_id: String,
}

/// Outcome of one dispatch.
#[derive(Debug)]
pub enum Dispatch {
    /// A handler produced the response.
    Handled(Response),
    /// Nothing here matched; the caller should try the next collaborator.
    Next,
    /// The path was ours but the verb has no handler.
    MethodNotAllowed { resource: String, allowed: Vec<Verb> },
}

/// Dispatch entry point for one resource and its children.
pub struct Dispatcher {
    descriptor: Arc<ResourceDescriptor>,
    routes: RouteTable,
    children: Vec<Arc<Dispatcher>>,
}

impl Dispatcher {
    pub fn new(descriptor: Arc<ResourceDescriptor>, children: Vec<Arc<Dispatcher>>) -> Self {
        let routes = RouteTable::build(&descriptor, descriptor.methods());
        Self {
            descriptor,
            routes,
            children,
        }
    }

    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.descriptor
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn children(&self) -> &[Arc<Dispatcher>] {
        &self.children
    }

    fn child(&self, name: &str) -> Option<&Arc<Dispatcher>> {
        self.children.iter().find(|c| c.descriptor.name() == name)
    }

    /// Base queryset for this level.
    ///
    /// At the top level this is every document of the resource. Below a
    /// parent, each `_id` constraint of the parent's scope becomes a
    /// `<parent>_key` constraint on this resource's documents.
    fn scope(&self, inherited: Option<Queryset>) -> Queryset {
        let all = self.descriptor.model().find_all();
        let (Some(parent_scope), Some(parent)) = (inherited, self.descriptor.parent()) else {
            return all;
        };

        let link = parent.key_name();
        parent_scope
            .constraints()
            .iter()
            .filter(|c| c.key == ID_KEY)
            .fold(all, |qs, c| qs.where_eq(link.clone(), c.value.clone()))
    }

    /// Dispatch `request`, scoped by `inherited` when called from a parent.
    pub fn dispatch(
        &self,
        request: ResourceRequest,
        inherited: Option<Queryset>,
    ) -> BoxFuture<'_, Dispatch> {
        async move {
            let path = request.path.to_lowercase();
            let method = request.method.to_lowercase();
            let parsed = parse_url(&path);

            let queryset = apply_filters(&parsed.filters, self.scope(inherited));
            let ctx = HandlerContext {
                queryset,
                body: request.body,
                request_id: request.request_id,
            };

            if parsed.route.is_empty() {
                let handler = Verb::parse(&method).and_then(|v| self.routes.get(v.as_str()));
                return match handler {
                    Some(handler) => Dispatch::Handled(handler(ctx).await),
                    None => {
                        tracing::debug!(
                            request_id = %ctx.request_id,
                            resource = %self.descriptor.name(),
                            method = %method,
                            "No handler bound for verb"
                        );
                        Dispatch::MethodNotAllowed {
                            resource: self.descriptor.name().to_string(),
                            allowed: self.routes.verbs(),
                        }
                    }
                };
            }

            if let Some(handler) = self.routes.get(&parsed.route) {
                return Dispatch::Handled(handler(ctx).await);
            }

            if let Some(child) = self.child(&parsed.route) {
                let request = ResourceRequest {
                    method,
                    path: parsed.remainder,
                    body: ctx.body,
                    request_id: ctx.request_id,
                };
                return child.dispatch(request, Some(ctx.queryset)).await;
            }

            tracing::debug!(
                request_id = %ctx.request_id,
                resource = %self.descriptor.name(),
                route = %parsed.route,
                "Unknown route, falling through"
            );
            Dispatch::Next
        }
        .boxed()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("resource", &self.descriptor.name())
            .field("routes", &self.routes)
            .field("children", &self.children)
            .finish()
    }
}
