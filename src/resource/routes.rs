//! Route table construction.
//!
//! # Responsibilities
//! - Bind one handler per allowed verb (fixed order: get, post, put, delete)
//! - Always bind the `schema` introspection handler
//! - Look handlers up by their string key
//!
//! # Design Decisions
//! - Handlers come from an explicit trait, one method per verb
//! - The table is frozen after `build`; there is no rebind
//! - Lookup is a linear scan over at most five entries

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use axum::response::Response;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde_json::Value;

use crate::store::Queryset;

/// CRUD verbs a resource can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

impl Verb {
    /// Binding order of the route table.
    pub const ALL: [Verb; 4] = [Verb::Get, Verb::Post, Verb::Put, Verb::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
            Verb::Put => "put",
            Verb::Delete => "delete",
        }
    }

    /// Case-insensitive parse; `None` for anything outside the four verbs.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
    }

    /// Verbs whose handlers read a request body.
    pub fn has_body(&self) -> bool {
        matches!(self, Verb::Post | Verb::Put)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a route table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteKey {
    Verb(Verb),
    Schema,
}

impl RouteKey {
    pub const SCHEMA: &'static str = "schema";

    pub fn as_str(&self) -> &'static str {
        match self {
            RouteKey::Verb(verb) => verb.as_str(),
            RouteKey::Schema => Self::SCHEMA,
        }
    }
}

/// Everything a handler gets to see of a request.
#[derive(Debug, Clone)]
pub struct HandlerContext {
    /// Scoped and filtered queryset for this request.
    pub queryset: Queryset,
    /// Parsed JSON body (post/put only).
    pub body: Option<Value>,
    pub request_id: String,
}

/// Per-verb handlers of a resource. Implementations must not mutate state.
#[async_trait]
pub trait ResourceHandlers: Send + Sync {
    async fn get(&self, ctx: HandlerContext) -> Response;
    async fn post(&self, ctx: HandlerContext) -> Response;
    async fn put(&self, ctx: HandlerContext) -> Response;
    async fn delete(&self, ctx: HandlerContext) -> Response;
    async fn schema(&self, ctx: HandlerContext) -> Response;
}

/// A bound handler closure.
pub type Handler = Arc<dyn Fn(HandlerContext) -> BoxFuture<'static, Response> + Send + Sync>;

/// Frozen mapping of route key → handler.
#[derive(Clone)]
pub struct RouteTable {
    entries: Vec<(RouteKey, Handler)>,
}

impl RouteTable {
    /// Bind `handlers` for each verb present in `methods`, plus `schema`.
    ///
    /// `methods` must already be lowercased; unknown tokens are ignored.
    pub fn build<H>(handlers: &Arc<H>, methods: &[String]) -> Self
    where
        H: ResourceHandlers + 'static,
    {
        let mut entries = Vec::with_capacity(Verb::ALL.len() + 1);
        for verb in Verb::ALL {
            if methods.iter().any(|m| m == verb.as_str()) {
                entries.push((RouteKey::Verb(verb), bind(handlers, RouteKey::Verb(verb))));
            }
        }
        entries.push((RouteKey::Schema, bind(handlers, RouteKey::Schema)));
        Self { entries }
    }

    /// Look a handler up by verb or route name.
    pub fn get(&self, key: &str) -> Option<&Handler> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, handler)| handler)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Keys in binding order.
    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Bound verbs in binding order.
    pub fn verbs(&self) -> Vec<Verb> {
        self.entries
            .iter()
            .filter_map(|(k, _)| match k {
                RouteKey::Verb(verb) => Some(*verb),
                RouteKey::Schema => None,
            })
            .collect()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("keys", &self.keys())
            .finish()
    }
}

fn bind<H>(handlers: &Arc<H>, key: RouteKey) -> Handler
where
    H: ResourceHandlers + 'static,
{
    let handlers = Arc::clone(handlers);
    Arc::new(move |ctx: HandlerContext| {
        let handlers = Arc::clone(&handlers);
        async move {
            match key {
                RouteKey::Verb(Verb::Get) => handlers.get(ctx).await,
                RouteKey::Verb(Verb::Post) => handlers.post(ctx).await,
                RouteKey::Verb(Verb::Put) => handlers.put(ctx).await,
                RouteKey::Verb(Verb::Delete) => handlers.delete(ctx).await,
                RouteKey::Schema => handlers.schema(ctx).await,
            }
        }
        .boxed()
    })
}
