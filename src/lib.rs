//! docroute: REST resources over a document store.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ mount (by base URL) ──▶ resource::dispatch
//!                      │ request id                               │ url → filters, route
//!                      │ timeout, body limit                      │ verb | schema | child
//!                      │ JSON decode                              ▼
//!                      │                                  resource::handlers
//!                      │                                          │
//!                      │                                          ▼
//!     Client Response  │                                  store (Queryset → DocumentStore)
//!     ◀────────────────┘
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```
//!
//! Resources are declared in config (or via [`resource::ResourceRegistry`]),
//! each one backed by a named collection with a schema. A resource can
//! answer `GET`/`POST` on its base URL, `GET`/`PUT`/`DELETE` on
//! `<base>/<id>`, a `schema` description route, and nest its children
//! under `<base>/<id>/<child>`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resource;
pub mod store;

pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resource::{ResourceDescriptor, ResourceRegistry, ResourceSpec};
pub use store::{DocumentStore, MemoryStore};
