//! Resource routing and dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ResourceSpec[]
//!     → registry.rs (resolve parents, register schemas)
//!     → descriptor.rs (derive URL templates)
//!     → routes.rs (bind verb handlers + schema, freeze)
//!     → dispatch.rs (dispatcher tree: roots with children)
//!
//! Per request (path relative to the mount point):
//!     → url.rs (segments → filters + route)
//!     → filter.rs (narrow the scoped queryset)
//!     → dispatch.rs (verb handler | named route | child | Next)
//!     → handlers.rs (run against the queryset, build the JSON response)
//! ```
//!
//! # Design Decisions
//! - Descriptors and route tables are immutable after startup
//! - The per-request queryset is threaded through arguments only
//! - Only hex-id equality filters exist

pub mod descriptor;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod registry;
pub mod routes;
pub mod url;

pub use descriptor::{ResourceDescriptor, ResourceSpec};
pub use dispatch::{Dispatch, Dispatcher, ResourceRequest};
pub use error::ResourceError;
pub use filter::FilterSpec;
pub use registry::ResourceRegistry;
pub use routes::{HandlerContext, ResourceHandlers, RouteTable, Verb};
pub use url::{parse_url, ParsedUrl};
