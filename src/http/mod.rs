//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, body decoding)
//!     → request.rs (request ID)
//!     → [mounted resources dispatch in order]
//!     → response.rs (JSON bodies, 404/405/400/413)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod tls;

pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::HttpServer;
pub use tls::load_tls_config;
