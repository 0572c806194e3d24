//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP host and resources produce:
//!     → logging.rs (structured log events with request_id)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every log line of a request
//! - Metrics are optional; disabled by default

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
