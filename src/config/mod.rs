//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → resources handed to the registry, the rest to the HTTP host
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; resources cannot change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::ServiceConfig;
pub use schema::ListenerConfig;
pub use schema::ResourceConfig;
pub use schema::{ObservabilityConfig, SecurityConfig, TimeoutConfig, TlsConfig};
