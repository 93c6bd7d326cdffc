//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → HttpServer, logging, metrics exporter
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Routes are registered in code, never from config

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AccessLogSettings, CompressionConfig, LimitsConfig, ListenerConfig, ObservabilityConfig,
    ServerConfig, TimeoutConfig, TlsConfig,
};
pub use validation::{validate_config, ValidationError};
