//! Declarative configuration for resilience primitives.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ResilienceConfig (validated, immutable)
//!     → section.build() → breaker / token / balancer / clock / retrier
//! ```
//!
//! # Design Decisions
//! - Every field has a default so an empty file is a valid config
//! - Validation separates syntactic (serde) from semantic checks
//! - Sections build with production timers and tickers; tests use the
//!   option builders directly

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BalancerConfig, BreakerConfig, ClockConfig, ResilienceConfig, RetryConfig, TokenConfig,
};
pub use validation::{validate_config, ValidationError};
