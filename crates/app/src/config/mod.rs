//! Configuration
//!
//! Settings shared by the CLI commands, read from flags with environment
//! fallbacks. A `.env` file is loaded first when present.

pub mod checkout;
pub mod db;
pub mod notifications;
pub mod observability;

pub use checkout::{CheckoutConfig, ConfigError};
pub use db::DatabaseConfig;
pub use notifications::NotificationConfig;
pub use observability::{LogFormat, LoggingConfig};
