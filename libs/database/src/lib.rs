//! Database plumbing for the storefront services.
//!
//! Connection setup, retry with backoff and health probes. Collections and
//! queries live in the domain crates.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB client setup and health checks
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//! use database::common::RetryConfig;
//!
//! let config = MongoConfig::new("mongodb://localhost:27017").with_database("storefront");
//! let client = connect_from_config_with_retry(&config, Some(RetryConfig::new())).await?;
//! let products = client.database(config.database()).collection::<Document>("products");
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;
