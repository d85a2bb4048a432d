//! Database connectors and utilities.
//!
//! # Features
//!
//! - `mongodb` - MongoDB connector, health checks and re-exported driver types
//! - `config` - `core_config::FromEnv` support for connector configs
//!
//! ```ignore
//! use database::mongodb::{MongoConfig, connect_from_config_with_retry};
//! use core_config::FromEnv;
//!
//! let config = MongoConfig::from_env()?;
//! let client = connect_from_config_with_retry(&config, None).await?;
//! let users = client.database(&config.database).collection::<User>("users");
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{DatabaseError, DatabaseResult, RetryConfig};
