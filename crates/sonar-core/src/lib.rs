//! # sonar-core
//!
//! Core types, traits, and utilities for the Sonar query layer.
//!
//! This crate provides the building blocks shared by the other crates:
//! - Error taxonomy and result alias
//! - Client configuration
//! - Pagination result and page requests
//! - Field types and selection sets
//! - The `Transport` and `WireDecodable` capabilities

pub mod config;
pub mod error;
pub mod pagination;
pub mod traits;
pub mod transport;
pub mod types;

pub use config::{ConfigError, SonarConfig};
pub use error::*;
pub use pagination::*;
pub use traits::*;
pub use transport::{MemoryTransport, RecordedRequest, Transport};
pub use types::*;
