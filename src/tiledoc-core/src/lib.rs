//! tiledoc Core Library
//!
//! This crate provides the pieces of tiledoc that do not touch the network:
//! - Feature record and metadata document models
//! - SODA response shapes
//! - Query predicate construction for layer, tile and region lookups
//! - Client configuration

pub mod config;
pub mod models;
pub mod query;

// Re-export commonly used types
pub use config::Config;
pub use models::*;
pub use query::{Comparator, Predicate, Region, DEFAULT_TILE_SIZE};
