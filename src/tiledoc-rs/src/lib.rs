//! tiledoc Client Library
//!
//! Async client for a SODA (Simple Oracle Document Access) REST document
//! store, tailored to collections of tiled feature records.
//!
//! ```rust,no_run
//! use tiledoc_rs::{Client, Config, CreateOptions};
//!
//! # async fn run() -> tiledoc_rs::Result<()> {
//! let config = Config::from_env();
//! let client = Client::connect(&config, "b123__p123__20201010", CreateOptions::create()).await?;
//! let tile = client.extract_tile_data(0, 0, 0, tiledoc_rs::DEFAULT_TILE_SIZE).await?;
//! println!("{} features in tile", tile.len());
//! # Ok(())
//! # }
//! ```

mod client;
mod extract;
mod transport;

pub use client::{Client, CreateOptions};
pub use tiledoc_core::query::{Comparator, Predicate, Region, DEFAULT_TILE_SIZE};
pub use tiledoc_core::{
    CollectionMetadata, Config, Feature, FeatureProperties, MetadataDocument, QueryPage,
};
pub use transport::{Method, Transport, TransportResponse};

/// Errors returned by every client operation.
///
/// Variants produced by a remote rejection carry the HTTP status and its
/// reason phrase unchanged.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Unable to create collection: {status} {reason}")]
    CreateCollection { status: u16, reason: String },

    #[error("Collection {0} already exists")]
    CollectionExists(String),

    #[error("Unable to delete collection: {status} {reason}")]
    DeleteCollection { status: u16, reason: String },

    #[error("Unable to access the document store: {status} {reason}")]
    Access { status: u16, reason: String },

    #[error("Unable to add item: {status} {reason}")]
    AddItem { status: u16, reason: String },

    #[error("Unable to extract data: {status} {reason}")]
    ExtractData { status: u16, reason: String },

    #[error("A collection can have only 1 metadata document")]
    MetadataAlreadyExists,

    #[error("Found {count} metadata documents. Only one is allowed")]
    TooManyMetadata { count: usize },

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// HTTP status attached to the error, if the store answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::CreateCollection { status, .. }
            | ClientError::DeleteCollection { status, .. }
            | ClientError::Access { status, .. }
            | ClientError::AddItem { status, .. }
            | ClientError::ExtractData { status, .. } => Some(*status),
            ClientError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
