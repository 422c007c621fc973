use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tiledoc_rs::DEFAULT_TILE_SIZE;

/// Store and query tiled feature collections in a SODA document store
#[derive(Debug, Parser)]
#[command(name = "tiledoc", version)]
pub struct Cli {
    /// JSON configuration file; environment variables override its values
    #[arg(short, long, env = "TILEDOC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for the JSON log files
    #[arg(long, env = "TILEDOC_LOG_DIR", default_value = "./logs")]
    pub log_dir: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the collections visible to the user
    List {
        /// Print the full listing with each collection's schema
        #[arg(long)]
        schema: bool,
    },

    /// Create a collection
    Create {
        collection: String,
        /// Delete and recreate the collection if it already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Delete a collection and all its documents
    Delete { collection: String },

    /// Insert the document, or array of documents, stored in a JSON file
    Add { collection: String, file: PathBuf },

    /// Store the collection metadata read from a JSON file
    SetMetadata { collection: String, file: PathBuf },

    /// Print the collection metadata
    Metadata { collection: String },

    /// Print every feature at a z-layer
    Layer { collection: String, z_layer: i64 },

    /// Print the features of one tile
    Tile {
        collection: String,
        z_layer: i64,
        x0: i64,
        y0: i64,
        #[arg(long, default_value_t = DEFAULT_TILE_SIZE)]
        size: i64,
    },

    /// Print the features inside an inclusive bounding box
    Region {
        collection: String,
        z_layer: i64,
        x0: i64,
        y0: i64,
        xf: i64,
        yf: i64,
    },
}

impl Command {
    pub fn collection(&self) -> Option<&str> {
        match self {
            Command::List { .. } => None,
            Command::Create { collection, .. }
            | Command::Delete { collection }
            | Command::Add { collection, .. }
            | Command::SetMetadata { collection, .. }
            | Command::Metadata { collection }
            | Command::Layer { collection, .. }
            | Command::Tile { collection, .. }
            | Command::Region { collection, .. } => Some(collection),
        }
    }
}
