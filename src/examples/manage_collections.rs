//! Collection Lifecycle Example
//!
//! Creates a scratch collection, shows it in the listing, then deletes it.
//!
//! Run with: TILEDOC_BASE_URL=... TILEDOC_USER=... TILEDOC_PASSWORD=... \
//!     cargo run -p tiledoc-rs --example manage_collections

use tiledoc_rs::{Client, Config, CreateOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    if !config.has_credentials() {
        anyhow::bail!("Set TILEDOC_USER and TILEDOC_PASSWORD to run this example");
    }

    let client = Client::connect(&config, "test_coll_dec29", CreateOptions::overwrite()).await?;
    println!("Created {}\n", client.collection());

    println!("Collections after creating the test collection:");
    for name in client.list_collections().await? {
        println!("   {}", name);
    }

    client.delete_collection().await?;

    println!("\nCollections after deleting the test collection:");
    for name in client.list_collections().await? {
        println!("   {}", name);
    }

    Ok(())
}
