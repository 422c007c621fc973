//! Collection Metadata Example
//!
//! Stores the metadata document of a collection, reads it back, and shows
//! that a second metadata document is rejected.
//!
//! Run with: cargo run -p tiledoc-rs --example collection_metadata

use tiledoc_rs::{Client, ClientError, CollectionMetadata, Config, CreateOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    if !config.has_credentials() {
        anyhow::bail!("Set TILEDOC_USER and TILEDOC_PASSWORD to run this example");
    }

    let client = Client::connect(&config, "b123__p123__20201015", CreateOptions::overwrite()).await?;

    let metadata = CollectionMetadata {
        block_name: Some("b123".to_string()),
        patch_id: Some("p123".to_string()),
        registration_version: Some("20201015".to_string()),
        segmentation_model: Some("UXYZ123".to_string()),
        deduplication_method: Some("M2_V1".to_string()),
        roi_size: Some([2048, 2048]),
        roi_offset: Some([1024, 1024]),
        ..CollectionMetadata::default()
    };

    client.add_metadata(&metadata).await?;
    println!("✅ Metadata stored\n");

    let extracted = client.extract_metadata().await?;
    println!("Extracted metadata:");
    println!("{}\n", serde_json::to_string_pretty(&extracted)?);

    match client.add_metadata(&metadata).await {
        Err(ClientError::MetadataAlreadyExists) => {
            println!("Second metadata document rejected, as expected")
        }
        Err(err) => return Err(err.into()),
        Ok(()) => anyhow::bail!("A second metadata document was accepted"),
    }

    Ok(())
}
