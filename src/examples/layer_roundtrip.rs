//! Layer Round Trip Example
//!
//! Inserts a handful of feature records on two z-layers, then reads them
//! back per layer, per tile and per region.
//!
//! Run with: cargo run -p tiledoc-rs --example layer_roundtrip

use tiledoc_rs::{Client, Config, CreateOptions, Feature, FeatureProperties, DEFAULT_TILE_SIZE};

const RLE: &str = "2098177 8 2100225 8 2102273 8 2104321 8 2106369 8 2108417 8 2110465 8 2112513 8";

/// Spread `count` features over a 2048x2048 region of interest
fn features_at_layer(z_layer: i64, count: i64) -> Vec<Feature> {
    (0..count)
        .map(|i| {
            let x = (i * 389 + z_layer * 97) % 2048;
            let y = (i * 211 + z_layer * 53) % 2048;
            Feature::point(
                x,
                y,
                z_layer,
                FeatureProperties {
                    area: 400 + (i as u64 * 37) % 200,
                    perimeter: 100 + (i as u64 * 13) % 120,
                    rle: RLE.to_string(),
                },
            )
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    if !config.has_credentials() {
        anyhow::bail!("Set TILEDOC_USER and TILEDOC_PASSWORD to run this example");
    }

    let client = Client::connect(&config, "b123__p123__20201012", CreateOptions::overwrite()).await?;

    let mut items = features_at_layer(0, 12);
    items.extend(features_at_layer(1, 4));
    client.add_multiple_items(&items).await?;
    println!("📝 Added {} features\n", items.len());

    for layer in [0, 1, 2] {
        let found = client.extract_items(layer).await?;
        println!("---- layer {} : {} features ------", layer, found.len());
        for item in &found {
            println!("   {}", item);
        }
    }

    let tile = client.extract_tile_data(0, 0, 0, DEFAULT_TILE_SIZE).await?;
    println!("\n🔍 Tile (0, 0) at layer 0: {} features", tile.len());

    let region = client.extract_region(0, 512, 512, 1535, 1535).await?;
    println!("🔍 Region (512, 512)-(1535, 1535) at layer 0: {} features", region.len());

    Ok(())
}
