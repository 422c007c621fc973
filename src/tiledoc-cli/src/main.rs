use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::path::Path;

use tiledoc_core::Config;
use tiledoc_rs::{Client, CreateOptions};

mod cli;
mod telemetry;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = telemetry::init_telemetry(&cli.log_dir, cli.verbose)?;

    let config = load_config(cli.config.as_deref())?;
    if !config.has_credentials() {
        anyhow::bail!("No credentials configured, set TILEDOC_USER and TILEDOC_PASSWORD");
    }

    tracing::info!(
        base_url = %config.base_url,
        user = %config.user,
        page_limit = ?config.page_limit,
        "tiledoc starting"
    );

    run(cli.command, &config).await
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(&path.to_string_lossy())
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => Config::default(),
    };
    Ok(config.with_env_overrides())
}

async fn run(command: Command, config: &Config) -> Result<()> {
    let collection = command.collection().unwrap_or_default().to_string();

    match command {
        Command::List { schema } => {
            let client = Client::from_config(config, collection)?;
            if schema {
                print_json(&client.list_collections_schema().await?)?;
            } else {
                for name in client.list_collections().await? {
                    println!("{}", name);
                }
            }
        }
        Command::Create { overwrite, .. } => {
            let options = if overwrite {
                CreateOptions::overwrite()
            } else {
                CreateOptions::create()
            };
            Client::connect(config, &collection, options).await?;
            tracing::info!(collection = %collection, "Created collection");
        }
        Command::Delete { .. } => {
            Client::from_config(config, &collection)?
                .delete_collection()
                .await?;
            tracing::info!(collection = %collection, "Deleted collection");
        }
        Command::Add { file, .. } => {
            let client = Client::from_config(config, &collection)?;
            match read_json(&file)? {
                Value::Array(items) => {
                    let count = items.len();
                    client.add_multiple_items(&items).await?;
                    tracing::info!(count, collection = %collection, "Added items");
                }
                item => {
                    client.add_item(&item).await?;
                    tracing::info!(collection = %collection, "Added item");
                }
            }
        }
        Command::SetMetadata { file, .. } => {
            let metadata = read_json(&file)?;
            Client::from_config(config, &collection)?
                .add_metadata(&metadata)
                .await?;
            tracing::info!(collection = %collection, "Stored metadata");
        }
        Command::Metadata { .. } => {
            let metadata = Client::from_config(config, &collection)?
                .extract_metadata()
                .await?;
            print_json(&Value::Object(metadata))?;
        }
        Command::Layer { z_layer, .. } => {
            let items = Client::from_config(config, &collection)?
                .extract_items(z_layer)
                .await?;
            print_json(&Value::Array(items))?;
        }
        Command::Tile {
            z_layer,
            x0,
            y0,
            size,
            ..
        } => {
            let items = Client::from_config(config, &collection)?
                .extract_tile_data(z_layer, x0, y0, size)
                .await?;
            print_json(&Value::Array(items))?;
        }
        Command::Region {
            z_layer,
            x0,
            y0,
            xf,
            yf,
            ..
        } => {
            let items = Client::from_config(config, &collection)?
                .extract_region(z_layer, x0, y0, xf, yf)
                .await?;
            print_json(&Value::Array(items))?;
        }
    }

    Ok(())
}

fn read_json(path: &Path) -> Result<Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
