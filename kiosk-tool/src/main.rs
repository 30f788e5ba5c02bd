mod config;
mod error;
mod images;
mod store;

use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{Parser, Subcommand};
use kiosk_core::{Catalog, Category, Item, ItemId};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::load_config;
use crate::error::ToolError;
use crate::images::{ImageDir, upload_name};
use crate::store::{AnyStore, BackendType};

#[derive(Parser)]
#[command(name = "ksk")]
#[command(about = "Kiosk catalog store", long_about = None)]
struct Cli {
    /// Storage backend: json or sqlite
    #[arg(long, global = true)]
    backend: Option<BackendType>,

    /// Path to the item store (JSON document or SQLite database)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Directory holding uploaded images
    #[arg(long, global = true)]
    images: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add an item, copying its image into the image directory
    Add {
        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        name: String,

        #[arg(long, value_parser = NonEmptyStringValueParser::new())]
        category: String,

        /// Image file to upload
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// List all items, oldest first
    List,
    /// List items whose name or category contains the keyword
    Search {
        #[arg(default_value = "")]
        keyword: String,
    },
    /// Show one item
    Get { id: ItemId },
    /// List all categories
    Categories,
    /// Print the file path serving the given image name
    Image { name: String },
}

#[derive(Serialize)]
struct ItemsResponse<'a> {
    items: &'a [Item],
}

#[derive(Serialize)]
struct CategoriesResponse<'a> {
    categories: &'a [Category],
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_json(value: &impl Serialize) -> Result<(), ToolError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), ToolError> {
    let settings = load_config().resolve(cli.backend, cli.store, cli.images);
    let images = ImageDir::new(settings.images_dir);
    let open_catalog = || -> Result<Catalog<AnyStore>, ToolError> {
        Ok(Catalog::new(AnyStore::open(settings.backend, &settings.store_path)?))
    };

    match cli.command {
        Command::Add {
            name,
            category,
            image,
        } => {
            let catalog = open_catalog()?;
            let filename = match &image {
                Some(source) => {
                    images.save(source)?;
                    Some(upload_name(source)?)
                }
                None => None,
            };
            let item = catalog.add(&name, &category, filename)?;
            info!(
                "Received item: {}, {}, {}",
                item.name,
                item.category,
                item.image_name.as_ref().map_or("", |n| n.as_str())
            );
            print_json(&item)?;
        }
        Command::List => {
            let items = open_catalog()?.list()?;
            print_json(&ItemsResponse { items: &items })?;
        }
        Command::Search { keyword } => {
            info!("Searching for: {}", keyword);
            let items = open_catalog()?.search(&keyword)?;
            print_json(&ItemsResponse { items: &items })?;
        }
        Command::Get { id } => {
            let item = open_catalog()?.get(id)?;
            print_json(&item)?;
        }
        Command::Categories => {
            let categories = open_catalog()?.categories()?;
            print_json(&CategoriesResponse {
                categories: &categories,
            })?;
        }
        Command::Image { name } => {
            println!("{}", images.locate(&name)?.display());
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_rejects_empty_name() {
        let result = Cli::try_parse_from(["ksk", "add", "--name", "", "--category", "Music"]);
        assert!(result.is_err());
    }

    #[test]
    fn search_keyword_defaults_to_empty() {
        let cli = Cli::try_parse_from(["ksk", "--backend", "sqlite", "search"]).unwrap();
        assert_eq!(cli.backend, Some(BackendType::Sqlite));
        assert!(matches!(cli.command, Command::Search { keyword } if keyword.is_empty()));
    }

    #[test]
    fn items_response_shape() {
        let catalog_item = kiosk_core::NewItem::new("Bike", "Sports", None)
            .unwrap()
            .into_item(1);
        let json = serde_json::to_value(ItemsResponse {
            items: &[catalog_item],
        })
        .unwrap();

        assert_eq!(json["items"][0]["name"], "Bike");
        assert_eq!(json["items"][0]["image_name"], serde_json::Value::Null);
    }
}
