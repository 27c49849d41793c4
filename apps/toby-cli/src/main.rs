//! toby - manage saved link collections from the terminal.
//!
//! Collections live as JSON files in the data directory (see `TobyConfig`).
//! Collections may be named by id or by name, items by id or URL.

mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use toby_core::export::export_filename_today;
use toby_core::{
    AutoConfirm, CollectionStore, Direction, ItemDraft, ItemPatch, JsonFileGateway, NullChannel,
    Outcome, SearchSession, SkipReason, TobyConfig,
};

use prompt::TerminalPrompt;

type Store = CollectionStore<JsonFileGateway>;
type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "toby", version, about = "Organize saved links into collections")]
struct Cli {
    /// Config file (defaults to <config_dir>/toby/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(long, short = 'y', default_value_t = false)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show all collections and their items
    List,
    /// Create a collection at the top of the list
    Create { name: String },
    /// Rename a collection
    Rename { collection: String, name: String },
    /// Delete a collection
    Delete { collection: String },
    /// Save a link into a collection
    Add {
        collection: String,
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        favicon: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Keep a second copy if the collection already has this URL
        #[arg(long, default_value_t = false)]
        allow_duplicate: bool,
    },
    /// Remove an item from a collection
    Remove { collection: String, item: String },
    /// Change an item's fields
    Edit {
        collection: String,
        item: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        favicon: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Move an item to another collection
    Move { item: String, from: String, to: String },
    /// Move an item one place up or down
    Reorder {
        collection: String,
        item: String,
        #[arg(value_enum)]
        direction: Step,
    },
    /// Set the collection order; every collection must be listed once
    Order { collections: Vec<String> },
    /// Toggle whether a collection is collapsed
    Collapse { collection: String },
    /// Fuzzy search across all items
    Search { query: String },
    /// Merge collections from an export or legacy lists file
    Import { file: PathBuf },
    /// Write all collections as JSON
    Export {
        /// Output file (defaults to toby-collections-<date>.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Step {
    Up,
    Down,
}

impl From<Step> for Direction {
    fn from(step: Step) -> Self {
        match step {
            Step::Up => Direction::Previous,
            Step::Down => Direction::Next,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TobyConfig::load_from(path)?,
        None => TobyConfig::load_standard()?,
    };
    if let Some(dir) = cli.data_dir.clone() {
        config.storage.data_dir = Some(dir);
    }
    let data_dir = config
        .data_dir()
        .ok_or("no data directory available; pass --data-dir")?;
    tracing::debug!("Using data directory {}", data_dir.display());

    let gateway = JsonFileGateway::new(data_dir);
    let mut store = if cli.yes {
        CollectionStore::open(gateway, NullChannel, AutoConfirm, config).await
    } else {
        CollectionStore::open(gateway, NullChannel, TerminalPrompt, config).await
    };

    run(&mut store, cli.command).await?;

    if store.is_unsynced() {
        return Err("changes could not be saved".into());
    }
    Ok(())
}

async fn run(store: &mut Store, command: Commands) -> CliResult<()> {
    match command {
        Commands::List => list(store),
        Commands::Create { name } => {
            let collection = store.create_collection(&name).await?;
            println!("{}", collection.id);
        }
        Commands::Rename { collection, name } => {
            let id = collection_id(store, &collection)?;
            report(store.rename_collection(&id, &name).await?);
        }
        Commands::Delete { collection } => {
            let id = collection_id(store, &collection)?;
            report(store.delete_collection(&id).await?);
        }
        Commands::Add {
            collection,
            url,
            title,
            favicon,
            description,
            allow_duplicate,
        } => {
            let id = collection_id(store, &collection)?;
            let draft = ItemDraft {
                title: title.unwrap_or_else(|| url.clone()),
                url,
                favicon,
                description,
            };
            if let Some(item) = report(store.add_item(&id, draft, !allow_duplicate).await?) {
                println!("{}", item.id);
            }
        }
        Commands::Remove { collection, item } => {
            let id = collection_id(store, &collection)?;
            let item_id = item_id(store, &id, &item)?;
            report(store.remove_item(&id, &item_id).await?);
        }
        Commands::Edit {
            collection,
            item,
            title,
            url,
            favicon,
            description,
        } => {
            let id = collection_id(store, &collection)?;
            let item_id = item_id(store, &id, &item)?;
            let patch = ItemPatch {
                title,
                url,
                favicon,
                description,
            };
            report(store.update_item(&id, &item_id, patch).await?);
        }
        Commands::Move { item, from, to } => {
            let from = collection_id(store, &from)?;
            let to = collection_id(store, &to)?;
            let item_id = item_id(store, &from, &item)?;
            if let Some(moved) = report(store.move_item(&item_id, &from, &to).await?) {
                println!("{}", moved.id);
            }
        }
        Commands::Reorder {
            collection,
            item,
            direction,
        } => {
            let id = collection_id(store, &collection)?;
            let item_id = item_id(store, &id, &item)?;
            report(store.reorder_item(&id, &item_id, direction.into()).await);
        }
        Commands::Order { collections } => {
            let ids = collections
                .iter()
                .map(|key| collection_id(store, key))
                .collect::<CliResult<Vec<_>>>()?;
            report(store.reorder_collections(&ids).await);
        }
        Commands::Collapse { collection } => {
            let id = collection_id(store, &collection)?;
            let collapsed = store.toggle_collapsed(&id).await;
            println!("{}", if collapsed { "collapsed" } else { "expanded" });
        }
        Commands::Search { query } => {
            let mut session = SearchSession::from_config(&store.config().search);
            session.open();
            for entry in session.run(&query, store.collections()) {
                println!(
                    "{}\t{}\t{}",
                    entry.collection_name, entry.item.title, entry.item.url
                );
            }
        }
        Commands::Import { file } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            if let Some(count) = report(store.import_merge(&raw).await?) {
                println!("Imported {} collection(s)", count);
            }
        }
        Commands::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(export_filename_today()));
            tokio::fs::write(&path, store.export_json()?).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn list(store: &Store) {
    for collection in store.collections() {
        let marker = if store.is_collapsed(&collection.id) { "+" } else { "-" };
        println!("{} {} ({})", marker, collection.name, collection.id);
        if store.is_collapsed(&collection.id) {
            continue;
        }
        for item in &collection.items {
            println!("    {}  {}", item.title, item.url);
        }
    }
}

/// Resolve a collection by id, then by case-insensitive name
fn collection_id(store: &Store, key: &str) -> CliResult<String> {
    if let Some(collection) = store.collection(key) {
        return Ok(collection.id.clone());
    }
    let mut matches = store
        .collections()
        .iter()
        .filter(|c| c.name.eq_ignore_ascii_case(key));
    match (matches.next(), matches.next()) {
        (Some(collection), None) => Ok(collection.id.clone()),
        (Some(_), Some(_)) => Err(format!("more than one collection is named {:?}", key).into()),
        (None, _) => Err(format!("no collection {:?}", key).into()),
    }
}

/// Resolve an item by id, then by URL
fn item_id(store: &Store, collection_id: &str, key: &str) -> CliResult<String> {
    store
        .collection(collection_id)
        .and_then(|c| c.items.iter().find(|i| i.id == key || i.url == key))
        .map(|i| i.id.clone())
        .ok_or_else(|| format!("no item {:?}", key).into())
}

/// Print why nothing happened; pass the applied value through
fn report<T>(outcome: Outcome<T>) -> Option<T> {
    match outcome {
        Outcome::Applied(value) => Some(value),
        Outcome::Skipped(reason) => {
            eprintln!("Nothing changed: {}", describe(reason));
            None
        }
    }
}

fn describe(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::CollectionNotFound => "collection not found",
        SkipReason::ItemNotFound => "item not found",
        SkipReason::Declined => "cancelled",
        SkipReason::Unchanged => "already up to date",
        SkipReason::DuplicateInCollection => "the collection already has this URL",
        SkipReason::AtBoundary => "already at the edge",
        SkipReason::OrderMismatch => "list every collection exactly once",
        SkipReason::SameCollection => "source and target are the same collection",
        SkipReason::NoSelection => "nothing selected",
    }
}
