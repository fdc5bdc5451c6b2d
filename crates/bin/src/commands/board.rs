//! Board commands: place and rebalance items in a JSON-file board.

use std::sync::Arc;

use rankboard::{
    CollectionId, ItemId, MoveOutcome, OrderStore, RankConfig, ReorderCoordinator,
    store::InMemoryStore,
};

use crate::cli::{BoardArgs, BoardCommand};
use crate::output::{OutputFormat, print_json, print_table};
use crate::store;

/// Run a `board` subcommand
pub async fn run(
    args: &BoardArgs,
    config: RankConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = store::board_path(args.data_dir.as_deref());
    let board = Arc::new(store::open(&path).await?);
    let coordinator = ReorderCoordinator::new(board.clone(), config)?;

    match &args.command {
        BoardCommand::List { collection: Some(collection) } => {
            list_collection(&board, &collection.parse()?, format).await
        }
        BoardCommand::List { collection: None } => list_board(&board, &coordinator, format).await,
        BoardCommand::Add(add) => {
            let item = add.id.as_deref().map_or_else(ItemId::generate, ItemId::from);
            if let Some(existing) = board.resolve_item(&item).await? {
                return Err(format!(
                    "{item} already exists in {}; use `board move`",
                    existing.collection
                )
                .into());
            }
            let (prev, next) = neighbors(add.prev.as_deref(), add.next.as_deref());
            let outcome = coordinator
                .insert_item(&item, &add.collection.parse()?, prev.as_ref(), next.as_ref())
                .await?;
            store::save(&board, &path).await?;
            print_outcome(&outcome, format)
        }
        BoardCommand::Move(place) => {
            let item = ItemId::from(place.item.as_str());
            let (prev, next) = neighbors(place.prev.as_deref(), place.next.as_deref());
            let outcome = coordinator
                .move_item(&item, &place.collection.parse()?, prev.as_ref(), next.as_ref())
                .await?;
            store::save(&board, &path).await?;
            print_outcome(&outcome, format)
        }
        BoardCommand::Rebalance { collection, crowded } => {
            let targets = match collection {
                Some(collection) => vec![collection.parse::<CollectionId>()?],
                None if *crowded => crowded_collections(&board, &coordinator).await?,
                None => Vec::new(),
            };

            let mut rows = Vec::with_capacity(targets.len());
            let mut entries = Vec::with_capacity(targets.len());
            for target in &targets {
                let mapping = coordinator.rebalance_with_retry(target).await?;
                rows.push(vec![target.to_string(), mapping.len().to_string()]);
                entries.push(serde_json::json!({
                    "collection": target.to_string(),
                    "items": mapping.len(),
                }));
            }
            store::save(&board, &path).await?;

            match format {
                OutputFormat::Human if targets.is_empty() => println!("Nothing to rebalance."),
                OutputFormat::Human => print_table(&["COLLECTION", "ITEMS"], &rows),
                OutputFormat::Json => print_json(&entries)?,
            }
            Ok(())
        }
    }
}

fn neighbors(prev: Option<&str>, next: Option<&str>) -> (Option<ItemId>, Option<ItemId>) {
    (prev.map(ItemId::from), next.map(ItemId::from))
}

fn print_outcome(outcome: &MoveOutcome, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => {
            println!(
                "Placed {} in {} at {}",
                outcome.item, outcome.collection, outcome.key
            );
            if outcome.needs_rebalance {
                println!(
                    "Keys in {0} are getting long; run `rankboard board rebalance {0}`",
                    outcome.collection
                );
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "item": outcome.item,
            "collection": outcome.collection.to_string(),
            "key": outcome.key,
            "needs_rebalance": outcome.needs_rebalance,
        }))?,
    }
    Ok(())
}

async fn list_collection(
    board: &InMemoryStore,
    collection: &CollectionId,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = board.fetch_ordered(collection).await?;
    match format {
        OutputFormat::Human => {
            if snapshot.is_empty() {
                println!("{collection} is empty.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = snapshot
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| vec![(i + 1).to_string(), item.id.to_string(), item.key.to_string()])
                .collect();
            print_table(&["#", "ITEM", "KEY"], &rows);
        }
        OutputFormat::Json => print_json(&snapshot.items)?,
    }
    Ok(())
}

async fn list_board(
    board: &InMemoryStore,
    coordinator: &ReorderCoordinator,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let threshold = coordinator.config().rebalance_threshold;
    let mut rows = Vec::new();
    let mut entries = Vec::new();

    for collection in board.collections().await {
        let snapshot = board.fetch_ordered(&collection).await?;
        let longest = snapshot.items.iter().map(|item| item.key.len()).max().unwrap_or(0);
        let crowded = longest > threshold;
        rows.push(vec![
            collection.to_string(),
            snapshot.len().to_string(),
            longest.to_string(),
            if crowded { "yes" } else { "no" }.to_string(),
        ]);
        entries.push(serde_json::json!({
            "collection": collection.to_string(),
            "items": snapshot.len(),
            "longest_key": longest,
            "needs_rebalance": crowded,
        }));
    }

    match format {
        OutputFormat::Human if rows.is_empty() => println!("No items found."),
        OutputFormat::Human => {
            print_table(&["COLLECTION", "ITEMS", "LONGEST KEY", "REBALANCE"], &rows)
        }
        OutputFormat::Json => print_json(&entries)?,
    }
    Ok(())
}

/// Collections holding at least one key over the rebalance threshold
async fn crowded_collections(
    board: &InMemoryStore,
    coordinator: &ReorderCoordinator,
) -> Result<Vec<CollectionId>, Box<dyn std::error::Error>> {
    let threshold = coordinator.config().rebalance_threshold;
    let mut crowded = Vec::new();
    for collection in board.collections().await {
        let snapshot = board.fetch_ordered(&collection).await?;
        if snapshot
            .items
            .iter()
            .any(|item| coordinator.engine().needs_rebalance(&item.key, threshold))
        {
            crowded.push(collection);
        }
    }
    Ok(crowded)
}
