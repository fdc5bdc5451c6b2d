//! Raw key commands: generate and check keys without touching a board.

use rankboard::{RankConfig, RankEngine, RankKey};

use crate::cli::KeyCommand;
use crate::output::{OutputFormat, print_json, print_table};

/// Run a `key` subcommand
pub fn run(
    command: &KeyCommand,
    config: &RankConfig,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = RankEngine::from_config(config)?;

    match command {
        KeyCommand::Initial => print_key(&engine.initial(), format),
        KeyCommand::Before { key } => print_key(&engine.before(&RankKey::from(key.as_str()))?, format),
        KeyCommand::After { key } => print_key(&engine.after(&RankKey::from(key.as_str()))?, format),
        KeyCommand::Between { low, high } => {
            let key = engine.between(&RankKey::from(low.as_str()), &RankKey::from(high.as_str()))?;
            print_key(&key, format)
        }
        KeyCommand::Check { keys } => check(&engine, config.rebalance_threshold, keys, format),
        KeyCommand::Spread { count } => {
            let keys = engine.spread(*count)?;
            match format {
                OutputFormat::Human => keys.iter().for_each(|key| println!("{key}")),
                OutputFormat::Json => print_json(&keys)?,
            }
            Ok(())
        }
    }
}

fn print_key(key: &RankKey, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => println!("{key}"),
        OutputFormat::Json => print_json(&serde_json::json!({ "key": key }))?,
    }
    Ok(())
}

fn check(
    engine: &RankEngine,
    threshold: usize,
    keys: &[String],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut invalid = 0;
    let mut rows = Vec::with_capacity(keys.len());
    let mut entries = Vec::with_capacity(keys.len());

    for raw in keys {
        let key = RankKey::from(raw.as_str());
        let (status, error) = match engine.validate(&key) {
            Ok(()) if engine.needs_rebalance(&key, threshold) => ("rebalance", None),
            Ok(()) => ("ok", None),
            Err(e) => {
                invalid += 1;
                ("invalid", Some(e.to_string()))
            }
        };
        rows.push(vec![
            raw.clone(),
            key.len().to_string(),
            error.clone().unwrap_or_else(|| status.to_string()),
        ]);
        entries.push(serde_json::json!({
            "key": raw,
            "length": key.len(),
            "status": status,
            "error": error,
        }));
    }

    match format {
        OutputFormat::Human => print_table(&["KEY", "LENGTH", "STATUS"], &rows),
        OutputFormat::Json => print_json(&entries)?,
    }

    if invalid > 0 {
        return Err(format!("{invalid} of {} keys are invalid", keys.len()).into());
    }
    Ok(())
}
