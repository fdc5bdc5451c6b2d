//! CLI argument definitions for the Rankboard binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Manual ordering keys for board columns
#[derive(Parser, Debug)]
#[command(name = "rankboard")]
#[command(about = "Rankboard: fractional rank keys for drag-and-drop ordering")]
#[command(version)]
pub struct Cli {
    /// Print JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    /// JSON file with rank configuration (alphabet, rebalance threshold, retry policy)
    #[arg(short, long, global = true, env = "RANKBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate and inspect raw rank keys
    #[command(subcommand)]
    Key(KeyCommand),
    /// Order items on a board stored in a JSON file
    Board(BoardArgs),
}

#[derive(Subcommand, Debug)]
pub enum KeyCommand {
    /// Key for the first item of an empty collection
    Initial,
    /// A key sorting before KEY
    Before { key: String },
    /// A key sorting after KEY
    After { key: String },
    /// A key sorting between LOW and HIGH
    Between { low: String, high: String },
    /// Validate keys and report whether they are long enough to warrant a rebalance
    Check {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// COUNT evenly spaced keys, as a rebalance would assign them
    Spread { count: usize },
}

/// Arguments shared by all board commands
#[derive(clap::Args, Debug)]
pub struct BoardArgs {
    /// Directory holding rankboard.json
    #[arg(short = 'D', long, env = "RANKBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: BoardCommand,
}

#[derive(Subcommand, Debug)]
pub enum BoardCommand {
    /// List a collection in order, or every collection when none is given
    List {
        /// Collection as project/column
        collection: Option<String>,
    },
    /// Add a new item to a collection
    Add(AddArgs),
    /// Move an existing item within its project
    Move(PlaceArgs),
    /// Reassign evenly spaced keys to a collection
    Rebalance {
        /// Collection as project/column
        #[arg(required_unless_present = "crowded")]
        collection: Option<String>,

        /// Rebalance every collection holding a key over the threshold
        #[arg(long, conflicts_with = "collection")]
        crowded: bool,
    },
}

/// A new item and where to put it
#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Target collection as project/column
    pub collection: String,

    /// Item id, e.g. an issue key; a random UUID when omitted
    #[arg(long)]
    pub id: Option<String>,

    /// Item that should directly precede it
    #[arg(long)]
    pub prev: Option<String>,

    /// Item that should directly follow it
    #[arg(long)]
    pub next: Option<String>,
}

/// Where to move an existing item
#[derive(clap::Args, Debug)]
pub struct PlaceArgs {
    /// Item id, e.g. an issue key
    pub item: String,

    /// Target collection as project/column
    pub collection: String,

    /// Item that should directly precede it
    #[arg(long)]
    pub prev: Option<String>,

    /// Item that should directly follow it
    #[arg(long)]
    pub next: Option<String>,
}
