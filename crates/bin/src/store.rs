//! Opening and saving the JSON board file.

use std::path::{Path, PathBuf};

use rankboard::store::InMemoryStore;

const BOARD_FILE: &str = "rankboard.json";

/// Path of the board file inside `data_dir`, defaulting to the current directory.
pub fn board_path(data_dir: Option<&Path>) -> PathBuf {
    data_dir.unwrap_or_else(|| Path::new(".")).join(BOARD_FILE)
}

/// Load the board, creating the data directory if needed. A missing file is an empty board.
pub async fn open(path: &Path) -> Result<InMemoryStore, Box<dyn std::error::Error>> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    let store = InMemoryStore::load_from_file(path).await?;
    tracing::debug!(
        "Opened board {} with {} items",
        path.display(),
        store.item_count().await
    );
    Ok(store)
}

pub async fn save(store: &InMemoryStore, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    store.save_to_file(path).await?;
    tracing::debug!("Saved board to {}", path.display());
    Ok(())
}
