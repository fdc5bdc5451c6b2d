//! Persistence operations for InMemoryStore
//!
//! This module handles serialization and file I/O for saving/loading
//! the in-memory store state to/from JSON files.

use std::{collections::BTreeMap, path::Path};

use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::RwLock;

use super::{InMemoryStore, StoreState, StoredItem};
use crate::{
    Result,
    constants::PERSISTENCE_VERSION,
    store::{CollectionId, ItemId, errors::StoreError},
};

/// Helper to check if version is default (0) for serde skip_serializing_if
fn is_v0(v: &u8) -> bool {
    *v == 0
}

/// Validates the persistence version during deserialization.
fn validate_persistence_version<'de, D>(deserializer: D) -> std::result::Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let version = u8::deserialize(deserializer)?;
    if version != PERSISTENCE_VERSION {
        return Err(serde::de::Error::custom(format!(
            "unsupported persistence version {version}; only version {PERSISTENCE_VERSION} is supported"
        )));
    }
    Ok(version)
}

/// JSON object keys must be strings, so revisions are stored as a list.
#[derive(Serialize, Deserialize)]
struct RevisionRecord {
    collection: CollectionId,
    revision: u64,
}

/// Serializable version of InMemoryStore for persistence
#[derive(Serialize, Deserialize)]
struct SerializableStore {
    /// File format version for compatibility checking
    #[serde(
        rename = "_v",
        default,
        skip_serializing_if = "is_v0",
        deserialize_with = "validate_persistence_version"
    )]
    version: u8,
    items: BTreeMap<ItemId, StoredItem>,
    #[serde(default)]
    revisions: Vec<RevisionRecord>,
}

/// Saves the entire store state to a specified file as JSON.
pub(crate) async fn save_to_file<P: AsRef<Path>>(store: &InMemoryStore, path: P) -> Result<()> {
    let path = path.as_ref();
    let serializable = {
        let state = store.state.read().await;
        SerializableStore {
            version: PERSISTENCE_VERSION,
            items: state.items.clone(),
            revisions: state
                .revisions
                .iter()
                .map(|(collection, revision)| RevisionRecord {
                    collection: collection.clone(),
                    revision: *revision,
                })
                .collect(),
        }
    };

    let json = serde_json::to_string_pretty(&serializable)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| StoreError::Persistence {
            path: path.display().to_string(),
            source,
        })?;
    tracing::debug!(path = %path.display(), items = serializable.items.len(), "Saved store");
    Ok(())
}

/// Loads the store state from a specified JSON file.
///
/// If the file does not exist, a new, empty `InMemoryStore` is returned.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<InMemoryStore> {
    let path = path.as_ref();
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(InMemoryStore::new()),
        Err(source) => {
            return Err(StoreError::Persistence {
                path: path.display().to_string(),
                source,
            }
            .into());
        }
    };

    let serializable: SerializableStore =
        serde_json::from_str(&json).map_err(|e| StoreError::InvalidState {
            reason: format!("{}: {e}", path.display()),
        })?;

    let mut revisions = BTreeMap::new();
    for record in serializable.revisions {
        if revisions.insert(record.collection.clone(), record.revision).is_some() {
            return Err(StoreError::InvalidState {
                reason: format!("duplicate revision record for {}", record.collection),
            }
            .into());
        }
    }

    Ok(InMemoryStore {
        state: RwLock::new(StoreState {
            items: serializable.items,
            revisions,
        }),
    })
}
