//! Storage collaborator for rank keys.
//!
//! This module defines the [`OrderStore`] trait through which the coordinator
//! reads ordered collections and writes keys, plus an in-memory implementation.
//!
//! A store persists keys and sorts by them; it never computes keys. Each
//! collection carries a revision that changes whenever anything in it
//! changes, which is how bulk rebalances detect that they raced another writer.

use std::{collections::BTreeMap, fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, constants::COLLECTION_SEPARATOR, rank::RankKey};

pub mod errors;
mod in_memory;

pub use errors::StoreError;
pub use in_memory::InMemoryStore;

/// Identifier of an orderable item, such as an issue key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// A fresh random identifier (UUIDv4).
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordering context: every item sharing one manually ordered list.
///
/// For a board this is one status column of one project. Items may move
/// between columns of the same project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollectionId {
    pub project: String,
    pub column: String,
}

impl CollectionId {
    pub fn new(project: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            column: column.into(),
        }
    }

    /// True when both collections belong to the same project.
    pub fn same_project(&self, other: &CollectionId) -> bool {
        self.project == other.project
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{COLLECTION_SEPARATOR}{}", self.project, self.column)
    }
}

impl FromStr for CollectionId {
    type Err = String;

    /// Parses `"project/column"`. The column may itself contain separators.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.split_once(COLLECTION_SEPARATOR) {
            Some((project, column)) if !project.is_empty() && !column.is_empty() => {
                Ok(Self::new(project, column))
            }
            _ => Err(format!(
                "expected 'project{COLLECTION_SEPARATOR}column', got '{s}'"
            )),
        }
    }
}

/// An item and its key, as returned by a sorted query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedItem {
    pub id: ItemId,
    pub key: RankKey,
}

impl RankedItem {
    pub fn new(id: impl Into<ItemId>, key: impl Into<RankKey>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }
}

/// Where an item currently lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPlacement {
    pub id: ItemId,
    pub collection: CollectionId,
    pub key: RankKey,
}

/// A consistent read of one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedSnapshot {
    pub collection: CollectionId,
    /// Revision at read time; pass it back to [`OrderStore::write_keys_bulk`].
    pub revision: u64,
    /// Items sorted ascending by key.
    pub items: Vec<RankedItem>,
}

impl OrderedSnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of an item, if present.
    pub fn position(&self, item: &ItemId) -> Option<usize> {
        self.items.iter().position(|ranked| &ranked.id == item)
    }

    pub fn first(&self) -> Option<&RankedItem> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&RankedItem> {
        self.items.last()
    }

    /// The snapshot with one item taken out, as seen by that item while it moves.
    pub fn without(mut self, item: &ItemId) -> Self {
        self.items.retain(|ranked| &ranked.id != item);
        self
    }
}

/// Storage trait abstracting the document store that holds rank keys.
///
/// Implementations must be `Send` and `Sync`; concurrent requests against
/// the same collection are expected. Single-item writes are assumed atomic.
/// Bulk writes must apply all keys or none.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Reads a collection sorted ascending by key, with its current revision.
    async fn fetch_ordered(&self, collection: &CollectionId) -> Result<OrderedSnapshot>;

    /// Sets one item's key, creating the item or moving it into `collection`.
    async fn write_key(&self, item: &ItemId, collection: &CollectionId, key: &RankKey)
    -> Result<()>;

    /// Atomically replaces the keys of every item in `collection`.
    ///
    /// # Errors
    /// `StoreError::RevisionMismatch` if the collection is no longer at
    /// `expected_revision`, and `StoreError::MembershipMismatch` if `keys` does
    /// not name exactly the collection's members. Nothing is written then.
    async fn write_keys_bulk(
        &self,
        collection: &CollectionId,
        expected_revision: u64,
        keys: &BTreeMap<ItemId, RankKey>,
    ) -> Result<()>;

    /// Looks up an item's current placement.
    async fn resolve_item(&self, item: &ItemId) -> Result<Option<ItemPlacement>>;
}
