//! Content provisioning: where the panoramas and their true locations come from.
//!
//! A [`LocationPool`] exposes a fixed list of [`PoolEntry`] values; a
//! [`SelectionPolicy`] decides which of them become the rounds of a new game.

mod builtin;
mod catalog;

pub use builtin::BuiltinPool;
pub use catalog::{sync_listings, FileCatalog, SyncReport};

use geoguess::PoolEntry;
use rand::seq::index;
use std::path::PathBuf;
use std::str::FromStr;

/// Errors from loading or drawing on a content pool.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Missing catalog file: {0}")]
    MissingFile(PathBuf),
    #[error("Round count must be at least 1")]
    ZeroRounds,
    #[error("Requested {requested} rounds but the pool only has {available} locations")]
    Insufficient { requested: usize, available: usize },
    #[error("Content pool has no usable locations")]
    Empty,
}

/// Supplier of candidate rounds.
pub trait LocationPool: Send + Sync {
    fn entries(&self) -> &[PoolEntry];

    /// Draw `count` distinct entries according to `policy`.
    fn select(
        &self,
        count: usize,
        policy: SelectionPolicy,
    ) -> Result<Vec<PoolEntry>, ContentError> {
        select_entries(self.entries(), count, policy)
    }
}

/// How rounds are drawn from a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPolicy {
    /// The first `count` entries, in pool order.
    Sequential,
    /// A uniform sample of `count` entries without replacement.
    #[default]
    Random,
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Self::Sequential),
            "random" => Ok(Self::Random),
            other => Err(format!("unknown selection policy: {}", other)),
        }
    }
}

impl std::fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => f.write_str("sequential"),
            Self::Random => f.write_str("random"),
        }
    }
}

pub fn select_entries(
    pool: &[PoolEntry],
    count: usize,
    policy: SelectionPolicy,
) -> Result<Vec<PoolEntry>, ContentError> {
    if count == 0 {
        return Err(ContentError::ZeroRounds);
    }
    if count > pool.len() {
        return Err(ContentError::Insufficient {
            requested: count,
            available: pool.len(),
        });
    }

    let selected = match policy {
        SelectionPolicy::Sequential => pool[..count].to_vec(),
        SelectionPolicy::Random => {
            let mut rng = rand::rng();
            index::sample(&mut rng, pool.len(), count)
                .into_iter()
                .map(|i| pool[i].clone())
                .collect()
        }
    };
    Ok(selected)
}
