//! Match registry - handle to live match lookup
//!
//! Handles are allocated from a process-wide counter and never reused. A match becomes
//! reachable when its handle is inserted and unreachable when it is removed, which happens
//! after its terminal event has been published.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::RwLock;

use tetromatch_core::types::MatchMode;

use crate::error::EngineError;
use crate::runtime::Command;

/// Opaque match handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(u64);

impl MatchId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the registry keeps for a live match
#[derive(Debug, Clone)]
pub struct MatchHandle {
    pub id: MatchId,
    pub player: String,
    pub mode: MatchMode,
    /// Inbound queue of the match task
    pub tx: UnboundedSender<Command>,
}

#[derive(Debug)]
pub struct Registry {
    next_id: AtomicU64,
    matches: RwLock<HashMap<MatchId, MatchHandle>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            matches: RwLock::new(HashMap::new()),
        }
    }

    /// Reserve a fresh handle
    pub fn allocate(&self) -> MatchId {
        MatchId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub async fn insert(&self, handle: MatchHandle) {
        log::debug!(
            "[registry] registered {:?} match {} for {}",
            handle.mode,
            handle.id,
            handle.player
        );
        self.matches.write().await.insert(handle.id, handle);
    }

    pub async fn remove(&self, id: MatchId) -> Option<MatchHandle> {
        let removed = self.matches.write().await.remove(&id);
        if let Some(handle) = &removed {
            log::debug!("[registry] removed match {} of {}", id, handle.player);
        }
        removed
    }

    /// Inbound queue of a live match
    pub async fn sender(&self, id: MatchId) -> Result<UnboundedSender<Command>, EngineError> {
        self.matches
            .read()
            .await
            .get(&id)
            .map(|handle| handle.tx.clone())
            .ok_or(EngineError::UnknownMatch(id))
    }

    pub async fn contains(&self, id: MatchId) -> bool {
        self.matches.read().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.matches.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Live handles in allocation order
    pub async fn ids(&self) -> Vec<MatchId> {
        let mut ids: Vec<MatchId> = self.matches.read().await.keys().copied().collect();
        ids.sort();
        ids
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
