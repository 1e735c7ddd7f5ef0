//! Per-user pending free-text input.
//!
//! Some flows need the user's next plain message: a suggestion, a report, a
//! new favorite name. Each user has at most one such slot; setting it
//! replaces whatever was there, and reading it clears it.

use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{Mode, UserId};

/// What the next plain-text message from a user is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Suggestion,
    Report,
    /// New display name for a favorite.
    ///
    /// Holds the stop's external id, not its index, so a catalog refresh
    /// between the prompt and the answer cannot retarget the rename.
    Rename {
        mode: Mode,
        external_id: String,
        old_name: String,
    },
}

/// Configuration for the pending-input store.
#[derive(Debug, Clone)]
pub struct PendingConfig {
    /// Abandoned entries are dropped after this long without activity.
    pub idle: Duration,
    pub max_capacity: u64,
}

impl Default for PendingConfig {
    fn default() -> Self {
        Self {
            idle: Duration::from_secs(600),
            max_capacity: 100_000,
        }
    }
}

/// Single-slot register per user.
#[derive(Clone)]
pub struct PendingInputStore {
    slots: MokaCache<UserId, Pending>,
}

impl PendingInputStore {
    pub fn new(config: &PendingConfig) -> Self {
        let slots = MokaCache::builder()
            .time_to_idle(config.idle)
            .max_capacity(config.max_capacity)
            .build();
        Self { slots }
    }

    /// Arm the slot, replacing any previous entry.
    pub async fn set(&self, user: UserId, pending: Pending) {
        self.slots.insert(user, pending).await;
    }

    /// Take the entry, leaving the slot empty.
    ///
    /// Concurrent consumers for the same user see the entry at most once.
    pub async fn consume(&self, user: UserId) -> Option<Pending> {
        self.slots.remove(&user).await
    }

    /// Drop any entry without reading it.
    pub async fn clear(&self, user: UserId) {
        self.slots.invalidate(&user).await;
    }
}

impl Default for PendingInputStore {
    fn default() -> Self {
        Self::new(&PendingConfig::default())
    }
}
