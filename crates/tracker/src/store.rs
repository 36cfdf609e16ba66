//! In-memory watch store with per-user CRUD operations.
//!
//! Maps each user to their tracked sections (insertion order preserved for
//! display) in a `HashMap` behind `Arc<RwLock<_>>` for concurrent access.
//! The command interface mutates it on user action while the poller writes
//! status refreshes in the background; one coarse lock serializes both.
//! Process-lifetime only, nothing is persisted.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use seatwatch_core::{SectionStatus, TrackedSection, UserId};

/// Errors surfaced to callers of [`WatchStore::add`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("CRN {crn} is already tracked")]
    Duplicate { crn: String },
}

/// Per-user tracked-section store.
///
/// Cheap to clone; clones share the same underlying map.
#[derive(Clone, Default)]
pub struct WatchStore {
    watches: Arc<RwLock<HashMap<UserId, Vec<TrackedSection>>>>,
}

impl WatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a watch for `user`. Inputs are normalized (subject upper-cased,
    /// section zero-padded) before storage; status starts zeroed. Fails
    /// with [`StoreError::Duplicate`] when the CRN is already tracked by
    /// this user, leaving the list unchanged.
    pub async fn add(
        &self,
        user: UserId,
        term: &str,
        subject: &str,
        course_number: &str,
        section: &str,
        crn: &str,
    ) -> Result<TrackedSection, StoreError> {
        let item = TrackedSection::new(term, subject, course_number, section, crn);

        let mut map = self.watches.write().await;
        let list = map.entry(user).or_default();
        if list.iter().any(|w| w.crn == item.crn) {
            return Err(StoreError::Duplicate { crn: item.crn });
        }
        list.push(item.clone());
        info!(user, crn = %item.crn, label = %item.label(), "watch added");
        Ok(item)
    }

    /// Remove the watch with the given CRN. Returns whether a removal
    /// occurred.
    pub async fn remove(&self, user: UserId, crn: &str) -> bool {
        let mut map = self.watches.write().await;
        let Some(list) = map.get_mut(&user) else {
            return false;
        };
        let before = list.len();
        list.retain(|w| w.crn != crn);
        let removed = list.len() < before;
        if removed {
            info!(user, crn, "watch removed");
        }
        removed
    }

    /// Drop all of a user's watches.
    pub async fn clear(&self, user: UserId) {
        let mut map = self.watches.write().await;
        if map.remove(&user).is_some() {
            info!(user, "watch list cleared");
        }
    }

    /// The user's watches in insertion order (possibly empty).
    pub async fn list(&self, user: UserId) -> Vec<TrackedSection> {
        let map = self.watches.read().await;
        map.get(&user).cloned().unwrap_or_default()
    }

    /// All watches of all users, for sweep snapshots.
    pub async fn snapshot(&self) -> Vec<(UserId, Vec<TrackedSection>)> {
        let map = self.watches.read().await;
        map.iter().map(|(u, list)| (*u, list.clone())).collect()
    }

    /// Overwrite the status fields of the matching watch. Silently a no-op
    /// when the watch no longer exists; a removal may race a sweep that
    /// already dispatched the query.
    pub async fn update_status(&self, user: UserId, crn: &str, status: SectionStatus) {
        let mut map = self.watches.write().await;
        match map
            .get_mut(&user)
            .and_then(|list| list.iter_mut().find(|w| w.crn == crn))
        {
            Some(item) => item.apply_status(status),
            None => debug!(user, crn, "status update for vanished watch dropped"),
        }
    }
}
