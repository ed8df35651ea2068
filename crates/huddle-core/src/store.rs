//! The draft state store.
//!
//! [`DraftStateStore`] is the single writer of the drafted set. A draft
//! attempt checks and inserts under one write lock, so concurrent attempts
//! on the same player cannot both succeed. Reads copy a snapshot under a
//! brief read lock.

use crate::catalog::{Player, PlayerCatalog, PlayerId};
use crate::event::DraftEvent;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;

/// A declined draft attempt.
///
/// Both variants are expected outcomes and leave the state untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DraftError {
    /// The id does not name a player in the catalog.
    #[error("Invalid player ID")]
    UnknownPlayer(PlayerId),

    /// The player has already been drafted.
    #[error("Player already drafted")]
    AlreadyDrafted(PlayerId),
}

impl DraftError {
    /// The player the attempt was for.
    #[must_use]
    pub fn player_id(&self) -> PlayerId {
        match self {
            DraftError::UnknownPlayer(id) | DraftError::AlreadyDrafted(id) => *id,
        }
    }

    /// Short machine-readable reason, used as a metrics label.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            DraftError::UnknownPlayer(_) => "unknown_player",
            DraftError::AlreadyDrafted(_) => "already_drafted",
        }
    }
}

#[derive(Debug, Default)]
struct DraftState {
    drafted: HashSet<PlayerId>,
    /// Drafted ids in the order they were drafted.
    order: Vec<PlayerId>,
}

/// Owns the drafted set for one draft session.
#[derive(Debug)]
pub struct DraftStateStore {
    catalog: Arc<PlayerCatalog>,
    state: RwLock<DraftState>,
}

impl DraftStateStore {
    /// Create an empty store over a catalog.
    #[must_use]
    pub fn new(catalog: Arc<PlayerCatalog>) -> Self {
        Self {
            catalog,
            state: RwLock::new(DraftState::default()),
        }
    }

    /// The catalog this store drafts from.
    #[must_use]
    pub fn catalog(&self) -> &Arc<PlayerCatalog> {
        &self.catalog
    }

    /// Attempt to draft a player.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::UnknownPlayer`] if the id is not in the catalog,
    /// or [`DraftError::AlreadyDrafted`] if someone got there first.
    pub fn attempt_draft(&self, player_id: PlayerId) -> Result<DraftEvent, DraftError> {
        if !self.catalog.contains(player_id) {
            debug!(player = player_id, "Draft declined: unknown player");
            return Err(DraftError::UnknownPlayer(player_id));
        }

        let sequence = {
            let mut state = self.write();
            if !state.drafted.insert(player_id) {
                debug!(player = player_id, "Draft declined: already drafted");
                return Err(DraftError::AlreadyDrafted(player_id));
            }
            state.order.push(player_id);
            state.order.len() as u64
        };

        debug!(player = player_id, sequence, "Player drafted");
        Ok(DraftEvent::new(player_id, sequence))
    }

    /// Players not yet drafted, in catalog order.
    #[must_use]
    pub fn list_available(&self) -> Vec<Player> {
        let state = self.read();
        self.catalog
            .players()
            .iter()
            .filter(|p| !state.drafted.contains(&p.id))
            .cloned()
            .collect()
    }

    /// Drafted players, in catalog order.
    #[must_use]
    pub fn list_drafted(&self) -> Vec<Player> {
        let state = self.read();
        self.catalog
            .players()
            .iter()
            .filter(|p| state.drafted.contains(&p.id))
            .cloned()
            .collect()
    }

    /// Drafted ids, in draft order.
    #[must_use]
    pub fn drafted_ids(&self) -> Vec<PlayerId> {
        self.read().order.clone()
    }

    /// Check if a player has been drafted.
    #[must_use]
    pub fn is_drafted(&self, player_id: PlayerId) -> bool {
        self.read().drafted.contains(&player_id)
    }

    /// Number of drafted players.
    #[must_use]
    pub fn drafted_count(&self) -> usize {
        self.read().order.len()
    }

    /// Sum of drafted players' ratings.
    #[must_use]
    pub fn total_rating(&self) -> f64 {
        let state = self.read();
        state
            .order
            .iter()
            .filter_map(|id| self.catalog.get(*id))
            .map(|p| p.rating)
            .sum()
    }

    // The drafted set is valid after any partial operation, so a poisoned
    // lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, DraftState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DraftState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
