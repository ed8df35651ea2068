//! A draft session: catalog, store and hub wired together.

use crate::catalog::{PlayerCatalog, PlayerId};
use crate::event::DraftEvent;
use crate::hub::{HubConfig, NotificationHub, ObserverId, PublishReport, Subscription};
use crate::store::{DraftError, DraftStateStore};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

/// Team name reported in standings. There is a single roster per session.
pub const TEAM_NAME: &str = "Your Team";

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    /// Team display name.
    pub team_name: String,
    /// Sum of the team's drafted ratings.
    pub points: f64,
}

/// A successful draft and how its notification went out.
#[derive(Debug, Clone, PartialEq)]
pub struct Drafted {
    /// The event that was published.
    pub event: DraftEvent,
    /// Fan-out outcome.
    pub report: PublishReport,
}

/// One draft session.
///
/// Created at startup and shared with every request handler.
#[derive(Debug)]
pub struct DraftRoom {
    store: DraftStateStore,
    hub: NotificationHub,
    /// Serializes draft-then-publish so events leave in draft order.
    sequencer: Mutex<()>,
}

impl DraftRoom {
    /// Create a room with default hub configuration.
    #[must_use]
    pub fn new(catalog: Arc<PlayerCatalog>) -> Self {
        Self::with_hub_config(catalog, HubConfig::default())
    }

    /// Create a room with custom hub configuration.
    #[must_use]
    pub fn with_hub_config(catalog: Arc<PlayerCatalog>, hub_config: HubConfig) -> Self {
        info!(players = catalog.len(), "Opening draft room");
        Self {
            store: DraftStateStore::new(catalog),
            hub: NotificationHub::with_config(hub_config),
            sequencer: Mutex::new(()),
        }
    }

    /// Draft a player and notify every observer.
    ///
    /// A failed delivery never fails the draft.
    ///
    /// # Errors
    ///
    /// Returns the store's [`DraftError`] if the draft is declined; nothing
    /// is published in that case.
    pub fn draft(&self, player_id: PlayerId) -> Result<Drafted, DraftError> {
        let _turn = self.sequencer.lock().unwrap_or_else(PoisonError::into_inner);

        let event = self.store.attempt_draft(player_id)?;
        let report = self.hub.publish(&event);

        debug!(
            player = player_id,
            sequence = event.sequence,
            delivered = report.delivered,
            dropped = report.dropped,
            "Draft broadcast"
        );

        Ok(Drafted { event, report })
    }

    /// Register a new observer.
    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    /// Remove an observer. Unknown observers are ignored.
    pub fn unsubscribe(&self, id: ObserverId) -> bool {
        self.hub.unsubscribe(id)
    }

    /// Current standings.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        vec![Standing {
            team_name: TEAM_NAME.to_string(),
            points: self.store.total_rating(),
        }]
    }

    /// The draft state store.
    #[must_use]
    pub fn store(&self) -> &DraftStateStore {
        &self.store
    }

    /// The notification hub.
    #[must_use]
    pub fn hub(&self) -> &NotificationHub {
        &self.hub
    }

    /// The player catalog.
    #[must_use]
    pub fn catalog(&self) -> &Arc<PlayerCatalog> {
        self.store.catalog()
    }
}
