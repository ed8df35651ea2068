//! Draft events delivered to observers.

use crate::catalog::PlayerId;
use serde::{Deserialize, Serialize};

/// Event kinds. Drafting is the only state transition there is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A player was drafted.
    Draft,
}

impl EventKind {
    /// Wire name of the event.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Draft => "draft",
        }
    }
}

/// A successful draft transition.
///
/// Serialized as `{"type":"draft","playerId":2,"sequence":1}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftEvent {
    /// Event kind.
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// The drafted player.
    pub player_id: PlayerId,
    /// Position in the session's draft order, starting at 1.
    pub sequence: u64,
}

impl DraftEvent {
    /// Create a draft event.
    #[must_use]
    pub fn new(player_id: PlayerId, sequence: u64) -> Self {
        Self {
            kind: EventKind::Draft,
            player_id,
            sequence,
        }
    }
}
