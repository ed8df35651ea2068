//! Player reference data.
//!
//! The catalog is loaded once at startup and shared read-only between the
//! draft store and request handlers. Its order is the order every listing
//! is returned in.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// A player identifier.
pub type PlayerId = u64;

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The player file could not be read.
    #[error("Failed to read player file: {0}")]
    Io(#[from] std::io::Error),

    /// The player file is not a JSON array of players.
    #[error("Failed to parse player file: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two players share an id.
    #[error("Duplicate player id: {0}")]
    DuplicateId(PlayerId),

    /// A rating is negative or not a finite number.
    #[error("Player {id} has invalid rating {rating}")]
    InvalidRating {
        /// Offending player.
        id: PlayerId,
        /// The rejected rating.
        rating: f64,
    },
}

/// A draftable player.
///
/// Only `id` and `rating` mean anything to the draft. Everything else is
/// carried through to clients untouched, including fields this type does
/// not name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Unique player id.
    pub id: PlayerId,
    /// Rating used for aggregate scoring.
    #[serde(default)]
    pub rating: f64,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Position (QB, RB, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    /// College team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Any other descriptive fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Player {
    /// Create a player with only an id and a rating.
    #[must_use]
    pub fn new(id: PlayerId, rating: f64) -> Self {
        Self {
            id,
            rating,
            name: None,
            position: None,
            team: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// Set the team.
    #[must_use]
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }
}

/// The ordered, immutable set of players for a draft session.
#[derive(Debug, Clone, Default)]
pub struct PlayerCatalog {
    players: Vec<Player>,
    index: HashMap<PlayerId, usize>,
}

impl PlayerCatalog {
    /// Build a catalog from players in display order.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate ids or invalid ratings.
    pub fn new(players: Vec<Player>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(players.len());

        for (position, player) in players.iter().enumerate() {
            if !player.rating.is_finite() || player.rating < 0.0 {
                return Err(CatalogError::InvalidRating {
                    id: player.id,
                    rating: player.rating,
                });
            }
            if index.insert(player.id, position).is_some() {
                return Err(CatalogError::DuplicateId(player.id));
            }
        }

        Ok(Self { players, index })
    }

    /// Parse a catalog from a JSON array.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or the players are.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let players: Vec<Player> = serde_json::from_str(json)?;
        Self::new(players)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&contents)?;
        info!(path = %path.display(), players = catalog.len(), "Loaded player catalog");
        Ok(catalog)
    }

    /// Look up a player by id.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    /// Check whether a player exists.
    #[must_use]
    pub fn contains(&self, id: PlayerId) -> bool {
        self.index.contains_key(&id)
    }

    /// All players in catalog order.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether the catalog has no players.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
