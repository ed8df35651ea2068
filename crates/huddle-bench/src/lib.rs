//! Shared fixtures for the Huddle benchmarks.

use huddle_core::{Player, PlayerCatalog};
use std::sync::Arc;

/// A catalog of `n` players with ids `1..=n`.
#[must_use]
pub fn catalog_of(n: u64) -> Arc<PlayerCatalog> {
    let players = (1..=n)
        .map(|id| Player::new(id, (id % 40) as f64 + 0.5))
        .collect();
    Arc::new(PlayerCatalog::new(players).expect("generated catalog is valid"))
}
