//! # huddle-core
//!
//! Draft-state synchronization for the Huddle draft server.
//!
//! This crate provides the fundamental building blocks:
//!
//! - **Catalog** - Read-only player reference data
//! - **Store** - The drafted set, with at-most-once drafting
//! - **Hub** - Observer registry and event fan-out
//! - **Room** - One draft session tying the three together
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Request   │────▶│  DraftRoom  │────▶│    Store    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │
//!                            ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │     Hub     │────▶│  Observers  │
//!                     └─────────────┘     └─────────────┘
//! ```

pub mod catalog;
pub mod event;
pub mod hub;
pub mod room;
pub mod store;

pub use catalog::{CatalogError, Player, PlayerCatalog, PlayerId};
pub use event::{DraftEvent, EventKind};
pub use hub::{
    DeliveryFailure, HubConfig, NotificationHub, ObserverId, PublishReport, Subscription,
};
pub use room::{DraftRoom, Drafted, Standing};
pub use store::{DraftError, DraftStateStore};
