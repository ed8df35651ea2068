//! # huddle-server
//!
//! HTTP, Server-Sent Events and WebSocket front end for a Huddle draft room.
//!
//! - `GET /api/players`, `GET /api/roster`, `GET /api/standings` - snapshots
//! - `POST /api/draft` - draft a player
//! - `GET /sse`, `GET /ws` - real-time draft events
//! - everything else - static files

pub mod config;
pub mod handlers;
pub mod metrics;
pub mod sse;
pub mod ws;

pub use config::Config;
pub use handlers::{build_router, run_server, serve, AppState};
