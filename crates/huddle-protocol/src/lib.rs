//! # huddle-protocol
//!
//! Wire protocol definitions for the Huddle draft server.
//!
//! This crate defines the JSON bodies of the HTTP API and the frames
//! exchanged over the draft WebSocket.
//!
//! ## Frame Types
//!
//! - `Connected` - Sent by the server when a socket opens
//! - `Draft` - A draft event (server) or draft request (client)
//! - `Ack` / `Declined` - Replies to client draft requests
//! - `Ping` / `Pong` - Keepalive
//!
//! ## Example
//!
//! ```rust
//! use huddle_protocol::{codec, ClientFrame, ServerFrame};
//!
//! let text = codec::encode(&ServerFrame::draft(2, 1)).unwrap();
//! assert_eq!(text, r#"{"type":"draft","playerId":2,"sequence":1}"#);
//!
//! let frame: ClientFrame = codec::decode(br#"{"type":"ping"}"#).unwrap();
//! assert_eq!(frame, ClientFrame::Ping);
//! ```

pub mod api;
pub mod codec;
pub mod frames;

pub use api::{DraftReply, DraftRequest, HealthReport};
pub use codec::{decode, encode, ProtocolError};
pub use frames::{ClientFrame, ServerFrame};
