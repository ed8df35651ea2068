//! WebSocket frame types for the Huddle protocol.
//!
//! Frames are JSON text messages tagged by a `type` field. The server pushes
//! draft events and replies to client requests; clients may draft over the
//! socket instead of the HTTP endpoint.

use serde::{Deserialize, Serialize};

/// A frame sent from the server to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    /// Sent once when the socket opens.
    #[serde(rename = "connected")]
    Connected {
        /// Observer id assigned to this connection.
        observer: u64,
        /// Suggested reconnect delay in milliseconds.
        retry: u64,
    },

    /// A player was drafted.
    #[serde(rename = "draft", rename_all = "camelCase")]
    Draft {
        /// The drafted player.
        player_id: u64,
        /// Position in the draft order.
        sequence: u64,
    },

    /// A client draft request succeeded.
    #[serde(rename = "ack")]
    Ack {
        /// Echoed request id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
    },

    /// A client draft request was declined.
    #[serde(rename = "declined")]
    Declined {
        /// Echoed request id.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        /// Human-readable reason.
        error: String,
    },

    /// Reply to a client ping.
    #[serde(rename = "pong")]
    Pong,

    /// The client sent something that could not be decoded.
    #[serde(rename = "error")]
    Error {
        /// Human-readable error message.
        message: String,
    },
}

impl ServerFrame {
    /// Frame type name.
    #[must_use]
    pub fn frame_type(&self) -> &'static str {
        match self {
            ServerFrame::Connected { .. } => "connected",
            ServerFrame::Draft { .. } => "draft",
            ServerFrame::Ack { .. } => "ack",
            ServerFrame::Declined { .. } => "declined",
            ServerFrame::Pong => "pong",
            ServerFrame::Error { .. } => "error",
        }
    }

    /// Create a Connected frame.
    #[must_use]
    pub fn connected(observer: u64, retry: u64) -> Self {
        ServerFrame::Connected { observer, retry }
    }

    /// Create a Draft frame.
    #[must_use]
    pub fn draft(player_id: u64, sequence: u64) -> Self {
        ServerFrame::Draft {
            player_id,
            sequence,
        }
    }

    /// Create an Ack frame.
    #[must_use]
    pub fn ack(id: Option<u64>) -> Self {
        ServerFrame::Ack { id }
    }

    /// Create a Declined frame.
    #[must_use]
    pub fn declined(id: Option<u64>, error: impl Into<String>) -> Self {
        ServerFrame::Declined {
            id,
            error: error.into(),
        }
    }

    /// Create an Error frame.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        ServerFrame::Error {
            message: message.into(),
        }
    }
}

/// A frame sent from a client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    /// Draft a player.
    #[serde(rename = "draft", rename_all = "camelCase")]
    Draft {
        /// Optional request id, echoed in the reply.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<u64>,
        /// Player to draft.
        player_id: u64,
    },

    /// Keepalive ping.
    #[serde(rename = "ping")]
    Ping,
}

impl ClientFrame {
    /// Frame type name.
    #[must_use]
    pub fn frame_type(&self) -> &'static str {
        match self {
            ClientFrame::Draft { .. } => "draft",
            ClientFrame::Ping => "ping",
        }
    }

    /// Create a Draft frame.
    #[must_use]
    pub fn draft(id: Option<u64>, player_id: u64) -> Self {
        ClientFrame::Draft { id, player_id }
    }
}
