//! HTTP request and response bodies.

use crate::codec::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error message for bodies that are not valid JSON.
pub const INVALID_JSON: &str = "Invalid JSON";

/// Error message for a missing or unusable player id.
pub const INVALID_PLAYER_ID: &str = "Invalid player ID";

/// Body of `POST /api/draft`.
///
/// `playerId` is kept as raw JSON: clients send numbers or numeric strings,
/// and anything else is an invalid id rather than malformed JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRequest {
    /// Requested player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<Value>,
}

impl DraftRequest {
    /// Create a request for a numeric id.
    #[must_use]
    pub fn new(player_id: u64) -> Self {
        Self {
            player_id: Some(Value::from(player_id)),
        }
    }

    /// Parse a request body. An empty body is treated as `{}`.
    ///
    /// Valid JSON that is not an object (an array, a number, a string)
    /// names no player. Only an object's `playerId` field is read.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON.
    pub fn parse(body: &[u8]) -> Result<Self, ProtocolError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body).map_err(ProtocolError::Decode)?;
        let player_id = value
            .as_object()
            .and_then(|fields| fields.get("playerId"))
            .cloned();
        Ok(Self { player_id })
    }

    /// The requested id, if it is a non-negative integer or a string of one.
    #[must_use]
    pub fn player_id(&self) -> Option<u64> {
        match self.player_id.as_ref()? {
            Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u64::MAX as f64)
                    .map(|f| f as u64)
            }),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Reply to `POST /api/draft`: `{"ok":true}` or `{"error":"..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DraftReply {
    /// The draft succeeded.
    Ok {
        /// Always `true`.
        ok: bool,
    },
    /// The draft was declined.
    Error {
        /// Human-readable reason.
        error: String,
    },
}

impl DraftReply {
    /// A success reply.
    #[must_use]
    pub fn ok() -> Self {
        DraftReply::Ok { ok: true }
    }

    /// A declined reply.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        DraftReply::Error {
            error: message.into(),
        }
    }
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// Always `"ok"` when the server answers.
    pub status: String,
    /// Seconds since startup.
    pub uptime: f64,
    /// Server version.
    pub version: String,
}

impl HealthReport {
    /// A healthy report.
    #[must_use]
    pub fn ok(uptime: f64, version: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            uptime,
            version: version.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_numeric_id() {
        let request = DraftRequest::parse(br#"{"playerId": 12}"#).unwrap();
        assert_eq!(request.player_id(), Some(12));
    }

    #[test]
    fn test_parse_string_and_float_ids() {
        assert_eq!(
            DraftRequest::parse(br#"{"playerId": " 7 "}"#).unwrap().player_id(),
            Some(7)
        );
        assert_eq!(
            DraftRequest::parse(br#"{"playerId": 3.0}"#).unwrap().player_id(),
            Some(3)
        );
        assert_eq!(
            DraftRequest::parse(br#"{"playerId": 3.5}"#).unwrap().player_id(),
            None
        );
    }

    #[test]
    fn test_unusable_ids() {
        let bodies: [&[u8]; 11] = [
            br#"{}"#,
            br#"{"playerId": null}"#,
            br#"{"playerId": "abc"}"#,
            br#"{"playerId": -1}"#,
            br#"{"playerId": true}"#,
            br#"{"player": 1}"#,
            b"[1]",
            br#"[{"playerId": 1}]"#,
            b"123",
            b"",
            b"  ",
        ];
        for body in bodies {
            let request = DraftRequest::parse(body).unwrap();
            assert_eq!(request.player_id(), None, "body: {:?}", body);
        }
    }

    #[test]
    fn test_malformed_body() {
        assert!(DraftRequest::parse(b"{playerId: 1").is_err());
        assert!(DraftRequest::parse(b"[1,").is_err());
        assert!(DraftRequest::parse(b"not json").is_err());
    }

    #[test]
    fn test_non_object_names_no_player() {
        let request = DraftRequest::parse(br#""just a string""#).unwrap();
        assert_eq!(request, DraftRequest::default());
    }

    #[test]
    fn test_duplicate_key_keeps_last() {
        let request = DraftRequest::parse(br#"{"playerId": 1, "playerId": 2}"#).unwrap();
        assert_eq!(request.player_id(), Some(2));
    }

    #[test]
    fn test_reply_shapes() {
        assert_eq!(serde_json::to_value(DraftReply::ok()).unwrap(), json!({"ok": true}));
        assert_eq!(
            serde_json::to_value(DraftReply::error(INVALID_PLAYER_ID)).unwrap(),
            json!({"error": "Invalid player ID"})
        );

        let reply: DraftReply = serde_json::from_str(r#"{"error":"Invalid JSON"}"#).unwrap();
        assert_eq!(reply, DraftReply::error(INVALID_JSON));
    }

    #[test]
    fn test_health_report() {
        let value = serde_json::to_value(HealthReport::ok(1.5, "0.1.0")).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["uptime"], 1.5);
    }
}
