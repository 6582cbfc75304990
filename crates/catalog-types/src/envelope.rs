//! The small JSON envelope returned by every mutating endpoint and every
//! failure: `{"Success": bool, "Message": string}`, plus the new `Id` on a
//! successful create.

use serde::{Deserialize, Serialize};

/// Response envelope shared by both tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(deserialize = "I: Deserialize<'de>"))]
pub struct Envelope<I> {
    /// Whether the operation succeeded.
    #[serde(rename = "Success")]
    pub success: bool,
    /// Human-readable outcome. Never carries internal error detail.
    #[serde(rename = "Message")]
    pub message: String,
    /// Id assigned by a successful create.
    #[serde(rename = "Id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<I>,
}

impl<I> Envelope<I> {
    /// A successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            id: None,
        }
    }

    /// A failed outcome.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            id: None,
        }
    }

    /// Attach the id of a newly created record.
    #[must_use]
    pub fn with_id(mut self, id: I) -> Self {
        self.id = Some(id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_omits_id() {
        let json = serde_json::to_value(Envelope::<i32>::failure("nope")).ok();
        assert_eq!(
            json,
            Some(serde_json::json!({"Success": false, "Message": "nope"}))
        );
    }

    #[test]
    fn created_envelope_carries_id() {
        let envelope = Envelope::ok("created").with_id(12);
        let json = serde_json::to_string(&envelope).unwrap_or_default();
        let back: Option<Envelope<i32>> = serde_json::from_str(&json).ok();
        assert_eq!(back.and_then(|e| e.id), Some(12));
    }
}
