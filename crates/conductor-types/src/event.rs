//! Build events emitted by builders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single progress/result event from a builder run.
///
/// Events are owned by the builder contract: the orchestrator forwards them
/// verbatim and never inspects `detail`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuildEvent {
    /// Whether the step this event reports succeeded.
    pub success: bool,
    /// Builder-defined payload.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub detail: Value,
}

impl BuildEvent {
    /// A bare success event.
    pub fn success() -> Self {
        Self {
            success: true,
            detail: Value::Null,
        }
    }

    /// A bare failure event.
    pub fn failure() -> Self {
        Self {
            success: false,
            detail: Value::Null,
        }
    }

    /// Attach a builder-defined payload.
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_omitted_when_null() {
        let json = serde_json::to_string(&BuildEvent::success()).unwrap();
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[test]
    fn detail_round_trips() {
        let event = BuildEvent::failure().with_detail(serde_json::json!({ "code": 2 }));
        let back: BuildEvent =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(back, event);
    }
}
