//! Discrete event log entries.
//!
//! Events are sparse: tool changes, complications, collisions, and coach
//! messages. They are appended immediately when they happen, independent
//! of the frame cadence, and ordered by timestamp by construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Category of a recorded event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The operator switched instruments.
    ToolChange,
    /// A complication occurred (e.g. carotid contact, CSF leak).
    Complication,
    /// The probe entered a collidable volume.
    Collision,
    /// A coaching or system message was shown.
    Message,
}

/// One discrete occurrence in the session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingEvent {
    /// Event category.
    pub kind: EventKind,
    /// Milliseconds since recording start.
    pub timestamp_ms: u64,
    /// Free-form payload, shaped by the event kind.
    pub data: Value,
}

impl RecordingEvent {
    /// For complication events, the complication type string carried in
    /// `data["type"]`, if present.
    #[must_use]
    pub fn complication_type(&self) -> Option<&str> {
        if self.kind != EventKind::Complication {
            return None;
        }
        self.data.get("type").and_then(Value::as_str)
    }
}
