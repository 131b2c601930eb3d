//! Frame types and keyframe/delta encoding.
//!
//! The recorder samples a full [`FrameSnapshot`] every tick and encodes it
//! as either a keyframe (all fields) or a delta (position plus only the
//! fields that changed). Compression is purely semantic (omitted fields,
//! no byte-level tricks), so the persisted format stays plain JSON.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use sella_core::session::{SurgicalStep, Tool};

/// Change in `blood_level` below which delta frames omit the field.
///
/// Blood level is a slowly integrating, noisy scalar where sub-unit jitter
/// is visually meaningless; every other scalar uses exact comparison so it
/// replays bit-identically. This asymmetry is deliberate and must not be
/// generalized to the other continuous fields.
pub const BLOOD_LEVEL_DELTA_THRESHOLD: f32 = 1.0;

/// Full per-tick simulation state as sampled by the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Endoscope tip position in simulator space.
    pub scope_position: Vec3,
    /// Scope pitch angle, degrees.
    pub scope_angle: f32,
    /// Scope roll about its axis, degrees.
    pub scope_rotation: f32,
    /// Insertion depth, cm.
    pub insertion_depth: f32,
    /// Selected instrument.
    pub active_tool: Tool,
    /// Whether the instrument is engaged.
    pub is_tool_active: bool,
    /// Current procedure phase.
    pub surgical_step: SurgicalStep,
    /// Accumulated bleeding, 0–100.
    pub blood_level: f32,
}

impl Default for FrameSnapshot {
    fn default() -> Self {
        Self {
            scope_position: Vec3::ZERO,
            scope_angle: 0.0,
            scope_rotation: 0.0,
            insertion_depth: 0.0,
            active_tool: Tool::Endoscope,
            is_tool_active: false,
            surgical_step: SurgicalStep::Approach,
            blood_level: 0.0,
        }
    }
}

/// Whether a recorded frame carries full or partial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameKind {
    /// Full state.
    Keyframe,
    /// Only changed fields, relative to the previous sampled state.
    Delta,
}

/// One frame in the recording log.
///
/// Position is always present since it changes every tick. Every other field
/// is present on keyframes and on the deltas where it changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    /// Milliseconds since recording start.
    pub timestamp_ms: u64,
    /// Keyframe or delta.
    pub kind: FrameKind,
    /// Scope position, always recorded.
    pub position: Vec3,
    /// Scope pitch, when changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    /// Scope roll, when changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
    /// Insertion depth, when changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insertion_depth: Option<f32>,
    /// Instrument, on change only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_tool: Option<Tool>,
    /// Engagement flag, on change only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_tool_active: Option<bool>,
    /// Procedure phase, on change only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surgical_step: Option<SurgicalStep>,
    /// Bleeding, when moved by more than the threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_level: Option<f32>,
}

impl RecordedFrame {
    /// Encodes a keyframe: every field present.
    #[must_use]
    pub fn keyframe(snapshot: &FrameSnapshot, timestamp_ms: u64) -> Self {
        Self {
            timestamp_ms,
            kind: FrameKind::Keyframe,
            position: snapshot.scope_position,
            angle: Some(snapshot.scope_angle),
            rotation: Some(snapshot.scope_rotation),
            insertion_depth: Some(snapshot.insertion_depth),
            active_tool: Some(snapshot.active_tool),
            is_tool_active: Some(snapshot.is_tool_active),
            surgical_step: Some(snapshot.surgical_step),
            blood_level: Some(snapshot.blood_level),
        }
    }

    /// Encodes a delta against the previously sampled state.
    #[must_use]
    pub fn delta(previous: &FrameSnapshot, current: &FrameSnapshot, timestamp_ms: u64) -> Self {
        let changed = |a: f32, b: f32| (a - b) != 0.0;
        Self {
            timestamp_ms,
            kind: FrameKind::Delta,
            position: current.scope_position,
            angle: changed(previous.scope_angle, current.scope_angle)
                .then_some(current.scope_angle),
            rotation: changed(previous.scope_rotation, current.scope_rotation)
                .then_some(current.scope_rotation),
            insertion_depth: changed(previous.insertion_depth, current.insertion_depth)
                .then_some(current.insertion_depth),
            active_tool: (previous.active_tool != current.active_tool)
                .then_some(current.active_tool),
            is_tool_active: (previous.is_tool_active != current.is_tool_active)
                .then_some(current.is_tool_active),
            surgical_step: (previous.surgical_step != current.surgical_step)
                .then_some(current.surgical_step),
            blood_level: ((previous.blood_level - current.blood_level).abs()
                > BLOOD_LEVEL_DELTA_THRESHOLD)
                .then_some(current.blood_level),
        }
    }

    /// Applies this frame onto a running state, in log order.
    pub fn apply_to(&self, state: &mut FrameSnapshot) {
        state.scope_position = self.position;
        if let Some(angle) = self.angle {
            state.scope_angle = angle;
        }
        if let Some(rotation) = self.rotation {
            state.scope_rotation = rotation;
        }
        if let Some(depth) = self.insertion_depth {
            state.insertion_depth = depth;
        }
        if let Some(tool) = self.active_tool {
            state.active_tool = tool;
        }
        if let Some(active) = self.is_tool_active {
            state.is_tool_active = active;
        }
        if let Some(step) = self.surgical_step {
            state.surgical_step = step;
        }
        if let Some(blood) = self.blood_level {
            state.blood_level = blood;
        }
    }
}
