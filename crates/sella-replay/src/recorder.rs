//! Session recorder: per-tick frame capture into a compressed log.
//!
//! The recorder is an explicit state machine, `Idle → Recording → Stopped`,
//! constructed and owned by the session controller (never a process-wide
//! singleton). Timestamps are zero-relative to `start()`. Captures after
//! `stop()` are idempotent no-ops: a late tick racing against stop must
//! not corrupt a finalized log.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::event::{EventKind, RecordingEvent};
use crate::frame::{FrameKind, FrameSnapshot, RecordedFrame};

/// Default number of frames between keyframes.
pub const DEFAULT_KEYFRAME_INTERVAL: u32 = 30;

/// Recorder lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecorderState {
    /// No recording in progress.
    Idle,
    /// Frames and events are being captured.
    Recording,
    /// A recording was finalized; `start()` begins a fresh one.
    Stopped,
}

/// Metadata frozen when a recording stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    /// Level the session was played on.
    pub level_id: String,
    /// Scenario variant.
    pub scenario: String,
    /// Total duration in milliseconds.
    pub duration_ms: u64,
    /// Total frames captured.
    pub frame_count: usize,
    /// Keyframes among them.
    pub keyframe_count: usize,
    /// Score at stop time.
    pub final_score: f32,
    /// Unique complication types, in first-occurrence order.
    pub complications: Vec<String>,
}

/// A finalized session recording: immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    /// Frozen session metadata.
    pub metadata: RecordingMetadata,
    /// The frame log, timestamp-ordered.
    pub frames: Vec<RecordedFrame>,
    /// The sparse event log, timestamp-ordered.
    pub events: Vec<RecordingEvent>,
}

/// The recorder itself.
#[derive(Debug, Clone)]
pub struct Recorder {
    state: RecorderState,
    keyframe_interval: u32,
    level_id: String,
    scenario: String,
    start_ms: u64,
    frame_counter: u32,
    last_state: FrameSnapshot,
    frames: Vec<RecordedFrame>,
    events: Vec<RecordingEvent>,
    complications: Vec<String>,
}

impl Recorder {
    /// Creates an idle recorder with the default keyframe interval.
    #[must_use]
    pub fn new() -> Self {
        Self::with_keyframe_interval(DEFAULT_KEYFRAME_INTERVAL)
    }

    /// Creates an idle recorder with a custom keyframe interval.
    #[must_use]
    pub fn with_keyframe_interval(keyframe_interval: u32) -> Self {
        Self {
            state: RecorderState::Idle,
            keyframe_interval: keyframe_interval.max(1),
            level_id: String::new(),
            scenario: String::new(),
            start_ms: 0,
            frame_counter: 0,
            last_state: FrameSnapshot::default(),
            frames: Vec::new(),
            events: Vec::new(),
            complications: Vec::new(),
        }
    }

    /// The current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Frames captured so far.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Begins a new recording, resetting all buffers and making `now_ms`
    /// the zero point for every subsequent timestamp.
    pub fn start(&mut self, level_id: impl Into<String>, scenario: impl Into<String>, now_ms: u64) {
        self.level_id = level_id.into();
        self.scenario = scenario.into();
        self.start_ms = now_ms;
        self.frame_counter = 0;
        self.last_state = FrameSnapshot::default();
        self.frames.clear();
        self.events.clear();
        self.complications.clear();
        self.state = RecorderState::Recording;
        tracing::debug!(level = %self.level_id, scenario = %self.scenario, "recording started");
    }

    /// Captures one tick of state. Every `keyframe_interval`-th call emits
    /// a keyframe (the first frame always is one); the rest emit deltas
    /// against the previously sampled state. Ignored unless recording.
    pub fn capture_frame(&mut self, snapshot: &FrameSnapshot, now_ms: u64) {
        if self.state != RecorderState::Recording {
            return;
        }
        let timestamp = now_ms.saturating_sub(self.start_ms);
        let frame = if self.frame_counter % self.keyframe_interval == 0 {
            RecordedFrame::keyframe(snapshot, timestamp)
        } else {
            RecordedFrame::delta(&self.last_state, snapshot, timestamp)
        };
        self.frames.push(frame);
        self.last_state = *snapshot;
        self.frame_counter += 1;
    }

    /// Appends a discrete event immediately, independent of frame cadence.
    /// Complication events with a `type` string also accumulate on the
    /// session's unique complication list. Ignored unless recording.
    pub fn record_event(&mut self, kind: EventKind, data: Value, now_ms: u64) {
        if self.state != RecorderState::Recording {
            return;
        }
        let event = RecordingEvent {
            kind,
            timestamp_ms: now_ms.saturating_sub(self.start_ms),
            data,
        };
        if let Some(kind) = event.complication_type() {
            if !self.complications.iter().any(|c| c == kind) {
                self.complications.push(kind.to_owned());
            }
        }
        self.events.push(event);
    }

    /// Finalizes the recording, freezing metadata. Returns `None` when not
    /// recording (stop is not retryable; the log is already frozen).
    pub fn stop(&mut self, final_score: f32, now_ms: u64) -> Option<Recording> {
        if self.state != RecorderState::Recording {
            return None;
        }
        self.state = RecorderState::Stopped;
        let keyframe_count = self
            .frames
            .iter()
            .filter(|f| f.kind == FrameKind::Keyframe)
            .count();
        let metadata = RecordingMetadata {
            level_id: std::mem::take(&mut self.level_id),
            scenario: std::mem::take(&mut self.scenario),
            duration_ms: now_ms.saturating_sub(self.start_ms),
            frame_count: self.frames.len(),
            keyframe_count,
            final_score,
            complications: std::mem::take(&mut self.complications),
        };
        tracing::debug!(
            frames = metadata.frame_count,
            keyframes = metadata.keyframe_count,
            duration_ms = metadata.duration_ms,
            "recording stopped"
        );
        Some(Recording {
            metadata,
            frames: std::mem::take(&mut self.frames),
            events: std::mem::take(&mut self.events),
        })
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}
