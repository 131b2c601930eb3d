//! Playback controller: variable-speed, frame-accurate replay.
//!
//! At load time the delta-compressed log is materialized into a dense
//! timeline of full snapshots (one application pass over the keyframe/delta
//! chain), so seeking is a binary search plus one interpolation, with no
//! delta walking at seek time.
//!
//! States: `Unloaded → Loaded(paused) ⇄ Loaded(playing)`; reaching the end
//! auto-pauses at the final position (terminal, no wrap-around). Each tick
//! either completes a full interpolate-and-emit cycle or is skipped when
//! paused; there is no partial state to corrupt.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sella_core::session::{SurgicalStep, Tool};

use crate::frame::FrameSnapshot;
use crate::recorder::Recording;

/// Errors from playback operations that require a loaded recording.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    /// No recording is loaded.
    #[error("no recording is loaded")]
    NothingLoaded,
    /// The recording has no frames to play.
    #[error("recording contains no frames")]
    EmptyRecording,
}

/// The fixed set of playback speed multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackSpeed {
    /// 0.25×.
    Quarter,
    /// 0.5×.
    Half,
    /// Real time.
    Normal,
    /// 2×.
    Double,
    /// 4×.
    Quadruple,
}

impl PlaybackSpeed {
    /// All speeds, slowest first.
    pub const ALL: [PlaybackSpeed; 5] = [
        PlaybackSpeed::Quarter,
        PlaybackSpeed::Half,
        PlaybackSpeed::Normal,
        PlaybackSpeed::Double,
        PlaybackSpeed::Quadruple,
    ];

    /// The real-time multiplier.
    #[must_use]
    pub fn multiplier(self) -> f32 {
        match self {
            PlaybackSpeed::Quarter => 0.25,
            PlaybackSpeed::Half => 0.5,
            PlaybackSpeed::Normal => 1.0,
            PlaybackSpeed::Double => 2.0,
            PlaybackSpeed::Quadruple => 4.0,
        }
    }
}

/// A fully interpolated frame, ready for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolatedFrame {
    /// Playback time this frame represents, ms.
    pub time_ms: f64,
    /// Linearly interpolated scope position.
    pub position: Vec3,
    /// Shortest-path interpolated pitch, degrees.
    pub angle: f32,
    /// Shortest-path interpolated roll, degrees.
    pub rotation: f32,
    /// Linearly interpolated insertion depth.
    pub insertion_depth: f32,
    /// Linearly interpolated blood level.
    pub blood_level: f32,
    /// Instrument; steps at frame boundaries, never blended.
    pub active_tool: Tool,
    /// Engagement flag; steps at frame boundaries.
    pub is_tool_active: bool,
    /// Procedure phase; steps at frame boundaries.
    pub surgical_step: SurgicalStep,
}

/// Read-only view of the controller state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    /// Whether time is advancing.
    pub is_playing: bool,
    /// Current playback position, ms.
    pub current_time_ms: f64,
    /// Total recording duration, ms.
    pub duration_ms: u64,
    /// Active speed multiplier.
    pub speed: PlaybackSpeed,
    /// Index of the frame at or before the current position.
    pub current_frame_index: usize,
}

/// One materialized timeline entry.
#[derive(Debug, Clone, Copy)]
struct TimelineFrame {
    timestamp_ms: u64,
    state: FrameSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Unloaded,
    Paused,
    Playing,
}

/// The playback controller. One instance per replay view; constructed by
/// whoever owns the view and dropped with it.
#[derive(Debug)]
pub struct PlaybackController {
    timeline: Vec<TimelineFrame>,
    duration_ms: u64,
    current_time_ms: f64,
    current_index: usize,
    speed: PlaybackSpeed,
    status: Status,
}

impl PlaybackController {
    /// Creates an unloaded controller at normal speed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeline: Vec::new(),
            duration_ms: 0,
            current_time_ms: 0.0,
            current_index: 0,
            speed: PlaybackSpeed::Normal,
            status: Status::Unloaded,
        }
    }

    /// Loads a recording, materializing the delta chain into a dense
    /// timeline. The controller starts paused at time 0.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::EmptyRecording`] for a frameless log.
    pub fn load(&mut self, recording: &Recording) -> Result<(), ReplayError> {
        if recording.frames.is_empty() {
            return Err(ReplayError::EmptyRecording);
        }
        let mut running = FrameSnapshot::default();
        let timeline: Vec<TimelineFrame> = recording
            .frames
            .iter()
            .map(|frame| {
                frame.apply_to(&mut running);
                TimelineFrame {
                    timestamp_ms: frame.timestamp_ms,
                    state: running,
                }
            })
            .collect();
        let last_ts = timeline.last().map_or(0, |f| f.timestamp_ms);
        self.duration_ms = recording.metadata.duration_ms.max(last_ts);
        self.timeline = timeline;
        self.current_time_ms = 0.0;
        self.current_index = 0;
        self.status = Status::Paused;
        tracing::debug!(
            frames = self.timeline.len(),
            duration_ms = self.duration_ms,
            "recording loaded for playback"
        );
        Ok(())
    }

    /// Discards the loaded recording and returns to `Unloaded`.
    pub fn unload(&mut self) {
        self.timeline.clear();
        self.duration_ms = 0;
        self.current_time_ms = 0.0;
        self.current_index = 0;
        self.status = Status::Unloaded;
    }

    /// Whether a recording is loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.status != Status::Unloaded
    }

    /// The current controller state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            is_playing: self.status == Status::Playing,
            current_time_ms: self.current_time_ms,
            duration_ms: self.duration_ms,
            speed: self.speed,
            current_frame_index: self.current_index,
        }
    }

    /// Starts (or resumes) playback.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NothingLoaded`] when no recording is loaded.
    pub fn play(&mut self) -> Result<(), ReplayError> {
        if self.status == Status::Unloaded {
            return Err(ReplayError::NothingLoaded);
        }
        self.status = Status::Playing;
        Ok(())
    }

    /// Pauses playback at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NothingLoaded`] when no recording is loaded.
    pub fn pause(&mut self) -> Result<(), ReplayError> {
        if self.status == Status::Unloaded {
            return Err(ReplayError::NothingLoaded);
        }
        self.status = Status::Paused;
        Ok(())
    }

    /// Toggles between playing and paused.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NothingLoaded`] when no recording is loaded.
    pub fn toggle(&mut self) -> Result<(), ReplayError> {
        match self.status {
            Status::Unloaded => Err(ReplayError::NothingLoaded),
            Status::Paused => self.play(),
            Status::Playing => self.pause(),
        }
    }

    /// Selects a speed multiplier. Does not change play/pause state.
    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    /// Advances playback by `dt_real` seconds of wall-clock time, scaled
    /// by the speed multiplier. Emits the interpolated frame for the new
    /// position, or `None` when not playing (the tick is skipped whole).
    ///
    /// Reaching the end auto-pauses at the final position.
    pub fn advance(&mut self, dt_real: f32) -> Option<InterpolatedFrame> {
        if self.status != Status::Playing {
            return None;
        }
        self.current_time_ms += f64::from(dt_real) * f64::from(self.speed.multiplier()) * 1000.0;
        #[allow(clippy::cast_precision_loss)]
        if self.current_time_ms >= self.duration_ms as f64 {
            self.current_time_ms = self.duration_ms as f64;
            self.status = Status::Paused;
            tracing::debug!("playback reached end");
        }
        self.current_index = self.index_at(self.current_time_ms);
        Some(self.frame_at(self.current_time_ms))
    }

    /// Seeks to `time_ms` (clamped into `[0, duration]`) and emits the
    /// interpolated frame immediately, regardless of play/pause state.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NothingLoaded`] when no recording is loaded.
    pub fn seek(&mut self, time_ms: f64) -> Result<InterpolatedFrame, ReplayError> {
        if self.status == Status::Unloaded {
            return Err(ReplayError::NothingLoaded);
        }
        #[allow(clippy::cast_precision_loss)]
        let clamped = time_ms.clamp(0.0, self.duration_ms as f64);
        self.current_time_ms = clamped;
        self.current_index = self.index_at(clamped);
        Ok(self.frame_at(clamped))
    }

    /// Moves exactly one recorded frame forward (clamped at the last).
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NothingLoaded`] when no recording is loaded.
    pub fn step_forward(&mut self) -> Result<InterpolatedFrame, ReplayError> {
        if self.status == Status::Unloaded {
            return Err(ReplayError::NothingLoaded);
        }
        let index = (self.current_index + 1).min(self.timeline.len() - 1);
        #[allow(clippy::cast_precision_loss)]
        let target = self.timeline[index].timestamp_ms as f64;
        self.seek(target)
    }

    /// Moves exactly one recorded frame backward (clamped at the first).
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NothingLoaded`] when no recording is loaded.
    pub fn step_backward(&mut self) -> Result<InterpolatedFrame, ReplayError> {
        if self.status == Status::Unloaded {
            return Err(ReplayError::NothingLoaded);
        }
        let index = self.current_index.saturating_sub(1);
        #[allow(clippy::cast_precision_loss)]
        let target = self.timeline[index].timestamp_ms as f64;
        self.seek(target)
    }

    /// Index of the last frame at or before `time_ms` (binary search).
    fn index_at(&self, time_ms: f64) -> usize {
        #[allow(clippy::cast_precision_loss)]
        let partition = self
            .timeline
            .partition_point(|f| f.timestamp_ms as f64 <= time_ms);
        partition.saturating_sub(1)
    }

    /// Interpolates the frame for `time_ms`, assuming a loaded timeline.
    fn frame_at(&self, time_ms: f64) -> InterpolatedFrame {
        let index = self.index_at(time_ms);
        let earlier = &self.timeline[index];

        let Some(later) = self.timeline.get(index + 1) else {
            // End of the log: the last frame verbatim.
            return Self::frame_from(earlier.state, time_ms);
        };

        #[allow(clippy::cast_precision_loss)]
        let span = (later.timestamp_ms - earlier.timestamp_ms) as f64;
        #[allow(clippy::cast_precision_loss)]
        let fraction = if span > 0.0 {
            ((time_ms - earlier.timestamp_ms as f64) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };
        #[allow(clippy::cast_possible_truncation)]
        let f = fraction as f32;

        let a = &earlier.state;
        let b = &later.state;
        InterpolatedFrame {
            time_ms,
            position: a.scope_position.lerp(b.scope_position, f),
            angle: lerp_angle_deg(a.scope_angle, b.scope_angle, f),
            rotation: lerp_angle_deg(a.scope_rotation, b.scope_rotation, f),
            insertion_depth: a.insertion_depth + (b.insertion_depth - a.insertion_depth) * f,
            blood_level: a.blood_level + (b.blood_level - a.blood_level) * f,
            // Discrete state holds the earlier frame's value for the whole
            // pair and switches exactly at the later frame's timestamp,
            // where the bracketing pair itself advances. Never blended.
            active_tool: a.active_tool,
            is_tool_active: a.is_tool_active,
            surgical_step: a.surgical_step,
        }
    }

    fn frame_from(state: FrameSnapshot, time_ms: f64) -> InterpolatedFrame {
        InterpolatedFrame {
            time_ms,
            position: state.scope_position,
            angle: state.scope_angle,
            rotation: state.scope_rotation,
            insertion_depth: state.insertion_depth,
            blood_level: state.blood_level,
            active_tool: state.active_tool,
            is_tool_active: state.is_tool_active,
            surgical_step: state.surgical_step,
        }
    }
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

/// Shortest-path angular interpolation in degrees, wrapping at ±180°.
fn lerp_angle_deg(a: f32, b: f32, f: f32) -> f32 {
    let diff = (b - a + 180.0).rem_euclid(360.0) - 180.0;
    a + diff * f
}
