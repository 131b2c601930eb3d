//! Calibration transform from raw landmark space into simulator space.
//!
//! Calibration is a one-shot action: the current wrist position becomes
//! the spatial zero point and the observed hand span fixes the scale
//! factor. Mapping is a pure function of (raw point, calibration state,
//! config) so it can be tested in isolation.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;
use crate::tracking::{landmark, HandFrame};

/// Nominal scale applied before calibration: one full image width spans
/// this many simulator centimeters.
pub const DEFAULT_SPAN_CM: f32 = 10.0;

/// The calibration transform, captured once per explicit calibration
/// action and replaced wholesale by the next one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationState {
    /// Raw-space wrist position captured at calibration time.
    pub offset: Vec3,
    /// Raw-units → centimeters scale factor.
    pub scale: f32,
    /// Observed wrist-to-middle-tip span (raw units) at calibration time.
    pub base_distance: f32,
    /// Whether a calibration has been captured.
    pub is_calibrated: bool,
}

impl Default for CalibrationState {
    fn default() -> Self {
        Self {
            offset: Vec3::ZERO,
            scale: 1.0,
            base_distance: 0.0,
            is_calibrated: false,
        }
    }
}

impl CalibrationState {
    /// The scale used for distance-dependent gesture math: the calibrated
    /// factor, or the nominal default before calibration.
    #[must_use]
    pub fn effective_scale(&self) -> f32 {
        if self.is_calibrated {
            self.scale
        } else {
            DEFAULT_SPAN_CM
        }
    }
}

/// Captures a calibration from the current frame.
///
/// The wrist becomes the spatial zero point; the scale factor is the ratio
/// of the configured real-world hand span to the observed wrist-to-middle-tip
/// span. Returns `None` when the frame is incomplete or degenerate (zero
/// span, non-finite landmarks); the caller keeps its previous state.
#[must_use]
pub fn calibrate(frame: &HandFrame, config: &CalibrationConfig) -> Option<CalibrationState> {
    if !frame.is_complete() {
        return None;
    }
    let wrist = frame.landmark(landmark::WRIST)?;
    let middle_tip = frame.landmark(landmark::MIDDLE_TIP)?;
    if !wrist.is_finite() || !middle_tip.is_finite() {
        return None;
    }
    let span = wrist.distance(middle_tip);
    if span < 1e-4 {
        return None;
    }
    let state = CalibrationState {
        offset: wrist,
        scale: config.reference_span_cm / span,
        base_distance: span,
        is_calibrated: true,
    };
    tracing::debug!(scale = state.scale, span, "calibration captured");
    Some(state)
}

/// Maps a raw landmark-space point into simulator space.
///
/// Uncalibrated: only a default centering transform around the image
/// center at a nominal scale, with zero insertion depth. Calibrated: the
/// full offset + scale transform, with the depth axis clamped into the
/// permitted working range. The image y axis points down and the raw z
/// axis points toward the camera, so both are negated.
#[must_use]
pub fn map_to_simulator_space(
    raw: Vec3,
    calibration: &CalibrationState,
    config: &CalibrationConfig,
) -> Vec3 {
    if !calibration.is_calibrated {
        return Vec3::new(
            (raw.x - 0.5) * DEFAULT_SPAN_CM,
            (0.5 - raw.y) * DEFAULT_SPAN_CM,
            0.0,
        );
    }
    let delta = raw - calibration.offset;
    let depth = (-delta.z * calibration.scale).clamp(config.depth_min, config.depth_max);
    Vec3::new(delta.x * calibration.scale, -delta.y * calibration.scale, depth)
}
