//! Pinch and gesture classification.
//!
//! Pinch strength is a normalized inverse of the thumb-to-index distance.
//! Gesture classification is a small decision table over pinch strength
//! and the set of extended fingers, with ties resolved by priority:
//! pinch > open > point > fist > unknown.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::config::CalibrationConfig;
use crate::tracking::calibration::CalibrationState;
use crate::tracking::{landmark, HandFrame};

/// Pinch strength at or above which the pinch gesture fires.
pub const PINCH_GESTURE_THRESHOLD: f32 = 0.7;

bitflags! {
    /// Which fingers are extended (tip far enough from the wrist).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct FingerFlags: u8 {
        /// Thumb extended.
        const THUMB = 1 << 0;
        /// Index finger extended.
        const INDEX = 1 << 1;
        /// Middle finger extended.
        const MIDDLE = 1 << 2;
        /// Ring finger extended.
        const RING = 1 << 3;
        /// Pinky extended.
        const PINKY = 1 << 4;
    }
}

impl FingerFlags {
    /// Number of extended fingers.
    #[must_use]
    pub fn count(self) -> u32 {
        self.bits().count_ones()
    }
}

/// Classified hand gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gesture {
    /// Thumb and index pinched together (tool activation).
    Pinch,
    /// Open palm, four or more fingers extended.
    Open,
    /// Index finger alone extended.
    Point,
    /// All fingers curled.
    Fist,
    /// Anything else, including malformed input.
    Unknown,
}

/// Normalized pinch strength in [0, 1]: 1.0 when the thumb and index tips
/// are at or inside the full-pinch distance, 0.0 at or beyond the zero
/// distance, linear between. Incomplete frames score 0.
#[must_use]
pub fn pinch_strength(
    frame: &HandFrame,
    calibration: &CalibrationState,
    config: &CalibrationConfig,
) -> f32 {
    let (Some(thumb), Some(index)) = (
        frame.landmark(landmark::THUMB_TIP),
        frame.landmark(landmark::INDEX_TIP),
    ) else {
        return 0.0;
    };
    let distance_cm = thumb.distance(index) * calibration.effective_scale();
    if !distance_cm.is_finite() {
        return 0.0;
    }
    let span = config.pinch_zero_cm - config.pinch_full_cm;
    (1.0 - (distance_cm - config.pinch_full_cm) / span).clamp(0.0, 1.0)
}

/// Computes the extended-finger mask: a finger counts as extended when its
/// tip sits farther from the wrist than the configured threshold (raw
/// units). Incomplete frames yield an empty mask.
#[must_use]
pub fn extended_fingers(frame: &HandFrame, config: &CalibrationConfig) -> FingerFlags {
    let Some(wrist) = frame.wrist() else {
        return FingerFlags::empty();
    };
    let tips = [
        (landmark::THUMB_TIP, FingerFlags::THUMB),
        (landmark::INDEX_TIP, FingerFlags::INDEX),
        (landmark::MIDDLE_TIP, FingerFlags::MIDDLE),
        (landmark::RING_TIP, FingerFlags::RING),
        (landmark::PINKY_TIP, FingerFlags::PINKY),
    ];
    let mut flags = FingerFlags::empty();
    for (index, flag) in tips {
        if let Some(tip) = frame.landmark(index) {
            if tip.distance(wrist) > config.extended_finger_threshold {
                flags |= flag;
            }
        }
    }
    flags
}

/// Classifies the frame's gesture.
///
/// Decision table, highest priority first:
///
/// | condition                                | gesture |
/// |------------------------------------------|---------|
/// | pinch strength ≥ 0.7                     | Pinch   |
/// | ≥ 4 fingers extended                     | Open    |
/// | exactly the index finger extended        | Point   |
/// | no fingers extended                      | Fist    |
/// | otherwise                                | Unknown |
#[must_use]
pub fn classify(
    frame: &HandFrame,
    calibration: &CalibrationState,
    config: &CalibrationConfig,
) -> Gesture {
    if !frame.is_complete() {
        return Gesture::Unknown;
    }
    if pinch_strength(frame, calibration, config) >= PINCH_GESTURE_THRESHOLD {
        return Gesture::Pinch;
    }
    let fingers = extended_fingers(frame, config);
    if fingers.count() >= 4 {
        return Gesture::Open;
    }
    if fingers == FingerFlags::INDEX {
        return Gesture::Point;
    }
    if fingers.is_empty() {
        return Gesture::Fist;
    }
    Gesture::Unknown
}
