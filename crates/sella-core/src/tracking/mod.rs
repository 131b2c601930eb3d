//! Hand-tracking input mapping.
//!
//! The vision collaborator supplies 21 landmarks per hand in normalized
//! image coordinates; this module owns everything after that point:
//! validation, the calibration transform into simulator space, and gesture
//! classification. Acquiring the landmarks is out of scope.

pub mod calibration;
pub mod gesture;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Landmark indices into a [`HandFrame`], matching the 21-point hand model
/// the vision collaborator emits.
pub mod landmark {
    /// Wrist root.
    pub const WRIST: usize = 0;
    /// Thumb tip.
    pub const THUMB_TIP: usize = 4;
    /// Index fingertip.
    pub const INDEX_TIP: usize = 8;
    /// Middle fingertip.
    pub const MIDDLE_TIP: usize = 12;
    /// Ring fingertip.
    pub const RING_TIP: usize = 16;
    /// Pinky fingertip.
    pub const PINKY_TIP: usize = 20;

    /// Expected landmark count per hand.
    pub const COUNT: usize = 21;
}

/// Which physical hand a frame belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Handedness {
    /// The operator's left hand.
    Left,
    /// The operator's right hand.
    Right,
}

/// One tick's worth of raw landmarks for a single hand.
///
/// Coordinates are normalized to the camera image: x and y in [0, 1],
/// z a relative depth estimate around 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// All 21 landmarks in model order.
    pub landmarks: Vec<Vec3>,
    /// Which hand this is.
    pub handedness: Handedness,
    /// Detector confidence in [0, 1].
    pub confidence: f32,
}

impl HandFrame {
    /// True when the frame carries the full landmark set.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.landmarks.len() == landmark::COUNT
    }

    /// A landmark by index, `None` when the frame is short.
    #[must_use]
    pub fn landmark(&self, index: usize) -> Option<Vec3> {
        self.landmarks.get(index).copied()
    }

    /// Wrist position, `None` when missing.
    #[must_use]
    pub fn wrist(&self) -> Option<Vec3> {
        self.landmark(landmark::WRIST)
    }
}

/// Result of mapping one tick of tracking input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackingStatus {
    /// A usable probe position was produced.
    Tracking(Vec3),
    /// Input was missing or malformed; no probe this tick.
    NotTracking,
}

impl TrackingStatus {
    /// The probe position, if tracking.
    #[must_use]
    pub fn position(&self) -> Option<Vec3> {
        match self {
            TrackingStatus::Tracking(p) => Some(*p),
            TrackingStatus::NotTracking => None,
        }
    }
}
