//! Test helper functions for setting up sessions and synthetic input.

use glam::Vec3;

use crate::anatomy::AnatomyModel;
use crate::collision::CollidableVolume;
use crate::config::SessionConfig;
use crate::session::{Session, SurgicalStep, TickInput, Tool};
use crate::signal::NullDevice;
use crate::tracking::{landmark, HandFrame, Handedness};

/// Builds a session over the default scenario with no collision volumes.
pub fn test_session() -> Session {
    let config = SessionConfig::default();
    let anatomy = AnatomyModel::default_scenario(config.proximity.resolution);
    Session::new(config, anatomy, Vec::new(), Box::new(NullDevice))
}

/// Builds a session with the standard level volumes: a non-critical septum
/// sphere on the midline and a critical sphere over each carotid.
pub fn test_session_with_volumes() -> Session {
    let config = SessionConfig::default();
    let anatomy = AnatomyModel::default_scenario(config.proximity.resolution);
    Session::new(
        config,
        anatomy,
        standard_volumes(),
        Box::new(NullDevice),
    )
}

/// The standard volume set used across integration tests.
pub fn standard_volumes() -> Vec<CollidableVolume> {
    vec![
        CollidableVolume {
            id: "septum".into(),
            center: Vec3::new(0.0, 0.0, 3.0),
            radius: 0.4,
            is_critical: false,
        },
        CollidableVolume {
            id: "carotid-left".into(),
            center: Vec3::new(-1.1, 0.0, 4.0),
            radius: 0.5,
            is_critical: true,
        },
        CollidableVolume {
            id: "carotid-right".into(),
            center: Vec3::new(1.1, 0.0, 4.0),
            radius: 0.5,
            is_critical: true,
        },
    ]
}

/// A complete open-hand frame with the wrist at `wrist` (raw coordinates).
pub fn open_hand(wrist: Vec3) -> HandFrame {
    crate::tracking::test_frames::synthetic_frame(wrist)
}

/// A complete frame pinching thumb and index, wrist at `wrist`.
pub fn pinched_hand(wrist: Vec3) -> HandFrame {
    let mut frame = open_hand(wrist);
    let tip = wrist + Vec3::new(0.0, 0.15, 0.0);
    frame.landmarks[landmark::THUMB_TIP] = tip;
    frame.landmarks[landmark::INDEX_TIP] = tip;
    frame
}

/// A malformed frame with too few landmarks.
pub fn short_frame() -> HandFrame {
    HandFrame {
        landmarks: vec![Vec3::splat(0.5); 7],
        handedness: Handedness::Right,
        confidence: 0.3,
    }
}

/// Tick input carrying the given hand and tool.
pub fn tick_input(hand: Option<HandFrame>, tool: Tool) -> TickInput {
    TickInput {
        hand,
        active_tool: tool,
        surgical_step: SurgicalStep::SellarExposure,
    }
}

/// Calibrates `session` on a centered open hand so that raw wrist motion
/// maps predictably into simulator space.
pub fn calibrate_centered(session: &mut Session) {
    let ok = session.calibrate(&open_hand(Vec3::new(0.5, 0.5, 0.0)));
    assert!(ok, "centered calibration frame must be accepted");
}
