//! End-to-end tests: a live simulation session recorded, persisted, and
//! replayed through the full stack.

use glam::Vec3;

use sella_core::anatomy::AnatomyModel;
use sella_core::config::{SessionConfig, FIXED_DT};
use sella_core::session::{Session, SurgicalStep, TickInput, Tool};
use sella_core::signal::NullDevice;
use sella_core::tracking::{landmark, HandFrame, Handedness};

use crate::frame::FrameSnapshot;
use crate::playback::PlaybackController;
use crate::recorder::Recorder;
use crate::store::{MemoryStore, RecordingStore};

/// An open hand whose wrist sits at `wrist` in raw tracking space.
fn open_hand(wrist: Vec3) -> HandFrame {
    let mut landmarks = vec![wrist; landmark::COUNT];
    landmarks[landmark::THUMB_TIP] = wrist + Vec3::new(-0.08, 0.10, 0.0);
    landmarks[landmark::INDEX_TIP] = wrist + Vec3::new(-0.03, 0.30, 0.0);
    landmarks[landmark::MIDDLE_TIP] = wrist + Vec3::new(0.0, 0.32, 0.0);
    landmarks[landmark::RING_TIP] = wrist + Vec3::new(0.03, 0.30, 0.0);
    landmarks[landmark::PINKY_TIP] = wrist + Vec3::new(0.06, 0.26, 0.0);
    HandFrame {
        landmarks,
        handedness: Handedness::Right,
        confidence: 0.95,
    }
}

/// Snapshots a tick's observable state the way the host application does.
fn snapshot_of(
    position: Vec3,
    tool: Tool,
    tool_active: bool,
    step: SurgicalStep,
) -> FrameSnapshot {
    FrameSnapshot {
        scope_position: position,
        scope_angle: 0.0,
        scope_rotation: 0.0,
        insertion_depth: position.z,
        active_tool: tool,
        is_tool_active: tool_active,
        surgical_step: step,
        blood_level: 0.0,
    }
}

/// Drives a session for `ticks` frames with a slowly drifting hand,
/// recording each tick, and returns the stored positions alongside the
/// finalized recording.
fn record_session(ticks: u32) -> (Vec<Vec3>, crate::recorder::Recording) {
    let config = SessionConfig::default();
    let anatomy = AnatomyModel::default_scenario(config.proximity.resolution);
    let mut session = Session::new(config, anatomy, Vec::new(), Box::new(NullDevice));

    let mut recorder = Recorder::new();
    recorder.start("level-1", "standard", 0);

    let mut positions = Vec::new();
    for tick in 0..ticks {
        let wrist = Vec3::new(0.5 + 0.002 * tick as f32, 0.5, 0.0);
        let input = TickInput {
            hand: Some(open_hand(wrist)),
            active_tool: Tool::Endoscope,
            surgical_step: SurgicalStep::Approach,
        };
        let out = session.tick(&input, FIXED_DT);
        let position = out
            .tracking
            .position()
            .expect("complete frame should track");
        positions.push(position);

        let snapshot = snapshot_of(position, input.active_tool, out.tool_active, input.surgical_step);
        recorder.capture_frame(&snapshot, u64::from(tick) * 16);
    }

    let recording = recorder
        .stop(88.0, u64::from(ticks.saturating_sub(1)) * 16)
        .expect("was recording");
    (positions, recording)
}

#[test]
fn session_record_store_replay_reproduces_tracked_positions() {
    let (positions, recording) = record_session(90);
    assert_eq!(recording.metadata.frame_count, 90);
    assert_eq!(recording.metadata.keyframe_count, 3);

    // Through the persistence seam, as the host application would.
    let mut store = MemoryStore::new();
    let id = store.save(&recording).unwrap();
    let loaded = store.load(&id).unwrap();

    let mut playback = PlaybackController::new();
    playback.load(&loaded).unwrap();

    // Every recorded instant replays the position the live session saw,
    // including frames reconstructed across keyframe boundaries.
    for (tick, expected) in positions.iter().enumerate() {
        let frame = playback.seek(tick as f64 * 16.0).unwrap();
        assert!(
            (frame.position - *expected).length() < 1e-4,
            "tick {tick}: {:?} vs {:?}",
            frame.position,
            expected
        );
    }
}

#[test]
fn replay_interpolates_between_live_session_frames() {
    let (positions, recording) = record_session(30);
    let mut playback = PlaybackController::new();
    playback.load(&recording).unwrap();

    // Halfway between ticks 10 and 11.
    let frame = playback.seek(10.0 * 16.0 + 8.0).unwrap();
    let expected = positions[10].lerp(positions[11], 0.5);
    assert!((frame.position - expected).length() < 1e-4);
}
