//! Session orchestrator: the per-tick update loop.
//!
//! A `Session` wires the input mapper, proximity engine, collision model,
//! resection grid, and signal synthesizer into one cooperative tick,
//! called once per rendered frame. Everything is dependency-injected and
//! owned by the session: no singletons, so multiple sessions can coexist
//! in tests and teardown is dropping the value.
//!
//! # Tick order
//!
//! 1. Map raw landmarks into simulator space (or `NotTracking`)
//! 2. Proximity query against the artery tables
//! 3. Collision check and, while a resecting tool is pinched, grid wear
//! 4. Signal synthesis and glide-smoothed audio parameters
//! 5. Haptic state machine transition, device output
//!
//! Each tick either completes the whole cycle or, on missing input,
//! degrades to a safe/silent output. Nothing blocks.

use serde::{Deserialize, Serialize};

use crate::anatomy::AnatomyModel;
use crate::collision::{check_collision, CollidableVolume, CollisionHit, ResectionGrid, ResectionOutcome};
use crate::config::SessionConfig;
use crate::proximity::{ProximityEngine, ProximityMetrics};
use crate::signal::{
    AudioParams, FeedbackDevice, HapticDriver, SignalSynthesizer, SmoothedAudio,
};
use crate::tracking::calibration::{self, CalibrationState};
use crate::tracking::gesture::{self, Gesture};
use crate::tracking::{HandFrame, TrackingStatus};

/// Integrity removed per second of resecting-tool contact.
pub const RESECTION_RATE: f32 = 2.0;

/// Surgical instruments selectable during a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    /// The scope itself; never resects.
    Endoscope,
    /// Ring curette for soft tissue.
    Curette,
    /// High-speed drill for bone.
    Drill,
    /// Suction cannula.
    Suction,
}

impl Tool {
    /// Whether contact with this tool wears the tissue wall.
    #[must_use]
    pub fn is_resecting(self) -> bool {
        matches!(self, Tool::Curette | Tool::Drill)
    }
}

/// Procedure phases, advanced by the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurgicalStep {
    /// Navigating the nasal corridor.
    Approach,
    /// Opening the sphenoid sinus.
    Sphenoidotomy,
    /// Exposing the sellar floor.
    SellarExposure,
    /// Opening the dura.
    DuralOpening,
    /// Removing the lesion.
    TumorResection,
    /// Reconstruction and withdrawal.
    Closure,
}

/// Per-tick input from the external collaborators.
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Raw landmarks for the dominant hand, if detected this tick.
    pub hand: Option<HandFrame>,
    /// Currently selected instrument.
    pub active_tool: Tool,
    /// Current procedure phase.
    pub surgical_step: SurgicalStep,
}

impl TickInput {
    /// Input with no detected hand.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            hand: None,
            active_tool: Tool::Endoscope,
            surgical_step: SurgicalStep::Approach,
        }
    }
}

/// Everything a tick produces for the renderer, HUD, and recorder.
#[derive(Debug, Clone)]
pub struct TickOutput {
    /// Mapped probe position, or `NotTracking`.
    pub tracking: TrackingStatus,
    /// Proximity metrics for HUD and audio.
    pub metrics: ProximityMetrics,
    /// Collision result against the level's volumes.
    pub collision: CollisionHit,
    /// Classified gesture.
    pub gesture: Gesture,
    /// Pinch strength in [0, 1].
    pub pinch: f32,
    /// Whether the active tool was engaged this tick.
    pub tool_active: bool,
    /// Glide-smoothed audio parameters sent to the device.
    pub audio: AudioParams,
    /// Grid mutation, when a resecting tool touched the wall.
    pub resection: Option<ResectionOutcome>,
}

/// One training session: owns all per-level mutable state.
pub struct Session {
    config: SessionConfig,
    proximity: ProximityEngine,
    synthesizer: SignalSynthesizer,
    volumes: Vec<CollidableVolume>,
    grid: ResectionGrid,
    calibration: CalibrationState,
    haptics: HapticDriver,
    audio: SmoothedAudio,
    device: Box<dyn FeedbackDevice>,
    elapsed: f32,
}

impl Session {
    /// Creates a session over a prebuilt anatomy model and level volumes.
    ///
    /// The feedback device is injected; pass
    /// [`NullDevice`](crate::signal::NullDevice) when audio/haptics are
    /// unavailable; feedback is advisory and never gates the simulation.
    #[must_use]
    pub fn new(
        config: SessionConfig,
        anatomy: AnatomyModel,
        volumes: Vec<CollidableVolume>,
        device: Box<dyn FeedbackDevice>,
    ) -> Self {
        let proximity = ProximityEngine::new(anatomy, config.proximity.clone());
        let synthesizer = SignalSynthesizer::new(config.signal.clone(), config.proximity.clone());
        let grid = ResectionGrid::new(config.grid.clone());
        let audio = SmoothedAudio::new(&config.signal);
        Self {
            config,
            proximity,
            synthesizer,
            volumes,
            grid,
            calibration: CalibrationState::default(),
            haptics: HapticDriver::new(),
            audio,
            device,
            elapsed: 0.0,
        }
    }

    /// Seconds of session time elapsed.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The current calibration state.
    #[must_use]
    pub fn calibration(&self) -> &CalibrationState {
        &self.calibration
    }

    /// The tissue wall state.
    #[must_use]
    pub fn grid(&self) -> &ResectionGrid {
        &self.grid
    }

    /// The proximity engine (read-only).
    #[must_use]
    pub fn proximity(&self) -> &ProximityEngine {
        &self.proximity
    }

    /// Captures a calibration from the given frame, replacing any previous
    /// one. Returns `false` (keeping the old state) on malformed input.
    pub fn calibrate(&mut self, frame: &HandFrame) -> bool {
        match calibration::calibrate(frame, &self.config.calibration) {
            Some(state) => {
                self.calibration = state;
                true
            }
            None => {
                tracing::warn!("calibration rejected: incomplete or degenerate frame");
                false
            }
        }
    }

    /// Resets per-level state for a restart: wall integrity, haptics, and
    /// the session clock. Calibration survives a restart.
    pub fn restart_level(&mut self) {
        tracing::debug!("level restart");
        self.grid.reset();
        self.haptics = HapticDriver::new();
        self.audio = SmoothedAudio::new(&self.config.signal);
        self.device.stop();
        self.elapsed = 0.0;
    }

    /// Runs one simulation tick.
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> TickOutput {
        self.elapsed += dt;

        let (tracking, gesture, pinch) = self.map_input(input);

        let Some(probe) = tracking.position() else {
            return self.degraded_tick(dt, tracking);
        };

        let nearest = self.proximity.nearest(probe);
        let sample = self.synthesizer.sample(nearest.distance, self.elapsed);
        let metrics = ProximityMetrics {
            distance: nearest.distance,
            raw_intensity: sample.raw_intensity,
            signal: sample.signal,
            nearest_side: nearest.side,
            danger: sample.danger,
        };

        let collision = check_collision(probe, &self.volumes);

        let tool_active = gesture == Gesture::Pinch;
        let resection = (tool_active && input.active_tool.is_resecting())
            .then(|| self.grid.resect(probe, RESECTION_RATE * dt));

        let targets = self.synthesizer.audio_targets(&sample);
        let audio = self.drive_feedback(&targets, dt);
        self.haptics.observe(metrics.danger, self.device.as_mut());

        TickOutput {
            tracking,
            metrics,
            collision,
            gesture,
            pinch,
            tool_active,
            audio,
            resection,
        }
    }

    /// Maps this tick's raw hand input.
    fn map_input(&self, input: &TickInput) -> (TrackingStatus, Gesture, f32) {
        match &input.hand {
            Some(frame) if frame.is_complete() => {
                let Some(wrist) = frame.wrist() else {
                    return (TrackingStatus::NotTracking, Gesture::Unknown, 0.0);
                };
                let probe = calibration::map_to_simulator_space(
                    wrist,
                    &self.calibration,
                    &self.config.calibration,
                );
                let gesture = gesture::classify(frame, &self.calibration, &self.config.calibration);
                let pinch =
                    gesture::pinch_strength(frame, &self.calibration, &self.config.calibration);
                (TrackingStatus::Tracking(probe), gesture, pinch)
            }
            _ => (TrackingStatus::NotTracking, Gesture::Unknown, 0.0),
        }
    }

    /// A tick without usable input: safe metrics, audio glides to silence.
    fn degraded_tick(&mut self, dt: f32, tracking: TrackingStatus) -> TickOutput {
        let audio = self.drive_feedback(&AudioParams::silent(&self.config.signal), dt);
        self.haptics
            .observe(ProximityMetrics::SAFE.danger, self.device.as_mut());
        TickOutput {
            tracking,
            metrics: ProximityMetrics::SAFE,
            collision: CollisionHit::none(),
            gesture: Gesture::Unknown,
            pinch: 0.0,
            tool_active: false,
            audio,
            resection: None,
        }
    }

    /// Glides the audio parameters toward their targets and plays them.
    fn drive_feedback(&mut self, target: &AudioParams, dt: f32) -> AudioParams {
        let smoothed = self.audio.step(*target, dt, &self.config.signal);
        self.device.play(smoothed);
        smoothed
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("elapsed", &self.elapsed)
            .field("calibrated", &self.calibration.is_calibrated)
            .field("removed_cells", &self.grid.removed_count())
            .finish_non_exhaustive()
    }
}
