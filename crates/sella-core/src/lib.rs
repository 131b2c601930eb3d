//! # Sella Core
//!
//! Real-time spatial-proximity and procedural-feedback engine for the Sella
//! endoscopic skull-base surgery trainer.
//!
//! The crate covers the parts of the trainer with algorithmic weight:
//!
//! - **Curve model**: arteries as immutable control-point paths expanded
//!   into precomputed sample tables at scenario load
//! - **Proximity engine**: continuous nearest-distance-to-curve queries via
//!   segment projection, under a 60 Hz tick budget
//! - **Signal synthesizer**: inverse-falloff intensity with heartbeat
//!   pulsatility, glide-smoothed audio parameters, and a haptic pattern
//!   state machine keyed on danger level
//! - **Collision & resection**: static sphere volumes and a destructible
//!   tissue-wall grid
//! - **Input mapper**: calibration transform and gesture classification
//!   over externally supplied hand landmarks
//! - **Session**: the dependency-injected per-tick orchestrator
//!
//! Rendering, UI, coaching text, and landmark acquisition are external
//! collaborators; this crate only defines the numeric contracts it shares
//! with them. Recording and playback live in the `sella-replay` crate.
//!
//! ## Usage
//!
//! ```
//! use sella_core::anatomy::AnatomyModel;
//! use sella_core::config::SessionConfig;
//! use sella_core::session::{Session, TickInput};
//! use sella_core::signal::NullDevice;
//!
//! let config = SessionConfig::default();
//! let anatomy = AnatomyModel::default_scenario(config.proximity.resolution);
//! let mut session = Session::new(config, anatomy, Vec::new(), Box::new(NullDevice));
//!
//! let out = session.tick(&TickInput::empty(), 1.0 / 60.0);
//! assert!(out.resection.is_none());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod anatomy;
pub mod collision;
pub mod config;
pub mod proximity;
pub mod session;
pub mod signal;
pub mod tracking;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use anatomy::{AnatomyModel, ArteryCurve, CurveTable, Side};
pub use collision::{check_collision, CollidableVolume, CollisionHit, ResectionGrid};
pub use config::{ConfigError, SessionConfig, FIXED_DT};
pub use proximity::{DangerLevel, Nearest, ProximityEngine, ProximityMetrics};
pub use session::{Session, SurgicalStep, TickInput, TickOutput, Tool};
pub use signal::{AudioParams, FeedbackDevice, HapticDriver, HapticPattern, NullDevice};
pub use tracking::{HandFrame, Handedness, TrackingStatus};
