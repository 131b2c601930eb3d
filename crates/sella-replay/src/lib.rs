//! Session recording and replay for the surgical trainer.
//!
//! This crate captures per-tick simulation state into a delta-compressed,
//! JSON-serializable log and plays it back with frame interpolation and
//! variable speed. It sits downstream of `sella-core`: the simulation
//! produces [`frame::FrameSnapshot`]s, the [`recorder::Recorder`] encodes
//! them, a [`store::RecordingStore`] persists them, and the
//! [`playback::PlaybackController`] reconstructs and interpolates them for
//! review.
//!
//! # Example
//!
//! ```
//! use sella_replay::frame::FrameSnapshot;
//! use sella_replay::playback::PlaybackController;
//! use sella_replay::recorder::Recorder;
//!
//! let mut recorder = Recorder::new();
//! recorder.start("level-1", "standard", 0);
//! for tick in 0..120u64 {
//!     recorder.capture_frame(&FrameSnapshot::default(), tick * 16);
//! }
//! let recording = recorder.stop(92.5, 120 * 16).expect("was recording");
//!
//! let mut playback = PlaybackController::new();
//! playback.load(&recording).expect("non-empty recording");
//! playback.play().expect("loaded");
//! let frame = playback.advance(1.0 / 60.0).expect("playing");
//! assert_eq!(frame.position, glam::Vec3::ZERO);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod event;
pub mod frame;
pub mod playback;
pub mod recorder;
pub mod store;

#[cfg(test)]
mod tests;

pub use event::{EventKind, RecordingEvent};
pub use frame::{FrameKind, FrameSnapshot, RecordedFrame};
pub use playback::{InterpolatedFrame, PlaybackController, PlaybackSpeed, PlaybackState, ReplayError};
pub use recorder::{Recorder, RecorderState, Recording, RecordingMetadata};
pub use store::{MemoryStore, RecordingId, RecordingStore, StoreError};
