//! Configuration for the simulator core.
//!
//! All tunable constants live here as serde-able config structs with
//! defaults matching the shipping scenario. Configs are plain values:
//! constructed once at session load, validated, then passed by reference
//! into the engines that need them.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fixed timestep for the simulation tick (1/60 second = ~16.67ms).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Errors produced by config validation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Danger thresholds must satisfy 0 < critical < warning < caution.
    #[error("danger thresholds must be positive and strictly increasing: critical={critical}, warning={warning}, caution={caution}")]
    BadDangerThresholds {
        /// Configured critical cutoff.
        critical: f32,
        /// Configured warning cutoff.
        warning: f32,
        /// Configured caution cutoff.
        caution: f32,
    },
    /// Curve sample resolution must allow at least one segment.
    #[error("curve resolution must be at least 2, got {0}")]
    BadResolution(usize),
    /// Signal peak range must be strictly below the max range.
    #[error("signal peak range {peak} must be below max range {max}")]
    BadSignalRange {
        /// Configured full-intensity range.
        peak: f32,
        /// Configured zero-intensity range.
        max: f32,
    },
    /// Resection grid must have at least one cell.
    #[error("resection grid must be at least 1x1, got {cols}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        cols: usize,
        /// Configured row count.
        rows: usize,
    },
    /// Working depth range must be non-empty.
    #[error("depth range [{min}, {max}] is empty")]
    BadDepthRange {
        /// Configured minimum working depth.
        min: f32,
        /// Configured maximum working depth.
        max: f32,
    },
}

/// Configuration for the proximity engine.
///
/// Distances are in simulator centimeters, the same unit the anatomy
/// curves are authored in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityConfig {
    /// Number of points sampled per curve side at scenario load.
    pub resolution: usize,
    /// Insertion depth below which the artery is out of reach and the
    /// projection loop is skipped entirely.
    pub depth_gate: f32,
    /// Distance below which danger is `Critical`.
    pub critical: f32,
    /// Distance below which danger is `Warning`.
    pub warning: f32,
    /// Distance below which danger is `Caution`.
    pub caution: f32,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            resolution: 100,
            depth_gate: 2.0,
            critical: 0.3,
            warning: 0.5,
            caution: 1.0,
        }
    }
}

impl ProximityConfig {
    /// Validates threshold ordering and resolution.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if thresholds are not strictly increasing
    /// and positive, or if the resolution is below 2.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.critical > 0.0 && self.critical < self.warning && self.warning < self.caution) {
            return Err(ConfigError::BadDangerThresholds {
                critical: self.critical,
                warning: self.warning,
                caution: self.caution,
            });
        }
        if self.resolution < 2 {
            return Err(ConfigError::BadResolution(self.resolution));
        }
        Ok(())
    }
}

/// Configuration for the signal synthesizer and feedback mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalConfig {
    /// Distance at or below which raw intensity is 1.0.
    pub peak_range: f32,
    /// Distance at or beyond which raw intensity is 0.0.
    pub max_range: f32,
    /// Pulsatility rate in beats per minute.
    pub heart_rate_bpm: f32,
    /// Lower bound of the pulsatility multiplier, so the signal never
    /// fully silences during the low phase.
    pub diastolic_floor: f32,
    /// Audio frequency emitted at zero intensity.
    pub base_freq_hz: f32,
    /// Audio frequency emitted at full intensity.
    pub max_freq_hz: f32,
    /// First-order glide rate for audio parameter smoothing, in units of
    /// "fraction of remaining gap closed per second".
    pub glide_rate: f32,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            peak_range: 0.5,
            max_range: 3.0,
            heart_rate_bpm: 70.0,
            diastolic_floor: 0.35,
            base_freq_hz: 220.0,
            max_freq_hz: 880.0,
            glide_rate: 8.0,
        }
    }
}

impl SignalConfig {
    /// Validates range ordering.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::BadSignalRange` if `peak_range >= max_range`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.peak_range >= self.max_range {
            return Err(ConfigError::BadSignalRange {
                peak: self.peak_range,
                max: self.max_range,
            });
        }
        Ok(())
    }
}

/// Configuration for the destructible tissue wall grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns (x axis).
    pub cols: usize,
    /// Number of rows (y axis).
    pub rows: usize,
    /// Lower-left corner of the wall in simulator space (x, y).
    pub origin: Vec3,
    /// Side length of one square cell.
    pub cell_size: f32,
    /// Integrity at or below which a cell counts as removed.
    pub removal_threshold: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cols: 10,
            rows: 10,
            origin: Vec3::new(-2.5, -2.5, 0.0),
            cell_size: 0.5,
            removal_threshold: 0.01,
        }
    }
}

impl GridConfig {
    /// Validates grid dimensions.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptyGrid` if either dimension is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cols == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                cols: self.cols,
                rows: self.rows,
            });
        }
        Ok(())
    }
}

/// Configuration for hand-tracking calibration and gesture detection.
///
/// Raw landmark coordinates arrive normalized to the camera image
/// (0–1 on each axis); the calibration transform maps them into
/// simulator centimeters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Real-world wrist-to-middle-fingertip span used to derive the
    /// scale factor, in centimeters.
    pub reference_span_cm: f32,
    /// Minimum permitted insertion depth after mapping.
    pub depth_min: f32,
    /// Maximum permitted insertion depth after mapping.
    pub depth_max: f32,
    /// Tip-to-wrist distance (raw units) beyond which a finger counts
    /// as extended.
    pub extended_finger_threshold: f32,
    /// Thumb-index distance (cm) at or below which pinch strength is 1.0.
    pub pinch_full_cm: f32,
    /// Thumb-index distance (cm) at or beyond which pinch strength is 0.0.
    pub pinch_zero_cm: f32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            reference_span_cm: 8.5,
            depth_min: 0.0,
            depth_max: 8.0,
            extended_finger_threshold: 0.25,
            pinch_full_cm: 0.8,
            pinch_zero_cm: 4.0,
        }
    }
}

impl CalibrationConfig {
    /// Validates the working depth range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::BadDepthRange` if `depth_min >= depth_max`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth_min >= self.depth_max {
            return Err(ConfigError::BadDepthRange {
                min: self.depth_min,
                max: self.depth_max,
            });
        }
        Ok(())
    }
}

/// Aggregate configuration for a training session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Proximity engine settings.
    pub proximity: ProximityConfig,
    /// Signal synthesizer settings.
    pub signal: SignalConfig,
    /// Resection grid settings.
    pub grid: GridConfig,
    /// Calibration and gesture settings.
    pub calibration: CalibrationConfig,
}

impl SessionConfig {
    /// Validates every sub-config.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.proximity.validate()?;
        self.signal.validate()?;
        self.grid.validate()?;
        self.calibration.validate()?;
        Ok(())
    }
}
