//! Signal synthesizer: proximity distance in, feedback parameters out.
//!
//! The synthesizer turns the per-tick nearest distance into a continuous
//! feedback scalar: an inverse-falloff intensity modulated by a heartbeat
//! rhythm. Audio parameters are continuous and glide-smoothed so there are
//! no audible clicks; haptics are discrete patterns selected by danger
//! level through an explicit state machine.

use serde::{Deserialize, Serialize};

use crate::config::{ProximityConfig, SignalConfig};
use crate::proximity::DangerLevel;

// =============================================================================
// Falloff and pulsatility
// =============================================================================

/// Inverse-falloff intensity for a given distance.
///
/// 1.0 at or inside `peak_range`, 0.0 at or beyond `max_range`, and a
/// squared (smooth, monotonically decreasing) interpolation between. The
/// squared ramp makes the signal swell non-linearly on approach instead of
/// fading linearly.
#[must_use]
pub fn falloff(distance: f32, config: &SignalConfig) -> f32 {
    if !distance.is_finite() || distance >= config.max_range {
        return 0.0;
    }
    if distance <= config.peak_range {
        return 1.0;
    }
    let t = (config.max_range - distance) / (config.max_range - config.peak_range);
    t * t
}

/// Heartbeat modulation at time `t` seconds: `0.5 + 0.5·sin(2π·f·t)` with
/// `f` derived from the configured BPM, then floored so the low (diastolic)
/// phase never fully silences the signal.
#[must_use]
pub fn pulsatility(t: f32, config: &SignalConfig) -> f32 {
    let freq = config.heart_rate_bpm / 60.0;
    let wave = 0.5 + 0.5 * (std::f32::consts::TAU * freq * t).sin();
    wave.max(config.diastolic_floor)
}

/// One synthesized sample: the contract output of the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalSample {
    /// Falloff intensity before pulsatility, in [0, 1].
    pub raw_intensity: f32,
    /// `raw_intensity · pulsatility`, in [0, 1].
    pub signal: f32,
    /// Danger classification of the input distance.
    pub danger: DangerLevel,
}

/// Synthesizes the feedback signal from distance and elapsed time.
#[derive(Debug, Clone)]
pub struct SignalSynthesizer {
    signal: SignalConfig,
    proximity: ProximityConfig,
}

impl SignalSynthesizer {
    /// Creates a synthesizer with the given tuning.
    #[must_use]
    pub fn new(signal: SignalConfig, proximity: ProximityConfig) -> Self {
        Self { signal, proximity }
    }

    /// The signal tuning in use.
    #[must_use]
    pub fn config(&self) -> &SignalConfig {
        &self.signal
    }

    /// Synthesizes the sample for a distance at elapsed time `t` seconds.
    #[must_use]
    pub fn sample(&self, distance: f32, t: f32) -> SignalSample {
        let raw_intensity = falloff(distance, &self.signal);
        let signal = raw_intensity * pulsatility(t, &self.signal);
        SignalSample {
            raw_intensity,
            signal,
            danger: DangerLevel::from_distance(distance, &self.proximity),
        }
    }

    /// Maps a sample to instantaneous (unsmoothed) audio targets.
    #[must_use]
    pub fn audio_targets(&self, sample: &SignalSample) -> AudioParams {
        AudioParams {
            frequency_hz: self.signal.base_freq_hz
                + (self.signal.max_freq_hz - self.signal.base_freq_hz) * sample.raw_intensity,
            gain: sample.signal,
        }
    }
}

// =============================================================================
// Audio output
// =============================================================================

/// Target parameters for the audio device adapter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioParams {
    /// Oscillator frequency in Hz.
    pub frequency_hz: f32,
    /// Output gain in [0, 1].
    pub gain: f32,
}

impl AudioParams {
    /// Silent output at the base frequency.
    #[must_use]
    pub fn silent(config: &SignalConfig) -> Self {
        Self {
            frequency_hz: config.base_freq_hz,
            gain: 0.0,
        }
    }
}

/// First-order parameter smoother ("glide").
///
/// Each step closes a fraction of the remaining gap to the target, so the
/// value approaches monotonically and never overshoots. Used for audio
/// frequency and gain to avoid instantaneous jumps that click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Glide {
    current: f32,
}

impl Glide {
    /// Starts the smoother at an initial value.
    #[must_use]
    pub fn new(initial: f32) -> Self {
        Self { current: initial }
    }

    /// The smoothed value.
    #[must_use]
    pub fn value(&self) -> f32 {
        self.current
    }

    /// Advances toward `target` over `dt` seconds at the given rate.
    pub fn step(&mut self, target: f32, dt: f32, rate: f32) -> f32 {
        let alpha = 1.0 - (-rate * dt).exp();
        self.current += (target - self.current) * alpha;
        self.current
    }
}

/// Glide-smoothed audio parameter pair.
#[derive(Debug, Clone, Copy)]
pub struct SmoothedAudio {
    frequency: Glide,
    gain: Glide,
}

impl SmoothedAudio {
    /// Starts silent at the base frequency.
    #[must_use]
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            frequency: Glide::new(config.base_freq_hz),
            gain: Glide::new(0.0),
        }
    }

    /// Glides toward the target parameters and returns the smoothed pair.
    pub fn step(&mut self, target: AudioParams, dt: f32, config: &SignalConfig) -> AudioParams {
        AudioParams {
            frequency_hz: self.frequency.step(target.frequency_hz, dt, config.glide_rate),
            gain: self.gain.step(target.gain, dt, config.glide_rate),
        }
    }
}

// =============================================================================
// Haptics
// =============================================================================

/// A discrete vibration pattern: alternating pulse/pause durations in ms,
/// replayed by the device on a fixed interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HapticPattern {
    /// Alternating pulse/pause durations, starting with a pulse.
    pub durations_ms: Vec<u32>,
    /// Interval at which the device replays the pattern.
    pub repeat_ms: u32,
}

impl HapticPattern {
    /// The pattern for a danger level, `None` for `Safe`.
    #[must_use]
    pub fn for_level(level: DangerLevel) -> Option<HapticPattern> {
        match level {
            DangerLevel::Safe => None,
            DangerLevel::Caution => Some(HapticPattern {
                durations_ms: vec![80],
                repeat_ms: 2000,
            }),
            DangerLevel::Warning => Some(HapticPattern {
                durations_ms: vec![120, 100, 120],
                repeat_ms: 1000,
            }),
            DangerLevel::Critical => Some(HapticPattern {
                durations_ms: vec![180, 80, 180, 80, 180],
                repeat_ms: 400,
            }),
        }
    }
}

/// Narrow adapter contract for the audio/haptic device.
///
/// A failing device is swapped for [`NullDevice`]: feedback is advisory and
/// never gates simulation correctness.
pub trait FeedbackDevice {
    /// Updates the continuous audio output.
    fn play(&mut self, params: AudioParams);
    /// Starts replaying a vibration pattern, cancelling any previous one.
    fn vibrate(&mut self, pattern: &HapticPattern);
    /// Stops all output.
    fn stop(&mut self);
}

/// Device adapter that discards everything. Used headless and as the
/// degraded fallback when a real device fails to initialize.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDevice;

impl FeedbackDevice for NullDevice {
    fn play(&mut self, _params: AudioParams) {}
    fn vibrate(&mut self, _pattern: &HapticPattern) {}
    fn stop(&mut self) {}
}

/// Haptic state machine keyed on danger level.
///
/// States are the four danger levels; the only transition is a level
/// *change*, whose action is to cancel the running pattern and start the
/// new level's pattern (or nothing, for `Safe`). Re-entering the current
/// level does not restart the pattern.
#[derive(Debug, Clone, Copy)]
pub struct HapticDriver {
    level: DangerLevel,
}

impl HapticDriver {
    /// Starts in the `Safe` state with no pattern running.
    #[must_use]
    pub fn new() -> Self {
        Self {
            level: DangerLevel::Safe,
        }
    }

    /// The current state.
    #[must_use]
    pub fn level(&self) -> DangerLevel {
        self.level
    }

    /// Feeds the tick's danger level through the transition table.
    ///
    /// Returns `true` when a transition fired (pattern restarted or
    /// cancelled on the device).
    pub fn observe(&mut self, level: DangerLevel, device: &mut dyn FeedbackDevice) -> bool {
        if level == self.level {
            return false;
        }
        tracing::debug!(from = ?self.level, to = ?level, "haptic level transition");
        self.level = level;
        match HapticPattern::for_level(level) {
            Some(pattern) => device.vibrate(&pattern),
            None => device.stop(),
        }
        true
    }
}

impl Default for HapticDriver {
    fn default() -> Self {
        Self::new()
    }
}
