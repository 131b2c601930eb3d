//! Proximity engine: nearest distance from the probe to the artery curves.
//!
//! Every tick the engine projects the probe onto each consecutive segment
//! of the precomputed sample tables and keeps the minimum squared distance.
//! The square root is taken once at the end, never inside the loop. The
//! whole query is allocation-free and O(resolution) per side, which keeps
//! it comfortably inside a 60 Hz tick budget.
//!
//! # Tie-breaking
//!
//! When the probe is exactly equidistant from both sides, the first side
//! evaluated (Left) wins. This is documented deterministic behavior, not
//! a physical claim.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::anatomy::{AnatomyModel, Side};
use crate::config::ProximityConfig;

/// Danger classification, a step function of distance to the nearest artery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DangerLevel {
    /// Beyond the caution threshold, or no artery in reach.
    Safe,
    /// Closer than the caution threshold.
    Caution,
    /// Closer than the warning threshold.
    Warning,
    /// Closer than the critical threshold.
    Critical,
}

impl DangerLevel {
    /// Classifies a distance against the configured cutoffs.
    ///
    /// Non-finite distances (the "artery out of reach" sentinel) are safe.
    #[must_use]
    pub fn from_distance(distance: f32, config: &ProximityConfig) -> Self {
        if !distance.is_finite() {
            return DangerLevel::Safe;
        }
        if distance < config.critical {
            DangerLevel::Critical
        } else if distance < config.warning {
            DangerLevel::Warning
        } else if distance < config.caution {
            DangerLevel::Caution
        } else {
            DangerLevel::Safe
        }
    }
}

/// Result of a nearest-point query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Nearest {
    /// Distance to the closest curve point, in cm. `f32::INFINITY` when the
    /// probe is above the depth gate or not finite.
    pub distance: f32,
    /// Which side was closest. `None` when no side was evaluated.
    pub side: Option<Side>,
}

impl Nearest {
    /// The out-of-reach sentinel: infinite distance, no side.
    pub const OUT_OF_REACH: Nearest = Nearest {
        distance: f32::INFINITY,
        side: None,
    };
}

/// Per-tick proximity metrics handed to the renderer and HUD.
///
/// Recomputed every tick, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityMetrics {
    /// Distance to the nearest artery, cm.
    pub distance: f32,
    /// Falloff intensity before pulsatility, in [0, 1].
    pub raw_intensity: f32,
    /// Pulsatility-modulated signal, in [0, 1].
    pub signal: f32,
    /// Closest side, if any artery was in reach.
    pub nearest_side: Option<Side>,
    /// Step-function classification of `distance`.
    pub danger: DangerLevel,
}

impl ProximityMetrics {
    /// Metrics representing "no artery in reach": zero signal, safe.
    pub const SAFE: ProximityMetrics = ProximityMetrics {
        distance: f32::INFINITY,
        raw_intensity: 0.0,
        signal: 0.0,
        nearest_side: None,
        danger: DangerLevel::Safe,
    };
}

/// The proximity engine. Owns the immutable anatomy tables and the
/// threshold configuration for the lifetime of a scenario.
#[derive(Debug, Clone)]
pub struct ProximityEngine {
    model: AnatomyModel,
    config: ProximityConfig,
}

impl ProximityEngine {
    /// Creates an engine over a prebuilt anatomy model.
    #[must_use]
    pub fn new(model: AnatomyModel, config: ProximityConfig) -> Self {
        Self { model, config }
    }

    /// The threshold configuration in use.
    #[must_use]
    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// The anatomy model in use.
    #[must_use]
    pub fn model(&self) -> &AnatomyModel {
        &self.model
    }

    /// Finds the nearest point on any curve to `probe`.
    ///
    /// Returns [`Nearest::OUT_OF_REACH`] when the probe has not been
    /// inserted past the depth gate, or when any probe coordinate is
    /// non-finite. A crash in this path would be worse than a transient
    /// safe reading, so bad input degrades instead of propagating.
    #[must_use]
    pub fn nearest(&self, probe: Vec3) -> Nearest {
        if !probe.is_finite() || probe.z < self.config.depth_gate {
            return Nearest::OUT_OF_REACH;
        }

        let mut best_d2 = f32::INFINITY;
        let mut best_side = None;

        for table in self.model.tables() {
            let d2 = min_distance_squared(probe, table.points());
            // Strict less-than: on an exact tie the earlier side stands.
            if d2 < best_d2 {
                best_d2 = d2;
                best_side = Some(table.side());
            }
        }

        match best_side {
            Some(side) => Nearest {
                // Single sqrt, outside the segment loop.
                distance: best_d2.sqrt(),
                side: Some(side),
            },
            None => Nearest::OUT_OF_REACH,
        }
    }

    /// Convenience: nearest distance classified into a danger level.
    #[must_use]
    pub fn danger_at(&self, probe: Vec3) -> DangerLevel {
        DangerLevel::from_distance(self.nearest(probe).distance, &self.config)
    }
}

/// Minimum squared distance from `probe` to the polyline through `points`.
fn min_distance_squared(probe: Vec3, points: &[Vec3]) -> f32 {
    let mut best = f32::INFINITY;
    for pair in points.windows(2) {
        let seg_start = pair[0];
        let seg_dir = pair[1] - seg_start;
        let len2 = seg_dir.length_squared();
        // Degenerate zero-length segment: treat t = 0.
        let t = if len2 > 0.0 {
            ((probe - seg_start).dot(seg_dir) / len2).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = seg_start + seg_dir * t;
        let d2 = probe.distance_squared(closest);
        if d2 < best {
            best = d2;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anatomy::ArteryCurve;

    /// Two straight vertical lines at x = ±1, z = 5 (past the depth gate).
    fn twin_line_model() -> AnatomyModel {
        let left = ArteryCurve::new(
            Side::Left,
            vec![Vec3::new(-1.0, -2.0, 5.0), Vec3::new(-1.0, 2.0, 5.0)],
        );
        let right = ArteryCurve::new(
            Side::Right,
            vec![Vec3::new(1.0, -2.0, 5.0), Vec3::new(1.0, 2.0, 5.0)],
        );
        AnatomyModel::new(&[left, right], 100)
    }

    fn engine() -> ProximityEngine {
        ProximityEngine::new(twin_line_model(), ProximityConfig::default())
    }

    mod nearest_tests {
        use super::*;

        #[test]
        fn distance_to_straight_line_is_perpendicular() {
            let engine = engine();
            let nearest = engine.nearest(Vec3::new(-0.5, 0.0, 5.0));
            assert!((nearest.distance - 0.5).abs() < 1e-4);
            assert_eq!(nearest.side, Some(Side::Left));
        }

        #[test]
        fn projection_is_continuous_between_samples() {
            // A point midway between two table samples must not snap to
            // the nearest sample; segment projection keeps it exact.
            let engine = engine();
            let nearest = engine.nearest(Vec3::new(-0.2, 0.013, 5.0));
            assert!((nearest.distance - 0.8).abs() < 1e-4);
        }

        #[test]
        fn probe_beyond_curve_end_clamps_to_endpoint() {
            let engine = engine();
            let nearest = engine.nearest(Vec3::new(-1.0, 5.0, 5.0));
            // 3 cm above the top endpoint at y = 2.
            assert!((nearest.distance - 3.0).abs() < 1e-4);
        }

        #[test]
        fn midline_tie_goes_to_left() {
            let engine = engine();
            let nearest = engine.nearest(Vec3::new(0.0, 0.0, 5.0));
            assert!((nearest.distance - 1.0).abs() < 1e-4);
            assert_eq!(nearest.side, Some(Side::Left));
        }

        #[test]
        fn right_side_wins_when_closer() {
            let engine = engine();
            let nearest = engine.nearest(Vec3::new(0.6, 0.0, 5.0));
            assert_eq!(nearest.side, Some(Side::Right));
        }

        #[test]
        fn shallow_probe_is_out_of_reach() {
            let engine = engine();
            let nearest = engine.nearest(Vec3::new(-1.0, 0.0, 1.0));
            assert_eq!(nearest, Nearest::OUT_OF_REACH);
        }

        #[test]
        fn depth_gate_is_configurable() {
            let config = ProximityConfig {
                depth_gate: 0.0,
                ..ProximityConfig::default()
            };
            let engine = ProximityEngine::new(twin_line_model(), config);
            let nearest = engine.nearest(Vec3::new(-1.0, 0.0, 1.0));
            assert!(nearest.distance.is_finite());
        }

        #[test]
        fn non_finite_probe_is_safe_not_a_fault() {
            let engine = engine();
            assert_eq!(
                engine.nearest(Vec3::new(f32::NAN, 0.0, 5.0)),
                Nearest::OUT_OF_REACH
            );
            assert_eq!(
                engine.nearest(Vec3::new(0.0, f32::INFINITY, 5.0)),
                Nearest::OUT_OF_REACH
            );
            assert_eq!(engine.danger_at(Vec3::splat(f32::NAN)), DangerLevel::Safe);
        }

        #[test]
        fn degenerate_zero_length_segment_is_handled() {
            let stacked = ArteryCurve::new(
                Side::Left,
                vec![Vec3::new(0.0, 0.0, 5.0), Vec3::new(0.0, 0.0, 5.0)],
            );
            // Resolution 2 keeps the duplicate as a single zero-length segment.
            let model = AnatomyModel::new(&[stacked], 2);
            let engine = ProximityEngine::new(model, ProximityConfig::default());
            let nearest = engine.nearest(Vec3::new(0.5, 0.0, 5.0));
            assert!((nearest.distance - 0.5).abs() < 1e-4);
        }
    }

    mod danger_level_tests {
        use super::*;

        #[test]
        fn boundary_classification() {
            let config = ProximityConfig::default();
            assert_eq!(
                DangerLevel::from_distance(0.29, &config),
                DangerLevel::Critical
            );
            assert_eq!(
                DangerLevel::from_distance(0.49, &config),
                DangerLevel::Warning
            );
            assert_eq!(
                DangerLevel::from_distance(0.99, &config),
                DangerLevel::Caution
            );
            assert_eq!(DangerLevel::from_distance(1.01, &config), DangerLevel::Safe);
        }

        #[test]
        fn cutoffs_are_exclusive() {
            let config = ProximityConfig::default();
            // Exactly at a threshold belongs to the milder level.
            assert_eq!(
                DangerLevel::from_distance(0.3, &config),
                DangerLevel::Warning
            );
            assert_eq!(
                DangerLevel::from_distance(0.5, &config),
                DangerLevel::Caution
            );
            assert_eq!(DangerLevel::from_distance(1.0, &config), DangerLevel::Safe);
        }

        #[test]
        fn infinite_distance_is_safe() {
            let config = ProximityConfig::default();
            assert_eq!(
                DangerLevel::from_distance(f32::INFINITY, &config),
                DangerLevel::Safe
            );
            assert_eq!(
                DangerLevel::from_distance(f32::NAN, &config),
                DangerLevel::Safe
            );
        }
    }
}
