//! Anatomical curve model.
//!
//! An artery is authored as an ordered list of control points per side and
//! expanded once, at scenario load, into a fixed-resolution sample table.
//! The table is an explicit immutable value: built once, read-only after,
//! and passed by reference into the proximity engine. Nothing here is
//! recomputed per tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Which side of the midline a curve belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Patient left.
    Left,
    /// Patient right.
    Right,
}

impl Side {
    /// Both sides, in evaluation order. Left is evaluated first, which
    /// makes it the winner of exact distance ties.
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];
}

/// An artery path authored as ordered control points.
///
/// Control points are immutable after construction. Smoothness comes from
/// Catmull-Rom interpolation when the sample table is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArteryCurve {
    side: Side,
    control_points: Vec<Vec3>,
}

impl ArteryCurve {
    /// Creates a curve from ordered control points.
    ///
    /// # Panics
    ///
    /// Panics if fewer than 2 control points are given. Curves are
    /// authored data, not runtime input, so a short curve is a scenario
    /// bug rather than a recoverable condition.
    #[must_use]
    pub fn new(side: Side, control_points: Vec<Vec3>) -> Self {
        assert!(
            control_points.len() >= 2,
            "artery curve needs at least 2 control points"
        );
        Self {
            side,
            control_points,
        }
    }

    /// The side this curve belongs to.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// The authored control points.
    #[must_use]
    pub fn control_points(&self) -> &[Vec3] {
        &self.control_points
    }

    /// Evaluates the curve at parameter `t` in [0, 1] using centripetal-free
    /// uniform Catmull-Rom over the control polygon. Endpoints are clamped
    /// (the first and last points repeat as phantom neighbors).
    #[must_use]
    pub fn point_at(&self, t: f32) -> Vec3 {
        let pts = &self.control_points;
        let n = pts.len();
        let t = t.clamp(0.0, 1.0);

        // Map t onto the segment index and local parameter.
        let scaled = t * (n - 1) as f32;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let seg = (scaled.floor() as usize).min(n - 2);
        let u = scaled - seg as f32;

        let p0 = pts[seg.saturating_sub(1)];
        let p1 = pts[seg];
        let p2 = pts[seg + 1];
        let p3 = pts[(seg + 2).min(n - 1)];

        catmull_rom(p0, p1, p2, p3, u)
    }
}

/// Uniform Catmull-Rom interpolation between `p1` and `p2`.
fn catmull_rom(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, u: f32) -> Vec3 {
    let u2 = u * u;
    let u3 = u2 * u;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
        + (3.0 * p1 - 3.0 * p2 + p3 - p0) * u3)
}

/// A precomputed sample table for one curve side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveTable {
    side: Side,
    points: Vec<Vec3>,
}

impl CurveTable {
    /// Builds a table of `resolution` points evenly spaced in parameter
    /// space. Built once at scenario load.
    #[must_use]
    pub fn build(curve: &ArteryCurve, resolution: usize) -> Self {
        let resolution = resolution.max(2);
        let points = (0..resolution)
            .map(|i| curve.point_at(i as f32 / (resolution - 1) as f32))
            .collect();
        Self {
            side: curve.side(),
            points,
        }
    }

    /// The side this table was built for.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// The sampled points, in curve order.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }
}

/// The full anatomical model for a scenario: one sampled curve per side.
///
/// Owned by the session and shared by reference with the proximity engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnatomyModel {
    tables: Vec<CurveTable>,
}

impl AnatomyModel {
    /// Builds the model from authored curves at the given table resolution.
    #[must_use]
    pub fn new(curves: &[ArteryCurve], resolution: usize) -> Self {
        let tables = curves
            .iter()
            .map(|c| CurveTable::build(c, resolution))
            .collect();
        Self { tables }
    }

    /// The per-side sample tables, in evaluation order.
    #[must_use]
    pub fn tables(&self) -> &[CurveTable] {
        &self.tables
    }

    /// The default transsphenoidal scenario: paraclival carotid segments
    /// left and right of the midline, running roughly vertically and
    /// deepening posteriorly. Units are simulator centimeters; z is
    /// insertion depth.
    #[must_use]
    pub fn default_scenario(resolution: usize) -> Self {
        let left = ArteryCurve::new(
            Side::Left,
            vec![
                Vec3::new(-1.4, -2.0, 3.2),
                Vec3::new(-1.2, -1.0, 3.6),
                Vec3::new(-1.1, 0.0, 4.0),
                Vec3::new(-1.3, 1.0, 4.3),
                Vec3::new(-1.6, 2.0, 4.5),
            ],
        );
        let right = ArteryCurve::new(
            Side::Right,
            vec![
                Vec3::new(1.4, -2.0, 3.2),
                Vec3::new(1.2, -1.0, 3.6),
                Vec3::new(1.1, 0.0, 4.0),
                Vec3::new(1.3, 1.0, 4.3),
                Vec3::new(1.6, 2.0, 4.5),
            ],
        );
        Self::new(&[left, right], resolution)
    }
}
