//! Collision volumes and the destructible tissue wall.
//!
//! Collidable volumes are static spheres checked per tick. The tissue wall
//! is a planar grid of integrity cells in [0, 1], worn down by resection
//! contacts and reset at level restart.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;

// =============================================================================
// Collidable volumes
// =============================================================================

/// A static spherical collision volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollidableVolume {
    /// Stable identifier, unique per level.
    pub id: String,
    /// Sphere center in simulator space.
    pub center: Vec3,
    /// Sphere radius, cm.
    pub radius: f32,
    /// Whether contact is a reportable complication.
    pub is_critical: bool,
}

impl CollidableVolume {
    /// True when `probe` is strictly inside the sphere.
    #[must_use]
    pub fn contains(&self, probe: Vec3) -> bool {
        probe.distance_squared(self.center) < self.radius * self.radius
    }
}

/// Result of a collision check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionHit {
    /// Whether any volume contains the probe.
    pub is_colliding: bool,
    /// Id of the first containing volume, in slice order.
    pub volume_id: Option<String>,
    /// Whether that volume is critical.
    pub is_critical: bool,
}

impl CollisionHit {
    /// The no-contact result.
    #[must_use]
    pub fn none() -> Self {
        Self {
            is_colliding: false,
            volume_id: None,
            is_critical: false,
        }
    }
}

/// Checks the probe against the volumes in slice order.
///
/// The first containing volume wins; there is no multi-collision
/// resolution. A non-finite probe never collides.
#[must_use]
pub fn check_collision(probe: Vec3, volumes: &[CollidableVolume]) -> CollisionHit {
    if !probe.is_finite() {
        return CollisionHit::none();
    }
    for volume in volumes {
        if volume.contains(probe) {
            return CollisionHit {
                is_colliding: true,
                volume_id: Some(volume.id.clone()),
                is_critical: volume.is_critical,
            };
        }
    }
    CollisionHit::none()
}

// =============================================================================
// Resection grid
// =============================================================================

/// Outcome of one resection call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResectionOutcome {
    /// Whether the touched cell is now removed.
    pub removed: bool,
    /// Index of the touched cell (`row * cols + col`), if in bounds.
    pub cell: Option<usize>,
    /// Total removed cells after this call, from a full-grid scan.
    pub removed_total: usize,
}

/// A destructible planar wall: `cols × rows` integrity cells.
///
/// Cells start at 1.0, are worn down by `resect`, and count as removed once
/// integrity drops to the removal threshold. Removal is one-way: integrity
/// never rises except through `reset`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResectionGrid {
    config: GridConfig,
    cells: Vec<f32>,
}

impl ResectionGrid {
    /// Creates a fully intact wall.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        let cells = vec![1.0; config.cols * config.rows];
        Self { config, cells }
    }

    /// The grid configuration.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Integrity of a cell, or `None` out of bounds.
    #[must_use]
    pub fn integrity(&self, cell: usize) -> Option<f32> {
        self.cells.get(cell).copied()
    }

    /// All cell integrities, row-major.
    #[must_use]
    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    /// Whether a cell is removed.
    #[must_use]
    pub fn is_removed(&self, cell: usize) -> bool {
        self.cells
            .get(cell)
            .is_some_and(|&i| i <= self.config.removal_threshold)
    }

    /// Count of removed cells.
    ///
    /// Always a full scan of the grid, never an incrementally maintained
    /// counter, so it matches the cell state even when calls arrive out of
    /// order.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&i| i <= self.config.removal_threshold)
            .count()
    }

    /// Restores every cell to full integrity (level restart).
    pub fn reset(&mut self) {
        self.cells.fill(1.0);
    }

    /// Maps the probe's planar coordinates to a cell index, or `None` when
    /// the probe is outside the wall or not finite.
    #[must_use]
    pub fn cell_at(&self, probe: Vec3) -> Option<usize> {
        if !probe.is_finite() {
            return None;
        }
        let local_x = probe.x - self.config.origin.x;
        let local_y = probe.y - self.config.origin.y;
        if local_x < 0.0 || local_y < 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let col = (local_x / self.config.cell_size) as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let row = (local_y / self.config.cell_size) as usize;
        if col >= self.config.cols || row >= self.config.rows {
            return None;
        }
        Some(row * self.config.cols + col)
    }

    /// Removes `amount` of integrity from the cell under the probe.
    ///
    /// Out-of-bounds and non-finite probes are a silent no-op, not an
    /// error: tool contact at the wall edge is expected every session.
    /// Integrity is floored at 0; non-finite or negative amounts are
    /// ignored so a bad tick cannot corrupt the wall.
    pub fn resect(&mut self, probe: Vec3, amount: f32) -> ResectionOutcome {
        let Some(cell) = self.cell_at(probe) else {
            return ResectionOutcome {
                removed: false,
                cell: None,
                removed_total: self.removed_count(),
            };
        };
        if amount.is_finite() && amount > 0.0 {
            self.cells[cell] = (self.cells[cell] - amount).max(0.0);
        }
        ResectionOutcome {
            removed: self.is_removed(cell),
            cell: Some(cell),
            removed_total: self.removed_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn volumes() -> Vec<CollidableVolume> {
        vec![
            CollidableVolume {
                id: "sphenoid-septum".into(),
                center: Vec3::new(0.0, 0.0, 3.0),
                radius: 0.5,
                is_critical: false,
            },
            CollidableVolume {
                id: "left-carotid-bulge".into(),
                center: Vec3::new(-1.0, 0.0, 4.0),
                radius: 0.6,
                is_critical: true,
            },
        ]
    }

    mod collision_tests {
        use super::*;

        #[test]
        fn probe_inside_sphere_collides() {
            let hit = check_collision(Vec3::new(0.1, 0.0, 3.0), &volumes());
            assert!(hit.is_colliding);
            assert_eq!(hit.volume_id.as_deref(), Some("sphenoid-septum"));
            assert!(!hit.is_critical);
        }

        #[test]
        fn probe_outside_all_spheres_is_clear() {
            let hit = check_collision(Vec3::new(5.0, 5.0, 5.0), &volumes());
            assert_eq!(hit, CollisionHit::none());
        }

        #[test]
        fn boundary_is_exclusive() {
            // Exactly on the surface does not count as contained.
            let hit = check_collision(Vec3::new(0.5, 0.0, 3.0), &volumes());
            assert!(!hit.is_colliding);
        }

        #[test]
        fn first_volume_in_order_wins() {
            let overlapping = vec![
                CollidableVolume {
                    id: "a".into(),
                    center: Vec3::ZERO,
                    radius: 1.0,
                    is_critical: false,
                },
                CollidableVolume {
                    id: "b".into(),
                    center: Vec3::ZERO,
                    radius: 2.0,
                    is_critical: true,
                },
            ];
            let hit = check_collision(Vec3::new(0.1, 0.0, 0.0), &overlapping);
            assert_eq!(hit.volume_id.as_deref(), Some("a"));
        }

        #[test]
        fn critical_volume_is_flagged() {
            let hit = check_collision(Vec3::new(-1.0, 0.1, 4.0), &volumes());
            assert!(hit.is_critical);
        }

        #[test]
        fn non_finite_probe_never_collides() {
            let hit = check_collision(Vec3::new(f32::NAN, 0.0, 3.0), &volumes());
            assert_eq!(hit, CollisionHit::none());
        }
    }

    mod resection_tests {
        use super::*;

        fn grid() -> ResectionGrid {
            ResectionGrid::new(GridConfig::default())
        }

        /// Center of cell (col, row) for the default config.
        fn cell_center(col: usize, row: usize) -> Vec3 {
            let config = GridConfig::default();
            Vec3::new(
                config.origin.x + (col as f32 + 0.5) * config.cell_size,
                config.origin.y + (row as f32 + 0.5) * config.cell_size,
                0.0,
            )
        }

        #[test]
        fn new_grid_is_fully_intact() {
            let grid = grid();
            assert_eq!(grid.cells().len(), 100);
            assert!(grid.cells().iter().all(|&i| (i - 1.0).abs() < f32::EPSILON));
            assert_eq!(grid.removed_count(), 0);
        }

        #[test]
        fn five_resections_of_point_three_remove_a_cell() {
            let mut grid = grid();
            let probe = cell_center(4, 4);
            let mut outcome = None;
            for _ in 0..5 {
                outcome = Some(grid.resect(probe, 0.3));
            }
            let outcome = outcome.unwrap();
            assert!(outcome.removed);
            assert_eq!(outcome.removed_total, 1);
            assert_eq!(grid.integrity(outcome.cell.unwrap()), Some(0.0));
        }

        #[test]
        fn integrity_never_leaves_unit_interval() {
            let mut grid = grid();
            let probe = cell_center(0, 0);
            for _ in 0..50 {
                grid.resect(probe, 0.4);
            }
            assert!(grid.cells().iter().all(|&i| (0.0..=1.0).contains(&i)));
        }

        #[test]
        fn removal_is_one_way() {
            let mut grid = grid();
            let probe = cell_center(2, 3);
            for _ in 0..4 {
                grid.resect(probe, 0.3);
            }
            let cell = grid.cell_at(probe).unwrap();
            assert!(grid.is_removed(cell));
            // Further zero-amount contact must not resurrect the cell.
            let outcome = grid.resect(probe, 0.0);
            assert!(outcome.removed);
        }

        #[test]
        fn out_of_bounds_is_a_no_op() {
            let mut grid = grid();
            let before = grid.cells().to_vec();
            let outcome = grid.resect(Vec3::new(100.0, 100.0, 0.0), 0.5);
            assert_eq!(outcome.cell, None);
            assert!(!outcome.removed);
            assert_eq!(grid.cells(), &before[..]);
        }

        #[test]
        fn non_finite_probe_does_not_corrupt_grid() {
            let mut grid = grid();
            let before = grid.cells().to_vec();
            grid.resect(Vec3::new(f32::NAN, 0.0, 0.0), 0.5);
            grid.resect(Vec3::new(0.0, f32::INFINITY, 0.0), 0.5);
            assert_eq!(grid.cells(), &before[..]);
        }

        #[test]
        fn non_finite_amount_is_ignored() {
            let mut grid = grid();
            let probe = cell_center(1, 1);
            let outcome = grid.resect(probe, f32::NAN);
            assert_eq!(grid.integrity(outcome.cell.unwrap()), Some(1.0));
        }

        #[test]
        fn reset_restores_full_integrity() {
            let mut grid = grid();
            let probe = cell_center(5, 5);
            for _ in 0..5 {
                grid.resect(probe, 0.3);
            }
            assert_eq!(grid.removed_count(), 1);
            grid.reset();
            assert_eq!(grid.removed_count(), 0);
            assert!(grid.cells().iter().all(|&i| (i - 1.0).abs() < f32::EPSILON));
        }

        #[test]
        fn removed_count_matches_state_after_interleaved_calls() {
            let mut grid = grid();
            for col in 0..3 {
                for _ in 0..5 {
                    grid.resect(cell_center(col, 0), 0.3);
                }
            }
            assert_eq!(grid.removed_count(), 3);
            assert_eq!(
                grid.cells()
                    .iter()
                    .filter(|&&i| i <= grid.config().removal_threshold)
                    .count(),
                3
            );
        }

        proptest! {
            #[test]
            fn integrity_bounds_hold_under_arbitrary_resection(
                amounts in proptest::collection::vec(-1.0f32..2.0, 1..60),
                col in 0usize..10,
                row in 0usize..10,
            ) {
                let mut grid = grid();
                let probe = cell_center(col, row);
                for amount in amounts {
                    grid.resect(probe, amount);
                }
                prop_assert!(grid.cells().iter().all(|&i| (0.0..=1.0).contains(&i)));
            }
        }
    }
}
