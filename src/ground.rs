//! Wander area and ground probing.
//!
//! The wander area is an axis-aligned volume that bounds the random
//! destinations idle units pick. Destinations are validated by probing
//! straight down from the top of the area for a ground contact; the probe
//! itself is an opaque service behind the [`GroundProbe`] trait so tests and
//! hosts can supply their own terrain source.

use crate::components::Position;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Full size of a volume along each axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Extents {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Axis-aligned volume bounding random wander destinations.
///
/// Read-only after creation; inserted as a resource, so at most one is
/// active in the simulation. Without one, idle units hold position.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WanderArea {
    pub center: Position,
    pub extents: Extents,
}

impl WanderArea {
    pub fn new(center: Position, extents: Extents) -> Self {
        Self { center, extents }
    }

    /// Top plane of the area; wander probes are cast down from here.
    pub fn top(&self) -> f32 {
        self.center.y + self.extents.y / 2.0
    }

    /// Whether a horizontal coordinate lies inside the area footprint.
    pub fn contains_horizontal(&self, x: f32, z: f32) -> bool {
        (x - self.center.x).abs() <= self.extents.x / 2.0
            && (z - self.center.z).abs() <= self.extents.z / 2.0
    }
}

/// Opaque terrain-height service.
///
/// `probe_down` casts a vertical ray from `(x, from_y, z)` downward for at
/// most `max_dist` world units and reports the highest ground contact, if
/// any. A miss means there is no walkable ground below the sample point.
pub trait GroundProbe: Send + Sync {
    fn probe_down(&self, x: f32, z: f32, from_y: f32, max_dist: f32) -> Option<Position>;
}

/// Shared handle to the active ground probe.
#[derive(Resource, Clone)]
pub struct GroundHandle(Arc<dyn GroundProbe>);

impl GroundHandle {
    pub fn new(probe: impl GroundProbe + 'static) -> Self {
        Self(Arc::new(probe))
    }

    pub fn probe_down(&self, x: f32, z: f32, from_y: f32, max_dist: f32) -> Option<Position> {
        self.0.probe_down(x, z, from_y, max_dist)
    }
}

/// Infinite flat ground at a fixed height.
#[derive(Debug, Clone, Copy)]
pub struct FlatGround {
    pub height: f32,
}

impl FlatGround {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl GroundProbe for FlatGround {
    fn probe_down(&self, x: f32, z: f32, from_y: f32, max_dist: f32) -> Option<Position> {
        if self.height <= from_y && from_y - self.height <= max_dist {
            Some(Position::new(x, self.height, z))
        } else {
            None
        }
    }
}

/// Grid-based heightfield. Probes outside the grid miss, which lets maps
/// have holes or edges units refuse to wander onto.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeightField {
    /// Grid width in cells (x axis).
    pub width: usize,
    /// Grid depth in cells (z axis).
    pub depth: usize,
    /// Size of each cell in world units.
    pub cell_size: f32,
    /// World position of cell (0, 0).
    pub origin_x: f32,
    pub origin_z: f32,
    /// Heights, row-major over (x, z).
    pub heights: Vec<f32>,
}

impl HeightField {
    /// Create a flat heightfield of `width` x `depth` cells.
    pub fn new_flat(width: usize, depth: usize, cell_size: f32, height: f32) -> Self {
        let half_w = width as f32 * cell_size / 2.0;
        let half_d = depth as f32 * cell_size / 2.0;
        Self {
            width,
            depth,
            cell_size,
            origin_x: -half_w,
            origin_z: -half_d,
            heights: vec![height; width * depth],
        }
    }

    fn cell_index(&self, x: f32, z: f32) -> Option<usize> {
        let cx = ((x - self.origin_x) / self.cell_size).floor();
        let cz = ((z - self.origin_z) / self.cell_size).floor();
        if cx < 0.0 || cz < 0.0 {
            return None;
        }
        let (cx, cz) = (cx as usize, cz as usize);
        if cx >= self.width || cz >= self.depth {
            return None;
        }
        Some(cz * self.width + cx)
    }

    /// Ground height at a horizontal coordinate, `None` outside the grid.
    pub fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.cell_index(x, z).map(|i| self.heights[i])
    }

    pub fn set_height(&mut self, x: f32, z: f32, height: f32) {
        if let Some(i) = self.cell_index(x, z) {
            self.heights[i] = height;
        }
    }
}

impl GroundProbe for HeightField {
    fn probe_down(&self, x: f32, z: f32, from_y: f32, max_dist: f32) -> Option<Position> {
        let height = self.height_at(x, z)?;
        if height <= from_y && from_y - height <= max_dist {
            Some(Position::new(x, height, z))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wander_area_bounds() {
        let area = WanderArea::new(
            Position::new(10.0, 2.0, -10.0),
            Extents::new(20.0, 8.0, 40.0),
        );
        assert_eq!(area.top(), 6.0);
        assert!(area.contains_horizontal(10.0, -10.0));
        assert!(area.contains_horizontal(0.0, 10.0));
        assert!(!area.contains_horizontal(21.0, -10.0));
        assert!(!area.contains_horizontal(10.0, 11.0));
    }

    #[test]
    fn test_flat_ground_probe() {
        let ground = FlatGround::new(1.0);
        let hit = ground.probe_down(3.0, 4.0, 10.0, 20.0).unwrap();
        assert_eq!(hit, Position::new(3.0, 1.0, 4.0));

        // Ray too short to reach the ground
        assert!(ground.probe_down(3.0, 4.0, 10.0, 5.0).is_none());
        // Ground above the ray origin
        assert!(ground.probe_down(3.0, 4.0, -2.0, 20.0).is_none());
    }

    #[test]
    fn test_heightfield_probe_and_bounds() {
        let mut field = HeightField::new_flat(10, 10, 2.0, 0.0);
        field.set_height(5.0, 5.0, 3.0);

        let hit = field.probe_down(5.0, 5.0, 10.0, 20.0).unwrap();
        assert_eq!(hit.y, 3.0);

        let flat = field.probe_down(-5.0, -5.0, 10.0, 20.0).unwrap();
        assert_eq!(flat.y, 0.0);

        // Outside the grid there is no ground
        assert!(field.probe_down(100.0, 0.0, 10.0, 20.0).is_none());
    }

    #[test]
    fn test_ground_handle_dispatch() {
        let handle = GroundHandle::new(FlatGround::new(0.0));
        assert!(handle.probe_down(0.0, 0.0, 5.0, 10.0).is_some());
    }
}
