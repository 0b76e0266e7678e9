//! Collision map: merged occupancy layers, boundary edges, and the queries
//! movement, aiming and AI run against them.
//!
//! Build order per map load is `add_layer`* → `generate_common_map` →
//! `build_edges`. Queries never mutate; rebuilding means running the three
//! steps again.

pub mod edges;
pub mod raycast;

use glam::Vec2;

use crate::error::CollisionError;
use crate::geometry::{Rect, Segment};
use crate::grid::OccupancyGrid;
use crate::logging::LogContext;

pub use raycast::{HitResult, RayCaster, RayHit};

pub struct CollisionMap {
    tile_size: f32,
    /// Registered layers in insertion order
    layers: Vec<(String, OccupancyGrid)>,
    common: OccupancyGrid,
    edges: Vec<Segment>,
    log: LogContext,
}

impl CollisionMap {
    pub fn new(tile_size: f32, log: LogContext) -> Self {
        Self {
            tile_size,
            layers: Vec::new(),
            common: OccupancyGrid::default(),
            edges: Vec::new(),
            log,
        }
    }

    /// Register a named occupancy layer. Re-using an id replaces that layer.
    ///
    /// Every layer must match the dimensions of the layers already registered.
    pub fn add_layer(
        &mut self,
        grid: OccupancyGrid,
        layer_id: impl Into<String>,
    ) -> Result<(), CollisionError> {
        let layer_id = layer_id.into();
        if let Some((_, other)) = self.layers.iter().find(|(id, _)| *id != layer_id) {
            if (other.width, other.height) != (grid.width, grid.height) {
                return Err(CollisionError::LayerSizeMismatch {
                    layer: layer_id,
                    want_w: other.width,
                    want_h: other.height,
                    got_w: grid.width,
                    got_h: grid.height,
                });
            }
        }

        log::debug!(
            target: self.log.target(),
            "layer `{}`: {}x{}, {} blocked",
            layer_id,
            grid.width,
            grid.height,
            grid.blocked_count()
        );

        match self.layers.iter_mut().find(|(id, _)| *id == layer_id) {
            Some((_, existing)) => *existing = grid,
            None => self.layers.push((layer_id, grid)),
        }
        Ok(())
    }

    /// OR every registered layer into the common map.
    pub fn generate_common_map(&mut self) {
        let Some((_, first)) = self.layers.first() else {
            self.common = OccupancyGrid::default();
            return;
        };

        let mut common = OccupancyGrid::new(first.width, first.height);
        for (_, layer) in &self.layers {
            common.merge_from(layer);
        }
        self.common = common;
    }

    /// Rebuild the edge set from the common map.
    pub fn build_edges(&mut self) {
        self.edges = edges::build_edges(&self.common, self.tile_size);
        log::info!(
            target: self.log.target(),
            "collision map {}x{} built: {} edges",
            self.common.width,
            self.common.height,
            self.edges.len()
        );
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn common_map(&self) -> &OccupancyGrid {
        &self.common
    }

    pub fn edges(&self) -> &[Segment] {
        &self.edges
    }

    /// Tile coordinate containing a world point.
    pub fn tile_at(&self, point: Vec2) -> (i32, i32) {
        (
            (point.x / self.tile_size).floor() as i32,
            (point.y / self.tile_size).floor() as i32,
        )
    }

    /// World-space centre of a tile.
    pub fn tile_center(&self, tile: (i32, i32)) -> Vec2 {
        (Vec2::new(tile.0 as f32, tile.1 as f32) + 0.5) * self.tile_size
    }

    /// Whether a tile is blocked in the common map. Out of range is free.
    pub fn is_blocked(&self, tile: (i32, i32)) -> bool {
        self.common.is_blocked(tile.0, tile.1)
    }

    pub fn is_blocked_at(&self, point: Vec2) -> bool {
        self.is_blocked(self.tile_at(point))
    }

    /// Whether a world-space rectangle overlaps any blocked tile.
    ///
    /// Touching a tile's border is not an overlap.
    pub fn box_overlaps_blocked(&self, rect: Rect) -> bool {
        let min = rect.min() / self.tile_size;
        let max = rect.max() / self.tile_size;
        let (x0, y0) = (min.x.floor() as i32, min.y.floor() as i32);
        let (x1, y1) = (max.x.ceil() as i32 - 1, max.y.ceil() as i32 - 1);

        (y0..=y1).any(|y| (x0..=x1).any(|x| self.common.is_blocked(x, y)))
    }

    /// Caster over this map's edges. Grazing a wall corner does not block.
    pub fn ray_caster(&self) -> RayCaster<'_> {
        RayCaster::with_grid(&self.edges, &self.common, self.tile_size)
    }

    /// Full cast result (point and distance).
    pub fn cast(&self, origin: Vec2, angle: f32, max_length: f32) -> HitResult {
        self.ray_caster().cast(origin, angle, max_length)
    }

    /// Nearest hit point of a ray, if any edge lies within `max_length`.
    pub fn ray_hit(&self, origin: Vec2, angle: f32, max_length: f32) -> Option<Vec2> {
        self.cast(origin, angle, max_length).map(|hit| hit.point)
    }

    /// Whether the straight line between two points crosses no edge.
    pub fn has_line_of_sight(&self, from: Vec2, to: Vec2) -> bool {
        self.ray_caster().is_clear(from, to)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Build a ready-to-query map from text rows.
    pub(crate) fn map_from_rows(rows: &[&str], tile_size: f32) -> CollisionMap {
        let mut map = CollisionMap::new(tile_size, LogContext::new("test"));
        map.add_layer(OccupancyGrid::from_rows(rows), "walls")
            .expect("single layer");
        map.generate_common_map();
        map.build_edges();
        map
    }

    #[test]
    fn test_layers_are_or_merged() {
        let mut map = CollisionMap::new(16.0, LogContext::new("test"));
        map.add_layer(OccupancyGrid::from_rows(&["#..", "..."]), "walls").unwrap();
        map.add_layer(OccupancyGrid::from_rows(&["...", "..#"]), "props").unwrap();
        map.generate_common_map();

        assert!(map.is_blocked((0, 0)));
        assert!(map.is_blocked((2, 1)));
        assert!(!map.is_blocked((1, 0)));
        assert_eq!(map.common_map().blocked_count(), 2);
    }

    #[test]
    fn test_layer_size_mismatch_is_rejected() {
        let mut map = CollisionMap::new(16.0, LogContext::new("test"));
        map.add_layer(OccupancyGrid::new(4, 4), "walls").unwrap();
        let err = map.add_layer(OccupancyGrid::new(3, 4), "props").unwrap_err();
        assert!(matches!(err, CollisionError::LayerSizeMismatch { got_w: 3, .. }));

        // Replacing the only layer may change size
        let mut single = CollisionMap::new(16.0, LogContext::new("test"));
        single.add_layer(OccupancyGrid::new(4, 4), "walls").unwrap();
        assert!(single.add_layer(OccupancyGrid::new(2, 2), "walls").is_ok());
    }

    #[test]
    fn test_empty_map_never_blocks() {
        let mut map = CollisionMap::new(16.0, LogContext::new("test"));
        map.generate_common_map();
        map.build_edges();
        assert!(map.edges().is_empty());
        assert!(!map.is_blocked((0, 0)));
        assert!(!map.box_overlaps_blocked(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert_eq!(map.ray_hit(Vec2::ZERO, 1.0, 500.0), None);
    }

    #[test]
    fn test_all_free_grid_has_no_hits() {
        let map = map_from_rows(&["....", "....", "...."], 16.0);
        assert!(map.edges().is_empty());
        for i in 0..16 {
            let angle = i as f32 * std::f32::consts::TAU / 16.0;
            assert_eq!(map.ray_hit(Vec2::new(32.0, 24.0), angle, 1000.0), None);
        }
    }

    #[test]
    fn test_out_of_range_tiles_are_free() {
        let map = map_from_rows(&["##", "##"], 16.0);
        assert!(!map.is_blocked((-1, -1)));
        assert!(!map.is_blocked((2, 0)));
        assert!(!map.is_blocked_at(Vec2::new(-5.0, 5.0)));
        assert!(map.is_blocked_at(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn test_box_overlap_boundaries() {
        let map = map_from_rows(&["...", ".#.", "..."], 16.0);

        // Fully inside the blocked tile
        assert!(map.box_overlaps_blocked(Rect::new(18.0, 18.0, 4.0, 4.0)));
        // Touching the blocked tile's left border from outside
        assert!(!map.box_overlaps_blocked(Rect::new(8.0, 18.0, 8.0, 4.0)));
        // One unit past the border
        assert!(map.box_overlaps_blocked(Rect::new(9.0, 18.0, 8.0, 4.0)));
        // Spanning over the blocked tile from free tiles
        assert!(map.box_overlaps_blocked(Rect::new(0.0, 0.0, 48.0, 48.0)));
        // Outside the map entirely
        assert!(!map.box_overlaps_blocked(Rect::new(-40.0, -40.0, 20.0, 20.0)));
    }

    #[test]
    fn test_ray_hit_through_map() {
        // Wall column at x=3
        let map = map_from_rows(&["...#", "...#", "...#"], 10.0);
        let hit = map.ray_hit(Vec2::new(5.0, 15.0), 0.0, 100.0).expect("wall");
        assert_relative_eq!(hit.x, 30.0, epsilon = 1e-4);
        assert_relative_eq!(hit.y, 15.0, epsilon = 1e-4);
        assert!(map.has_line_of_sight(Vec2::new(5.0, 5.0), Vec2::new(25.0, 25.0)));
        assert!(!map.has_line_of_sight(Vec2::new(5.0, 5.0), Vec2::new(45.0, 5.0)));
    }

    #[test]
    fn test_sight_passes_wall_corner_but_not_diagonal_pinch() {
        // Column with a free row on top: looking over the corner is fine
        let wall = map_from_rows(&["...", ".#.", ".#."], 16.0);
        assert!(wall.has_line_of_sight(Vec2::new(0.0, 32.0), Vec2::new(32.0, 0.0)));
        assert!(!wall.has_line_of_sight(Vec2::new(8.0, 40.0), Vec2::new(40.0, 40.0)));

        // Two tiles meeting at a corner seal the diagonal between them
        let pinch = map_from_rows(&["#.", ".#"], 16.0);
        assert!(!pinch.has_line_of_sight(Vec2::new(24.0, 8.0), Vec2::new(8.0, 24.0)));
    }
}
