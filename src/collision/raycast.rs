//! Ray casting against the map's edge set.
//!
//! Every query walks the stored segment slice once and keeps the nearest
//! intersection; nothing is allocated per call. This runs every step for the
//! player's aim ray and for each active enemy's sight checks.

use glam::Vec2;

use crate::constants::{CORNER_SAMPLE_FRACTION, CORNER_TOLERANCE, PARALLEL_EPSILON};
use crate::geometry::{cross, direction_from_angle, Segment};
use crate::grid::OccupancyGrid;

/// Nearest obstruction found by a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    pub distance: f32,
}

/// Result of a cast: `None` means nothing within the ray's length.
pub type HitResult = Option<RayHit>;

/// Intersection of segment `p -> p + r` with segment `q -> q + s`.
///
/// Returns the parameters along both segments, or `None` when the
/// segments miss or are (nearly) parallel. The parallel test compares the
/// sine of the angle between them, so it does not depend on segment length.
#[inline]
fn segment_intersection(p: Vec2, r: Vec2, q: Vec2, s: Vec2) -> Option<(f32, f32)> {
    let denom = cross(r, s);
    let scale = r.length_squared() * s.length_squared();
    if denom * denom <= PARALLEL_EPSILON * PARALLEL_EPSILON * scale {
        return None;
    }
    let qp = q - p;
    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

/// Tile grid the edges were built from, used to settle hits on tile corners.
#[derive(Debug, Clone, Copy)]
struct CornerGrid<'a> {
    grid: &'a OccupancyGrid,
    tile_size: f32,
}

impl CornerGrid<'_> {
    /// Whether a ray heading along `dir` through the tile corner `corner`
    /// is stopped there.
    ///
    /// The ray is stopped if the tile it enters is blocked. A diagonal ray
    /// is also stopped when both tiles beside its path are blocked. An
    /// axis-aligned ray runs between two tiles and is stopped only if both
    /// are blocked.
    fn blocks(&self, corner: Vec2, dir: Vec2) -> bool {
        let step = self.tile_size * CORNER_SAMPLE_FRACTION;
        let blocked = |sx: f32, sy: f32| {
            let p = corner + Vec2::new(sx, sy) * step;
            self.grid.is_blocked(
                (p.x / self.tile_size).floor() as i32,
                (p.y / self.tile_size).floor() as i32,
            )
        };
        let sign = |v: f32| if v.abs() <= PARALLEL_EPSILON { 0.0 } else { v.signum() };
        let (sx, sy) = (sign(dir.x), sign(dir.y));

        match (sx == 0.0, sy == 0.0) {
            (true, true) => true,
            (false, true) => blocked(sx, 1.0) && blocked(sx, -1.0),
            (true, false) => blocked(1.0, sy) && blocked(-1.0, sy),
            (false, false) => blocked(sx, sy) || (blocked(sx, -sy) && blocked(-sx, sy)),
        }
    }
}

/// Casts rays against a borrowed edge set.
///
/// Without a grid every touch of an edge counts, end points included. With
/// the grid the edges came from, a ray that only grazes a convex wall corner
/// passes it.
#[derive(Debug, Clone, Copy)]
pub struct RayCaster<'a> {
    edges: &'a [Segment],
    corners: Option<CornerGrid<'a>>,
}

impl<'a> RayCaster<'a> {
    pub fn new(edges: &'a [Segment]) -> Self {
        Self {
            edges,
            corners: None,
        }
    }

    /// Caster over edges built from `grid` at `tile_size`.
    pub fn with_grid(edges: &'a [Segment], grid: &'a OccupancyGrid, tile_size: f32) -> Self {
        Self {
            edges,
            corners: Some(CornerGrid { grid, tile_size }),
        }
    }

    /// Cast from `origin` at `angle` (radians) up to `max_length`.
    pub fn cast(&self, origin: Vec2, angle: f32, max_length: f32) -> HitResult {
        if max_length <= 0.0 {
            return None;
        }
        let end = origin + direction_from_angle(angle) * max_length;
        self.cast_segment(origin, end)
    }

    /// Nearest intersection along the segment `from -> to`.
    pub fn cast_segment(&self, from: Vec2, to: Vec2) -> HitResult {
        puffin::profile_function!();

        let r = to - from;
        let length = r.length();
        if length == 0.0 {
            return None;
        }

        let mut nearest_t = f32::INFINITY;
        for edge in self.edges {
            let s = edge.end - edge.start;
            let Some((t, u)) = segment_intersection(from, r, edge.start, s) else {
                continue;
            };
            if t >= nearest_t || self.grazes_corner(edge, u * s.length(), r / length) {
                continue;
            }
            nearest_t = t;
        }

        if nearest_t.is_finite() {
            Some(RayHit {
                point: from + r * nearest_t,
                distance: nearest_t * length,
            })
        } else {
            None
        }
    }

    /// Whether a hit `along` world units into `edge` touches one of its end
    /// points without the ray being stopped there.
    fn grazes_corner(&self, edge: &Segment, along: f32, dir: Vec2) -> bool {
        let Some(corners) = self.corners else {
            return false;
        };
        let corner = if along <= CORNER_TOLERANCE {
            edge.start
        } else if edge.length() - along <= CORNER_TOLERANCE {
            edge.end
        } else {
            return false;
        };
        !corners.blocks(corner, dir)
    }

    /// Whether the segment `from -> to` crosses no edge.
    pub fn is_clear(&self, from: Vec2, to: Vec2) -> bool {
        self.cast_segment(from, to).is_none()
    }
}
