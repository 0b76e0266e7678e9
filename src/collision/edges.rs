//! Tile map to edge conversion.
//!
//! Walks the grid once, row-major, and emits a boundary segment for every
//! side of a blocked tile that faces a free tile (or the outside of the map).
//! A side that continues a segment already started by the tile to the west
//! (for north/south sides) or to the north (for west/east sides) extends that
//! segment instead of starting a new one, so a solid rectangle of any size
//! ends up as exactly four segments and interiors produce none.

use glam::Vec2;

use crate::geometry::Segment;
use crate::grid::OccupancyGrid;

const NORTH: usize = 0;
const SOUTH: usize = 1;
const EAST: usize = 2;
const WEST: usize = 3;

/// Convert an occupancy grid into merged boundary segments.
///
/// An empty grid yields an empty set.
pub fn build_edges(grid: &OccupancyGrid, tile_size: f32) -> Vec<Segment> {
    puffin::profile_function!();

    let mut edges: Vec<Segment> = Vec::new();
    if grid.is_empty() {
        return edges;
    }

    let w = grid.width;
    // For each tile, which segment (if any) runs along each of its sides
    let mut cell_edges: Vec<[Option<usize>; 4]> = vec![[None; 4]; w * grid.height];

    for y in 0..grid.height as i32 {
        for x in 0..w as i32 {
            if !grid.is_blocked(x, y) {
                continue;
            }

            let i = y as usize * w + x as usize;
            let left = x as f32 * tile_size;
            let right = (x + 1) as f32 * tile_size;
            let top = y as f32 * tile_size;
            let bottom = (y + 1) as f32 * tile_size;

            // Vertical sides continue from the tile above
            let north_cell = if y > 0 { Some(i - w) } else { None };
            for (side, neighbour_x, edge_x) in [(WEST, x - 1, left), (EAST, x + 1, right)] {
                if grid.is_blocked(neighbour_x, y) {
                    continue;
                }
                let continued = north_cell.and_then(|n| cell_edges[n][side]);
                cell_edges[i][side] = Some(match continued {
                    Some(e) => {
                        edges[e].end.y = bottom;
                        e
                    }
                    None => {
                        edges.push(Segment::new(Vec2::new(edge_x, top), Vec2::new(edge_x, bottom)));
                        edges.len() - 1
                    }
                });
            }

            // Horizontal sides continue from the tile to the left
            let west_cell = if x > 0 { Some(i - 1) } else { None };
            for (side, neighbour_y, edge_y) in [(NORTH, y - 1, top), (SOUTH, y + 1, bottom)] {
                if grid.is_blocked(x, neighbour_y) {
                    continue;
                }
                let continued = west_cell.and_then(|n| cell_edges[n][side]);
                cell_edges[i][side] = Some(match continued {
                    Some(e) => {
                        edges[e].end.x = right;
                        e
                    }
                    None => {
                        edges.push(Segment::new(Vec2::new(left, edge_y), Vec2::new(right, edge_y)));
                        edges.len() - 1
                    }
                });
            }
        }
    }

    edges
}
