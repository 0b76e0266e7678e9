use std::cmp::Ordering;
use std::collections::BinaryHeap;

use glam::Vec2;

use crate::collision::CollisionMap;
use crate::logging::LogContext;

/// Costs closer than this are considered equal when breaking ties.
const COST_EPSILON: f32 = 1e-4;

/// A walkable route: `[start, waypoints.., goal]` in world space.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub points: Vec<Vec2>,
    /// Total Euclidean length
    pub cost: f32,
}

impl Path {
    fn from_points(points: Vec<Vec2>) -> Self {
        let cost = points.windows(2).map(|w| w[0].distance(w[1])).sum();
        Self { points, cost }
    }

    pub fn goal(&self) -> Option<Vec2> {
        self.points.last().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Outcome of a path query. `NoPath` is a normal result the caller must handle.
#[derive(Debug, Clone, PartialEq)]
pub enum PathResult {
    Found(Path),
    NoPath,
}

impl PathResult {
    pub fn is_found(&self) -> bool {
        matches!(self, PathResult::Found(_))
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            PathResult::Found(path) => Some(path),
            PathResult::NoPath => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct ScoredNode {
    node: usize,
    g_score: f32,
    f_score: f32, // g_score + heuristic
}

impl Eq for ScoredNode {}

// BinaryHeap is a max-heap, so we reverse the ordering for min-heap behavior.
// Equal scores pop the lower node index first.
impl Ord for ScoredNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f_score
            .partial_cmp(&self.f_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Navigation nodes with line-of-sight adjacency computed once at load.
///
/// Read-only after construction; rebuild it whenever the collision map is rebuilt.
pub struct WaypointGraph {
    nodes: Vec<Vec2>,
    /// For each node, (neighbour index, distance), ascending by index
    adjacency: Vec<Vec<(usize, f32)>>,
    log: LogContext,
}

impl WaypointGraph {
    /// Connect every pair of nodes that can see each other.
    pub fn build(nodes: Vec<Vec2>, map: &CollisionMap, log: LogContext) -> Self {
        puffin::profile_function!();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                if map.has_line_of_sight(nodes[i], nodes[j]) {
                    let d = nodes[i].distance(nodes[j]);
                    adjacency[i].push((j, d));
                    adjacency[j].push((i, d));
                }
            }
        }
        for neighbours in &mut adjacency {
            neighbours.sort_by_key(|&(n, _)| n);
        }

        let links: usize = adjacency.iter().map(Vec::len).sum::<usize>() / 2;
        log::info!(
            target: log.target(),
            "waypoint graph: {} nodes, {} links",
            nodes.len(),
            links
        );

        Self {
            nodes,
            adjacency,
            log,
        }
    }

    /// Build from tile coordinates; each waypoint sits at its tile's centre.
    pub fn from_tiles(tiles: &[(i32, i32)], map: &CollisionMap, log: LogContext) -> Self {
        let nodes = tiles.iter().map(|&t| map.tile_center(t)).collect();
        Self::build(nodes, map, log)
    }

    pub fn nodes(&self) -> &[Vec2] {
        &self.nodes
    }

    pub fn neighbours(&self, node: usize) -> &[(usize, f32)] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Closest node with a clear line to `point`; ties go to the lower index.
    fn nearest_visible(&self, map: &CollisionMap, point: Vec2) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (i, &node) in self.nodes.iter().enumerate() {
            let d = node.distance_squared(point);
            if best.map_or(true, |(_, bd)| d < bd) && map.has_line_of_sight(point, node) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Find a walkable route from `start` to `goal`.
    ///
    /// Mutually visible endpoints get the direct two-point path without
    /// touching the graph; otherwise the route runs through the nearest
    /// visible waypoints of each end using A* with a Euclidean heuristic.
    pub fn find_path(&self, map: &CollisionMap, start: Vec2, goal: Vec2) -> PathResult {
        puffin::profile_function!();

        if start == goal {
            return PathResult::Found(Path {
                points: vec![start],
                cost: 0.0,
            });
        }

        if map.has_line_of_sight(start, goal) {
            return PathResult::Found(Path::from_points(vec![start, goal]));
        }

        let (Some(start_node), Some(goal_node)) = (
            self.nearest_visible(map, start),
            self.nearest_visible(map, goal),
        ) else {
            log::debug!(target: self.log.target(), "no waypoint visible from {start} or {goal}");
            return PathResult::NoPath;
        };

        let Some(route) = self.search(start_node, goal_node) else {
            log::debug!(
                target: self.log.target(),
                "waypoints {start_node} and {goal_node} are not connected"
            );
            return PathResult::NoPath;
        };

        let mut points = Vec::with_capacity(route.len() + 2);
        points.push(start);
        for node in route {
            let p = self.nodes[node];
            if points.last() != Some(&p) {
                points.push(p);
            }
        }
        if points.last() != Some(&goal) {
            points.push(goal);
        }

        PathResult::Found(Path::from_points(points))
    }

    /// A* over node indices. Returns the node sequence including both ends.
    fn search(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        let goal_pos = self.nodes[goal];
        let heuristic = |n: usize| self.nodes[n].distance(goal_pos);

        let mut open_set = BinaryHeap::new();
        let mut came_from: Vec<Option<usize>> = vec![None; self.nodes.len()];
        let mut g_score = vec![f32::INFINITY; self.nodes.len()];

        g_score[start] = 0.0;
        open_set.push(ScoredNode {
            node: start,
            g_score: 0.0,
            f_score: heuristic(start),
        });

        while let Some(current) = open_set.pop() {
            if current.node == goal {
                return Some(reconstruct_path(&came_from, goal));
            }

            // Stale heap entry
            if current.g_score > g_score[current.node] + COST_EPSILON {
                continue;
            }

            for &(neighbour, weight) in &self.adjacency[current.node] {
                let tentative_g = current.g_score + weight;
                let neighbour_g = g_score[neighbour];

                let better = tentative_g < neighbour_g - COST_EPSILON;
                let tie_lower = (tentative_g - neighbour_g).abs() <= COST_EPSILON
                    && came_from[neighbour].map_or(false, |prev| current.node < prev);

                if better || tie_lower {
                    came_from[neighbour] = Some(current.node);
                    g_score[neighbour] = tentative_g;
                    open_set.push(ScoredNode {
                        node: neighbour,
                        g_score: tentative_g,
                        f_score: tentative_g + heuristic(neighbour),
                    });
                }
            }
        }

        None // No path found
    }
}

/// Reconstruct the node sequence from the came_from links
fn reconstruct_path(came_from: &[Option<usize>], mut current: usize) -> Vec<usize> {
    let mut path = vec![current];

    while let Some(prev) = came_from[current] {
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::tests::map_from_rows;
    use approx::assert_relative_eq;

    /// 10x10 map, tile size 16, wall on column 5 for rows 1..10 (row 0 is the gap).
    fn wall_with_gap_rows() -> Vec<String> {
        (0..10)
            .map(|y| if y == 0 { "..........".to_string() } else { ".....#....".to_string() })
            .collect()
    }

    fn map_from_strings(rows: &[String]) -> CollisionMap {
        let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
        map_from_rows(&refs, 16.0)
    }

    fn assert_walkable(map: &CollisionMap, path: &Path) {
        for w in path.points.windows(2) {
            assert!(
                map.has_line_of_sight(w[0], w[1]),
                "segment {:?} -> {:?} crosses a wall",
                w[0],
                w[1]
            );
        }
    }

    #[test]
    fn test_same_start_and_goal() {
        let map = map_from_strings(&wall_with_gap_rows());
        let graph = WaypointGraph::from_tiles(&[], &map, LogContext::new("test"));
        let a = Vec2::new(20.0, 20.0);

        let path = graph.find_path(&map, a, a).into_path().expect("trivial path");
        assert_eq!(path.points, vec![a]);
        assert_eq!(path.cost, 0.0);
    }

    #[test]
    fn test_visible_goal_is_direct() {
        let map = map_from_strings(&wall_with_gap_rows());
        // Waypoints exist but must not be used
        let graph = WaypointGraph::from_tiles(&[(0, 0), (2, 2)], &map, LogContext::new("test"));
        let a = Vec2::new(10.0, 100.0);
        let b = Vec2::new(60.0, 140.0);

        let path = graph.find_path(&map, a, b).into_path().expect("direct path");
        assert_eq!(path.points, vec![a, b]);
        assert_relative_eq!(path.cost, a.distance(b));
    }

    #[test]
    fn test_routes_through_gap_in_wall() {
        let map = map_from_strings(&wall_with_gap_rows());
        let tiles = [(0, 5), (9, 5), (5, 0), (9, 0)];
        let graph = WaypointGraph::from_tiles(&tiles, &map, LogContext::new("test"));

        let start = Vec2::new(0.0 * 16.0, 5.0 * 16.0);
        let goal = Vec2::new(9.0 * 16.0, 5.0 * 16.0);
        assert!(!map.has_line_of_sight(start, goal));

        let path = graph.find_path(&map, start, goal).into_path().expect("route via gap");
        assert!(path.len() > 2, "must not be a straight line");
        assert_eq!(path.points.first(), Some(&start));
        assert_eq!(path.goal(), Some(goal));
        // Crosses over the wall through row 0
        assert!(path.points.iter().any(|p| p.y < 16.0));
        assert!(path.cost > start.distance(goal));
        assert_walkable(&map, &path);
    }

    #[test]
    fn test_gap_waypoint_links_past_wall_corner() {
        let map = map_from_strings(&wall_with_gap_rows());
        let graph =
            WaypointGraph::from_tiles(&[(0, 5), (9, 5), (5, 0)], &map, LogContext::new("test"));

        // (8,88) -> (88,8) only touches the wall's top-left corner
        assert!(graph.neighbours(0).iter().any(|&(n, _)| n == 2));
        assert!(graph.neighbours(2).iter().any(|&(n, _)| n == 0));
        // (88,8) -> (152,88) cuts the wall's right face at (96,18)
        assert!(graph.neighbours(2).iter().all(|&(n, _)| n != 1));

        let start = Vec2::new(0.0 * 16.0, 5.0 * 16.0);
        let goal = Vec2::new(120.0, 24.0);
        assert!(!map.has_line_of_sight(start, goal));

        let path = graph.find_path(&map, start, goal).into_path().expect("route via gap");
        assert_eq!(
            path.points,
            vec![start, Vec2::new(8.0, 88.0), Vec2::new(88.0, 8.0), goal]
        );
        assert_walkable(&map, &path);
    }

    #[test]
    fn test_sealed_wall_has_no_path() {
        let rows: Vec<String> = (0..10).map(|_| ".....#....".to_string()).collect();
        let map = map_from_strings(&rows);
        let tiles = [(0, 5), (9, 5), (0, 0), (9, 0), (4, 9), (6, 9)];
        let graph = WaypointGraph::from_tiles(&tiles, &map, LogContext::new("test"));

        let result = graph.find_path(&map, Vec2::new(8.0, 80.0), Vec2::new(150.0, 80.0));
        assert_eq!(result, PathResult::NoPath);
    }

    #[test]
    fn test_no_visible_waypoint_is_no_path() {
        let map = map_from_strings(&wall_with_gap_rows());
        let graph = WaypointGraph::from_tiles(&[], &map, LogContext::new("test"));
        let result = graph.find_path(&map, Vec2::new(8.0, 80.0), Vec2::new(150.0, 80.0));
        assert!(!result.is_found());
    }

    #[test]
    fn test_adjacency_is_cached_by_sight() {
        let map = map_from_strings(&wall_with_gap_rows());
        let graph =
            WaypointGraph::from_tiles(&[(0, 5), (9, 5), (0, 0)], &map, LogContext::new("test"));
        // Across the wall: not linked
        assert!(graph.neighbours(0).iter().all(|&(n, _)| n != 1));
        // Same side: linked, weight is the distance
        let &(n, d) = graph.neighbours(0).first().expect("link to (0,0)");
        assert_eq!(n, 2);
        assert_relative_eq!(d, 80.0);
        assert!(graph.neighbours(99).is_empty());
    }

    #[test]
    fn test_equal_routes_prefer_lower_index() {
        // Block in the middle; symmetric detours above and below
        let map = map_from_rows(&[".....", ".....", "..#..", ".....", "....."], 10.0);
        let graph =
            WaypointGraph::from_tiles(&[(2, 4), (2, 0)], &map, LogContext::new("test"));
        let start = Vec2::new(5.0, 25.0);
        let goal = Vec2::new(45.0, 25.0);

        let first = graph.find_path(&map, start, goal).into_path().expect("path");
        assert_eq!(first.points[1], Vec2::new(25.0, 45.0));
        // Stable across calls
        assert_eq!(graph.find_path(&map, start, goal).into_path(), Some(first));
    }

    #[test]
    fn test_longer_route_through_graph() {
        // U-shaped corridor: start bottom-left, goal bottom-right, wall between
        let map = map_from_rows(
            &[
                "......",
                ".####.",
                ".#..#.",
                ".#..#.",
                "..##..",
            ],
            10.0,
        );
        let tiles = [(0, 0), (5, 0), (0, 4), (5, 4)];
        let graph = WaypointGraph::from_tiles(&tiles, &map, LogContext::new("test"));
        let start = Vec2::new(5.0, 35.0);
        let goal = Vec2::new(55.0, 35.0);

        let path = graph.find_path(&map, start, goal).into_path().expect("path");
        assert_walkable(&map, &path);
        assert!(path.points.contains(&Vec2::new(5.0, 5.0)));
        assert!(path.points.contains(&Vec2::new(55.0, 5.0)));
    }
}
