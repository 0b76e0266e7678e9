//! Player input interpretation.
//!
//! The host (a window, a test, or the headless autopilot) fills in a
//! `PlayerInput` each step; this module turns it into movement, aim and
//! attacks. Keeping input as plain data leaves windowing out of the core.

use glam::Vec2;
use hecs::{Entity, World};

use crate::collision::CollisionMap;
use crate::components::{Aim, Position, Weapon};
use crate::constants::AIM_RAY_LENGTH;
use crate::geometry::angle_between_points;
use crate::pathfinding::{PathResult, WaypointGraph};
use crate::queries;

/// What the player wants to do this step.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Movement direction; any length, zero for standing still
    pub move_dir: Vec2,
    /// World point under the cursor, if it moved this step
    pub aim_at: Option<Vec2>,
    /// Use the weapon along the current aim
    pub attack: bool,
}

/// Recompute the aim ray after the player moved or the aim point changed.
///
/// Returns whether the aim was refreshed.
pub fn update_aim(
    world: &mut World,
    map: &CollisionMap,
    player: Entity,
    aim_at: Option<Vec2>,
    moved: bool,
) -> bool {
    if !moved && aim_at.is_none() {
        return false;
    }
    let Ok((pos, aim)) = world.query_one_mut::<(&Position, &mut Aim)>(player) else {
        return false;
    };

    let origin = pos.0;
    if let Some(point) = aim_at {
        if point != origin {
            aim.angle = angle_between_points(origin, point);
        }
    }
    aim.hit = map.ray_hit(origin, aim.angle, AIM_RAY_LENGTH);
    true
}

/// Headless driver: hunt the nearest enemy.
///
/// Walks straight at a visible enemy, follows a waypoint path to a hidden
/// one, and swings once the enemy is within weapon reach.
pub fn autopilot(
    world: &World,
    map: &CollisionMap,
    graph: &WaypointGraph,
    player: Entity,
) -> PlayerInput {
    let Some(pos) = queries::get_entity_position(world, player) else {
        return PlayerInput::default();
    };
    let Some((_, enemy_pos)) = queries::nearest_enemy(world, pos) else {
        return PlayerInput::default();
    };
    let reach = world.get::<&Weapon>(player).map_or(0.0, |w| w.range);

    let visible = map.has_line_of_sight(pos, enemy_pos);
    if visible && pos.distance(enemy_pos) <= reach {
        return PlayerInput {
            move_dir: Vec2::ZERO,
            aim_at: Some(enemy_pos),
            attack: true,
        };
    }

    let heading = if visible {
        Some(enemy_pos)
    } else {
        match graph.find_path(map, pos, enemy_pos) {
            PathResult::Found(path) => path.points.get(1).copied(),
            PathResult::NoPath => None,
        }
    };

    match heading {
        Some(point) => PlayerInput {
            move_dir: point - pos,
            aim_at: Some(point),
            attack: false,
        },
        None => PlayerInput::default(),
    }
}
