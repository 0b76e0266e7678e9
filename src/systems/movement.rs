//! Movement against the static collision map.
//!
//! Entities collide with the map only, never with each other. Moves are
//! resolved one axis at a time so a body pressed diagonally into a wall
//! slides along it instead of stopping dead.

use glam::Vec2;
use hecs::{Entity, World};

use crate::collision::CollisionMap;
use crate::components::{Hitbox, Position, Speed};

/// How many times a blocked axis move is halved while looking for contact
const CONTACT_REFINEMENT_STEPS: u32 = 4;

/// Move along one axis, shortening the move until it no longer overlaps a
/// blocked tile (or giving up and staying put).
fn sweep_axis(map: &CollisionMap, hitbox: &Hitbox, pos: Vec2, delta: Vec2) -> Vec2 {
    let mut step = delta;
    for _ in 0..=CONTACT_REFINEMENT_STEPS {
        let candidate = pos + step;
        if !map.box_overlaps_blocked(hitbox.rect_at(candidate)) {
            return candidate;
        }
        step *= 0.5;
    }
    pos
}

/// Resolve a move of `delta` for a box centred at `pos`.
pub fn move_with_collision(map: &CollisionMap, hitbox: &Hitbox, pos: Vec2, delta: Vec2) -> Vec2 {
    let mut p = pos;
    if delta.x != 0.0 {
        p = sweep_axis(map, hitbox, p, Vec2::new(delta.x, 0.0));
    }
    if delta.y != 0.0 {
        p = sweep_axis(map, hitbox, p, Vec2::new(0.0, delta.y));
    }
    p
}

/// Move towards `target`, at most `max_distance`, never overshooting.
pub fn step_towards(
    map: &CollisionMap,
    hitbox: &Hitbox,
    pos: Vec2,
    target: Vec2,
    max_distance: f32,
) -> Vec2 {
    let to_target = target - pos;
    let distance = to_target.length();
    if distance <= f32::EPSILON || max_distance <= 0.0 {
        return pos;
    }
    let delta = to_target * (max_distance.min(distance) / distance);
    move_with_collision(map, hitbox, pos, delta)
}

/// Apply one step of player movement input. Returns whether the player moved.
///
/// `direction` does not need to be normalized; noclip ignores the map.
pub fn move_player(
    world: &mut World,
    map: &CollisionMap,
    player: Entity,
    direction: Vec2,
    dt: f32,
    noclip: bool,
) -> bool {
    let Ok((pos, hitbox, speed)) = world.query_one_mut::<(&mut Position, &Hitbox, &Speed)>(player)
    else {
        return false;
    };

    let direction = direction.normalize_or_zero();
    if direction == Vec2::ZERO {
        return false;
    }

    let delta = direction * speed.0 * dt;
    let new_pos = if noclip {
        pos.0 + delta
    } else {
        move_with_collision(map, hitbox, pos.0, delta)
    };

    let moved = new_pos != pos.0;
    pos.0 = new_pos;
    moved
}
