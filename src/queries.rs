//! Common entity query helpers.
//!
//! Pure read-only lookups shared by the AI, combat and debug systems.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Enemy, Health, Hitbox, Position};
use crate::geometry::Rect;

/// Get an entity's world position.
pub fn get_entity_position(world: &World, entity: Entity) -> Option<Vec2> {
    world.get::<&Position>(entity).ok().map(|p| p.0)
}

/// Get an entity's collision rectangle.
pub fn get_entity_rect(world: &World, entity: Entity) -> Option<Rect> {
    let pos = get_entity_position(world, entity)?;
    let hitbox = world.get::<&Hitbox>(entity).ok()?;
    Some(hitbox.rect_at(pos))
}

/// Check if an entity is dead (health <= 0). Missing entities count as dead.
pub fn is_entity_dead(world: &World, entity: Entity) -> bool {
    world
        .get::<&Health>(entity)
        .map(|h| h.is_dead())
        .unwrap_or(true)
}

/// Position of a target that still exists and is alive.
pub fn live_target_position(world: &World, target: Entity) -> Option<Vec2> {
    if is_entity_dead(world, target) {
        return None;
    }
    get_entity_position(world, target)
}

/// All enemies, in a fixed order (by entity id) so updates are deterministic.
pub fn enemies_in_order(world: &World) -> Vec<Entity> {
    let mut enemies: Vec<Entity> = world
        .query::<&Enemy>()
        .iter()
        .map(|(entity, _)| entity)
        .collect();
    enemies.sort_by_key(|e| e.id());
    enemies
}

/// Living enemies with their positions, in update order.
pub fn living_enemies(world: &World) -> Vec<(Entity, Vec2)> {
    enemies_in_order(world)
        .into_iter()
        .filter(|&e| !is_entity_dead(world, e))
        .filter_map(|e| get_entity_position(world, e).map(|p| (e, p)))
        .collect()
}

/// Closest living enemy to a point.
pub fn nearest_enemy(world: &World, point: Vec2) -> Option<(Entity, Vec2)> {
    living_enemies(world).into_iter().min_by(|a, b| {
        a.1.distance_squared(point)
            .partial_cmp(&b.1.distance_squared(point))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
