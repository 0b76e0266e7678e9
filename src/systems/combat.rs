//! Combat system functions.

use glam::Vec2;
use hecs::{Entity, World};

use crate::collision::CollisionMap;
use crate::components::{Aim, Health, Position, Weapon, WeaponKind};
use crate::constants::MELEE_ARC_HALF_ANGLE;
use crate::events::{EventQueue, GameEvent};
use crate::geometry::{angle_between_points, angle_difference, direction_from_angle, Rect};
use crate::queries;

/// Count down every weapon's cooldown
pub fn tick_cooldowns(world: &mut World, dt: f32) {
    for (_, weapon) in world.query_mut::<&mut Weapon>() {
        weapon.tick(dt);
    }
}

/// Deal damage to a living target. Returns false if the target is already
/// dead or gone.
pub fn apply_damage(
    world: &mut World,
    attacker: Entity,
    target: Entity,
    damage: i32,
    events: &mut EventQueue,
) -> bool {
    let Ok((pos, health)) = world.query_one_mut::<(&Position, &mut Health)>(target) else {
        return false;
    };
    if health.is_dead() {
        return false;
    }
    health.take_damage(damage);
    events.push(GameEvent::AttackHit {
        attacker,
        target,
        target_pos: pos.0,
        damage,
    });
    true
}

/// Distance along a ray to where it enters `rect`, if it does (slab test).
fn ray_enters_rect(origin: Vec2, dir: Vec2, rect: Rect) -> Option<f32> {
    let (min, max) = (rect.min(), rect.max());
    let mut t_near = f32::NEG_INFINITY;
    let mut t_far = f32::INFINITY;

    for (o, d, lo, hi) in [(origin.x, dir.x, min.x, max.x), (origin.y, dir.y, min.y, max.y)] {
        if d.abs() <= f32::EPSILON {
            if o < lo || o > hi {
                return None;
            }
            continue;
        }
        let (t0, t1) = ((lo - o) / d, (hi - o) / d);
        t_near = t_near.max(t0.min(t1));
        t_far = t_far.min(t0.max(t1));
    }

    (t_near <= t_far && t_far >= 0.0).then_some(t_near.max(0.0))
}

/// Enemies a swing from `origin` towards `angle` connects with.
fn melee_targets(
    world: &World,
    map: &CollisionMap,
    origin: Vec2,
    angle: f32,
    range: f32,
) -> Vec<Entity> {
    queries::living_enemies(world)
        .into_iter()
        .filter(|&(_, pos)| {
            origin.distance(pos) <= range
                && angle_difference(angle, angle_between_points(origin, pos)) <= MELEE_ARC_HALF_ANGLE
                && map.has_line_of_sight(origin, pos)
        })
        .map(|(entity, _)| entity)
        .collect()
}

/// First enemy along the aim ray, stopping at walls and the weapon's range.
fn ranged_target(
    world: &World,
    map: &CollisionMap,
    origin: Vec2,
    angle: f32,
    range: f32,
) -> Option<Entity> {
    let reach = map
        .cast(origin, angle, range)
        .map_or(range, |hit| hit.distance);
    let dir = direction_from_angle(angle);

    queries::living_enemies(world)
        .into_iter()
        .filter_map(|(entity, _)| {
            let rect = queries::get_entity_rect(world, entity)?;
            let t = ray_enters_rect(origin, dir, rect)?;
            (t <= reach).then_some((entity, t))
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(entity, _)| entity)
}

/// The player uses their weapon along the current aim.
///
/// Returns false if the weapon is still cooling down. A swing or shot that
/// connects with nothing emits `AttackMissed`.
pub fn player_attack(
    world: &mut World,
    map: &CollisionMap,
    player: Entity,
    events: &mut EventQueue,
) -> bool {
    puffin::profile_function!();

    let (origin, angle, kind, damage, range) = {
        let Ok((pos, aim, weapon)) =
            world.query_one_mut::<(&Position, &Aim, &mut Weapon)>(player)
        else {
            return false;
        };
        if !weapon.try_attack() {
            return false;
        }
        (pos.0, aim.angle, weapon.kind, weapon.damage, weapon.range)
    };

    let targets = match kind {
        WeaponKind::Melee | WeaponKind::Hitbox => melee_targets(world, map, origin, angle, range),
        WeaponKind::Ranged => ranged_target(world, map, origin, angle, range)
            .into_iter()
            .collect(),
    };

    if targets.is_empty() {
        events.push(GameEvent::AttackMissed { attacker: player });
        return true;
    }
    for target in targets {
        apply_damage(world, player, target, damage, events);
    }
    true
}

/// Despawn everything whose health ran out, emitting `EntityDied`.
/// Returns the removed entities.
pub fn remove_dead(world: &mut World, events: &mut EventQueue) -> Vec<Entity> {
    let mut dead: Vec<(Entity, Vec2)> = world
        .query::<(&Position, &Health)>()
        .iter()
        .filter(|(_, (_, health))| health.is_dead())
        .map(|(id, (pos, _))| (id, pos.0))
        .collect();
    dead.sort_by_key(|(e, _)| e.id());

    for &(entity, position) in &dead {
        events.push(GameEvent::EntityDied { entity, position });
        let _ = world.despawn(entity);
    }
    dead.into_iter().map(|(e, _)| e).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::tests::map_from_rows;
    use crate::components::{Enemy, Hitbox, Player};
    use std::f32::consts::PI;

    fn weapon(kind: WeaponKind, damage: i32, range: f32) -> Weapon {
        Weapon {
            name: "test".into(),
            kind,
            damage,
            range,
            cooldown: 0.5,
            remaining: 0.0,
        }
    }

    fn spawn_enemy(world: &mut World, x: f32, y: f32, hp: i32) -> Entity {
        world.spawn((
            Enemy {
                template: "devil".into(),
            },
            Position::new(x, y),
            Hitbox::new(6.0, 6.0),
            Health::new(hp),
        ))
    }

    fn spawn_player(world: &mut World, weapon: Weapon, angle: f32) -> Entity {
        world.spawn((
            Player,
            Position::new(20.0, 20.0),
            Hitbox::new(6.0, 6.0),
            Health::new(100),
            weapon,
            Aim { angle, hit: None },
        ))
    }

    fn open_map() -> CollisionMap {
        map_from_rows(&["........", "........", "........", "........"], 10.0)
    }

    #[test]
    fn test_melee_hits_within_arc_only() {
        let map = open_map();
        let mut world = World::new();
        let mut events = EventQueue::new();
        let player = spawn_player(&mut world, weapon(WeaponKind::Melee, 7, 15.0), 0.0);
        let ahead = spawn_enemy(&mut world, 30.0, 20.0, 10);
        let behind = spawn_enemy(&mut world, 10.0, 20.0, 10);
        let far = spawn_enemy(&mut world, 50.0, 20.0, 10);

        assert!(player_attack(&mut world, &map, player, &mut events));
        assert_eq!(world.get::<&Health>(ahead).unwrap().current, 3);
        assert_eq!(world.get::<&Health>(behind).unwrap().current, 10);
        assert_eq!(world.get::<&Health>(far).unwrap().current, 10);

        // Second swing is still on cooldown
        assert!(!player_attack(&mut world, &map, player, &mut events));
    }

    #[test]
    fn test_melee_does_not_hit_through_walls() {
        let map = map_from_rows(&["...#....", "...#....", "...#....", "...#...."], 10.0);
        let mut world = World::new();
        let mut events = EventQueue::new();
        let player = spawn_player(&mut world, weapon(WeaponKind::Melee, 7, 30.0), 0.0);
        let hidden = spawn_enemy(&mut world, 45.0, 20.0, 10);

        player_attack(&mut world, &map, player, &mut events);
        assert_eq!(world.get::<&Health>(hidden).unwrap().current, 10);
        assert!(matches!(
            events.iter().next(),
            Some(GameEvent::AttackMissed { .. })
        ));
    }

    #[test]
    fn test_ranged_hits_nearest_in_line() {
        let map = open_map();
        let mut world = World::new();
        let mut events = EventQueue::new();
        let player = spawn_player(&mut world, weapon(WeaponKind::Ranged, 4, 100.0), 0.0);
        let near = spawn_enemy(&mut world, 45.0, 21.0, 10);
        let behind_it = spawn_enemy(&mut world, 65.0, 20.0, 10);
        let off_line = spawn_enemy(&mut world, 30.0, 35.0, 10);

        player_attack(&mut world, &map, player, &mut events);
        assert_eq!(world.get::<&Health>(near).unwrap().current, 6);
        assert_eq!(world.get::<&Health>(behind_it).unwrap().current, 10);
        assert_eq!(world.get::<&Health>(off_line).unwrap().current, 10);
    }

    #[test]
    fn test_ranged_stops_at_wall() {
        let map = map_from_rows(&["....#...", "....#...", "....#...", "....#..."], 10.0);
        let mut world = World::new();
        let mut events = EventQueue::new();
        let player = spawn_player(&mut world, weapon(WeaponKind::Ranged, 4, 100.0), 0.0);
        let beyond = spawn_enemy(&mut world, 65.0, 20.0, 10);

        player_attack(&mut world, &map, player, &mut events);
        assert_eq!(world.get::<&Health>(beyond).unwrap().current, 10);
    }

    #[test]
    fn test_ray_enters_rect() {
        let rect = Rect::new(10.0, -1.0, 4.0, 2.0);
        assert_eq!(ray_enters_rect(Vec2::ZERO, Vec2::X, rect), Some(10.0));
        assert_eq!(ray_enters_rect(Vec2::ZERO, -Vec2::X, rect), None);
        assert_eq!(ray_enters_rect(Vec2::new(0.0, 5.0), Vec2::X, rect), None);
        assert_eq!(
            ray_enters_rect(Vec2::new(12.0, 0.0), direction_from_angle(PI / 2.0), rect),
            Some(0.0)
        );
    }

    #[test]
    fn test_weak_target_is_removed() {
        let mut world = World::new();
        let mut events = EventQueue::new();
        let attacker = world.spawn((Position::new(0.0, 0.0),));
        let weak = spawn_enemy(&mut world, 5.0, 0.0, 3);
        let strong = spawn_enemy(&mut world, 6.0, 0.0, 30);

        assert!(apply_damage(&mut world, attacker, weak, 5, &mut events));
        assert!(apply_damage(&mut world, attacker, strong, 5, &mut events));
        // Already dead: no second hit
        assert!(!apply_damage(&mut world, attacker, weak, 5, &mut events));

        let removed = remove_dead(&mut world, &mut events);
        assert_eq!(removed, vec![weak]);
        assert!(!world.contains(weak));
        assert!(world.contains(strong));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::EntityDied { entity, .. } if *entity == weak)));
    }

    #[test]
    fn test_cooldowns_tick_down() {
        let mut world = World::new();
        let mut w = weapon(WeaponKind::Melee, 1, 1.0);
        w.remaining = 0.3;
        let e = world.spawn((w,));
        tick_cooldowns(&mut world, 0.2);
        assert!(!world.get::<&Weapon>(e).unwrap().can_attack());
        tick_cooldowns(&mut world, 0.2);
        assert!(world.get::<&Weapon>(e).unwrap().can_attack());
    }
}
