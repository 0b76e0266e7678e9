//! Enemy steering: perception, the state machine, and movement.
//!
//! Each step every enemy looks at its target (sight via the ray caster,
//! distance against its detection radius and weapon range), picks a state,
//! then acts on it: wander when idle, run straight at a visible target or
//! follow a waypoint path to a hidden one, attack on cooldown, or run away.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;

use crate::collision::CollisionMap;
use crate::components::{AIState, EnemyAI, Health, Hitbox, Position, Speed, Weapon};
use crate::constants::{
    IDLE_SPEED_FACTOR, IDLE_WANDER_INTERVAL, IDLE_WANDER_RADIUS, PATH_REPLAN_INTERVAL,
    PATH_REPLAN_TOLERANCE, TARGET_LOST_GRACE, WAYPOINT_REACH_DISTANCE,
};
use crate::events::{EventQueue, GameEvent};
use crate::logging::LogContext;
use crate::pathfinding::{PathResult, WaypointGraph};
use crate::queries;
use crate::systems::combat;
use crate::systems::movement::{move_with_collision, step_towards};

/// What an enemy knows about its target this step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perception {
    /// Target position, if the target still exists and is alive
    pub target: Option<Vec2>,
    pub distance: f32,
    pub line_of_sight: bool,
}

impl Perception {
    pub fn none() -> Self {
        Self {
            target: None,
            distance: f32::INFINITY,
            line_of_sight: false,
        }
    }
}

/// Read-only world data the AI steers through.
pub struct AiContext<'a> {
    pub map: &'a CollisionMap,
    pub graph: &'a WaypointGraph,
    pub log: LogContext,
}

/// Update every enemy, one after another in a fixed order.
pub fn update_enemies(
    world: &mut World,
    ctx: &AiContext,
    dt: f32,
    events: &mut EventQueue,
    rng: &mut impl Rng,
) {
    puffin::profile_function!();

    for entity in queries::enemies_in_order(world) {
        if queries::is_entity_dead(world, entity) {
            continue;
        }
        update_enemy(world, ctx, entity, dt, events, rng);
    }
}

/// Look at the target from `from`.
pub fn perceive(world: &World, map: &CollisionMap, from: Vec2, target: Option<Entity>) -> Perception {
    let Some(target_pos) = target.and_then(|t| queries::live_target_position(world, t)) else {
        return Perception::none();
    };
    Perception {
        target: Some(target_pos),
        distance: from.distance(target_pos),
        line_of_sight: map.has_line_of_sight(from, target_pos),
    }
}

/// Decide the next AI state. Only `lost_timer` is updated here.
pub fn update_state_machine(
    ai: &mut EnemyAI,
    perception: Perception,
    weapon_range: f32,
    health_fraction: f32,
    dt: f32,
) -> AIState {
    if perception.target.is_none() {
        ai.lost_timer = 0.0;
        return AIState::Idle;
    }

    let visible = perception.line_of_sight && perception.distance <= ai.detection_radius;
    let in_weapon_range = perception.line_of_sight && perception.distance <= weapon_range;
    let should_flee = ai.flee_below.map_or(false, |f| health_fraction <= f);

    match ai.state {
        AIState::Idle => {
            if !visible {
                AIState::Idle
            } else if should_flee {
                AIState::Flee
            } else {
                AIState::Chase
            }
        }
        AIState::Chase => {
            if should_flee {
                return AIState::Flee;
            }
            if in_weapon_range {
                return AIState::Attack;
            }
            let lost = !perception.line_of_sight && perception.distance > ai.detection_radius;
            if lost {
                ai.lost_timer += dt;
                if ai.lost_timer >= TARGET_LOST_GRACE {
                    return AIState::Idle;
                }
            } else {
                ai.lost_timer = 0.0;
            }
            AIState::Chase
        }
        AIState::Attack => {
            if should_flee {
                AIState::Flee
            } else if !in_weapon_range {
                AIState::Chase
            } else {
                AIState::Attack
            }
        }
        AIState::Flee => {
            if perception.distance > ai.detection_radius {
                AIState::Idle
            } else {
                AIState::Flee
            }
        }
    }
}

/// Reset per-state bookkeeping when a state is entered.
fn enter_state(ai: &mut EnemyAI, new_state: AIState) {
    ai.state = new_state;
    ai.lost_timer = 0.0;
    ai.wander_goal = None;
    match new_state {
        AIState::Chase => {
            // Plan immediately if the target is hidden
            ai.replan_timer = 0.0;
            ai.path_failed = false;
        }
        AIState::Idle | AIState::Attack | AIState::Flee => ai.clear_path(),
    }
}

fn update_enemy(
    world: &mut World,
    ctx: &AiContext,
    entity: Entity,
    dt: f32,
    events: &mut EventQueue,
    rng: &mut impl Rng,
) {
    let (pos, target) = match (
        world.get::<&Position>(entity),
        world.get::<&EnemyAI>(entity),
    ) {
        (Ok(p), Ok(ai)) => (p.0, ai.target),
        _ => return,
    };
    let perception = perceive(world, ctx.map, pos, target);

    let Ok((position, hitbox, speed, health, weapon, ai)) = world
        .query_one_mut::<(&mut Position, &Hitbox, &Speed, &Health, &mut Weapon, &mut EnemyAI)>(
            entity,
        )
    else {
        return;
    };

    let old_state = ai.state;
    let new_state = update_state_machine(ai, perception, weapon.range, health.percentage(), dt);
    if new_state != old_state {
        log::debug!(
            target: ctx.log.target(),
            "enemy {} {:?} -> {:?} (distance {:.1}, sight {})",
            entity.id(),
            old_state,
            new_state,
            perception.distance,
            perception.line_of_sight
        );
        enter_state(ai, new_state);
        events.push(GameEvent::AIStateChanged {
            entity,
            old_state,
            new_state,
        });
    }

    let step = speed.0 * dt;
    let mut pending_attack = None;

    match (ai.state, perception.target) {
        (AIState::Chase, Some(target_pos)) => {
            position.0 = chase(
                ctx, entity, ai, hitbox, position.0, target_pos, perception, step, dt, events,
            );
        }
        (AIState::Attack, Some(_)) => {
            // Attacking does not move; the weapon's cooldown paces it
            if weapon.try_attack() {
                pending_attack = target.map(|t| (t, weapon.damage));
            }
        }
        (AIState::Flee, Some(target_pos)) => {
            let away = (position.0 - target_pos).normalize_or_zero();
            position.0 = move_with_collision(ctx.map, hitbox, position.0, away * step);
        }
        _ => {
            position.0 = wander(ctx.map, ai, hitbox, position.0, step * IDLE_SPEED_FACTOR, dt, rng);
        }
    }

    if let Some((target, damage)) = pending_attack {
        combat::apply_damage(world, entity, target, damage, events);
    }
}

/// Chase movement: straight at a visible target, otherwise along a path.
#[allow(clippy::too_many_arguments)]
fn chase(
    ctx: &AiContext,
    entity: Entity,
    ai: &mut EnemyAI,
    hitbox: &Hitbox,
    pos: Vec2,
    target_pos: Vec2,
    perception: Perception,
    step: f32,
    dt: f32,
    events: &mut EventQueue,
) -> Vec2 {
    if perception.line_of_sight {
        ai.clear_path();
        ai.path_failed = false;
        return step_towards(ctx.map, hitbox, pos, target_pos, step);
    }

    ai.replan_timer -= dt;
    let target_moved = ai
        .path
        .as_ref()
        .and_then(|p| p.goal())
        .map_or(false, |goal| goal.distance(target_pos) > PATH_REPLAN_TOLERANCE);

    if target_moved || ai.replan_timer <= 0.0 {
        ai.replan_timer = PATH_REPLAN_INTERVAL;
        match ctx.graph.find_path(ctx.map, pos, target_pos) {
            PathResult::Found(path) => {
                // Point 0 is where we already stand
                ai.path_index = 1.min(path.len().saturating_sub(1));
                ai.path = Some(path);
                ai.path_failed = false;
            }
            PathResult::NoPath => {
                ai.clear_path();
                if !ai.path_failed {
                    log::debug!(
                        target: ctx.log.target(),
                        "enemy {} has no path to {target_pos}, holding position",
                        entity.id()
                    );
                    events.push(GameEvent::PathNotFound {
                        entity,
                        goal: target_pos,
                    });
                }
                ai.path_failed = true;
            }
        }
    }

    follow_path(ctx.map, ai, hitbox, pos, step)
}

/// Walk towards the next path point, advancing past points as they are reached.
fn follow_path(map: &CollisionMap, ai: &mut EnemyAI, hitbox: &Hitbox, pos: Vec2, step: f32) -> Vec2 {
    // Cut corners: skip ahead while a later point is already in sight.
    // A fresh plan may start by doubling back to the nearest waypoint.
    if let Some(path) = &ai.path {
        while ai.path_index + 1 < path.points.len()
            && map.has_line_of_sight(pos, path.points[ai.path_index + 1])
        {
            ai.path_index += 1;
        }
    }

    let Some(next) = ai.next_path_point() else {
        // Finished or no path: hold position and replan next step
        if ai.path.is_some() {
            ai.clear_path();
            ai.replan_timer = 0.0;
        }
        return pos;
    };

    let new_pos = step_towards(map, hitbox, pos, next, step);
    if new_pos.distance(next) <= WAYPOINT_REACH_DISTANCE {
        ai.path_index += 1;
    }
    new_pos
}

/// Idle wandering: now and then pick a nearby visible spot and stroll to it.
fn wander(
    map: &CollisionMap,
    ai: &mut EnemyAI,
    hitbox: &Hitbox,
    pos: Vec2,
    step: f32,
    dt: f32,
    rng: &mut impl Rng,
) -> Vec2 {
    ai.wander_timer -= dt;
    if ai.wander_timer <= 0.0 {
        ai.wander_timer = IDLE_WANDER_INTERVAL;
        let offset = Vec2::new(
            rng.gen_range(-IDLE_WANDER_RADIUS..=IDLE_WANDER_RADIUS),
            rng.gen_range(-IDLE_WANDER_RADIUS..=IDLE_WANDER_RADIUS),
        );
        let goal = pos + offset;
        ai.wander_goal = (map.has_line_of_sight(pos, goal)
            && !map.box_overlaps_blocked(hitbox.rect_at(goal)))
        .then_some(goal);
    }

    let Some(goal) = ai.wander_goal else {
        return pos;
    };
    let new_pos = step_towards(map, hitbox, pos, goal, step);
    if new_pos.distance(goal) <= WAYPOINT_REACH_DISTANCE || new_pos == pos {
        ai.wander_goal = None;
    }
    new_pos
}
