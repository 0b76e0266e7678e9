//! World initialization - creates the ECS world and spawns the level's actors.

use crate::components::{Aim, Enemy, EnemyAI, Health, Hitbox, Player, Position, Speed};
use crate::constants::*;
use crate::error::LevelError;
use crate::level::{EnemySpawn, LevelData};

use glam::Vec2;
use hecs::{Entity, World};

/// Spawn the player at the level's start point.
fn spawn_player(world: &mut World, level: &LevelData) -> Result<Entity, LevelError> {
    let (x, y) = level.player.position;
    let weapon = level.weapon(&level.player.weapon)?;
    let (w, h) = PLAYER_HITBOX_SIZE;

    Ok(world.spawn((
        Player,
        Position::new(x, y),
        Hitbox::new(w, h),
        Speed(PLAYER_SPEED),
        Health::new(level.player.health),
        weapon,
        Aim::default(),
    )))
}

/// Spawn one enemy from its template, hunting `target`.
pub fn spawn_enemy(
    world: &mut World,
    level: &LevelData,
    spawn: &EnemySpawn,
    target: Entity,
) -> Result<Entity, LevelError> {
    let template = level.template(&spawn.template)?;
    let weapon = level.weapon(&template.weapon)?;
    let (w, h) = template.hitbox.unwrap_or(ENEMY_HITBOX_SIZE);
    let flee_below = template.flees.then_some(DEFAULT_FLEE_HEALTH_FRACTION);

    Ok(world.spawn((
        Enemy {
            template: spawn.template.clone(),
        },
        Position(Vec2::new(spawn.position.0, spawn.position.1)),
        Hitbox::new(w, h),
        Speed(template.speed),
        Health::new(template.health),
        weapon,
        EnemyAI::new(Some(target), template.detection_radius, flee_below),
    )))
}

/// Create the world with the player and every enemy spawned.
///
/// Spawning happens in level order, so entity ids (and therefore the AI
/// update order) follow the level file.
pub fn init_world(level: &LevelData) -> Result<(World, Entity), LevelError> {
    let mut world = World::new();
    let player = spawn_player(&mut world, level)?;
    for spawn in &level.enemies {
        spawn_enemy(&mut world, level, spawn, player)?;
    }
    Ok((world, player))
}
