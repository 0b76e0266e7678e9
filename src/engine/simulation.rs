//! Game simulation - one fixed step of the world, and event processing.

use crate::components::AIState;
use crate::events::{EventQueue, GameEvent};
use crate::logging::LogContext;
use crate::systems::ai::{self, AiContext};
use crate::systems::combat;
use crate::systems::movement;
use crate::systems::player_input::{self, PlayerInput};

use hecs::Entity;

use super::game_state::{GameState, AI_LOG};

/// What happened during one fixed step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepResult {
    pub player_moved: bool,
    pub player_attacked: bool,
    /// Entities despawned at the end of the step
    pub deaths: usize,
    pub player_died: bool,
}

/// Advance the simulation by one fixed step of `dt` seconds.
///
/// Order: cooldowns, player movement, aim, player attack, enemies, deaths.
/// Damage dealt during the step lands immediately; the dead are only
/// despawned at the end, so nothing vanishes mid-step.
pub fn step(state: &mut GameState, input: &PlayerInput, dt: f32) -> StepResult {
    puffin::profile_function!();

    let mut result = StepResult::default();
    let player = state.player_entity;

    combat::tick_cooldowns(&mut state.world, dt);

    if state.player_alive() {
        result.player_moved = movement::move_player(
            &mut state.world,
            &state.collision,
            player,
            input.move_dir,
            dt,
            state.debug.noclip,
        );
        player_input::update_aim(
            &mut state.world,
            &state.collision,
            player,
            input.aim_at,
            result.player_moved,
        );
        if input.attack {
            result.player_attacked =
                combat::player_attack(&mut state.world, &state.collision, player, &mut state.events);
        }
    }

    let ctx = AiContext {
        map: &state.collision,
        graph: &state.waypoints,
        log: AI_LOG,
    };
    ai::update_enemies(&mut state.world, &ctx, dt, &mut state.events, &mut state.rng);

    let dead = combat::remove_dead(&mut state.world, &mut state.events);
    result.deaths = dead.len();
    result.player_died = dead.contains(&player);

    state.clock.advance(dt);
    result
}

/// Running tally of drained events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventSummary {
    pub hits_by_player: u32,
    pub hits_on_player: u32,
    pub misses: u32,
    pub kills: u32,
    pub enemies_alerted: u32,
    pub paths_not_found: u32,
}

/// Drain all pending events, logging each and counting them up.
pub fn process_events(
    events: &mut EventQueue,
    player_entity: Entity,
    log: LogContext,
    summary: &mut EventSummary,
) {
    for event in events.drain() {
        match &event {
            GameEvent::AttackHit {
                attacker,
                target,
                damage,
                ..
            } => {
                if *attacker == player_entity {
                    summary.hits_by_player += 1;
                }
                if *target == player_entity {
                    summary.hits_on_player += 1;
                }
                log::debug!(
                    target: log.target(),
                    "{} hit {} for {damage}",
                    attacker.id(),
                    target.id()
                );
            }
            GameEvent::AttackMissed { attacker } => {
                summary.misses += 1;
                log::trace!(target: log.target(), "{} missed", attacker.id());
            }
            GameEvent::EntityDied { entity, position } => {
                if *entity != player_entity {
                    summary.kills += 1;
                }
                log::info!(target: log.target(), "{} died at {position}", entity.id());
            }
            GameEvent::AIStateChanged {
                entity,
                old_state,
                new_state,
            } => {
                if *old_state == AIState::Idle && *new_state == AIState::Chase {
                    summary.enemies_alerted += 1;
                }
                log::trace!(
                    target: log.target(),
                    "{} {old_state:?} -> {new_state:?}",
                    entity.id()
                );
            }
            GameEvent::PathNotFound { entity, goal } => {
                summary.paths_not_found += 1;
                log::debug!(target: log.target(), "{} cannot reach {goal}", entity.id());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Health, Position};
    use crate::level::LevelData;
    use crate::logging::LogContext;
    use crate::queries;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_step_moves_player_and_advances_clock() {
        let mut state = GameState::from_level(&LevelData::demo(), 1).unwrap();
        let before = queries::get_entity_position(&state.world, state.player_entity).unwrap();

        let input = PlayerInput {
            move_dir: Vec2::new(1.0, 0.0),
            ..PlayerInput::default()
        };
        let result = step(&mut state, &input, DT);

        assert!(result.player_moved);
        let after = queries::get_entity_position(&state.world, state.player_entity).unwrap();
        assert!(after.x > before.x);
        assert_eq!(state.clock.ticks, 1);
    }

    #[test]
    fn test_level_with_player_in_wall_does_not_load() {
        let mut level = LevelData::demo();
        // Tile (0, 0) is part of the border
        level.player.position = (8.0, 8.0);
        let err = GameState::from_level(&level, 1).err().expect("spawn overlaps the border");
        assert!(matches!(err, crate::error::LevelError::SpawnInWall { .. }));
    }

    #[test]
    fn test_step_despawns_killed_enemy() {
        let mut state = GameState::from_level(&LevelData::demo(), 1).unwrap();
        let enemy = queries::enemies_in_order(&state.world)[0];
        // Put the enemy right in front of the player with one hit point left
        let player_pos = queries::get_entity_position(&state.world, state.player_entity).unwrap();
        state.world.get::<&mut Position>(enemy).unwrap().0 = player_pos + Vec2::new(10.0, 0.0);
        state.world.get::<&mut Health>(enemy).unwrap().current = 1;

        let input = PlayerInput {
            aim_at: Some(player_pos + Vec2::new(10.0, 0.0)),
            attack: true,
            ..PlayerInput::default()
        };
        let result = step(&mut state, &input, DT);

        assert!(result.player_attacked);
        assert_eq!(result.deaths, 1);
        assert!(!state.world.contains(enemy));
        assert_eq!(state.enemies_left(), 3);

        let mut summary = EventSummary::default();
        process_events(
            &mut state.events,
            state.player_entity,
            LogContext::new("test"),
            &mut summary,
        );
        assert_eq!(summary.kills, 1);
        assert_eq!(summary.hits_by_player, 1);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_dead_player_stops_acting() {
        let mut state = GameState::from_level(&LevelData::demo(), 1).unwrap();
        state.world.get::<&mut Health>(state.player_entity).unwrap().current = 0;

        let result = step(&mut state, &PlayerInput::default(), DT);
        assert!(result.player_died);
        assert!(!state.player_alive());

        // Enemies lose their target and settle back to idle
        let next = step(&mut state, &PlayerInput::default(), DT);
        assert!(!next.player_moved);
        assert_eq!(next.deaths, 0);
    }

    #[test]
    fn test_runs_are_reproducible() {
        let run = |seed| {
            let mut state = GameState::from_level(&LevelData::demo(), seed).unwrap();
            for _ in 0..240 {
                step(&mut state, &PlayerInput::default(), DT);
            }
            queries::living_enemies(&state.world)
        };
        assert_eq!(run(9), run(9));
    }
}
