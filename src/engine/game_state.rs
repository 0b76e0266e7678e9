//! Core game state - owns the simulation data.

use crate::collision::CollisionMap;
use crate::debug_overlay::{DebugFlags, DebugOverlay};
use crate::error::LevelError;
use crate::events::EventQueue;
use crate::level::LevelData;
use crate::logging::LogContext;
use crate::pathfinding::WaypointGraph;
use crate::queries;
use crate::time_system::GameClock;

use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::initialization;

/// Log targets handed to each subsystem.
pub const COLLISION_LOG: LogContext = LogContext::new("edge_roguelike::collision");
pub const PATHFINDING_LOG: LogContext = LogContext::new("edge_roguelike::pathfinding");
pub const AI_LOG: LogContext = LogContext::new("edge_roguelike::ai");
pub const GAME_LOG: LogContext = LogContext::new("edge_roguelike::game");

/// Core game state - owns all simulation data.
pub struct GameState {
    /// The ECS world
    pub world: World,

    /// Merged collision layers and their edges; read-only after load
    pub collision: CollisionMap,

    /// Waypoint graph with visibility cached at load
    pub waypoints: WaypointGraph,

    /// Player entity handle
    pub player_entity: Entity,

    /// Game clock (simulation time)
    pub clock: GameClock,

    /// Events pushed during steps, drained by the game loop
    pub events: EventQueue,

    pub debug: DebugFlags,

    /// Seeded so runs are reproducible
    pub rng: StdRng,

    pub log: LogContext,
}

impl GameState {
    /// Build the collision map, waypoint graph and world for a level.
    pub fn from_level(level: &LevelData, seed: u64) -> Result<Self, LevelError> {
        puffin::profile_function!();

        let collision = level.build_collision_map(COLLISION_LOG)?;
        level.validate_spawns(&collision)?;
        let waypoints = WaypointGraph::from_tiles(&level.waypoints, &collision, PATHFINDING_LOG);
        let (world, player_entity) = initialization::init_world(level)?;

        log::info!(
            target: GAME_LOG.target(),
            "level loaded: {} edges, {} waypoints, {} enemies",
            collision.edges().len(),
            waypoints.len(),
            level.enemies.len()
        );

        Ok(Self {
            world,
            collision,
            waypoints,
            player_entity,
            clock: GameClock::new(),
            events: EventQueue::new(),
            debug: DebugFlags::default(),
            rng: StdRng::seed_from_u64(seed),
            log: GAME_LOG,
        })
    }

    pub fn player_alive(&self) -> bool {
        !queries::is_entity_dead(&self.world, self.player_entity)
    }

    pub fn enemies_left(&self) -> usize {
        queries::living_enemies(&self.world).len()
    }

    /// Debug drawing data for the current flags.
    pub fn debug_overlay(&self) -> DebugOverlay {
        DebugOverlay::collect(&self.debug, &self.world, &self.collision, self.player_entity)
    }
}
