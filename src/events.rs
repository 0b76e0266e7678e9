//! Game event system for decoupled communication between systems.
//!
//! Systems push events during a step; the game loop drains them once per
//! frame for logging and for whatever presentation layer sits on top.

use glam::Vec2;
use hecs::Entity;

use crate::components::AIState;

/// Game events that systems can emit and subscribe to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// An entity attacked another entity
    AttackHit {
        attacker: Entity,
        target: Entity,
        target_pos: Vec2,
        damage: i32,
    },
    /// A weapon was used but hit nothing
    AttackMissed { attacker: Entity },
    /// An entity died
    EntityDied { entity: Entity, position: Vec2 },
    /// An enemy's AI changed state
    AIStateChanged {
        entity: Entity,
        old_state: AIState,
        new_state: AIState,
    },
    /// An enemy could not find a route to its target and is holding position
    PathNotFound { entity: Entity, goal: Vec2 },
}

/// Simple event queue - events are pushed during update, processed at end of frame
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }
}
