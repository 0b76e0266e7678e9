use glam::Vec2;
use hecs::Entity;

use crate::geometry::Rect;
use crate::pathfinding::Path;

/// Position component - world coordinates of the hitbox centre
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position(pub Vec2);

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self(Vec2::new(x, y))
    }
}

/// Collision box, centred on the entity's position
#[derive(Debug, Clone, Copy)]
pub struct Hitbox {
    pub size: Vec2,
}

impl Hitbox {
    pub fn new(w: f32, h: f32) -> Self {
        Self {
            size: Vec2::new(w, h),
        }
    }

    pub fn rect_at(&self, center: Vec2) -> Rect {
        Rect::from_center(center, self.size)
    }
}

/// Movement speed in world units per second
#[derive(Debug, Clone, Copy)]
pub struct Speed(pub f32);

/// Player marker component
#[derive(Debug, Clone, Copy)]
pub struct Player;

/// Enemy marker, remembering which template spawned it
#[derive(Debug, Clone)]
pub struct Enemy {
    pub template: String,
}

/// Health component
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn percentage(&self) -> f32 {
        if self.max <= 0 {
            return 0.0;
        }
        (self.current as f32 / self.max as f32).clamp(0.0, 1.0)
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.current = (self.current - amount).max(0);
    }
}

/// How a weapon finds what it hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeaponKind {
    /// Swing: everything in range inside an arc around the aim direction
    Melee,
    /// Projectile along the aim ray: nearest target in front of the wall hit
    Ranged,
    /// Contact attack used by enemies: the current target when in range
    Hitbox,
}

/// Weapon component
#[derive(Debug, Clone)]
pub struct Weapon {
    pub name: String,
    pub kind: WeaponKind,
    pub damage: i32,
    pub range: f32,
    /// Seconds between attacks
    pub cooldown: f32,
    /// Seconds until the next attack is allowed
    pub remaining: f32,
}

impl Weapon {
    pub fn can_attack(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Start the cooldown. Returns false if still cooling down.
    pub fn try_attack(&mut self) -> bool {
        if !self.can_attack() {
            return false;
        }
        self.remaining = self.cooldown;
        true
    }

    pub fn tick(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }
}

/// Player aim: direction towards the cursor and where the aim ray stops
#[derive(Debug, Clone, Copy, Default)]
pub struct Aim {
    pub angle: f32,
    pub hit: Option<Vec2>,
}

/// AI state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AIState {
    #[default]
    Idle,
    Chase,
    Attack,
    Flee,
}

/// Steering AI for enemies.
///
/// `target` is a plain entity id: the AI never keeps the target alive, and a
/// despawned target simply stops resolving.
#[derive(Debug, Clone)]
pub struct EnemyAI {
    pub state: AIState,
    pub target: Option<Entity>,
    pub detection_radius: f32,
    /// Flee once health falls to this fraction of max, if set
    pub flee_below: Option<f32>,
    /// Current navigation task
    pub path: Option<Path>,
    /// Index of the next path point to walk to
    pub path_index: usize,
    /// Seconds until the path is refreshed regardless of target movement
    pub replan_timer: f32,
    /// Seconds the target has been out of sight and out of range
    pub lost_timer: f32,
    /// Set after a failed path query so the miss is reported once
    pub path_failed: bool,
    pub wander_timer: f32,
    pub wander_goal: Option<Vec2>,
}

impl EnemyAI {
    pub fn new(target: Option<Entity>, detection_radius: f32, flee_below: Option<f32>) -> Self {
        Self {
            state: AIState::Idle,
            target,
            detection_radius,
            flee_below,
            path: None,
            path_index: 0,
            replan_timer: 0.0,
            lost_timer: 0.0,
            path_failed: false,
            wander_timer: 0.0,
            wander_goal: None,
        }
    }

    /// Drop the current navigation task.
    pub fn clear_path(&mut self) {
        self.path = None;
        self.path_index = 0;
    }

    /// Next point of the current path still to be reached.
    pub fn next_path_point(&self) -> Option<Vec2> {
        self.path
            .as_ref()
            .and_then(|p| p.points.get(self.path_index).copied())
    }
}
