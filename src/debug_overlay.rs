//! Debug toggles and the data a renderer needs to draw them.
//!
//! Nothing here draws. `DebugOverlay::collect` gathers plain segments and
//! points from the simulation so any presentation layer can show them.

use glam::Vec2;
use hecs::World;

use crate::collision::CollisionMap;
use crate::components::{Aim, EnemyAI, Hitbox, Position};
use crate::constants::AIM_RAY_LENGTH;
use crate::geometry::{direction_from_angle, Rect, Segment};
use crate::queries;

/// Developer toggles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebugFlags {
    /// Draw the map's collision edges
    pub collision_lines: bool,
    /// Draw the player's aim ray and each enemy's line of sight
    pub raycast: bool,
    /// Draw enemy navigation paths
    pub pathfinding: bool,
    /// Draw player and enemy hitboxes
    pub hitboxes: bool,
    /// Player ignores map collision
    pub noclip: bool,
}

impl DebugFlags {
    pub const NAMES: [&'static str; 5] =
        ["collision", "raycast", "pathfinding", "hitboxes", "noclip"];

    /// Everything visual on; noclip stays off.
    pub fn all_visual() -> Self {
        Self {
            collision_lines: true,
            raycast: true,
            pathfinding: true,
            hitboxes: true,
            noclip: false,
        }
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "collision" => Some(&mut self.collision_lines),
            "raycast" => Some(&mut self.raycast),
            "pathfinding" => Some(&mut self.pathfinding),
            "hitboxes" => Some(&mut self.hitboxes),
            "noclip" => Some(&mut self.noclip),
            _ => None,
        }
    }

    /// Flip a toggle by name. Returns the new value, or `None` for an
    /// unknown name.
    pub fn toggle(&mut self, name: &str) -> Option<bool> {
        let flag = self.flag_mut(name)?;
        *flag = !*flag;
        Some(*flag)
    }
}

/// Everything the debug view wants drawn this frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugOverlay {
    pub edges: Vec<Segment>,
    /// Aim ray from the player, ending at the hit point or full length
    pub aim_ray: Option<Segment>,
    pub aim_hit: Option<Vec2>,
    /// Enemy to target, cut short where a wall blocks the view
    pub sight_lines: Vec<Segment>,
    /// One polyline per enemy with a path, from its position onwards
    pub paths: Vec<Vec<Vec2>>,
    pub hitboxes: Vec<Rect>,
}

impl DebugOverlay {
    pub fn collect(
        flags: &DebugFlags,
        world: &World,
        map: &CollisionMap,
        player: hecs::Entity,
    ) -> Self {
        puffin::profile_function!();

        let mut overlay = Self::default();

        if flags.collision_lines {
            overlay.edges = map.edges().to_vec();
        }

        if flags.raycast {
            if let Ok(mut query) = world.query_one::<(&Position, &Aim)>(player) {
                if let Some((pos, aim)) = query.get() {
                    let end = aim
                        .hit
                        .unwrap_or_else(|| pos.0 + direction_from_angle(aim.angle) * AIM_RAY_LENGTH);
                    overlay.aim_ray = Some(Segment::new(pos.0, end));
                    overlay.aim_hit = aim.hit;
                }
            }
            overlay.sight_lines = sight_lines(world, map);
        }

        if flags.pathfinding {
            let mut paths: Vec<(u32, Vec<Vec2>)> = world
                .query::<(&Position, &EnemyAI)>()
                .iter()
                .filter_map(|(entity, (pos, ai))| {
                    let path = ai.path.as_ref()?;
                    let rest = path.points.get(ai.path_index..)?;
                    let mut line = Vec::with_capacity(rest.len() + 1);
                    line.push(pos.0);
                    line.extend_from_slice(rest);
                    Some((entity.id(), line))
                })
                .collect();
            paths.sort_by_key(|(id, _)| *id);
            overlay.paths = paths.into_iter().map(|(_, line)| line).collect();
        }

        if flags.hitboxes {
            let mut boxes: Vec<(u32, Rect)> = world
                .query::<&Hitbox>()
                .iter()
                .filter_map(|(entity, _)| {
                    queries::get_entity_rect(world, entity).map(|rect| (entity.id(), rect))
                })
                .collect();
            boxes.sort_by_key(|(id, _)| *id);
            overlay.hitboxes = boxes.into_iter().map(|(_, rect)| rect).collect();
        }

        overlay
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
            && self.aim_ray.is_none()
            && self.sight_lines.is_empty()
            && self.paths.is_empty()
            && self.hitboxes.is_empty()
    }
}

/// What each enemy sees of its target, in spawn order.
fn sight_lines(world: &World, map: &CollisionMap) -> Vec<Segment> {
    let caster = map.ray_caster();
    queries::enemies_in_order(world)
        .into_iter()
        .filter_map(|enemy| {
            let from = queries::get_entity_position(world, enemy)?;
            let target = world.get::<&EnemyAI>(enemy).ok()?.target?;
            let to = queries::live_target_position(world, target)?;
            let end = caster.cast_segment(from, to).map_or(to, |hit| hit.point);
            Some(Segment::new(from, end))
        })
        .collect()
}
