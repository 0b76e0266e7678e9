//! Level description: collision layers, waypoints, weapons and spawns.
//!
//! Levels are JSON files. Layers are text rows where `#` is blocked;
//! waypoints are tile coordinates (used at the tile centre).

use std::collections::BTreeMap;
use std::path::Path;

use glam::Vec2;
use serde::Deserialize;

use crate::collision::CollisionMap;
use crate::components::{Weapon, WeaponKind};
use crate::constants::{
    DEFAULT_DETECTION_RADIUS, DEFAULT_TILE_SIZE, ENEMY_HITBOX_SIZE, PLAYER_HEALTH,
    PLAYER_HITBOX_SIZE,
};
use crate::error::LevelError;
use crate::geometry::Rect;
use crate::grid::OccupancyGrid;
use crate::logging::LogContext;

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

fn default_detection_radius() -> f32 {
    DEFAULT_DETECTION_RADIUS
}

fn default_player_health() -> i32 {
    PLAYER_HEALTH
}

#[derive(Debug, Clone, Deserialize)]
pub struct LayerData {
    pub id: String,
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeaponData {
    pub kind: WeaponKind,
    pub damage: i32,
    pub range: f32,
    pub cooldown: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnemyTemplate {
    pub health: i32,
    pub speed: f32,
    pub weapon: String,
    #[serde(default = "default_detection_radius")]
    pub detection_radius: f32,
    #[serde(default)]
    pub flees: bool,
    #[serde(default)]
    pub hitbox: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSpawn {
    pub position: (f32, f32),
    pub weapon: String,
    #[serde(default = "default_player_health")]
    pub health: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnemySpawn {
    pub template: String,
    pub position: (f32, f32),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelData {
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
    #[serde(default)]
    pub layers: Vec<LayerData>,
    #[serde(default)]
    pub waypoints: Vec<(i32, i32)>,
    #[serde(default)]
    pub weapons: BTreeMap<String, WeaponData>,
    #[serde(default)]
    pub enemy_templates: BTreeMap<String, EnemyTemplate>,
    pub player: PlayerSpawn,
    #[serde(default)]
    pub enemies: Vec<EnemySpawn>,
}

impl LevelData {
    /// Read and validate a level file.
    pub fn load(path: &Path) -> Result<Self, LevelError> {
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: LevelData = serde_json::from_str(json)?;
        level.validate()?;
        Ok(level)
    }

    /// Check every cross-reference up front so spawning cannot fail halfway.
    pub fn validate(&self) -> Result<(), LevelError> {
        if !(self.tile_size > 0.0) {
            return Err(LevelError::BadTileSize(self.tile_size));
        }
        self.weapon(&self.player.weapon)?;
        for template in self.enemy_templates.values() {
            self.weapon(&template.weapon)?;
        }
        for spawn in &self.enemies {
            self.template(&spawn.template)?;
        }
        Ok(())
    }

    /// Instantiate a named weapon, ready to attack.
    pub fn weapon(&self, name: &str) -> Result<Weapon, LevelError> {
        let data = self
            .weapons
            .get(name)
            .ok_or_else(|| LevelError::UnknownWeapon(name.to_string()))?;
        Ok(Weapon {
            name: name.to_string(),
            kind: data.kind,
            damage: data.damage,
            range: data.range,
            cooldown: data.cooldown,
            remaining: 0.0,
        })
    }

    pub fn template(&self, name: &str) -> Result<&EnemyTemplate, LevelError> {
        self.enemy_templates
            .get(name)
            .ok_or_else(|| LevelError::UnknownTemplate(name.to_string()))
    }

    /// Register every layer, merge them and build the edge set.
    pub fn build_collision_map(&self, log: LogContext) -> Result<CollisionMap, LevelError> {
        let mut map = CollisionMap::new(self.tile_size, log);
        for layer in &self.layers {
            map.add_layer(OccupancyGrid::from_rows(&layer.rows), layer.id.clone())?;
        }
        map.generate_common_map();
        map.build_edges();
        Ok(map)
    }

    /// Every spawn's hitbox must start clear of blocked tiles, or movement
    /// can never free it.
    pub fn validate_spawns(&self, map: &CollisionMap) -> Result<(), LevelError> {
        let check = |what: &str, (x, y): (f32, f32), (w, h): (f32, f32)| {
            let rect = Rect::from_center(Vec2::new(x, y), Vec2::new(w, h));
            if map.box_overlaps_blocked(rect) {
                return Err(LevelError::SpawnInWall {
                    what: what.to_string(),
                    x,
                    y,
                });
            }
            Ok(())
        };

        check("player", self.player.position, PLAYER_HITBOX_SIZE)?;
        for spawn in &self.enemies {
            let size = self.template(&spawn.template)?.hitbox.unwrap_or(ENEMY_HITBOX_SIZE);
            check(&spawn.template, spawn.position, size)?;
        }
        Ok(())
    }

    /// The built-in level: a walled arena split by a wall with two gaps,
    /// a pillar in the upper half, the player below and four devils above.
    pub fn demo() -> Self {
        const W: usize = 48;
        const H: usize = 36;

        let mut walls = vec![vec!['.'; W]; H];
        for (y, row) in walls.iter_mut().enumerate() {
            for (x, cell) in row.iter_mut().enumerate() {
                let border = x == 0 || y == 0 || x == W - 1 || y == H - 1;
                let divider = y == 24 && !(10..=12).contains(&x) && !(40..=42).contains(&x);
                let pillar = (24..=27).contains(&x) && (10..=13).contains(&y);
                if border || divider || pillar {
                    *cell = '#';
                }
            }
        }

        let mut props = vec![vec!['.'; W]; H];
        for &(x, y) in &[(5, 5), (6, 5), (5, 6), (33, 30), (34, 30)] {
            props[y][x] = '#';
        }

        let to_rows = |grid: Vec<Vec<char>>| -> Vec<String> {
            grid.into_iter().map(|r| r.into_iter().collect()).collect()
        };

        let weapon = |kind, damage, range, cooldown| WeaponData {
            kind,
            damage,
            range,
            cooldown,
        };
        let weapons = BTreeMap::from([
            ("sword".to_string(), weapon(WeaponKind::Melee, 20, 24.0, 0.4)),
            ("bow".to_string(), weapon(WeaponKind::Ranged, 12, 300.0, 0.8)),
            ("bite".to_string(), weapon(WeaponKind::Hitbox, 4, 14.0, 1.0)),
        ]);

        let enemy_templates = BTreeMap::from([(
            "devil".to_string(),
            EnemyTemplate {
                health: 40,
                speed: 60.0,
                weapon: "bite".to_string(),
                detection_radius: 240.0,
                flees: true,
                hitbox: None,
            },
        )]);

        let enemies = [(500.0, 290.0), (580.0, 300.0), (590.0, 310.0), (610.0, 300.0)]
            .into_iter()
            .map(|position| EnemySpawn {
                template: "devil".to_string(),
                position,
            })
            .collect();

        Self {
            tile_size: DEFAULT_TILE_SIZE,
            layers: vec![
                LayerData {
                    id: "walls".to_string(),
                    rows: to_rows(walls),
                },
                LayerData {
                    id: "props".to_string(),
                    rows: to_rows(props),
                },
            ],
            waypoints: vec![
                // Either side of both gaps
                (11, 22),
                (11, 26),
                (41, 22),
                (41, 26),
                // Around the pillar
                (22, 8),
                (29, 8),
                (22, 15),
                (29, 15),
                // Lower half corners
                (3, 32),
                (44, 32),
                (20, 29),
            ],
            weapons,
            enemy_templates,
            player: PlayerSpawn {
                position: (296.0, 472.0),
                weapon: "sword".to_string(),
                health: PLAYER_HEALTH,
            },
            enemies,
        }
    }
}
