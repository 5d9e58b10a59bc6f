//! Game state and core simulation types
//!
//! One `GameState` exists per loaded level. It owns the player, the live
//! enemy and spike sets, the snapshot they are restored from, health and the
//! camera.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::health::Health;
use super::level::{LevelData, Surface, TutorialText};
use super::rect::Rect;
use crate::consts::*;

/// Things that happened during a tick, for logging and the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// An enemy was stomped and removed
    EnemyDefeated,
    /// Contact damage went into the damage channel
    DamagePosted { amount: u8 },
    /// Non-fatal damage applied
    PlayerHurt { health: u8 },
    /// Damage dropped during invulnerability
    HitIgnored,
    /// Fatal damage; player and level were reset
    PlayerDied,
    /// Player touched the goal
    LevelComplete,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// True whenever not resting on a surface
    pub jumping: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::new(SPAWN_X, SPAWN_Y),
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            jumping: false,
        }
    }
}

impl Player {
    pub fn rect(&self) -> Rect {
        Rect::at(self.pos, self.size)
    }

    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Back to the spawn point, at rest and grounded
    pub fn respawn(&mut self) {
        self.pos = Vec2::new(SPAWN_X, SPAWN_Y);
        self.vel = Vec2::ZERO;
        self.jumping = false;
    }
}

/// Enemy and spike layout captured when a level finishes loading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub enemies: Vec<Rect>,
    pub spikes: Vec<Rect>,
}

impl LevelSnapshot {
    pub fn capture(enemies: &[Rect], spikes: &[Rect]) -> Self {
        Self {
            enemies: enemies.to_vec(),
            spikes: spikes.to_vec(),
        }
    }

    /// Overwrite the live collections with the captured layout
    pub fn restore_into(&self, enemies: &mut Vec<Rect>, spikes: &mut Vec<Rect>) {
        enemies.clear();
        enemies.extend_from_slice(&self.enemies);
        spikes.clear();
        spikes.extend_from_slice(&self.spikes);
    }
}

/// Complete simulation state for one level
#[derive(Debug, Clone)]
pub struct GameState {
    pub player: Player,
    pub health: Health,
    pub camera: Camera,
    /// Static level geometry
    pub base_width: f32,
    pub base_height: f32,
    pub surfaces: Vec<Surface>,
    pub goal: Option<Rect>,
    pub tutorial_texts: Vec<TutorialText>,
    /// Live, mutable collections
    pub enemies: Vec<Rect>,
    pub spikes: Vec<Rect>,
    snapshot: LevelSnapshot,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl GameState {
    /// Build a fresh state for a validated level
    pub fn new(level: LevelData) -> Self {
        let LevelData {
            base_width,
            base_height,
            surfaces,
            enemies,
            spikes,
            goal,
            tutorial_texts,
            ..
        } = level;

        let snapshot = LevelSnapshot::capture(&enemies, &spikes);
        let player = Player::default();
        let camera = Camera::follow(&player.rect(), base_width, base_height);

        Self {
            player,
            health: Health::new(),
            camera,
            base_width,
            base_height,
            surfaces,
            goal,
            tutorial_texts,
            enemies,
            spikes,
            snapshot,
            time_ticks: 0,
        }
    }

    pub fn snapshot(&self) -> &LevelSnapshot {
        &self.snapshot
    }

    /// Whether the player overlaps the goal
    pub fn reached_goal(&self) -> bool {
        self.goal
            .as_ref()
            .is_some_and(|goal| self.player.rect().intersects(goal))
    }

    /// Whether the player has fallen past the bottom of the world
    pub fn in_void(&self) -> bool {
        self.player.pos.y > self.base_height + VOID_MARGIN
    }

    /// Put the player back at spawn and restore enemies and spikes.
    /// Health is left to the caller.
    pub fn respawn(&mut self) {
        self.player.respawn();
        self.snapshot
            .restore_into(&mut self.enemies, &mut self.spikes);
    }

    /// Respawn plus full health and no invulnerability
    pub fn reset(&mut self) {
        self.respawn();
        self.health.restore();
    }

    pub fn update_camera(&mut self) {
        self.camera = Camera::follow(&self.player.rect(), self.base_width, self.base_height);
    }
}
