//! Game state and core simulation types
//!
//! `World` is the single mutable aggregate threaded through every tick.
//! The grid is immutable; only entities, camera and HUD change at runtime.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::level::{BlockKind, Grid, SpawnTable, build_level};
use crate::consts::*;
use crate::tuning::Tuning;

/// Session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    #[default]
    Play,
    Pause,
    /// Terminal until restart
    Dead,
    /// Terminal until restart
    Win,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Play => "PLAY",
            Status::Pause => "PAUSE",
            Status::Dead => "DEAD",
            Status::Win => "WIN",
        }
    }

    /// Result of the pause toggle; terminal states ignore it
    pub fn toggled(self) -> Option<Status> {
        match self {
            Status::Play => Some(Status::Pause),
            Status::Pause => Some(Status::Play),
            Status::Dead | Status::Win => None,
        }
    }

    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Dead | Status::Win)
    }
}

/// Read-only summary published to the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub score: u32,
    pub coins: u32,
    /// Remaining seconds (fractional)
    pub time: f32,
    pub world: String,
    pub lives: u32,
    pub status: Status,
}

impl Snapshot {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            coins: 0,
            time: tuning.start_time,
            world: tuning.world_label.clone(),
            lives: tuning.start_lives,
            status: Status::Play,
        }
    }

    /// Whole seconds shown on the HUD
    pub fn display_time(&self) -> u32 {
        self.time.max(0.0).floor() as u32
    }
}

/// Snapshot owner plus the outbox of event-driven publications
#[derive(Debug, Clone)]
pub struct Hud {
    snapshot: Snapshot,
    outbox: Vec<Snapshot>,
}

impl Hud {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            snapshot: Snapshot::new(tuning),
            outbox: Vec::new(),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.snapshot.status
    }

    /// Queue a copy of the current snapshot for observers
    pub fn publish(&mut self) {
        self.outbox.push(self.snapshot.clone());
    }

    /// Add score/coins and publish immediately
    pub fn award(&mut self, score: u32, coins: u32) {
        self.snapshot.score += score;
        self.snapshot.coins += coins;
        self.publish();
    }

    /// Run the clock down; returns true when it reaches zero
    pub fn run_clock(&mut self, seconds: f32) -> bool {
        self.snapshot.time = (self.snapshot.time - seconds).max(0.0);
        self.snapshot.time <= 0.0
    }

    /// Toggle PLAY/PAUSE. Returns the new status if it changed.
    pub fn toggle_pause(&mut self) -> Option<Status> {
        let next = self.snapshot.status.toggled()?;
        self.snapshot.status = next;
        self.publish();
        Some(next)
    }

    /// Move PLAY to a terminal status. Only the first call per session succeeds.
    pub fn finish(&mut self, status: Status, bonus: u32) -> bool {
        if self.snapshot.status != Status::Play || !status.is_terminal() {
            return false;
        }
        self.snapshot.status = status;
        self.snapshot.score += bonus;
        self.publish();
        true
    }

    /// Back to initial values (publishes)
    pub fn reset(&mut self, tuning: &Tuning) {
        self.snapshot = Snapshot::new(tuning);
        self.publish();
    }

    /// Take all queued publications, oldest first
    pub fn drain(&mut self) -> Vec<Snapshot> {
        std::mem::take(&mut self.outbox)
    }
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Enemy,
    TimeUp,
}

/// Notable things that happened during a tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    CoinCollected { pos: Vec2 },
    BlockBumped { pos: Vec2, coin: bool },
    EnemyStomped { index: usize },
    PlayerDied { cause: DeathCause },
    LevelComplete,
    Paused,
    Resumed,
    Restarted,
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the hitbox
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub on_ground: bool,
    /// -1 facing left, 1 facing right
    pub facing: i8,
    pub running: bool,
    pub dead: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            on_ground: false,
            facing: 1,
            running: false,
            dead: false,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// A walking hazard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub dead: bool,
    /// Frames of squash animation left after a stomp
    pub squash: f32,
}

impl Enemy {
    pub fn new(pos: Vec2, speed: f32) -> Self {
        Self {
            pos,
            vel: Vec2::new(-speed, 0.0),
            size: Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT),
            dead: false,
            squash: 0.0,
        }
    }

    #[inline]
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    /// Whether a renderer should still draw this enemy
    #[inline]
    pub fn visible(&self) -> bool {
        !self.dead || self.squash > 0.0
    }
}

/// A collectible coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    /// Centre position
    pub pos: Vec2,
    pub taken: bool,
    /// Visual rise after pickup, counts down to zero
    pub bounce: f32,
}

impl Coin {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            taken: false,
            bounce: 0.0,
        }
    }

    #[inline]
    pub fn visible(&self) -> bool {
        !self.taken || self.bounce > 0.0
    }
}

/// A brick or question block that can be bumped from below
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Current top-left (y moves while bumped)
    pub pos: Vec2,
    pub origin_y: f32,
    pub kind: BlockKind,
    pub bumped: bool,
    pub bump_vel: f32,
    pub has_hidden_coin: bool,
}

impl Block {
    pub fn new(pos: Vec2, kind: BlockKind) -> Self {
        Self {
            pos,
            origin_y: pos.y,
            kind,
            bumped: false,
            bump_vel: 0.0,
            has_hidden_coin: kind == BlockKind::Question,
        }
    }

    /// Advance the bump animation; snaps back exactly to the origin
    pub fn settle(&mut self, gravity: f32, dt: f32) {
        if !self.bumped {
            return;
        }
        self.pos.y += self.bump_vel * dt;
        self.bump_vel += gravity * dt;
        if self.pos.y >= self.origin_y {
            self.pos.y = self.origin_y;
            self.bumped = false;
            self.bump_vel = 0.0;
        }
    }
}

/// Horizontal scroll in screen pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    pub x: f32,
}

/// Complete mutable game world
#[derive(Debug, Clone)]
pub struct World {
    pub tuning: Tuning,
    pub level: Grid,
    pub spawns: SpawnTable,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,
    pub blocks: Vec<Block>,
    pub camera: Camera,
    /// Screen size in pixels, supplied by the host
    pub viewport: Vec2,
    pub hud: Hud,
    /// Events recorded since the last drain
    pub events: Vec<GameEvent>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(build_level(), Tuning::default())
    }
}

impl World {
    pub fn new(level: Grid, tuning: Tuning) -> Self {
        let spawns = level.spawns();
        let mut world = Self {
            player: Player::new(spawns.player),
            enemies: Vec::new(),
            coins: Vec::new(),
            blocks: Vec::new(),
            camera: Camera::default(),
            viewport: Vec2::new(960.0, 540.0),
            hud: Hud::new(&tuning),
            events: Vec::new(),
            tuning,
            level,
            spawns,
        };
        world.spawn_entities();
        world
    }

    /// Rebuild every entity and the HUD from the spawn table
    pub fn reset(&mut self) {
        self.spawn_entities();
        self.camera = Camera::default();
        self.hud.reset(&self.tuning);
        self.events.push(GameEvent::Restarted);
        log::info!("World {} restarted", self.tuning.world_label);
    }

    fn spawn_entities(&mut self) {
        self.player = Player::new(self.spawns.player);
        self.enemies = self
            .spawns
            .enemies
            .iter()
            .map(|&p| Enemy::new(p, self.tuning.enemy_speed))
            .collect();
        self.coins = self.spawns.coins.iter().map(|&p| Coin::new(p)).collect();
        self.blocks = self
            .spawns
            .blocks
            .iter()
            .map(|&(p, kind)| Block::new(p, kind))
            .collect();
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
    }

    #[inline]
    pub fn snapshot(&self) -> &Snapshot {
        self.hud.snapshot()
    }

    #[inline]
    pub fn status(&self) -> Status {
        self.hud.status()
    }

    /// Left edge of the flag column in logical units
    #[inline]
    pub fn flag_x(&self) -> Option<f32> {
        self.spawns.flag_x
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
