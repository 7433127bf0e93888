//! Tile Runner - A side-scrolling tile platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (level grid, collisions, entity rules)
//! - `game`: Frame loop driving the simulation and its observers
//! - `renderer`: Draw-list generation and the Canvas2D backend
//! - `platform`: Keyboard mapping and viewport fitting
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod platform;
pub mod renderer;
pub mod sim;
pub mod tuning;

pub use game::{FrameRenderer, FrameScheduler, Game, SnapshotObserver};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Tile edge length in logical units
    pub const TILE: f32 = 16.0;
    /// Logical units -> screen pixels
    pub const SCALE: f32 = 3.0;
    /// Tile edge length in screen pixels
    pub const TILE_PX: f32 = TILE * SCALE;

    /// Level dimensions in tiles
    pub const LEVEL_WIDTH: usize = 260;
    pub const LEVEL_HEIGHT: usize = 16;

    /// Inset applied when snapping a body against a tile face
    pub const CONTACT_EPSILON: f32 = 0.01;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 12.0;
    pub const PLAYER_HEIGHT: f32 = 14.0;

    /// Enemy hitbox
    pub const ENEMY_WIDTH: f32 = 14.0;
    pub const ENEMY_HEIGHT: f32 = 12.0;
}

/// Convert a logical coordinate to the tile index containing it
#[inline]
pub fn cell_of(v: f32) -> i32 {
    (v / consts::TILE).floor() as i32
}
