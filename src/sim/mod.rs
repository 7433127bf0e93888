//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Frame-time multiplier supplied by the caller, no clocks read here
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod level;
pub mod state;
pub mod tick;

pub use camera::{CAMERA_LEAD, follow};
pub use collision::{Aabb, BumpHandler, NoBumps, Resolved, resolve};
pub use level::{BlockKind, Grid, LevelError, SpawnTable, Tile, build_level, is_solid, tile_at};
pub use state::{
    Block, Camera, Coin, DeathCause, Enemy, GameEvent, Hud, Player, Snapshot, Status, World,
};
pub use tick::{TickInput, bump_block, normalize_dt, tick};
