//! Data-driven game balance
//!
//! Every gameplay constant lives here so levels can be re-tuned without
//! touching simulation code. Velocities are expressed per nominal frame.

use serde::{Deserialize, Serialize};

/// Environment variable naming a JSON tuning file (native only)
pub const TUNING_ENV: &str = "TILE_RUNNER_TUNING";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player physics ===
    pub gravity: f32,
    /// Multiplier applied on top of `gravity` each tick
    pub gravity_scale: f32,
    pub max_fall_speed: f32,
    pub walk_accel: f32,
    pub run_accel: f32,
    pub walk_speed_cap: f32,
    pub run_speed_cap: f32,
    pub ground_friction: f32,
    pub air_friction: f32,
    pub jump_velocity: f32,

    // === Enemies ===
    pub enemy_speed: f32,
    /// Max depth (from above) at which an overlap counts as a stomp
    pub stomp_depth: f32,
    /// Fraction of `jump_velocity` given back on a stomp
    pub stomp_bounce: f32,
    pub squash_frames: f32,

    // === Items ===
    /// Half-size of the square around the player centre that picks up coins
    pub coin_reach: f32,
    pub coin_bounce: f32,
    pub coin_bounce_decay: f32,
    pub block_bump_velocity: f32,
    pub block_settle_gravity: f32,

    // === Scoring ===
    pub coin_score: u32,
    pub bump_coin_score: u32,
    pub stomp_score: u32,
    pub flag_bonus: u32,

    // === Session ===
    pub start_time: f32,
    /// Seconds removed from the clock per nominal frame
    pub clock_rate: f32,
    pub start_lives: u32,
    pub world_label: String,

    // === Timing ===
    pub frame_ms: f32,
    pub max_elapsed_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.45,
            gravity_scale: 3.2,
            max_fall_speed: 10.0,
            walk_accel: 0.35,
            run_accel: 0.5,
            walk_speed_cap: 3.2,
            run_speed_cap: 3.6,
            ground_friction: 0.82,
            air_friction: 0.94,
            jump_velocity: -8.5,

            enemy_speed: 0.6,
            stomp_depth: 8.0,
            stomp_bounce: 0.6,
            squash_frames: 20.0,

            coin_reach: 12.0,
            coin_bounce: 14.0,
            coin_bounce_decay: 1.2,
            block_bump_velocity: -2.5,
            block_settle_gravity: 0.6,

            coin_score: 100,
            bump_coin_score: 200,
            stomp_score: 200,
            flag_bonus: 1000,

            start_time: 400.0,
            clock_rate: 0.06,
            start_lives: 3,
            world_label: "1-1".to_string(),

            frame_ms: 16.6667,
            max_elapsed_ms: 32.0,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Gravity added to vertical velocity per nominal frame
    #[inline]
    pub fn fall_accel(&self) -> f32 {
        self.gravity * self.gravity_scale
    }

    /// Load tuning from the file named by `TILE_RUNNER_TUNING` (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(TUNING_ENV) else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_json(&content) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {path}");
                    tuning
                }
                Err(e) => {
                    log::warn!("Failed to parse {path}: {e}, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read {path}: {e}, using defaults");
                Self::default()
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        Self::default()
    }
}
