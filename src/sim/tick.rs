//! Simulation step
//!
//! Advances the world by one tick. `dt` is the frame-time multiplier
//! (1.0 = one nominal frame); all velocities in `Tuning` are per nominal frame.

use glam::Vec2;

use super::camera::follow;
use super::collision::{BumpHandler, NoBumps, resolve};
use super::state::{Block, Coin, DeathCause, GameEvent, Hud, Player, Status, World};
use crate::consts::SCALE;
use crate::tuning::Tuning;

/// Tolerance under which a horizontal enemy move counts as blocked
const BLOCKED_EPSILON: f32 = 1e-4;

/// Max distance between a bump point and a block's tile origin
const BUMP_MATCH: f32 = 2.0;

/// Input intents for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Level-triggered: holding jump re-jumps on landing
    pub jump: bool,
    pub run: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
    /// Full reset (one-shot)
    pub restart: bool,
}

/// Convert elapsed wall time to the tick multiplier, capping stalls
pub fn normalize_dt(elapsed_ms: f64, tuning: &Tuning) -> f32 {
    let capped = elapsed_ms.clamp(0.0, tuning.max_elapsed_ms as f64);
    (capped / tuning.frame_ms as f64) as f32
}

/// Advance the world by one tick
pub fn tick(world: &mut World, input: &TickInput, dt: f32) {
    if input.restart {
        world.reset();
        return;
    }

    if input.pause {
        match world.hud.toggle_pause() {
            Some(Status::Pause) => {
                log::info!("Paused");
                world.events.push(GameEvent::Paused);
            }
            Some(_) => {
                log::info!("Resumed");
                world.events.push(GameEvent::Resumed);
            }
            None => {}
        }
    }

    // Frozen outside PLAY
    if world.status() != Status::Play {
        return;
    }

    update_player(world, input, dt);
    update_coins(world, dt);
    for block in &mut world.blocks {
        block.settle(world.tuning.block_settle_gravity, dt);
    }
    update_enemies(world, dt);
    check_flag(world);
    run_clock(world, dt);

    world.camera.x = follow(
        world.player.pos.x,
        world.viewport.x,
        world.level.pixel_width() * SCALE,
    );
}

/// Routes head-hits from the player sweep into the block collection
struct BlockBumper<'a> {
    blocks: &'a mut [Block],
    coins: &'a mut Vec<Coin>,
    hud: &'a mut Hud,
    events: &'a mut Vec<GameEvent>,
    tuning: &'a Tuning,
}

impl BumpHandler for BlockBumper<'_> {
    fn bump(&mut self, tile_pos: Vec2) {
        if let Some(coin) = bump_block(self.blocks, self.coins, self.hud, self.tuning, tile_pos) {
            self.events.push(GameEvent::BlockBumped { pos: tile_pos, coin });
        }
    }
}

/// Bump the block sitting at `tile_pos`
///
/// Returns `None` if no idle block is there, otherwise whether the bump
/// released the block's hidden coin. A hidden coin is released at most once.
pub fn bump_block(
    blocks: &mut [Block],
    coins: &mut Vec<Coin>,
    hud: &mut Hud,
    tuning: &Tuning,
    tile_pos: Vec2,
) -> Option<bool> {
    let block = blocks.iter_mut().find(|b| {
        !b.bumped && (b.pos.x - tile_pos.x).abs() < BUMP_MATCH && (b.origin_y - tile_pos.y).abs() < BUMP_MATCH
    })?;

    block.bumped = true;
    block.bump_vel = tuning.block_bump_velocity;

    if !block.has_hidden_coin {
        log::debug!("Bumped empty block at {tile_pos}");
        return Some(false);
    }

    block.has_hidden_coin = false;
    let half = crate::consts::TILE / 2.0;
    coins.push(Coin {
        pos: Vec2::new(block.pos.x + half, block.origin_y + half - 6.0),
        taken: true,
        bounce: tuning.coin_bounce,
    });
    hud.award(tuning.bump_coin_score, 1);
    log::debug!("Block at {tile_pos} released its coin");
    Some(true)
}

impl World {
    /// Bump the block at `tile_pos` as if struck from below
    pub fn bump_block(&mut self, tile_pos: Vec2) -> Option<bool> {
        let coin = bump_block(&mut self.blocks, &mut self.coins, &mut self.hud, &self.tuning, tile_pos)?;
        self.events.push(GameEvent::BlockBumped { pos: tile_pos, coin });
        Some(coin)
    }
}

fn update_player(world: &mut World, input: &TickInput, dt: f32) {
    let World {
        player,
        level,
        blocks,
        coins,
        hud,
        events,
        tuning,
        ..
    } = world;

    apply_intents(player, input, tuning, dt);

    let mut bumper = BlockBumper {
        blocks,
        coins,
        hud,
        events,
        tuning,
    };
    let moved = resolve(level, &player.aabb(), player.vel * dt, &mut bumper);
    player.pos = moved.pos;
    player.on_ground = moved.hit_bottom;
}

/// Acceleration, friction, jump and gravity for one tick
fn apply_intents(player: &mut Player, input: &TickInput, tuning: &Tuning, dt: f32) {
    let accel = dt * if input.run { tuning.run_accel } else { tuning.walk_accel };
    let cap = if input.run {
        tuning.run_speed_cap
    } else {
        tuning.walk_speed_cap
    };
    player.running = input.run;

    if input.left {
        player.vel.x -= accel;
        player.facing = -1;
    }
    if input.right {
        player.vel.x += accel;
        player.facing = 1;
    }

    let friction = if player.on_ground {
        tuning.ground_friction
    } else {
        tuning.air_friction
    };
    player.vel.x = (player.vel.x * friction).clamp(-cap, cap);

    if input.jump && player.on_ground {
        player.vel.y = tuning.jump_velocity;
        player.on_ground = false;
    }

    player.vel.y = (player.vel.y + tuning.fall_accel() * dt).min(tuning.max_fall_speed);
}

fn update_coins(world: &mut World, dt: f32) {
    let center = world.player.center();
    let tuning = &world.tuning;

    for coin in &mut world.coins {
        if coin.taken {
            if coin.bounce > 0.0 {
                coin.bounce = (coin.bounce - tuning.coin_bounce_decay * dt).max(0.0);
            }
            continue;
        }

        let d = center - coin.pos;
        if d.x.abs() < tuning.coin_reach && d.y.abs() < tuning.coin_reach {
            coin.taken = true;
            coin.bounce = tuning.coin_bounce;
            world.hud.award(tuning.coin_score, 1);
            world.events.push(GameEvent::CoinCollected { pos: coin.pos });
            log::debug!("Coin collected at {}", coin.pos);
        }
    }
}

fn update_enemies(world: &mut World, dt: f32) {
    let World {
        enemies,
        player,
        level,
        hud,
        events,
        tuning,
        ..
    } = world;

    for (index, enemy) in enemies.iter_mut().enumerate() {
        if enemy.dead {
            enemy.squash = (enemy.squash - dt).max(0.0);
            continue;
        }

        enemy.vel.y += tuning.fall_accel() * dt;

        // Walk; turn around when a wall stops the move entirely
        let dx = enemy.vel.x * dt;
        if dx != 0.0 {
            let moved = resolve(level, &enemy.aabb(), Vec2::new(dx, 0.0), &mut NoBumps);
            if (moved.pos.x - enemy.pos.x).abs() < BLOCKED_EPSILON {
                enemy.vel.x = -enemy.vel.x;
            } else {
                enemy.pos.x = moved.pos.x;
            }
        }

        let fall = resolve(level, &enemy.aabb(), Vec2::new(0.0, enemy.vel.y * dt), &mut NoBumps);
        enemy.pos.y = fall.pos.y;
        if fall.hit_bottom {
            enemy.vel.y = 0.0;
        }

        if player.dead || !player.aabb().overlaps(&enemy.aabb()) {
            continue;
        }

        let depth = player.pos.y + player.size.y - enemy.pos.y;
        if player.vel.y > 0.0 && depth < tuning.stomp_depth {
            enemy.dead = true;
            enemy.squash = tuning.squash_frames;
            player.vel.y = tuning.jump_velocity * tuning.stomp_bounce;
            hud.award(tuning.stomp_score, 0);
            events.push(GameEvent::EnemyStomped { index });
            log::debug!("Enemy {index} stomped");
        } else {
            player.dead = true;
            if hud.finish(Status::Dead, 0) {
                events.push(GameEvent::PlayerDied {
                    cause: DeathCause::Enemy,
                });
                log::info!("Player hit by enemy {index}");
            }
        }
    }
}

fn check_flag(world: &mut World) {
    let Some(flag_x) = world.flag_x() else {
        return;
    };
    if world.player.dead || world.player.pos.x <= flag_x {
        return;
    }
    if world.hud.finish(Status::Win, world.tuning.flag_bonus) {
        world.events.push(GameEvent::LevelComplete);
        log::info!("Level complete, score {}", world.snapshot().score);
    }
}

fn run_clock(world: &mut World, dt: f32) {
    let expired = world.hud.run_clock(dt * world.tuning.clock_rate);
    if !expired || world.player.dead || world.status() != Status::Play {
        return;
    }
    world.player.dead = true;
    if world.hud.finish(Status::Dead, 0) {
        world.events.push(GameEvent::PlayerDied {
            cause: DeathCause::TimeUp,
        });
        log::info!("Time up");
    }
}
