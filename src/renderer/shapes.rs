//! Shape generation for the side-scrolling scene
//!
//! Everything is emitted as screen-space rectangles in back-to-front order so
//! any 2D backend can paint the list verbatim.

use glam::Vec2;

use crate::consts::{SCALE, TILE, TILE_PX};
use crate::sim::{Block, BlockKind, Coin, Enemy, Player, Tile, World};

pub const SKY: &str = "#7ec0fd";
const HILLS: [&str; 3] = ["#9be8ff", "#8cd4f7", "#7cc0ef"];
const HILL_COUNT: usize = 12;
const HILL_SPACING: f32 = 140.0;
const HILL_PARALLAX: f32 = 0.3;

const GROUND: &str = "#6b3e1f";
const GRASS: &str = "#9bd66b";
const PLATFORM: &str = "#c6854a";
const PLATFORM_DARK: &str = "#9b6336";
const BRICK: &str = "#b75f3e";
const BRICK_DARK: &str = "#8e4028";
const BRICK_LIGHT: &str = "#e5a37b";
const QUESTION: &str = "#f6a000";
const QUESTION_MARK: &str = "#fff3c4";
const QUESTION_USED: &str = "#b88a3e";
const PIPE_TOP: &str = "#2ecf7c";
const PIPE_BODY: &str = "#1fa05d";
const POLE: &str = "#ffffff";
const PENNANT: &str = "#ff3648";
const COIN: &str = "#ffd34d";
const COIN_SHINE: &str = "#ffe68a";
const ENEMY_FEET: &str = "#6b3e1f";
const ENEMY_BODY: &str = "#c85f4a";
const ENEMY_EYES: &str = "#381a14";
const SKIN: &str = "#e7b591";
const SHIRT: &str = "#ff6b6b";
const SHIRT_RUNNING: &str = "#ff4d4d";
const OVERALLS: &str = "#2e6bff";
const EYE: &str = "#000000";

/// Filled screen-space rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: &'static str,
}

/// Accumulates rects relative to a screen-space origin, in logical units
struct Painter<'a> {
    out: &'a mut Vec<DrawRect>,
    origin: Vec2,
}

impl Painter<'_> {
    /// Rect at logical offset (x, y) from the origin, size (w, h) logical
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: &'static str) {
        self.out.push(DrawRect {
            x: self.origin.x + x * SCALE,
            y: self.origin.y + y * SCALE,
            w: w * SCALE,
            h: h * SCALE,
            color,
        });
    }
}

/// Screen position of a logical world point
#[inline]
fn to_screen(world: &World, pos: Vec2) -> Vec2 {
    Vec2::new(pos.x * SCALE - world.camera.x, pos.y * SCALE)
}

/// Inclusive-exclusive column range overlapping the viewport, with a margin
pub fn visible_columns(camera_x: f32, viewport_width: f32, level_width: usize) -> std::ops::Range<usize> {
    let first = ((camera_x / TILE_PX).floor() as i64 - 2).max(0) as usize;
    let last = (((camera_x + viewport_width) / TILE_PX).floor() as i64 + 2).max(0) as usize;
    first.min(level_width)..last.min(level_width)
}

/// Build the draw list for one frame
pub fn frame_shapes(world: &World) -> Vec<DrawRect> {
    let mut out = Vec::with_capacity(512);

    out.push(DrawRect {
        x: 0.0,
        y: 0.0,
        w: world.viewport.x,
        h: world.viewport.y,
        color: SKY,
    });
    hills(world, &mut out);

    let columns = visible_columns(world.camera.x, world.viewport.x, world.level.width());
    for (col, row, tile) in world.level.cells() {
        if !columns.contains(&col) {
            continue;
        }
        let origin = to_screen(world, Vec2::new(col as f32, row as f32) * TILE);
        tile_shapes(tile, &mut Painter { out: &mut out, origin });
    }

    for block in &world.blocks {
        if columns.contains(&((block.pos.x / TILE) as usize)) {
            block_shapes(block, &mut Painter {
                origin: to_screen(world, block.pos),
                out: &mut out,
            });
        }
    }
    for coin in world.coins.iter().filter(|c| c.visible()) {
        coin_shapes(coin, &mut Painter {
            origin: to_screen(world, coin.pos),
            out: &mut out,
        });
    }
    for enemy in world.enemies.iter().filter(|e| e.visible()) {
        enemy_shapes(enemy, &mut Painter {
            origin: to_screen(world, enemy.pos),
            out: &mut out,
        });
    }
    player_shapes(&world.player, &mut Painter {
        origin: to_screen(world, world.player.pos),
        out: &mut out,
    });

    out
}

fn hills(world: &World, out: &mut Vec<DrawRect>) {
    let base = world.viewport.y;
    for i in 0..HILL_COUNT {
        let height = (30.0 + (i % 3) as f32 * 12.0) * SCALE;
        out.push(DrawRect {
            x: i as f32 * HILL_SPACING * SCALE - world.camera.x * HILL_PARALLAX,
            y: base - 32.0 * SCALE - height,
            w: 120.0 * SCALE,
            h: height,
            color: HILLS[i % HILLS.len()],
        });
    }
}

/// Static tiles. Bricks and question blocks are drawn from their entities.
fn tile_shapes(tile: Tile, p: &mut Painter) {
    match tile {
        Tile::Ground => {
            p.rect(0.0, 0.0, TILE, TILE, GROUND);
            p.rect(0.0, 0.0, TILE, 2.0, GRASS);
        }
        Tile::Platform => {
            p.rect(0.0, 0.0, TILE, TILE, PLATFORM);
            p.rect(1.0, 1.0, 6.0, 6.0, PLATFORM_DARK);
            p.rect(9.0, 9.0, 6.0, 6.0, PLATFORM_DARK);
        }
        Tile::PipeTopLeft | Tile::PipeTopRight => {
            p.rect(0.0, 0.0, TILE, TILE, PIPE_TOP);
            p.rect(0.0, TILE - 3.0, TILE, 3.0, PIPE_BODY);
        }
        Tile::PipeBodyLeft => {
            p.rect(2.0, 0.0, TILE - 2.0, TILE, PIPE_BODY);
            p.rect(4.0, 0.0, 2.0, TILE, PIPE_TOP);
        }
        Tile::PipeBodyRight => p.rect(0.0, 0.0, TILE - 2.0, TILE, PIPE_BODY),
        Tile::FlagPole => p.rect(7.0, 0.0, 2.0, TILE, POLE),
        Tile::FlagTop => {
            p.rect(7.0, 0.0, 2.0, TILE, POLE);
            p.rect(-3.0, 2.0, 10.0, 7.0, PENNANT);
        }
        _ => {}
    }
}

fn block_shapes(block: &Block, p: &mut Painter) {
    match block.kind {
        BlockKind::Brick => {
            p.rect(0.0, 0.0, TILE, TILE, BRICK);
            p.rect(0.0, 7.0, TILE, 1.0, BRICK_DARK);
            p.rect(7.0, 0.0, 1.0, 7.0, BRICK_DARK);
            p.rect(3.0, 8.0, 1.0, 8.0, BRICK_DARK);
            p.rect(11.0, 8.0, 1.0, 8.0, BRICK_DARK);
            p.rect(1.0, 1.0, 2.0, 2.0, BRICK_LIGHT);
        }
        BlockKind::Question if block.has_hidden_coin => {
            p.rect(0.0, 0.0, TILE, TILE, QUESTION);
            p.rect(5.0, 3.0, 6.0, 2.0, QUESTION_MARK);
            p.rect(9.0, 5.0, 2.0, 3.0, QUESTION_MARK);
            p.rect(7.0, 8.0, 2.0, 2.0, QUESTION_MARK);
            p.rect(7.0, 11.0, 2.0, 2.0, QUESTION_MARK);
        }
        BlockKind::Question => p.rect(0.0, 0.0, TILE, TILE, QUESTION_USED),
    }
}

fn coin_shapes(coin: &Coin, p: &mut Painter) {
    let lift = -coin.bounce;
    p.rect(-3.0, lift - 5.0, 6.0, 10.0, COIN);
    p.rect(-1.0, lift - 3.0, 2.0, 6.0, COIN_SHINE);
}

fn enemy_shapes(enemy: &Enemy, p: &mut Painter) {
    if enemy.dead {
        p.rect(0.0, enemy.size.y - 4.0, enemy.size.x, 4.0, ENEMY_BODY);
        p.rect(0.0, enemy.size.y - 1.0, enemy.size.x, 1.0, ENEMY_FEET);
        return;
    }
    p.rect(1.0, 1.0, 12.0, 8.0, ENEMY_BODY);
    p.rect(0.0, 9.0, 14.0, 3.0, ENEMY_FEET);
    p.rect(3.0, 3.0, 2.0, 2.0, ENEMY_EYES);
    p.rect(9.0, 3.0, 2.0, 2.0, ENEMY_EYES);
}

fn player_shapes(player: &Player, p: &mut Painter) {
    let shirt = if player.running { SHIRT_RUNNING } else { SHIRT };
    p.rect(3.0, 0.0, 6.0, 4.0, SKIN);
    p.rect(2.0, 4.0, 8.0, 4.0, shirt);
    p.rect(1.0, 8.0, 4.0, 6.0, OVERALLS);
    p.rect(7.0, 8.0, 4.0, 6.0, OVERALLS);
    let eye_x = if player.facing < 0 { 4.0 } else { 6.0 };
    p.rect(eye_x, 1.0, 2.0, 2.0, EYE);
}
