//! Collision resolution between moving boxes and the tile grid
//!
//! Bodies are swept one logical unit at a time, horizontal axis first, so a
//! fast body can never skip over a one-tile wall. On contact the body snaps to
//! the tile face (inset by `CONTACT_EPSILON`) and stops for that axis.

use glam::Vec2;

use super::level::Grid;
use crate::cell_of;
use crate::consts::{CONTACT_EPSILON, TILE};

/// Axis-aligned box, positioned by its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.pos.x < other.pos.x + other.size.x
            && self.pos.x + self.size.x > other.pos.x
            && self.pos.y < other.pos.y + other.size.y
            && self.pos.y + self.size.y > other.pos.y
    }
}

/// Receives head-on hits from below, at the struck tile's top-left
pub trait BumpHandler {
    fn bump(&mut self, tile_pos: Vec2);
}

/// Bump handler for bodies that cannot bump blocks
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBumps;

impl BumpHandler for NoBumps {
    fn bump(&mut self, _tile_pos: Vec2) {}
}

/// Outcome of a sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved {
    pub pos: Vec2,
    /// Landed on a solid tile while moving down
    pub hit_bottom: bool,
}

/// Inclusive range of cells covered by `[start, start + len]`
#[inline]
fn cell_span(start: f32, len: f32) -> std::ops::RangeInclusive<i32> {
    cell_of(start)..=cell_of(start + len)
}

/// Solid columns touched by a box at `pos`
fn solid_columns(grid: &Grid, pos: Vec2, size: Vec2) -> impl Iterator<Item = i32> + '_ {
    let rows = cell_span(pos.y, size.y);
    cell_span(pos.x, size.x).filter(move |&col| rows.clone().any(|row| grid.is_solid_at(col, row)))
}

/// Solid rows touched by a box at `pos`
fn solid_rows(grid: &Grid, pos: Vec2, size: Vec2) -> impl Iterator<Item = i32> + '_ {
    let cols = cell_span(pos.x, size.x);
    cell_span(pos.y, size.y).filter(move |&row| cols.clone().any(|col| grid.is_solid_at(col, row)))
}

/// Unit step lengths covering `distance` (last step may be partial)
fn unit_steps(distance: f32) -> impl Iterator<Item = f32> {
    let count = distance.abs().ceil() as u32;
    let mut remaining = distance.abs();
    (0..count).map(move |_| {
        let step = remaining.min(1.0);
        remaining -= step;
        step
    })
}

fn sweep_x(grid: &Grid, body: &Aabb, dx: f32) -> f32 {
    let sign = dx.signum();
    let mut x = body.pos.x;

    for step in unit_steps(dx) {
        x += sign * step;
        let probe = Vec2::new(x, body.pos.y);
        let hit = if sign > 0.0 {
            solid_columns(grid, probe, body.size).min()
        } else {
            solid_columns(grid, probe, body.size).max()
        };
        if let Some(col) = hit {
            x = if sign > 0.0 {
                col as f32 * TILE - body.size.x - CONTACT_EPSILON
            } else {
                (col + 1) as f32 * TILE + CONTACT_EPSILON
            };
            break;
        }
    }

    x
}

fn sweep_y<H: BumpHandler + ?Sized>(grid: &Grid, body: &Aabb, x: f32, dy: f32, bumps: &mut H) -> (f32, bool) {
    let sign = dy.signum();
    let mut y = body.pos.y;

    for step in unit_steps(dy) {
        y += sign * step;
        let probe = Vec2::new(x, y);
        if sign > 0.0 {
            if let Some(row) = solid_rows(grid, probe, body.size).min() {
                return (row as f32 * TILE - body.size.y - CONTACT_EPSILON, true);
            }
        } else if let Some(row) = solid_rows(grid, probe, body.size).max() {
            // Every solid cell along the head row gets bumped this tick
            for col in cell_span(x, body.size.x) {
                if grid.is_solid_at(col, row) {
                    bumps.bump(Vec2::new(col as f32 * TILE, row as f32 * TILE));
                }
            }
            return ((row + 1) as f32 * TILE + CONTACT_EPSILON, false);
        }
    }

    (y, false)
}

/// Sweep `body` by `delta` against the grid
///
/// Horizontal displacement is resolved first; the vertical sweep then runs
/// from the resolved x. Hitting a tile from below reports it to `bumps`.
pub fn resolve<H: BumpHandler + ?Sized>(grid: &Grid, body: &Aabb, delta: Vec2, bumps: &mut H) -> Resolved {
    let x = if delta.x != 0.0 { sweep_x(grid, body, delta.x) } else { body.pos.x };

    let (y, hit_bottom) = if delta.y != 0.0 {
        sweep_y(grid, body, x, delta.y, bumps)
    } else {
        (body.pos.y, false)
    };

    Resolved {
        pos: Vec2::new(x, y),
        hit_bottom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every bumped tile
    #[derive(Default)]
    struct Recorder(Vec<Vec2>);

    impl BumpHandler for Recorder {
        fn bump(&mut self, tile_pos: Vec2) {
            self.0.push(tile_pos);
        }
    }

    fn arena() -> Grid {
        // 10 x 8, ground on rows 6-7, a brick at (4, 2), a wall at col 8
        Grid::from_rows(&[
            "..........",
            "........#.",
            "....B...#.",
            "........#.",
            "........#.",
            "........#.",
            "##########",
            "##########",
        ])
        .unwrap()
    }

    fn body(x: f32, y: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(12.0, 14.0))
    }

    #[test]
    fn test_stationary_body_is_unchanged() {
        let grid = arena();
        let b = body(20.0, 40.0);
        let mut rec = Recorder::default();
        let r = resolve(&grid, &b, Vec2::ZERO, &mut rec);
        assert_eq!(r.pos, b.pos);
        assert!(!r.hit_bottom);
        assert!(rec.0.is_empty());
    }

    #[test]
    fn test_landing_snaps_to_tile_top() {
        let grid = arena();
        let b = body(20.0, 75.0);
        let r = resolve(&grid, &b, Vec2::new(0.0, 10.0), &mut NoBumps);
        assert!(r.hit_bottom);
        assert!((r.pos.y + 14.0 - 6.0 * TILE).abs() < 0.02);
    }

    #[test]
    fn test_free_fall_without_contact() {
        let grid = arena();
        let b = body(20.0, 20.0);
        let r = resolve(&grid, &b, Vec2::new(0.0, 5.5), &mut NoBumps);
        assert!(!r.hit_bottom);
        assert!((r.pos.y - 25.5).abs() < 1e-4);
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let grid = arena();
        let b = body(110.0, 70.0);
        let r = resolve(&grid, &b, Vec2::new(9.0, 0.0), &mut NoBumps);
        assert!((r.pos.x + 12.0 - 8.0 * TILE).abs() < 0.02);
        assert_eq!(r.pos.y, 70.0);

        // pressed against the wall, a second push stays put
        let again = resolve(&grid, &Aabb::new(r.pos, b.size), Vec2::new(3.0, 0.0), &mut NoBumps);
        assert!((again.pos.x - r.pos.x).abs() < 1e-4);
    }

    #[test]
    fn test_leftward_into_map_edge() {
        let grid = arena();
        let b = body(2.0, 70.0);
        let r = resolve(&grid, &b, Vec2::new(-5.0, 0.0), &mut NoBumps);
        assert!((r.pos.x - CONTACT_EPSILON).abs() < 1e-4);
    }

    #[test]
    fn test_head_hit_bumps_block() {
        let grid = arena();
        // under the brick at (4, 2): brick bottom is y = 48
        let b = body(66.0, 52.0);
        let mut rec = Recorder::default();
        let r = resolve(&grid, &b, Vec2::new(0.0, -8.0), &mut rec);
        assert!(!r.hit_bottom);
        assert!((r.pos.y - (48.0 + CONTACT_EPSILON)).abs() < 1e-4);
        assert_eq!(rec.0, vec![Vec2::new(64.0, 32.0)]);
    }

    #[test]
    fn test_fast_fall_does_not_tunnel() {
        let grid = Grid::from_rows(&["....", "....", "....", "====", "....", "....", "....", "...."]).unwrap();
        let b = body(10.0, 10.0);
        let r = resolve(&grid, &b, Vec2::new(0.0, 40.0), &mut NoBumps);
        assert!(r.hit_bottom);
        assert!(r.pos.y + 14.0 <= 3.0 * TILE);
    }

    #[test]
    fn test_overlap_is_strict() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(10.0));
        assert!(a.overlaps(&Aabb::new(Vec2::splat(9.0), Vec2::splat(10.0))));
        assert!(!a.overlaps(&Aabb::new(Vec2::new(10.0, 0.0), Vec2::splat(10.0))));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn inside_solid(grid: &Grid, b: &Aabb) -> bool {
            cell_span(b.pos.x, b.size.x).any(|c| cell_span(b.pos.y, b.size.y).any(|r| grid.is_solid_at(c, r)))
        }

        proptest! {
            #[test]
            fn sweep_never_ends_inside_solid(
                x in 2.0f32..100.0,
                y in 0.0f32..60.0,
                dx in -20.0f32..20.0,
                dy in -20.0f32..20.0,
            ) {
                let grid = arena();
                let b = body(x, y);
                prop_assume!(!inside_solid(&grid, &b));
                let r = resolve(&grid, &b, Vec2::new(dx, dy), &mut NoBumps);
                prop_assert!(!inside_solid(&grid, &Aabb::new(r.pos, b.size)));
            }
        }
    }
}
