//! Static tile map
//!
//! The level is a rectangular grid of tile symbols built once at startup.
//! Anything outside the grid reads as ground so sweeps can never leave the map.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{LEVEL_HEIGHT, LEVEL_WIDTH, TILE};

/// One grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Ground,
    Brick,
    Question,
    /// Coin spawn marker (not solid, becomes a `Coin` entity)
    CoinMarker,
    Platform,
    PipeTopLeft,
    PipeTopRight,
    PipeBodyLeft,
    PipeBodyRight,
    FlagPole,
    FlagTop,
    /// Enemy spawn marker (the enemy appears one tile above)
    EnemySpawn,
    PlayerStart,
}

impl Tile {
    /// Parse a legend symbol
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            '.' => Tile::Empty,
            '#' => Tile::Ground,
            'B' => Tile::Brick,
            '?' => Tile::Question,
            'C' => Tile::CoinMarker,
            '=' => Tile::Platform,
            'P' => Tile::PipeTopLeft,
            'p' => Tile::PipeTopRight,
            '|' => Tile::PipeBodyLeft,
            '!' => Tile::PipeBodyRight,
            'F' => Tile::FlagPole,
            'T' => Tile::FlagTop,
            'G' => Tile::EnemySpawn,
            'M' => Tile::PlayerStart,
            _ => return None,
        })
    }

    pub fn as_char(self) -> char {
        match self {
            Tile::Empty => '.',
            Tile::Ground => '#',
            Tile::Brick => 'B',
            Tile::Question => '?',
            Tile::CoinMarker => 'C',
            Tile::Platform => '=',
            Tile::PipeTopLeft => 'P',
            Tile::PipeTopRight => 'p',
            Tile::PipeBodyLeft => '|',
            Tile::PipeBodyRight => '!',
            Tile::FlagPole => 'F',
            Tile::FlagTop => 'T',
            Tile::EnemySpawn => 'G',
            Tile::PlayerStart => 'M',
        }
    }

    /// Whether this tile blocks movement
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(
            self,
            Tile::Ground
                | Tile::Brick
                | Tile::Question
                | Tile::Platform
                | Tile::PipeTopLeft
                | Tile::PipeTopRight
                | Tile::PipeBodyLeft
                | Tile::PipeBodyRight
                | Tile::FlagPole
        )
    }
}

/// Free-function form of [`Tile::is_solid`]
#[inline]
pub fn is_solid(tile: Tile) -> bool {
    tile.is_solid()
}

/// Grid construction failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelError {
    Empty,
    Ragged { row: usize, expected: usize, found: usize },
    UnknownSymbol { row: usize, col: usize, symbol: char },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Empty => write!(f, "level has no tiles"),
            LevelError::Ragged { row, expected, found } => {
                write!(f, "row {row} has {found} tiles, expected {expected}")
            }
            LevelError::UnknownSymbol { row, col, symbol } => {
                write!(f, "unknown tile symbol {symbol:?} at row {row}, col {col}")
            }
        }
    }
}

impl std::error::Error for LevelError {}

/// Rectangular tile map, row-major
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// A grid filled with `Tile::Empty`
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; width * height],
        }
    }

    /// Parse a grid from legend rows (top row first)
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(LevelError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != width {
                return Err(LevelError::Ragged { row, expected: width, found });
            }
            for (col, symbol) in line.chars().enumerate() {
                let tile = Tile::from_char(symbol).ok_or(LevelError::UnknownSymbol { row, col, symbol })?;
                tiles.push(tile);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Level width in logical units
    #[inline]
    pub fn pixel_width(&self) -> f32 {
        self.width as f32 * TILE
    }

    /// Tile at (col, row); out-of-bounds reads as ground
    pub fn tile_at(&self, col: i32, row: i32) -> Tile {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return Tile::Ground;
        }
        self.tiles[row as usize * self.width + col as usize]
    }

    #[inline]
    pub fn is_solid_at(&self, col: i32, row: i32) -> bool {
        self.tile_at(col, row).is_solid()
    }

    /// Overwrite a cell; out-of-bounds writes are dropped
    pub fn set(&mut self, col: usize, row: usize, tile: Tile) {
        if col < self.width && row < self.height {
            self.tiles[row * self.width + col] = tile;
        }
    }

    /// Iterate all cells as (col, row, tile)
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, Tile)> + '_ {
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, &t)| (i % self.width, i / self.width, t))
    }

    /// Render back to legend rows
    pub fn to_rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width)
            .map(|row| row.iter().map(|t| t.as_char()).collect())
            .collect()
    }

    /// Scan markers and interactive tiles into spawn positions
    pub fn spawns(&self) -> SpawnTable {
        let mut table = SpawnTable {
            player: Vec2::new(3.0 * TILE, 10.0 * TILE),
            enemies: Vec::new(),
            coins: Vec::new(),
            blocks: Vec::new(),
            flag_x: None,
        };

        for (col, row, tile) in self.cells() {
            let x = col as f32 * TILE;
            let y = row as f32 * TILE;
            match tile {
                Tile::CoinMarker => table.coins.push(Vec2::new(x + TILE / 2.0, y + TILE / 2.0)),
                Tile::EnemySpawn => table.enemies.push(Vec2::new(x, y - TILE)),
                Tile::Brick => table.blocks.push((Vec2::new(x, y), BlockKind::Brick)),
                Tile::Question => table.blocks.push((Vec2::new(x, y), BlockKind::Question)),
                Tile::PlayerStart => table.player = Vec2::new(x, y),
                Tile::FlagPole | Tile::FlagTop => {
                    table.flag_x = Some(table.flag_x.map_or(x, |f: f32| f.min(x)));
                }
                _ => {}
            }
        }

        table
    }
}

/// Free-function form of [`Grid::tile_at`]
#[inline]
pub fn tile_at(grid: &Grid, col: i32, row: i32) -> Tile {
    grid.tile_at(col, row)
}

/// Interactive block flavour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Brick,
    /// Holds one hidden coin
    Question,
}

/// Spawn positions scanned from a grid, in row-major order
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTable {
    /// Top-left of the player hitbox
    pub player: Vec2,
    /// Top-left of each enemy hitbox
    pub enemies: Vec<Vec2>,
    /// Coin centres
    pub coins: Vec<Vec2>,
    /// Top-left of each block tile
    pub blocks: Vec<(Vec2, BlockKind)>,
    /// Left edge of the flag column; `None` means the level cannot be won
    pub flag_x: Option<f32>,
}

/// Build the fixed level layout
pub fn build_level() -> Grid {
    let w = LEVEL_WIDTH;
    let h = LEVEL_HEIGHT;
    let mut grid = Grid::empty(w, h);

    // Ground strip
    for x in 0..w {
        for y in h - 2..h {
            grid.set(x, y, Tile::Ground);
        }
    }

    // Start area
    grid.set(2, 11, Tile::PlayerStart);
    grid.set(14, 8, Tile::Question);
    grid.set(15, 8, Tile::Brick);
    grid.set(16, 8, Tile::Question);
    grid.set(18, 8, Tile::Brick);
    grid.set(18, 7, Tile::CoinMarker);

    // Staircases
    for i in 0..4 {
        grid.set(28 + i, 12 - i, Tile::Platform);
    }
    for i in 0..3 {
        grid.set(48 + i, 12 - i, Tile::Platform);
    }

    // Pipes
    place_pipe(&mut grid, 60, 12, 2);
    place_pipe(&mut grid, 76, 12, 3);
    place_pipe(&mut grid, 92, 12, 4);

    // Mid section
    grid.set(110, 7, Tile::Question);
    grid.set(114, 7, Tile::Question);
    grid.set(118, 7, Tile::Question);
    grid.set(114, 6, Tile::CoinMarker);
    grid.set(130, 10, Tile::Brick);
    grid.set(136, 8, Tile::CoinMarker);
    for x in (145..155).step_by(2) {
        grid.set(x, 6, Tile::CoinMarker);
    }

    // Enemies
    for x in [40, 65, 100, 150, 190] {
        grid.set(x, 12, Tile::EnemySpawn);
    }

    // Floating platforms
    for x in 160..168 {
        grid.set(x, 9, Tile::Platform);
    }
    for x in 170..177 {
        grid.set(x, 7, Tile::Platform);
    }
    for x in 182..189 {
        grid.set(x, 9, Tile::Platform);
    }

    // Blocks over the platforms
    grid.set(172, 8, Tile::Question);
    grid.set(173, 8, Tile::Question);
    grid.set(174, 8, Tile::Question);
    grid.set(173, 7, Tile::CoinMarker);

    // Final staircase
    for i in 0..6 {
        for s in 0..=i {
            grid.set(212 + i, 13 - s, Tile::Platform);
        }
    }

    // Flag
    grid.set(236, 3, Tile::FlagTop);
    for y in 4..=13 {
        grid.set(236, y, Tile::FlagPole);
    }

    // Final run
    for x in 240..w {
        grid.set(x, 13, Tile::Platform);
    }

    grid
}

/// Place a two-wide pipe whose top sits on `top_row`
fn place_pipe(grid: &mut Grid, col: usize, top_row: usize, height: usize) {
    grid.set(col, top_row, Tile::PipeTopLeft);
    grid.set(col + 1, top_row, Tile::PipeTopRight);
    for i in 1..height {
        grid.set(col, top_row + i, Tile::PipeBodyLeft);
        grid.set(col + 1, top_row + i, Tile::PipeBodyRight);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_dimensions() {
        let grid = build_level();
        assert_eq!(grid.width(), LEVEL_WIDTH);
        assert_eq!(grid.height(), LEVEL_HEIGHT);
        assert!(grid.to_rows().iter().all(|r| r.chars().count() == LEVEL_WIDTH));
    }

    #[test]
    fn test_level_is_deterministic() {
        assert_eq!(build_level(), build_level());
    }

    #[test]
    fn test_level_landmarks() {
        let grid = build_level();
        assert_eq!(grid.tile_at(0, 15), Tile::Ground);
        assert_eq!(grid.tile_at(2, 11), Tile::PlayerStart);
        assert_eq!(grid.tile_at(14, 8), Tile::Question);
        assert_eq!(grid.tile_at(60, 12), Tile::PipeTopLeft);
        assert_eq!(grid.tile_at(60, 13), Tile::PipeBodyLeft);
        assert_eq!(grid.tile_at(60, 14), Tile::Ground);
        // the tallest pipe runs through the ground strip
        assert_eq!(grid.tile_at(93, 15), Tile::PipeBodyRight);
        assert_eq!(grid.tile_at(236, 3), Tile::FlagTop);
        assert_eq!(grid.tile_at(236, 13), Tile::FlagPole);
        assert_eq!(grid.tile_at(217, 8), Tile::Platform);
    }

    #[test]
    fn test_spawn_table() {
        let spawns = build_level().spawns();
        assert_eq!(spawns.player, Vec2::new(32.0, 176.0));
        assert_eq!(spawns.enemies.len(), 5);
        assert_eq!(spawns.enemies[0], Vec2::new(640.0, 176.0));
        // 1 + 1 + 1 + 5 + 1 coin markers
        assert_eq!(spawns.coins.len(), 9);
        assert_eq!(spawns.coins[0], Vec2::new(114.0 * TILE + 8.0, 6.0 * TILE + 8.0));
        let questions = spawns.blocks.iter().filter(|(_, k)| *k == BlockKind::Question).count();
        assert_eq!(questions, 8);
        assert_eq!(spawns.blocks.len(), 11);
        assert_eq!(spawns.flag_x, Some(236.0 * TILE));
    }

    #[test]
    fn test_solid_classifier() {
        assert!(is_solid(Tile::Ground));
        assert!(is_solid(Tile::FlagPole));
        assert!(is_solid(Tile::PipeBodyRight));
        assert!(!is_solid(Tile::FlagTop));
        assert!(!is_solid(Tile::CoinMarker));
        assert!(!is_solid(Tile::EnemySpawn));
        assert!(!is_solid(Tile::PlayerStart));
        assert!(!is_solid(Tile::Empty));
    }

    #[test]
    fn test_from_rows_round_trip() {
        let rows = ["..C.", "M.?G", "####"];
        let grid = Grid::from_rows(&rows).unwrap();
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn test_from_rows_errors() {
        let empty: [&str; 0] = [];
        assert_eq!(Grid::from_rows(&empty), Err(LevelError::Empty));
        assert_eq!(
            Grid::from_rows(&["...", ".."]),
            Err(LevelError::Ragged { row: 1, expected: 3, found: 2 })
        );
        assert_eq!(
            Grid::from_rows(&["..x"]),
            Err(LevelError::UnknownSymbol { row: 0, col: 2, symbol: 'x' })
        );
    }

    #[test]
    fn test_default_player_start() {
        let grid = Grid::from_rows(&["....", "####"]).unwrap();
        let spawns = grid.spawns();
        assert_eq!(spawns.player, Vec2::new(48.0, 160.0));
        assert_eq!(spawns.flag_x, None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn out_of_bounds_is_solid(col in -500i32..800, row in -100i32..100) {
                let grid = build_level();
                let inside = (0..grid.width() as i32).contains(&col)
                    && (0..grid.height() as i32).contains(&row);
                prop_assume!(!inside);
                prop_assert_eq!(tile_at(&grid, col, row), Tile::Ground);
                prop_assert!(grid.is_solid_at(col, row));
            }
        }
    }
}
