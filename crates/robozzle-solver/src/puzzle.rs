//! Puzzle board types: colored cells, stars, and the robot's start.
//!
//! The solving engine only ever reads a [`Puzzle`]. Mutation goes through
//! the setters here so the star count stays in sync with the grid.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Cell color. An unpainted cell is represented as `None` wherever an
/// `Option<TileColor>` appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileColor {
    Red,
    Green,
    Blue,
}

impl TileColor {
    pub const ALL: [TileColor; 3] = [TileColor::Red, TileColor::Green, TileColor::Blue];

    /// Two-bit color code used by the text format (0 is unpainted).
    pub fn code(self) -> u8 {
        match self {
            TileColor::Red => 1,
            TileColor::Green => 2,
            TileColor::Blue => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<TileColor> {
        match code & 0b11 {
            1 => Some(TileColor::Red),
            2 => Some(TileColor::Green),
            3 => Some(TileColor::Blue),
            _ => None,
        }
    }
}

/// Facing direction. Indices run clockwise starting at `Up = 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub fn from_index(index: u8) -> Option<Direction> {
        match index {
            0 => Some(Direction::Up),
            1 => Some(Direction::Right),
            2 => Some(Direction::Down),
            3 => Some(Direction::Left),
            _ => None,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    pub fn turn_left(self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    pub fn turn_right(self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Position on the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring position one step towards `direction`.
    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x + dx, self.y + dy)
    }
}

/// A single cell of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile {
    pub color: Option<TileColor>,
    #[serde(rename = "hasStar")]
    pub has_star: bool,
}

impl Tile {
    pub fn new(color: TileColor, has_star: bool) -> Self {
        Self {
            color: Some(color),
            has_star,
        }
    }
}

/// Number of painted cells per color, as returned by [`Puzzle::color_counts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorCounts {
    pub red: usize,
    pub green: usize,
    pub blue: usize,
}

impl ColorCounts {
    /// How many of the three colors appear at least once.
    pub fn distinct(&self) -> usize {
        [self.red, self.green, self.blue]
            .iter()
            .filter(|&&count| count > 0)
            .count()
    }
}

/// A rectangular puzzle board with a robot start.
#[derive(Debug, Clone)]
pub struct Puzzle {
    width: usize,
    height: usize,
    /// Row-major, `width * height` entries.
    tiles: Vec<Tile>,
    star_count: usize,
    start: Position,
    start_direction: Direction,
}

impl Puzzle {
    /// Create an unpainted, starless board. Panics if either side is zero.
    pub fn new(width: usize, height: usize, start: Position, start_direction: Direction) -> Self {
        assert!(width > 0 && height > 0, "puzzle dimensions must be positive");
        Self {
            width,
            height,
            tiles: vec![Tile::default(); width * height],
            star_count: 0,
            start,
            start_direction,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn star_count(&self) -> usize {
        self.star_count
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn start_direction(&self) -> Direction {
        self.start_direction
    }

    pub fn set_start(&mut self, start: Position) {
        self.start = start;
    }

    pub fn set_start_direction(&mut self, direction: Direction) {
        self.start_direction = direction;
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    /// Flat index of an in-bounds position.
    pub(crate) fn index_of(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.y as usize * self.width + pos.x as usize)
        } else {
            None
        }
    }

    /// Get the tile at a position (bounds-checked)
    pub fn tile(&self, pos: Position) -> Option<&Tile> {
        self.index_of(pos).map(|i| &self.tiles[i])
    }

    /// Color of the cell at `pos`; `None` when unpainted or out of bounds.
    pub fn color_at(&self, pos: Position) -> Option<TileColor> {
        self.tile(pos).and_then(|t| t.color)
    }

    pub fn has_star(&self, pos: Position) -> bool {
        self.tile(pos).is_some_and(|t| t.has_star)
    }

    /// Paint a cell. Out-of-bounds positions are ignored.
    pub fn set_color(&mut self, pos: Position, color: Option<TileColor>) {
        if let Some(i) = self.index_of(pos) {
            self.tiles[i].color = color;
        }
    }

    /// Place or remove a star, keeping the star count current.
    pub fn set_star(&mut self, pos: Position, has_star: bool) {
        let Some(i) = self.index_of(pos) else {
            return;
        };
        let tile = &mut self.tiles[i];
        if tile.has_star {
            self.star_count -= 1;
        }
        tile.has_star = has_star;
        if tile.has_star {
            self.star_count += 1;
        }
    }

    /// Count cells of each color
    pub fn color_counts(&self) -> ColorCounts {
        let mut counts = ColorCounts::default();
        for tile in &self.tiles {
            match tile.color {
                Some(TileColor::Red) => counts.red += 1,
                Some(TileColor::Green) => counts.green += 1,
                Some(TileColor::Blue) => counts.blue += 1,
                None => {}
            }
        }
        counts
    }

    /// Check the board is ready for solving.
    ///
    /// The interpreter assumes this holds; drivers call it before searching.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.star_count == 0 {
            return Err(ConfigError::NoStars);
        }
        let Position { x, y } = self.start;
        if !self.in_bounds(self.start) {
            return Err(ConfigError::StartOutOfBounds { x, y });
        }
        if self.color_at(self.start).is_none() {
            return Err(ConfigError::StartUnpainted { x, y });
        }
        Ok(())
    }

    pub fn is_valid_configuration(&self) -> bool {
        self.validate().is_ok()
    }
}
