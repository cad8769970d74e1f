#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since board dimensions are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow sign loss when going from signed to unsigned types since we validate values are non-negative before casting
    clippy::cast_sign_loss,
    // Allow potential wrapping when casting between types of same size as we validate values are in range
    clippy::cast_possible_wrap
)]

use log::debug;
use ratatui::style::Color;
use std::time::Duration;

use crate::game::Rules;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl TetrominoType {
    pub const ALL: [TetrominoType; 7] = [
        TetrominoType::I,
        TetrominoType::J,
        TetrominoType::L,
        TetrominoType::O,
        TetrominoType::S,
        TetrominoType::T,
        TetrominoType::Z,
    ];

    /// Uniform pick over all seven types, independent of previous picks.
    #[must_use]
    pub fn random() -> Self {
        Self::ALL[fastrand::usize(..Self::ALL.len())]
    }

    /// Cell value written into the grid for this type (1-7).
    #[must_use]
    pub fn id(self) -> u8 {
        match self {
            TetrominoType::I => 1,
            TetrominoType::J => 2,
            TetrominoType::L => 3,
            TetrominoType::O => 4,
            TetrominoType::S => 5,
            TetrominoType::T => 6,
            TetrominoType::Z => 7,
        }
    }

    #[must_use]
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }

    /// Rotation-0 occupancy matrix, rows top to bottom.
    #[must_use]
    pub fn matrix(self) -> &'static [&'static [bool]] {
        const X: bool = true;
        const O: bool = false;
        match self {
            TetrominoType::I => &[&[X, X, X, X]],
            TetrominoType::J => &[&[X, O, O], &[X, X, X]],
            TetrominoType::L => &[&[O, O, X], &[X, X, X]],
            TetrominoType::O => &[&[X, X], &[X, X]],
            TetrominoType::S => &[&[O, X, X], &[X, X, O]],
            TetrominoType::T => &[&[O, X, O], &[X, X, X]],
            TetrominoType::Z => &[&[X, X, O], &[O, X, X]],
        }
    }

    #[must_use]
    pub fn get_color(self) -> Color {
        match self {
            TetrominoType::I => Color::Cyan,
            TetrominoType::J => Color::Blue,
            TetrominoType::L => Color::Rgb(255, 165, 0),
            TetrominoType::O => Color::Yellow,
            TetrominoType::S => Color::Green,
            TetrominoType::T => Color::Magenta,
            TetrominoType::Z => Color::Red,
        }
    }
}

/// A rectangular piece matrix. Every occupied cell belongs to `kind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub kind: TetrominoType,
    cells: Vec<Vec<bool>>,
}

impl Shape {
    #[must_use]
    pub fn new(kind: TetrominoType) -> Self {
        Self {
            kind,
            cells: kind.matrix().iter().map(|row| row.to_vec()).collect(),
        }
    }

    #[must_use]
    pub fn random() -> Self {
        Self::new(TetrominoType::random())
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.cells
    }

    /// Offsets `(dx, dy)` of the occupied cells relative to the top-left corner.
    pub fn blocks(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, occupied)| **occupied)
                .map(move |(dx, _)| (dx, dy))
        })
    }

    /// Clockwise quarter turn: an R x C matrix becomes C x R with
    /// `out[i][j] = in[R - 1 - j][i]`.
    #[must_use]
    pub fn rotated_cw(&self) -> Self {
        let rows = self.height();
        let cols = self.width();
        let cells = (0..cols)
            .map(|i| (0..rows).map(|j| self.cells[rows - 1 - j][i]).collect())
            .collect();
        Self {
            kind: self.kind,
            cells,
        }
    }
}

/// The falling piece; `(x, y)` is the grid position of the shape's top-left cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    #[must_use]
    pub fn new(shape: Shape, x: i32, y: i32) -> Self {
        Self { shape, x, y }
    }

    /// Absolute grid coordinates of the occupied cells.
    pub fn get_blocks(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape
            .blocks()
            .map(|(dx, dy)| (self.x + dx as i32, self.y + dy as i32))
    }
}

/// Settled blocks, indexed `cells[y][x]` with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    cells: Vec<Vec<Option<TetrominoType>>>,
}

impl Board {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![None; width]; height],
        }
    }

    pub fn clear(&mut self) {
        for row in &mut self.cells {
            row.fill(None);
        }
    }

    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<TetrominoType> {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    pub fn set(&mut self, x: usize, y: usize, value: Option<TetrominoType>) {
        if let Some(cell) = self.cells.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = value;
        }
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<TetrominoType>>] {
        &self.cells
    }

    /// Cell lookup where anything outside `[0, width) x [0, height)` reads as occupied.
    #[must_use]
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(x), Ok(y)) if x < self.width && y < self.height => self.cells[y][x].is_some(),
            _ => true,
        }
    }

    #[must_use]
    pub fn collides(&self, piece: &Piece) -> bool {
        piece.get_blocks().any(|(x, y)| self.is_blocked(x, y))
    }

    /// Writes the piece's type into every cell it covers.
    pub fn merge(&mut self, piece: &Piece) {
        debug_assert!(!self.collides(piece), "merging a colliding piece");
        let kind = piece.shape.kind;
        for (x, y) in piece.get_blocks() {
            if let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) {
                self.set(x, y, Some(kind));
            }
        }
    }

    fn is_row_full(&self, y: usize) -> bool {
        self.cells[y].iter().all(Option::is_some)
    }

    /// Removes every full row, inserting an empty row at the top for each.
    /// Scans bottom-up and re-checks the same index after a removal.
    pub fn sweep(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.height;
        while y > 0 {
            let row = y - 1;
            if self.is_row_full(row) {
                self.cells.remove(row);
                self.cells.insert(0, vec![None; self.width]);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }
}

/// Outcome of applying a lock event's cleared rows to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreEvent {
    pub points: u32,
    pub leveled_up: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub score: u32,
    pub level: u32,
    pub lines_cleared: u32,
    pub drop_interval: Duration,
    rules: Rules,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Rules::default())
    }
}

impl GameState {
    #[must_use]
    pub fn new(rules: Rules) -> Self {
        Self {
            score: 0,
            level: crate::game::STARTING_LEVEL,
            lines_cleared: 0,
            drop_interval: rules.initial_drop_interval,
            rules,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.rules);
    }

    /// Scores one lock event. At most one level-up happens per call, even when
    /// the cleared rows cross more than one threshold.
    pub fn apply_lines(&mut self, rows_cleared: usize) -> ScoreEvent {
        if rows_cleared == 0 {
            return ScoreEvent::default();
        }

        let rows = u32::try_from(rows_cleared).unwrap_or(u32::MAX);
        let points = rows
            .saturating_mul(self.rules.points_per_line)
            .saturating_mul(self.level);
        self.score = self.score.saturating_add(points);
        self.lines_cleared = self.lines_cleared.saturating_add(rows);

        let leveled_up = self.lines_cleared >= self.level * self.rules.lines_per_level;
        if leveled_up {
            self.level += 1;
            self.drop_interval = self
                .drop_interval
                .saturating_sub(self.rules.drop_interval_step)
                .max(self.rules.min_drop_interval);
            debug!(
                "Level up to {} (drop interval {:?})",
                self.level, self.drop_interval
            );
        }

        ScoreEvent { points, leveled_up }
    }
}
