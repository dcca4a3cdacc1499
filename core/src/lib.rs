use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use generator::*;
pub use tile::*;
pub use types::*;

mod engine;
mod error;
mod generator;
mod tile;
mod types;

/// Cell value marking a mine on the board grid.
pub const MINE: i8 = -1;

/// Shape, mine count, and assist budgets for one game.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub mines: CellCount,
    pub guesses: u8,
    pub flag_guesses: u8,
}

impl GameConfig {
    pub const fn new(
        rows: Coord,
        cols: Coord,
        mines: CellCount,
        guesses: u8,
        flag_guesses: u8,
    ) -> Self {
        Self {
            rows,
            cols,
            mines,
            guesses,
            flag_guesses,
        }
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.rows, self.cols)
    }

    /// Hard placement ceiling: the 4 corners never hold mines.
    pub const fn max_mines(&self) -> CellCount {
        self.total_cells().saturating_sub(4)
    }

    /// Mine-count ceiling the input layer conventionally enforces before
    /// asking for a board, well below the hard ceiling.
    pub const fn suggested_mine_limit(&self) -> CellCount {
        self.total_cells().div_ceil(3)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        if self.mines > self.max_mines() {
            return Err(GameError::TooManyMines);
        }
        Ok(())
    }

    /// Fraction of cells holding a mine.
    pub fn mine_density(&self) -> f64 {
        f64::from(self.mines) / f64::from(self.total_cells())
    }

    /// Difficulty score scaling the mine density against the board area.
    /// Degenerately sparse boards score 0.
    pub fn difficulty(&self) -> u32 {
        let multiplier = 1.0 + (self.mine_density() - 0.1) / (0.33 - 0.1) * 12.0;
        (multiplier * f64::from(self.total_cells()) / 13.0).floor() as u32
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(10, 10, 15, 3, 0)
    }
}

/// Immutable rows x cols grid of cell values: [`MINE`], or the `0..=8` count
/// of mined cells among the up-to-8 neighbors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    values: Array2<i8>,
    mine_count: CellCount,
}

impl Board {
    /// Builds a board from a grid holding only [`MINE`] markers, filling in
    /// the adjacency counts of every non-mine cell.
    pub(crate) fn from_mine_grid(mut values: Array2<i8>) -> Self {
        let size = grid_size(&values);
        let mut mine_count = 0;
        for coords in iter_coords(size) {
            if values[coords.to_nd_index()] == MINE {
                mine_count += 1;
            }
        }
        for coords in iter_coords(size) {
            if values[coords.to_nd_index()] != MINE {
                let adjacent = neighbors(coords, size)
                    .filter(|&pos| values[pos.to_nd_index()] == MINE)
                    .count();
                values[coords.to_nd_index()] = adjacent as i8;
            }
        }
        Self { values, mine_count }
    }

    /// Builds a board with mines at exactly the given positions; adjacency
    /// counts are derived. Intended for tests and replays.
    pub fn with_mines(rows: Coord, cols: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GameError::EmptyBoard);
        }
        let mut values = Array2::zeros((usize::from(rows), usize::from(cols)));
        for &coords in mine_coords {
            if coords.0 >= rows || coords.1 >= cols {
                return Err(GameError::InvalidCoords);
            }
            values[coords.to_nd_index()] = MINE;
        }
        Ok(Self::from_mine_grid(values))
    }

    /// Validates an externally supplied grid: every non-mine value must equal
    /// its true mined-neighbor count.
    pub fn from_values(values: Array2<i8>) -> Result<Self> {
        let dim = values.dim();
        if dim.0 == 0 || dim.1 == 0 {
            return Err(GameError::EmptyBoard);
        }
        if dim.0 > usize::from(Coord::MAX) || dim.1 > usize::from(Coord::MAX) {
            return Err(GameError::InvalidBoardValues);
        }

        let board = Self::from_mine_grid(values.mapv(|v| if v == MINE { MINE } else { 0 }));
        if board.values == values {
            Ok(board)
        } else {
            Err(GameError::InvalidBoardValues)
        }
    }

    pub fn size(&self) -> Coord2 {
        grid_size(&self.values)
    }

    pub fn total_cells(&self) -> CellCount {
        let size = self.size();
        mult(size.0, size.1)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn in_bounds(&self, coords: Coord2) -> bool {
        let size = self.size();
        coords.0 < size.0 && coords.1 < size.1
    }

    pub fn value(&self, coords: Coord2) -> i8 {
        self.values[coords.to_nd_index()]
    }

    pub fn is_mine(&self, coords: Coord2) -> bool {
        self.value(coords) == MINE
    }

    /// Mined-cell count among the up-to-8 neighbors, recomputed from the
    /// grid. For non-mine cells this equals [`Board::value`].
    pub fn adjacent_mines(&self, coords: Coord2) -> u8 {
        self.neighbors(coords)
            .filter(|&pos| self.is_mine(pos))
            .count() as u8
    }

    pub fn neighbors(&self, coords: Coord2) -> impl Iterator<Item = Coord2> + use<> {
        neighbors(coords, self.size())
    }

    pub fn corners(&self) -> [Coord2; 4] {
        corners(self.size())
    }
}

fn grid_size<T>(values: &Array2<T>) -> Coord2 {
    let dim = values.dim();
    (dim.0 as Coord, dim.1 as Coord)
}

fn iter_coords((rows, cols): Coord2) -> impl Iterator<Item = Coord2> {
    (0..rows).flat_map(move |r| (0..cols).map(move |c| (r, c)))
}

/// Outcome of a flag toggle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

impl MarkOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Changed => true,
        }
    }
}

/// Outcome of an open, chord, or corner opening.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    /// A safe guess landed on a mine and flagged it instead of opening it.
    AutoFlagged,
    Revealed,
    HitMine,
    Won,
}

impl RevealOutcome {
    pub const fn has_update(self) -> bool {
        use RevealOutcome::*;
        match self {
            NoChange => false,
            AutoFlagged => true,
            Revealed => true,
            HitMine => true,
            Won => true,
        }
    }
}

/// Outcome of spending a flag guess.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GuessOutcome {
    NoChange,
    /// The flag sits on a mine; its true adjacent-mine count is now exposed.
    Verified(u8),
    /// The flag was wrong, which ends the game.
    WrongFlag,
}

impl GuessOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Verified(_) | Self::WrongFlag)
    }
}
