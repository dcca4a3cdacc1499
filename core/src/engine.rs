use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameState {
    InProgress,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::InProgress
    }
}

/// Owns one game: the board, the visibility masks, the assist budgets, and
/// the InProgress/Won/Lost state machine.
///
/// Gameplay methods take a `(row, col)` pair where relevant and mutate the
/// engine in place; the collaborator reads the next snapshot through the
/// accessors and [`GameEngine::cell_at`]. Out-of-bounds coordinates and
/// moves after the game has ended are silent no-ops.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEngine {
    config: GameConfig,
    board: Board,
    hidden: Array2<bool>,
    flagged: Array2<bool>,
    mistakes: HashSet<Coord2>,
    flag_guessed: HashMap<Coord2, u8>,
    cells_unopened: CellCount,
    mines_remaining: i32,
    guesses_left: u8,
    flag_guesses_left: u8,
    guessing: bool,
    moves_made: u32,
    state: GameState,
}

impl GameEngine {
    /// Starts a fresh game on an explicit board.
    pub fn new(board: Board, guesses: u8, flag_guesses: u8) -> Self {
        let (rows, cols) = board.size();
        let config = GameConfig::new(rows, cols, board.mine_count(), guesses, flag_guesses);
        let dim = (usize::from(rows), usize::from(cols));
        Self {
            config,
            hidden: Array2::from_elem(dim, true),
            flagged: Array2::from_elem(dim, false),
            mistakes: HashSet::new(),
            flag_guessed: HashMap::new(),
            cells_unopened: config.total_cells(),
            mines_remaining: i32::from(config.mines),
            guesses_left: guesses,
            flag_guesses_left: flag_guesses,
            guessing: false,
            moves_made: 0,
            state: GameState::InProgress,
            board,
        }
    }

    /// Generates a board for `config` and starts a fresh game on it.
    pub fn generate<G: BoardGenerator>(config: GameConfig, generator: G) -> Result<Self> {
        let board = generator.generate(config)?;
        Ok(Self::new(board, config.guesses, config.flag_guesses))
    }

    /// Replaces the board with a newly generated one of the same shape and
    /// mine count, resetting every mask, counter, and terminal flag.
    pub fn regenerate<G: BoardGenerator>(&mut self, generator: G) -> Result<()> {
        *self = Self::generate(self.config, generator)?;
        Ok(())
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn size(&self) -> Coord2 {
        self.board.size()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn won(&self) -> bool {
        matches!(self.state, GameState::Won)
    }

    pub fn lost(&self) -> bool {
        matches!(self.state, GameState::Lost)
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    /// Count of still-hidden cells; the game is won when this reaches the
    /// mine count.
    pub fn cells_unopened(&self) -> CellCount {
        self.cells_unopened
    }

    /// Mines minus flags placed; negative when over-flagged.
    pub fn mines_remaining(&self) -> i32 {
        self.mines_remaining
    }

    pub fn guesses_left(&self) -> u8 {
        self.guesses_left
    }

    pub fn flag_guesses_left(&self) -> u8 {
        self.flag_guesses_left
    }

    /// Whether the safe-guess assist is armed for the next open.
    pub fn is_guessing(&self) -> bool {
        self.guessing
    }

    /// Count of state-changing actions, used externally for timer gating.
    pub fn moves_made(&self) -> u32 {
        self.moves_made
    }

    pub fn is_hidden(&self, coords: Coord2) -> bool {
        self.board.in_bounds(coords) && self.hidden[coords.to_nd_index()]
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.board.in_bounds(coords) && self.flagged[coords.to_nd_index()]
    }

    /// Cells to highlight as incorrect after a loss.
    pub fn mistakes(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.mistakes.iter().copied()
    }

    /// Adjacency count exposed for this flag by a successful flag guess.
    pub fn flag_guessed(&self, coords: Coord2) -> Option<u8> {
        self.flag_guessed.get(&coords).copied()
    }

    /// Projection of a single cell for rendering.
    pub fn cell_at(&self, coords: Coord2) -> CellView {
        if !self.board.in_bounds(coords) {
            return CellView::Hidden;
        }
        if self.mistakes.contains(&coords) {
            CellView::Mistake
        } else if self.flagged[coords.to_nd_index()] {
            CellView::Flagged {
                verified: self.flag_guessed(coords),
            }
        } else if self.hidden[coords.to_nd_index()] {
            CellView::Hidden
        } else if self.board.is_mine(coords) {
            CellView::Mine
        } else {
            CellView::Revealed(self.board.value(coords) as u8)
        }
    }

    /// Opens a cell. With the safe-guess assist armed and budget left this
    /// consumes one guess and can never lose: a mine is flagged instead of
    /// opened. Flagged cells are never opened.
    pub fn open(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.can_act(coords) || self.flagged[coords.to_nd_index()] {
            return RevealOutcome::NoChange;
        }

        if self.guessing && self.guesses_left > 0 {
            // single-shot: disarm before resolving so a guess is never
            // spent twice on one intent
            self.guessing = false;
            self.guesses_left -= 1;

            if self.board.is_mine(coords) {
                log::debug!("safe guess at {:?} flagged a mine", coords);
                return match self.toggle_flag(coords) {
                    MarkOutcome::Changed => RevealOutcome::AutoFlagged,
                    MarkOutcome::NoChange => RevealOutcome::NoChange,
                };
            }
        }

        self.batch_open(&[coords])
    }

    /// Opens all four corners at once. Generators never mine a corner, so
    /// this is always a safe start.
    pub fn open_corners(&mut self) -> RevealOutcome {
        if self.state.is_finished() {
            return RevealOutcome::NoChange;
        }
        self.batch_open(&self.board.corners())
    }

    /// Opens every non-flagged neighbor of a revealed numbered cell, valid
    /// only when the flagged-neighbor count matches its number. A mismatch
    /// is a deliberate no-op that still costs a move.
    pub fn chord(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.can_act(coords)
            || self.hidden[coords.to_nd_index()]
            || self.board.is_mine(coords)
        {
            return RevealOutcome::NoChange;
        }
        let target = self.board.value(coords) as u8;
        self.chord_with_target(coords, target)
    }

    /// Chords around a verified flag, taking the target count from the
    /// adjacency exposed by [`GameEngine::guess_flag`] instead of the board.
    pub fn chord_guessed(&mut self, coords: Coord2) -> RevealOutcome {
        if !self.can_act(coords) {
            return RevealOutcome::NoChange;
        }
        match self.flag_guessed(coords) {
            Some(target) => self.chord_with_target(coords, target),
            None => {
                self.moves_made += 1;
                RevealOutcome::NoChange
            }
        }
    }

    /// Flags or unflags a hidden cell.
    pub fn toggle_flag(&mut self, coords: Coord2) -> MarkOutcome {
        if !self.can_act(coords) || !self.hidden[coords.to_nd_index()] {
            return MarkOutcome::NoChange;
        }

        let flagged = &mut self.flagged[coords.to_nd_index()];
        *flagged = !*flagged;
        self.mines_remaining += if *flagged { -1 } else { 1 };
        self.moves_made += 1;
        log::trace!("flag toggled at {:?}", coords);
        MarkOutcome::Changed
    }

    /// Arms or disarms the safe-guess assist for the next open.
    pub fn arm_guess(&mut self, armed: bool) {
        self.guessing = armed;
    }

    /// Spends a flag guess to verify a flag. A correct flag exposes its true
    /// adjacent-mine count without unhiding or unflagging the cell; a wrong
    /// flag ends the game on the spot.
    pub fn guess_flag(&mut self, coords: Coord2) -> GuessOutcome {
        if !self.can_act(coords) || !self.flagged[coords.to_nd_index()] {
            return GuessOutcome::NoChange;
        }

        let mut outcome = GuessOutcome::NoChange;
        if self.flag_guesses_left > 0 {
            if !self.board.is_mine(coords) {
                log::debug!("flag guess exposed a wrong flag at {:?}", coords);
                self.moves_made += 1;
                self.set_lost(coords);
                return GuessOutcome::WrongFlag;
            }
            if !self.flag_guessed.contains_key(&coords) {
                let count = self.board.adjacent_mines(coords);
                self.flag_guessed.insert(coords, count);
                self.flag_guesses_left -= 1;
                outcome = GuessOutcome::Verified(count);
            }
        }

        self.moves_made += 1;
        outcome
    }

    fn can_act(&self, coords: Coord2) -> bool {
        !self.state.is_finished() && self.board.in_bounds(coords)
    }

    fn chord_with_target(&mut self, coords: Coord2, target: u8) -> RevealOutcome {
        let mut flag_count = 0;
        let mut candidates: SmallVec<[Coord2; 8]> = SmallVec::new();
        for neighbor in self.board.neighbors(coords) {
            if self.flagged[neighbor.to_nd_index()] {
                flag_count += 1;
            } else {
                candidates.push(neighbor);
            }
        }

        if flag_count == target {
            self.batch_open(&candidates)
        } else {
            self.moves_made += 1;
            RevealOutcome::NoChange
        }
    }

    /// The one flood-fill primitive behind plain opens, chords, and the
    /// corner opening. Costs a single move however many seeds it is given.
    ///
    /// Flags are a hard barrier in all 8 directions and are dropped as
    /// seeds; a mine among the remaining seeds loses the game before any
    /// cell is revealed. Reveals accumulate in a scratch set and commit to
    /// the hidden mask once, so callers always observe snapshot-to-snapshot
    /// transitions.
    fn batch_open(&mut self, seeds: &[Coord2]) -> RevealOutcome {
        self.moves_made += 1;

        let seeds: SmallVec<[Coord2; 8]> = seeds
            .iter()
            .copied()
            .filter(|&coords| {
                self.board.in_bounds(coords) && !self.flagged[coords.to_nd_index()]
            })
            .collect();

        if let Some(&mine) = seeds.iter().find(|&&coords| self.board.is_mine(coords)) {
            self.set_lost(mine);
            return RevealOutcome::HitMine;
        }

        let mut marked: HashSet<Coord2> = HashSet::new();
        let mut frontier: VecDeque<Coord2> = VecDeque::new();

        for &coords in &seeds {
            if self.hidden[coords.to_nd_index()]
                && marked.insert(coords)
                && self.board.value(coords) == 0
            {
                frontier.push_back(coords);
            }
        }

        while let Some(coords) = frontier.pop_front() {
            for neighbor in self.board.neighbors(coords) {
                let index = neighbor.to_nd_index();
                if self.flagged[index] || !self.hidden[index] || !marked.insert(neighbor) {
                    continue;
                }
                log::trace!("flood reached {:?}", neighbor);
                if self.board.value(neighbor) == 0 {
                    frontier.push_back(neighbor);
                }
            }
        }

        if marked.is_empty() {
            return RevealOutcome::NoChange;
        }

        let opened = marked.len() as CellCount;
        for coords in marked {
            self.hidden[coords.to_nd_index()] = false;
        }
        self.cells_unopened -= opened;
        log::debug!("opened {} cells, {} left unopened", opened, self.cells_unopened);

        if self.cells_unopened == self.config.mines {
            self.set_won();
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        }
    }

    /// Terminal loss: wrong flags are removed and recorded as mistakes, the
    /// trigger cell is always recorded, and the whole board is revealed.
    fn set_lost(&mut self, trigger: Coord2) {
        for ((r, c), flagged) in self.flagged.indexed_iter_mut() {
            let coords = (r as Coord, c as Coord);
            if *flagged && !self.board.is_mine(coords) {
                self.mistakes.insert(coords);
                *flagged = false;
            }
        }
        self.mistakes.insert(trigger);
        self.hidden.fill(false);
        self.state = GameState::Lost;
        log::debug!("lost after {} moves, triggered at {:?}", self.moves_made, trigger);
    }

    /// Terminal win: every mine flagged in place of whatever flags existed,
    /// everything revealed, counter zeroed.
    fn set_won(&mut self) {
        for ((r, c), flagged) in self.flagged.indexed_iter_mut() {
            *flagged = self.board.is_mine((r as Coord, c as Coord));
        }
        self.hidden.fill(false);
        self.mines_remaining = 0;
        self.state = GameState::Won;
        log::debug!("won after {} moves", self.moves_made);
    }
}
