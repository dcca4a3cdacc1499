use ndarray::Array2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Rejection-sampling generator: picks uniformly random positions, skipping
/// corners and cells already mined, until the requested count is placed.
/// Always terminates since the mine count is capped at cells - 4.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Board> {
        config.validate()?;

        let bounds = (config.rows, config.cols);
        let corner_cells = corners(bounds);
        let mut values: Array2<i8> =
            Array2::zeros((usize::from(config.rows), usize::from(config.cols)));

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut placed: CellCount = 0;
        while placed < config.mines {
            let coords = (
                rng.random_range(0..config.rows),
                rng.random_range(0..config.cols),
            );
            if corner_cells.contains(&coords) || values[coords.to_nd_index()] == MINE {
                continue;
            }
            values[coords.to_nd_index()] = MINE;
            placed += 1;
        }
        log::debug!(
            "placed {} mines on a {}x{} board",
            placed,
            config.rows,
            config.cols
        );

        Ok(Board::from_mine_grid(values))
    }
}
