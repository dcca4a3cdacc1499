use crate::*;

pub use random::*;

mod random;

/// Produces the minefield for a fresh game. Implementations must honor the
/// corner-safety rule: none of the 4 corner cells may hold a mine.
pub trait BoardGenerator {
    fn generate(self, config: GameConfig) -> Result<Board>;
}
