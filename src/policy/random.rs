use rand::{Rng, RngCore};

use crate::engine::{ActionSet, Board, Move};

use super::Policy;

/// Picks uniformly among the legal moves.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformRandom;

impl Policy for UniformRandom {
    fn name(&self) -> &str { "uniform-random" }

    fn decide(&self, _board: Board, legal: ActionSet, rng: &mut dyn RngCore) -> Move {
        if legal.is_empty() {
            return Move::Up;
        }
        let pick = rng.gen_range(0..legal.len());
        legal.nth(pick).unwrap_or(Move::Up)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn covers_every_legal_move() {
        let legal: ActionSet = [Move::Down, Move::Left, Move::Right].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(11);
        let mut seen = ActionSet::EMPTY;
        for _ in 0..200 {
            let m = UniformRandom.decide(Board::EMPTY, legal, &mut rng);
            assert!(legal.contains(m));
            seen.insert(m);
        }
        assert_eq!(seen, legal);
    }
}
