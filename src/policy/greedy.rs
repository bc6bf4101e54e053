use std::cmp::Reverse;

use rand::RngCore;

use crate::engine::{ActionSet, Board, Move};

use super::Policy;

/// One-ply lookahead: prefer the move leaving the most empty cells, then the
/// highest derived score, then the earliest direction in `Move::ALL`.
///
/// Policies only see the legal [`ActionSet`], so the candidate boards are
/// shifted again here; that costs four row lookups per direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greedy;

impl Policy for Greedy {
    fn name(&self) -> &str { "greedy" }

    fn decide(&self, board: Board, legal: ActionSet, _rng: &mut dyn RngCore) -> Move {
        legal
            .iter()
            .max_by_key(|&dir| {
                let next = board.shift(dir);
                (next.count_empty(), next.score(), Reverse(dir.index()))
            })
            .unwrap_or(Move::Up)
    }
}
