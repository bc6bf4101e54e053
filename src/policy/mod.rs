//! Decision policies.
//!
//! The harness only depends on the [`Policy`] trait. A policy sees the board
//! (packed, with `to_grid()` for a decoded view) and the set of legal moves,
//! and must answer with one of those moves. Stochastic policies draw from the
//! RNG handed to them so a seeded benchmark replays exactly.
//!
//! Built-ins:
//! - [`UniformRandom`]: uniform over the legal set.
//! - [`Greedy`]: one-ply lookahead, keeps the board as empty as possible.
//! - [`crate::expectimax::Expectimax`]: depth-limited expectimax search.

use rand::RngCore;

use crate::engine::{ActionSet, Board, Move};
use crate::expectimax::{Expectimax, ExpectimaxConfig};

mod greedy;
mod random;

pub use greedy::Greedy;
pub use random::UniformRandom;

/// A move-selection strategy.
///
/// `decide` is only called with a non-empty `legal` set and must return a
/// member of it. Anything else aborts the episode.
pub trait Policy: Sync {
    /// Display name used in benchmark reports.
    fn name(&self) -> &str;

    fn decide(&self, board: Board, legal: ActionSet, rng: &mut dyn RngCore) -> Move;
}

impl<P: Policy + ?Sized> Policy for &P {
    fn name(&self) -> &str { (**self).name() }
    fn decide(&self, board: Board, legal: ActionSet, rng: &mut dyn RngCore) -> Move { (**self).decide(board, legal, rng) }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn name(&self) -> &str { (**self).name() }
    fn decide(&self, board: Board, legal: ActionSet, rng: &mut dyn RngCore) -> Move { (**self).decide(board, legal, rng) }
}

/// Adapter turning a closure into a named [`Policy`].
pub struct FnPolicy<F> {
    name: String,
    f: F,
}

impl<F> Policy for FnPolicy<F>
where
    F: Fn(Board, ActionSet, &mut dyn RngCore) -> Move + Sync,
{
    fn name(&self) -> &str { &self.name }
    fn decide(&self, board: Board, legal: ActionSet, rng: &mut dyn RngCore) -> Move { (self.f)(board, legal, rng) }
}

/// Wrap a closure as a policy.
///
/// ```
/// use bench_2048::engine::Move;
/// use bench_2048::policy::{from_fn, Policy};
/// let first = from_fn("first-legal", |_board, legal, _rng| legal.nth(0).unwrap_or(Move::Up));
/// assert_eq!(first.name(), "first-legal");
/// ```
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnPolicy<F>
where
    F: Fn(Board, ActionSet, &mut dyn RngCore) -> Move + Sync,
{
    FnPolicy { name: name.into(), f }
}

/// Built-in policies selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PolicyKind {
    Random,
    Greedy,
    Expectimax,
}

impl PolicyKind {
    /// Instantiate the policy; `depth` only applies to expectimax.
    pub fn build(self, depth: Option<u64>) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(UniformRandom),
            PolicyKind::Greedy => Box::new(Greedy),
            PolicyKind::Expectimax => {
                let mut cfg = ExpectimaxConfig::default();
                if depth.is_some() {
                    cfg.depth_cap = depth;
                }
                Box::new(Expectimax::with_config(cfg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn built_ins_answer_with_legal_moves() {
        let board = Board::from_grid(&[[1, 2, 1, 2], [0, 0, 0, 0], [0, 0, 1, 0], [0; 4]]).unwrap();
        let legal = board.legal_moves().actions();
        let mut rng = StdRng::seed_from_u64(3);
        for kind in [PolicyKind::Random, PolicyKind::Greedy, PolicyKind::Expectimax] {
            let policy = kind.build(Some(1));
            for _ in 0..8 {
                let m = policy.decide(board, legal, &mut rng);
                assert!(legal.contains(m), "{} chose {m}", policy.name());
            }
        }
    }

    #[test]
    fn fn_policy_forwards_to_closure() {
        let p = from_fn("always-down", |_, _, _| Move::Down);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(p.decide(Board::EMPTY, ActionSet::ALL, &mut rng), Move::Down);
        let boxed: Box<dyn Policy> = Box::new(p);
        assert_eq!(boxed.name(), "always-down");
    }
}
