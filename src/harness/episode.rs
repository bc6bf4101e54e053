use std::time::{Duration, Instant};

use rand::{rngs::StdRng, SeedableRng};

use crate::engine::{ActionSet, Board, Move};
use crate::policy::Policy;

/// Why an episode was cut short.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EpisodeError {
    #[error("policy chose {action} on turn {turn} but the legal moves were {legal:?}")]
    IllegalPolicyAction { action: Move, legal: ActionSet, board: Board, turn: u64 },
}

/// How an episode ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EpisodeStatus {
    /// No legal move was left after a spawn.
    GameOver,
    /// The configured turn cap was reached.
    TurnLimit,
    /// The policy broke its contract; the episode stopped there.
    Aborted(EpisodeError),
}

/// Record of one finished episode. Never mutated once returned.
#[derive(Debug, Clone)]
pub struct EpisodeOutcome {
    /// Seed the episode's RNGs were derived from; replays it exactly.
    pub seed: u64,
    /// Moves applied.
    pub turns: u64,
    /// Highest tile value reached, e.g. 2048.
    pub max_tile: u64,
    /// Points earned by merges over the whole episode.
    pub score: u64,
    pub duration: Duration,
    pub final_board: Board,
    pub status: EpisodeStatus,
}

impl EpisodeOutcome {
    #[inline]
    pub fn is_aborted(&self) -> bool { matches!(self.status, EpisodeStatus::Aborted(_)) }
}

/// Starting conditions shared by every episode of a batch.
#[derive(Debug, Clone, Copy)]
pub struct Episode {
    pub start: Board,
    /// Tiles spawned onto `start` before the first turn.
    pub opening_tiles: usize,
    pub max_turns: u64,
}

impl Default for Episode {
    fn default() -> Self { Episode { start: Board::EMPTY, opening_tiles: 0, max_turns: u64::MAX } }
}

/// Offset separating the policy's RNG stream from the spawner's.
const POLICY_STREAM: u64 = 0x5851_f42d_4c95_7f2d;

impl Episode {
    /// Play one episode to completion.
    ///
    /// Each turn spawns a tile, resolves the legal moves and, unless there
    /// are none or the turn cap is hit, applies the policy's choice. A choice
    /// outside the legal set aborts the episode.
    pub fn play<P: Policy + ?Sized>(&self, policy: &P, seed: u64) -> EpisodeOutcome {
        let started = Instant::now();
        let mut spawn_rng = StdRng::seed_from_u64(seed);
        let mut policy_rng = StdRng::seed_from_u64(seed ^ POLICY_STREAM);

        let mut board = self.start;
        for _ in 0..self.opening_tiles {
            board = board.with_random_tile(&mut spawn_rng);
        }

        let mut turns = 0u64;
        let mut score = 0u64;
        let status = loop {
            board = board.with_random_tile(&mut spawn_rng);
            let legal = board.legal_moves();
            if legal.is_empty() {
                break EpisodeStatus::GameOver;
            }
            if turns >= self.max_turns {
                break EpisodeStatus::TurnLimit;
            }
            let action = policy.decide(board, legal.actions(), &mut policy_rng);
            match legal.result(action) {
                Some(next) => {
                    // A merge into exponent e raises the derived score by exactly 2^e.
                    score += next.score() - board.score();
                    board = next;
                    turns += 1;
                }
                None => {
                    break EpisodeStatus::Aborted(EpisodeError::IllegalPolicyAction {
                        action,
                        legal: legal.actions(),
                        board,
                        turn: turns,
                    });
                }
            }
        };

        EpisodeOutcome {
            seed,
            turns,
            max_tile: board.highest_tile(),
            score,
            duration: started.elapsed(),
            final_board: board,
            status,
        }
    }
}
