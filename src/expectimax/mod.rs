//! Expectimax search policy over the packed board.
//!
//! Max nodes try every legal move; chance nodes average over every empty cell
//! receiving a 2 (p=0.9) or a 4 (p=0.1). Leaves are scored by a per-line
//! heuristic looked up from a table over all `2^20` rows.
//!
//! Notes
//! - Engine and heuristic tables are initialized lazily; the constructors warm
//!   them so the first decision is not slower than the rest.
//! - The search itself is deterministic; it ignores the RNG it is handed.
//!
//! ```
//! use bench_2048::engine::Board;
//! use bench_2048::expectimax::{Expectimax, ExpectimaxConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//! let mut rng = StdRng::seed_from_u64(123);
//! let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
//! let ex = Expectimax::with_config(ExpectimaxConfig { depth_cap: Some(1), ..Default::default() });
//! assert!(ex.best_move(b).is_some());
//! ```

use crate::engine;

mod heuristic;
mod search;

pub use search::Expectimax;

/// Configurable knobs for Expectimax.
///
/// - `prob_cutoff`: prune chance branches when cumulative probability falls below this value.
/// - `depth_cap`: optional hard cap on the dynamic search depth.
/// - `cache_enabled`: enable/disable the per-decision transposition map.
#[derive(Debug, Clone)]
pub struct ExpectimaxConfig {
    pub prob_cutoff: f32,
    pub depth_cap: Option<u64>,
    pub cache_enabled: bool,
}

impl Default for ExpectimaxConfig {
    fn default() -> Self {
        Self { prob_cutoff: 1e-4, depth_cap: Some(2), cache_enabled: true }
    }
}

/// Per-branch expected value at the root.
///
/// `legal` is false when the move is a no-op for the current board.
#[derive(Debug, Clone, Copy)]
pub struct BranchEval {
    pub dir: engine::Move,
    pub ev: f64,
    pub legal: bool,
}

/// Search counters accumulated across decisions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchStats {
    pub decisions: u64,
    pub nodes: u64,
    pub peak_nodes: u64,
}

fn warm_engine_and_heuristics() {
    engine::new();
    heuristic::warm();
}
