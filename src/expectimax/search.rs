use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use ahash::RandomState as AHasher;
use rand::RngCore;

use crate::engine::state::CELL_BITS;
use crate::engine::{ActionSet, Board, Move};
use crate::policy::Policy;

use super::heuristic::{count_unique, get_heuristic_score};
use super::{warm_engine_and_heuristics, BranchEval, ExpectimaxConfig, SearchStats};

enum Node { Max, Chance }

#[derive(Clone, Copy)]
struct TranspositionEntry { score: f64, move_depth: u64 }

type TranspositionMap = HashMap<Board, TranspositionEntry, AHasher>;

/// Single-threaded expectimax search.
///
/// Each decision uses its own transposition map, so one instance can be
/// shared by every worker of a benchmark run. Counters are atomic for the
/// same reason.
pub struct Expectimax {
    cfg: ExpectimaxConfig,
    decisions: AtomicU64,
    nodes: AtomicU64,
    peak_nodes: AtomicU64,
}

impl Expectimax {
    pub fn new() -> Self { Self::with_config(ExpectimaxConfig::default()) }

    pub fn with_config(cfg: ExpectimaxConfig) -> Self {
        warm_engine_and_heuristics();
        Self { cfg, decisions: AtomicU64::new(0), nodes: AtomicU64::new(0), peak_nodes: AtomicU64::new(0) }
    }

    #[inline]
    pub fn config(&self) -> &ExpectimaxConfig { &self.cfg }

    /// Compute the best move, or `None` when no move changes the board.
    pub fn best_move(&self, board: Board) -> Option<Move> {
        pick_best(&self.branch_evals(board), ActionSet::ALL)
    }

    /// Compute the expected value of each direction.
    ///
    /// Returns a fixed array in order `[Up, Down, Left, Right]`, with illegal
    /// moves marked `legal = false`.
    pub fn branch_evals(&self, board: Board) -> [BranchEval; 4] {
        let depth = self.compute_depth(board);
        let mut map = TranspositionMap::with_hasher(AHasher::new());
        let mut state_count = 0u64;
        let out = Move::ALL.map(|dir| {
            let new_board = board.shift(dir);
            if new_board == board {
                BranchEval { dir, ev: 0.0, legal: false }
            } else {
                let ev = self.expectimax(new_board, Node::Chance, depth, 1.0, &mut map, &mut state_count);
                BranchEval { dir, ev, legal: true }
            }
        });
        self.record(state_count);
        out
    }

    /// Counters accumulated since construction or the last [`Self::reset_stats`].
    pub fn stats(&self) -> SearchStats {
        SearchStats {
            decisions: self.decisions.load(Ordering::Relaxed),
            nodes: self.nodes.load(Ordering::Relaxed),
            peak_nodes: self.peak_nodes.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.decisions.store(0, Ordering::Relaxed);
        self.nodes.store(0, Ordering::Relaxed);
        self.peak_nodes.store(0, Ordering::Relaxed);
    }

    fn record(&self, state_count: u64) {
        self.decisions.fetch_add(1, Ordering::Relaxed);
        self.nodes.fetch_add(state_count, Ordering::Relaxed);
        self.peak_nodes.fetch_max(state_count, Ordering::Relaxed);
    }

    #[inline]
    fn compute_depth(&self, board: Board) -> u64 {
        let dyn_depth = (count_unique(board) as u64).saturating_sub(2).max(3);
        match self.cfg.depth_cap { Some(cap) => dyn_depth.min(cap.max(1)), None => dyn_depth }
    }

    fn expectimax(
        &self,
        board: Board,
        node: Node,
        move_depth: u64,
        cum_prob: f32,
        map: &mut TranspositionMap,
        state_count: &mut u64,
    ) -> f64 {
        *state_count += 1;
        match node {
            Node::Max => self.evaluate_max(board, move_depth, cum_prob, map, state_count),
            Node::Chance => self.evaluate_chance(board, move_depth, cum_prob, map, state_count),
        }
    }

    fn evaluate_max(
        &self,
        board: Board,
        move_depth: u64,
        cum_prob: f32,
        map: &mut TranspositionMap,
        state_count: &mut u64,
    ) -> f64 {
        let mut best_score: Option<f64> = None;
        for (_, new_board) in board.legal_moves().iter() {
            let score = self.expectimax(new_board, Node::Chance, move_depth, cum_prob, map, state_count);
            if best_score.map_or(true, |best| score > best) {
                best_score = Some(score);
            }
        }
        // A lost position is worth nothing.
        best_score.unwrap_or(0.0)
    }

    fn evaluate_chance(
        &self,
        board: Board,
        move_depth: u64,
        cum_prob: f32,
        map: &mut TranspositionMap,
        state_count: &mut u64,
    ) -> f64 {
        if move_depth == 0 || cum_prob < self.cfg.prob_cutoff {
            return get_heuristic_score(board);
        }
        if self.cfg.cache_enabled {
            if let Some(entry) = map.get(&board) {
                if entry.move_depth >= move_depth {
                    return entry.score;
                }
            }
        }
        let num_empty_tiles = board.count_empty();
        if num_empty_tiles == 0 {
            return get_heuristic_score(board);
        }
        let base_prob = cum_prob / num_empty_tiles as f32;
        let mut score = 0.0;
        for idx in (0..16).filter(|&idx| board.exponent(idx) == 0) {
            let insert_tile = 1u128 << (idx as u32 * CELL_BITS);
            let new_board2 = Board::from_raw(board.raw() | insert_tile);
            score += self.expectimax(new_board2, Node::Max, move_depth - 1, base_prob * 0.9, map, state_count) * 0.9;
            let new_board4 = Board::from_raw(board.raw() | (insert_tile << 1));
            score += self.expectimax(new_board4, Node::Max, move_depth - 1, base_prob * 0.1, map, state_count) * 0.1;
        }
        score /= num_empty_tiles as f64;
        if self.cfg.cache_enabled {
            map.insert(board, TranspositionEntry { score, move_depth });
        }
        score
    }
}

impl Default for Expectimax { fn default() -> Self { Self::new() } }

impl Policy for Expectimax {
    fn name(&self) -> &str { "expectimax" }

    fn decide(&self, board: Board, legal: ActionSet, _rng: &mut dyn RngCore) -> Move {
        pick_best(&self.branch_evals(board), legal)
            .or_else(|| legal.nth(0))
            .unwrap_or(Move::Up)
    }
}

fn pick_best(branches: &[BranchEval; 4], allowed: ActionSet) -> Option<Move> {
    branches
        .iter()
        .filter(|branch| branch.legal && allowed.contains(branch.dir))
        .max_by(|a, b| a.ev.partial_cmp(&b.ev).unwrap_or(std::cmp::Ordering::Equal))
        .map(|branch| branch.dir)
}
