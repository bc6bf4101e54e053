use std::sync::OnceLock;

use crate::engine::state::{ROW_BITS, ROW_MASK};
use crate::engine::tables::{row_to_tiles, ROW_TABLE_SIZE};
use crate::engine::{transpose, Board};

static HEURISTIC_SCORES: OnceLock<Box<[f64]>> = OnceLock::new();

pub(crate) fn warm() {
    let _ = heuristic_scores();
}

fn heuristic_scores() -> &'static [f64] {
    HEURISTIC_SCORES
        .get_or_init(|| {
            let mut v = vec![0.0f64; ROW_TABLE_SIZE];
            for (i, slot) in v.iter_mut().enumerate() {
                *slot = calc_heuristic_score(row_to_tiles(i as u32));
            }
            v.into_boxed_slice()
        })
        .as_ref()
}

/// Static evaluation of a board: sum of the row and column line scores.
#[inline]
pub(crate) fn get_heuristic_score(board: Board) -> f64 {
    let rows = board.raw();
    let cols = transpose(rows);
    let scores = heuristic_scores();
    (0..4).fold(0., |score, line_idx| {
        let shift = line_idx * ROW_BITS;
        let row_val = ((rows >> shift) & ROW_MASK) as usize;
        let col_val = ((cols >> shift) & ROW_MASK) as usize;
        score + scores[row_val] + scores[col_val]
    })
}

// Weights follow nneonneo's 2048-ai line heuristic unchanged. Exponents past
// 17 cannot occur on a 4x4 board, so the wider 5-bit rows only add
// table entries that are never looked up during play.
fn calc_heuristic_score(line: [u8; 4]) -> f64 {
    const LOST_PENALTY: f64 = 200_000.0;
    LOST_PENALTY + calc_empty(&line) + calc_merges(&line) - calc_monotonicity(&line) - calc_sum(&line)
}

fn calc_sum(line: &[u8; 4]) -> f64 {
    const SUM_POWER: f64 = 3.5;
    const SUM_WEIGHT: f64 = 11.0;
    line.iter().map(|&t| (t as f64).powf(SUM_POWER)).sum::<f64>() * SUM_WEIGHT
}

fn calc_empty(line: &[u8; 4]) -> f64 {
    const EMPTY_WEIGHT: f64 = 270.0;
    line.iter().filter(|&&t| t == 0).count() as f64 * EMPTY_WEIGHT
}

fn calc_merges(line: &[u8; 4]) -> f64 {
    const MERGES_WEIGHT: f64 = 700.0;
    let mut prev = 0;
    let mut counter = 0.;
    let mut merges = 0.;
    for &tile in line {
        if prev == tile && tile != 0 {
            counter += 1.;
        } else if counter > 0. {
            merges += 1. + counter;
            counter = 0.;
        }
        prev = tile;
    }
    if counter > 0. {
        merges += 1. + counter;
    }
    merges * MERGES_WEIGHT
}

fn calc_monotonicity(line: &[u8; 4]) -> f64 {
    const MONOTONICITY_POWER: f64 = 4.0;
    const MONOTONICITY_WEIGHT: f64 = 47.0;
    let mut monotonicity_left = 0.;
    let mut monotonicity_right = 0.;
    for pair in line.windows(2) {
        let a = (pair[0] as f64).powf(MONOTONICITY_POWER);
        let b = (pair[1] as f64).powf(MONOTONICITY_POWER);
        if pair[0] > pair[1] {
            monotonicity_left += a - b;
        } else {
            monotonicity_right += b - a;
        }
    }
    monotonicity_left.min(monotonicity_right) * MONOTONICITY_WEIGHT
}

/// Number of distinct tile values on the board.
pub(crate) fn count_unique(board: Board) -> u32 {
    let seen = board.tiles().fold(0u32, |acc, e| acc | (1 << e));
    (seen >> 1).count_ones()
}
