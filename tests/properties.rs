//! Property-based tests for the packed engine.

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use bench_2048::engine::tables::{build_left_table, build_right_table, row_to_tiles, tiles_to_row, ROW_TABLE_SIZE};
use bench_2048::engine::{self as GameEngine, decode, encode, legal_moves, mirror_row, transpose, Board, Grid, Move};

/// Exponents skewed towards small values so merges actually happen.
fn exponent_strategy() -> impl Strategy<Value = u8> {
    prop_oneof![3 => 0u8..4, 1 => 0u8..=31]
}

fn grid_strategy() -> impl Strategy<Value = Grid> {
    prop::array::uniform4(prop::array::uniform4(exponent_strategy()))
}

fn board_strategy() -> impl Strategy<Value = Board> {
    grid_strategy().prop_map(|g| encode(&g).unwrap())
}

/// Straightforward left slide on a vector: compress, merge pairs once, pad.
/// Also returns how many merges happened.
fn reference_slide_left(tiles: [u8; 4]) -> ([u8; 4], u32) {
    let packed: Vec<u8> = tiles.iter().copied().filter(|&t| t != 0).collect();
    let mut out = Vec::with_capacity(4);
    let mut merges = 0;
    let mut i = 0;
    while i < packed.len() {
        if i + 1 < packed.len() && packed[i] == packed[i + 1] && packed[i] < 31 {
            out.push(packed[i] + 1);
            merges += 1;
            i += 2;
        } else {
            out.push(packed[i]);
            i += 1;
        }
    }
    out.resize(4, 0);
    ([out[0], out[1], out[2], out[3]], merges)
}

/// Merges a move towards `dir` performs, counted line by line on the grid.
fn reference_merges(board: Board, dir: Move) -> u32 {
    let g = decode(board);
    (0..4)
        .map(|i| match dir {
            Move::Left => g[i],
            Move::Right => [g[i][3], g[i][2], g[i][1], g[i][0]],
            Move::Up => [g[0][i], g[1][i], g[2][i], g[3][i]],
            Move::Down => [g[3][i], g[2][i], g[1][i], g[0][i]],
        })
        .map(|line| reference_slide_left(line).1)
        .sum()
}

fn face_sum(board: Board) -> u64 {
    board.tiles().filter(|&e| e != 0).map(|e| 1u64 << e).sum()
}

#[test]
fn left_table_matches_reference_for_every_row() {
    let left = build_left_table();
    assert_eq!(left.len(), ROW_TABLE_SIZE);
    for row in 0..ROW_TABLE_SIZE as u32 {
        let expected = tiles_to_row(reference_slide_left(row_to_tiles(row)).0);
        assert_eq!(left[row as usize], expected, "row {:?}", row_to_tiles(row));
    }
}

#[test]
fn right_table_is_mirrored_left_table() {
    let left = build_left_table();
    let right = build_right_table(&left);
    for row in 0..ROW_TABLE_SIZE as u32 {
        assert_eq!(right[row as usize], mirror_row(left[mirror_row(row) as usize]));
    }
}

#[test]
fn process_tables_agree_with_fresh_build() {
    let tables = GameEngine::tables();
    let left = build_left_table();
    assert_eq!(tables.left(), &left[..]);
    assert_eq!(tables.right(), &build_right_table(&left)[..]);
}

proptest! {
    #[test]
    fn codec_round_trip(grid in grid_strategy()) {
        prop_assert_eq!(decode(encode(&grid).unwrap()), grid);
    }

    #[test]
    fn transpose_is_self_inverse(raw in any::<u128>()) {
        let b = Board::from_raw(raw);
        prop_assert_eq!(transpose(transpose(b.raw())), b.raw());
    }

    #[test]
    fn no_op_moves_are_exactly_the_illegal_ones(board in board_strategy()) {
        let legal = legal_moves(board);
        for dir in Move::ALL {
            let moved = board.shift(dir);
            prop_assert_eq!(moved == board, !legal.actions().contains(dir), "{}", dir);
            if moved != board {
                prop_assert_eq!(legal.result(dir), Some(moved));
            }
        }
        prop_assert_eq!(legal.is_empty(), board.is_game_over());
    }

    #[test]
    fn moves_conserve_tiles_up_to_merges(board in board_strategy()) {
        for dir in Move::ALL {
            let moved = board.shift(dir);
            // Merging v + v into 2v keeps the face-value total.
            prop_assert_eq!(face_sum(moved), face_sum(board), "{}", dir);
            let merges = reference_merges(board, dir);
            prop_assert_eq!(board.count_non_empty() - moved.count_non_empty(), merges, "{}", dir);
            prop_assert!(moved.max_exponent() >= board.max_exponent());
        }
    }

    #[test]
    fn vertical_moves_are_transposed_horizontal_moves(board in board_strategy()) {
        let t = |b: Board| Board::from_raw(transpose(b.raw()));
        prop_assert_eq!(board.shift(Move::Up), t(t(board).shift(Move::Left)));
        prop_assert_eq!(board.shift(Move::Down), t(t(board).shift(Move::Right)));
    }

    #[test]
    fn moves_are_idempotent_once_settled(board in board_strategy(), dir_idx in 0usize..4) {
        let dir = Move::ALL[dir_idx];
        let mut b = board;
        // After the first pass every effective move must merge something.
        for _ in 0..16 {
            b = b.shift(dir);
        }
        prop_assert_eq!(b.shift(dir), b);
    }

    #[test]
    fn spawn_adds_exactly_one_tile_unless_full(board in board_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let spawned = board.with_random_tile(&mut rng);
        if board.count_empty() == 0 {
            prop_assert_eq!(spawned, board);
        } else {
            prop_assert_eq!(spawned.count_non_empty(), board.count_non_empty() + 1);
            // Existing tiles are untouched; the new one is a 2 or a 4.
            prop_assert_eq!(spawned.raw() & board.raw(), board.raw());
            let added = spawned.raw() ^ board.raw();
            prop_assert!(Board::from_raw(added).tiles().all(|e| e == 0 || e == 1 || e == 2));
        }
    }
}
