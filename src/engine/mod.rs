//! Bit-packed 2048 engine.
//!
//! - [`state`]: the packed [`Board`] and the grid codec.
//! - [`tables`]: row move tables and the transpose used for vertical moves.
//! - [`actions`]: legal-move resolution.
//!
//! The move tables are built once per process on first use. Call [`new`] to
//! pay that cost up front (e.g. before timing anything).

use rand::Rng;
use std::fmt;
use std::sync::OnceLock;

pub mod actions;
pub mod state;
pub mod tables;

pub use actions::{legal_moves, ActionSet, LegalMoves};
pub use state::{decode, encode, spawn, Board, BoardError, BoardRaw, Grid, MAX_EXPONENT};
pub use tables::{mirror_row, transpose, MoveTables};

/// A direction to move/merge tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Up,
    Down,
    Left,
    Right,
}

impl Move {
    /// All directions in canonical order.
    pub const ALL: [Move; 4] = [Move::Up, Move::Down, Move::Left, Move::Right];

    /// Position in [`Move::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Move::Up => 0,
            Move::Down => 1,
            Move::Left => 2,
            Move::Right => 3,
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Move::Up => "up",
            Move::Down => "down",
            Move::Left => "left",
            Move::Right => "right",
        };
        f.write_str(s)
    }
}

static TABLES: OnceLock<MoveTables> = OnceLock::new();

/// Initialize internal tables on first use. Safe to call multiple times.
pub fn new() { let _ = tables(); }

/// The process-wide move tables, built on first access.
#[inline]
pub fn tables() -> &'static MoveTables { TABLES.get_or_init(MoveTables::build) }

impl Board {
    /// Return the board resulting from sliding/merging tiles in `dir` (no random insert).
    ///
    /// ```
    /// use bench_2048::engine::{Board, Move};
    /// let b = Board::from_grid(&[[1, 1, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// assert_eq!(b.shift(Move::Left).to_grid()[0], [2, 0, 0, 0]);
    /// ```
    #[inline]
    pub fn shift(self, dir: Move) -> Self {
        let t = tables();
        match dir {
            Move::Left => t.move_left(self),
            Move::Right => t.move_right(self),
            Move::Up => t.move_up(self),
            Move::Down => t.move_down(self),
        }
    }

    /// Perform a move then insert a random tile if the move changed the board.
    #[inline]
    pub fn make_move<R: Rng + ?Sized>(self, dir: Move, rng: &mut R) -> Self {
        let moved = self.shift(dir);
        if moved != self { moved.with_random_tile(rng) } else { self }
    }

    /// Legal moves from this board together with their results.
    #[inline]
    pub fn legal_moves(self) -> LegalMoves { LegalMoves::resolve(self) }

    /// Return true if no legal moves remain.
    #[inline]
    pub fn is_game_over(self) -> bool { Move::ALL.into_iter().all(|dir| self.shift(dir) == self) }
}

/// Slide/merge tiles in the given direction. No randomness.
#[inline]
pub fn shift(board: Board, dir: Move) -> Board { board.shift(dir) }

#[inline]
pub fn move_left(board: Board) -> Board { tables().move_left(board) }

#[inline]
pub fn move_right(board: Board) -> Board { tables().move_right(board) }

#[inline]
pub fn move_up(board: Board) -> Board { tables().move_up(board) }

#[inline]
pub fn move_down(board: Board) -> Board { tables().move_down(board) }

/// Transpose a board; see [`tables::transpose`].
#[inline]
pub fn transpose_board(board: Board) -> Board { Board::from_raw(transpose(board.raw())) }

/// True if no move in any direction changes the board.
#[inline]
pub fn is_game_over(board: Board) -> bool { board.is_game_over() }
