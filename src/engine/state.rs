//! Packed board representation and the grid codec.
//!
//! A [`Board`] stores 16 cells of 5 bits each in the low 80 bits of a `u128`,
//! row-major and LSB-first: cell `(row, col)` lives at bit offset
//! `(row * 4 + col) * 5`. A field holds the tile *exponent*; 0 is an empty
//! cell and `e >= 1` is a tile of face value `2^e`.

use rand::Rng;
use std::fmt;

/// Raw packed representation.
pub type BoardRaw = u128;

/// Decoded board: `grid[row][col]` is the exponent at that cell.
pub type Grid = [[u8; 4]; 4];

/// Width of a single cell field in bits.
pub const CELL_BITS: u32 = 5;
/// Width of one row (4 cells) in bits.
pub const ROW_BITS: u32 = 4 * CELL_BITS;
/// Largest exponent a cell field can hold.
pub const MAX_EXPONENT: u8 = 31;

pub(crate) const CELL_MASK: BoardRaw = (1 << CELL_BITS) - 1;
pub(crate) const ROW_MASK: BoardRaw = (1 << ROW_BITS) - 1;
pub(crate) const BOARD_MASK: BoardRaw = (1 << (4 * ROW_BITS)) - 1;

/// Bit 0 of every field.
const FIELD_LOW_BITS: BoardRaw = {
    let mut m = 0;
    let mut i = 0;
    while i < 16 {
        m |= 1 << (i * CELL_BITS);
        i += 1;
    }
    m
};

/// Errors raised when building a board from caller-supplied data.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("cell ({row}, {col}) holds exponent {value}, which does not fit in a 5-bit field (max 31)")]
    ValueOutOfRange { row: usize, col: usize, value: u8 },
    #[error("grid must be 4x4, got {rows} rows (first bad row length: {cols})")]
    GridSizeMismatch { rows: usize, cols: usize },
}

/// Packed 4x4 board, 16 five-bit exponent fields in a `u128`.
///
/// Boards are small `Copy` values; every move produces a fresh one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Board(BoardRaw);

impl Board {
    /// A constant empty board (all zeros).
    pub const EMPTY: Board = Board(0);

    /// Construct a `Board` from its raw packed representation.
    ///
    /// Bits above the 80-bit board area are discarded.
    #[inline]
    pub const fn from_raw(raw: BoardRaw) -> Self { Board(raw & BOARD_MASK) }

    /// Consume this `Board`, returning the raw packed `u128`.
    #[inline]
    pub const fn into_raw(self) -> BoardRaw { self.0 }

    /// Borrow the raw packed `u128` for this `Board`.
    #[inline]
    pub const fn raw(&self) -> BoardRaw { self.0 }

    /// Pack a grid of exponents.
    ///
    /// ```
    /// use bench_2048::engine::{Board, BoardError};
    /// let b = Board::from_grid(&[[1, 1, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
    /// assert_eq!(b.raw(), 0b00001_00001);
    /// assert!(matches!(
    ///     Board::from_grid(&[[32, 0, 0, 0], [0; 4], [0; 4], [0; 4]]),
    ///     Err(BoardError::ValueOutOfRange { row: 0, col: 0, value: 32 })
    /// ));
    /// ```
    pub fn from_grid(grid: &Grid) -> Result<Self, BoardError> {
        let mut raw: BoardRaw = 0;
        for (row, cells) in grid.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if value > MAX_EXPONENT {
                    return Err(BoardError::ValueOutOfRange { row, col, value });
                }
                raw |= (value as BoardRaw) << field_offset(row * 4 + col);
            }
        }
        Ok(Board(raw))
    }

    /// Pack a grid of arbitrary shape, rejecting anything that is not 4x4.
    pub fn try_from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self, BoardError> {
        if rows.len() != 4 {
            let cols = rows.first().map_or(0, |r| r.as_ref().len());
            return Err(BoardError::GridSizeMismatch { rows: rows.len(), cols });
        }
        let mut grid: Grid = [[0; 4]; 4];
        for (dst, src) in grid.iter_mut().zip(rows) {
            let src = src.as_ref();
            *dst = src
                .try_into()
                .map_err(|_| BoardError::GridSizeMismatch { rows: 4, cols: src.len() })?;
        }
        Board::from_grid(&grid)
    }

    /// Unpack into a grid of exponents.
    pub fn to_grid(self) -> Grid {
        let mut grid: Grid = [[0; 4]; 4];
        for (idx, exp) in self.tiles().enumerate() {
            grid[idx / 4][idx % 4] = exp;
        }
        grid
    }

    /// Iterate over the 16 exponents in row-major order.
    #[inline]
    pub fn tiles(self) -> TilesIter { TilesIter { raw: self.0, remaining: 16 } }

    /// Exponent stored at row-major index `idx` (0..16).
    #[inline]
    pub fn exponent(self, idx: usize) -> u8 {
        debug_assert!(idx < 16);
        ((self.0 >> field_offset(idx)) & CELL_MASK) as u8
    }

    /// Exponent stored at `(row, col)`.
    #[inline]
    pub fn exponent_at(self, row: usize, col: usize) -> u8 { self.exponent(row * 4 + col) }

    /// Face value at row-major index `idx` (0 if empty), e.g. 2, 4, 8, ...
    #[inline]
    pub fn tile_value(self, idx: usize) -> u64 { exponent_to_value(self.exponent(idx)) }

    /// Count the number of empty cells on the board.
    #[inline]
    pub fn count_empty(self) -> u32 { 16 - self.count_non_empty() }

    /// Count the number of occupied cells on the board.
    #[inline]
    pub fn count_non_empty(self) -> u32 {
        // Fold every field onto its lowest bit, then popcount.
        let x = self.0;
        let folded = x | (x >> 1) | (x >> 2) | (x >> 3) | (x >> 4);
        (folded & FIELD_LOW_BITS).count_ones()
    }

    /// Largest exponent present (0 for an empty board).
    #[inline]
    pub fn max_exponent(self) -> u8 { self.tiles().max().unwrap_or(0) }

    /// Return the highest tile value (e.g., 2048) present on the board, 0 if empty.
    #[inline]
    pub fn highest_tile(self) -> u64 { exponent_to_value(self.max_exponent()) }

    /// True once a 2048 tile (or larger) is on the board.
    #[inline]
    pub fn has_won(self) -> bool { self.max_exponent() >= 11 }

    /// Points a player would have earned building this board from 2s.
    ///
    /// A tile of exponent `e >= 2` built only from 2s earned `(e - 1) * 2^e`
    /// points across all of its merges. Spawned 4s are counted as if they had
    /// been merged, so this slightly overestimates a real game's score.
    pub fn score(self) -> u64 {
        self.tiles()
            .filter(|&e| e >= 2)
            .map(|e| (e as u64 - 1) << e)
            .sum()
    }

    /// Insert a random 2 (90%) or 4 (10%) tile into a uniformly chosen empty
    /// cell, using the provided RNG. A full board is returned unchanged.
    ///
    /// ```
    /// use bench_2048::engine::Board;
    /// use rand::{SeedableRng, rngs::StdRng};
    /// let mut rng = StdRng::seed_from_u64(123);
    /// let b = Board::EMPTY.with_random_tile(&mut rng).with_random_tile(&mut rng);
    /// assert_eq!(b.count_empty(), 14);
    /// ```
    pub fn with_random_tile<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let empty = self.count_empty();
        if empty == 0 {
            return self;
        }
        let mut index = rng.gen_range(0..empty);
        let tile = generate_random_tile(rng);
        for idx in 0..16 {
            if self.exponent(idx) == 0 {
                if index == 0 {
                    return Board(self.0 | (tile << field_offset(idx)));
                }
                index -= 1;
            }
        }
        unreachable!("count_empty reported more empty cells than exist")
    }
}

/// Free-function form of [`Board::to_grid`].
#[inline]
pub fn decode(board: Board) -> Grid { board.to_grid() }

/// Free-function form of [`Board::from_grid`].
#[inline]
pub fn encode(grid: &Grid) -> Result<Board, BoardError> { Board::from_grid(grid) }

/// Insert a random tile; see [`Board::with_random_tile`].
#[inline]
pub fn spawn<R: Rng + ?Sized>(board: Board, rng: &mut R) -> Board { board.with_random_tile(rng) }

/// Iterator over a board's exponents, row-major.
#[derive(Clone)]
pub struct TilesIter {
    raw: BoardRaw,
    remaining: u8,
}

impl Iterator for TilesIter {
    type Item = u8;

    #[inline]
    fn next(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        let exp = (self.raw & CELL_MASK) as u8;
        self.raw >>= CELL_BITS;
        self.remaining -= 1;
        Some(exp)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for TilesIter {}

#[inline]
pub(crate) const fn field_offset(idx: usize) -> u32 { idx as u32 * CELL_BITS }

#[inline]
fn exponent_to_value(exp: u8) -> u64 { if exp == 0 { 0 } else { 1u64 << exp } }

fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R) -> BoardRaw { if rng.gen_range(0..10) < 9 { 1 } else { 2 } }

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Board({:#022x})", self.0)
    }
}

const CELL_WIDTH: usize = 10;

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.to_grid();
        for (r, row) in grid.iter().enumerate() {
            if r > 0 {
                writeln!(f, "{}", "-".repeat(CELL_WIDTH * 4 + 3))?;
            }
            let cells: Vec<String> = row.iter().map(|&e| format_val(e)).collect();
            writeln!(f, "{}", cells.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(exp: u8) -> String {
    match exp {
        0 => " ".repeat(CELL_WIDTH),
        e => format!("{:^width$}", exponent_to_value(e), width = CELL_WIDTH),
    }
}

impl From<BoardRaw> for Board { fn from(v: BoardRaw) -> Self { Board::from_raw(v) } }
impl From<Board> for BoardRaw { fn from(b: Board) -> Self { b.into_raw() } }

impl TryFrom<&Grid> for Board {
    type Error = BoardError;
    fn try_from(grid: &Grid) -> Result<Self, Self::Error> { Board::from_grid(grid) }
}
