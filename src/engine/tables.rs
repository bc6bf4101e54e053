//! Row move tables.
//!
//! A row is 4 five-bit fields (20 bits), so every possible row fits in a
//! table of `2^20` entries. Only the left slide is simulated; the right table
//! is derived with `right(r) = mirror(left(mirror(r)))`.

use super::state::{Board, BoardRaw, MAX_EXPONENT, ROW_BITS, ROW_MASK};

/// Number of distinct 20-bit rows.
pub const ROW_TABLE_SIZE: usize = 1 << ROW_BITS;

const FIELD: u32 = 0x1f;

/// Precomputed left and right row tables.
///
/// Built once and immutable afterwards; share it by reference (or use the
/// process-wide instance from [`crate::engine::tables`]).
pub struct MoveTables {
    left: Box<[u32]>,
    right: Box<[u32]>,
}

impl MoveTables {
    /// Simulate the left table and mirror it into the right table.
    pub fn build() -> Self {
        let left = build_left_table();
        let right = build_right_table(&left);
        MoveTables { left, right }
    }

    #[inline]
    pub fn left(&self) -> &[u32] { &self.left }

    #[inline]
    pub fn right(&self) -> &[u32] { &self.right }

    /// Slide every row towards column 0.
    #[inline]
    pub fn move_left(&self, board: Board) -> Board { Board::from_raw(shift_rows(board.raw(), &self.left)) }

    /// Slide every row towards column 3.
    #[inline]
    pub fn move_right(&self, board: Board) -> Board { Board::from_raw(shift_rows(board.raw(), &self.right)) }

    /// Slide every column towards row 0.
    #[inline]
    pub fn move_up(&self, board: Board) -> Board {
        Board::from_raw(transpose(shift_rows(transpose(board.raw()), &self.left)))
    }

    /// Slide every column towards row 3.
    #[inline]
    pub fn move_down(&self, board: Board) -> Board {
        Board::from_raw(transpose(shift_rows(transpose(board.raw()), &self.right)))
    }
}

/// Left slide-and-merge result for every row value.
pub fn build_left_table() -> Box<[u32]> {
    // Allocate on the heap to avoid large stack frames
    let mut table = vec![0u32; ROW_TABLE_SIZE];
    for (row, slot) in table.iter_mut().enumerate() {
        *slot = slide_row_left(row as u32);
    }
    table.into_boxed_slice()
}

/// Right table derived from the left one by mirroring rows.
pub fn build_right_table(left: &[u32]) -> Box<[u32]> {
    debug_assert_eq!(left.len(), ROW_TABLE_SIZE);
    let mut table = vec![0u32; ROW_TABLE_SIZE];
    for (row, slot) in table.iter_mut().enumerate() {
        *slot = mirror_row(left[mirror_row(row as u32) as usize]);
    }
    table.into_boxed_slice()
}

/// Reverse the order of the four fields of a 20-bit row.
#[inline]
pub const fn mirror_row(row: u32) -> u32 {
    let t0 = (row & 0x0_001f) << 15;
    let t1 = (row & 0x0_03e0) << 5;
    let t2 = (row & 0x0_7c00) >> 5;
    let t3 = (row & 0xf_8000) >> 15;
    t0 | t1 | t2 | t3
}

/// Unpack a 20-bit row into its four exponents, field 0 first.
#[inline]
pub fn row_to_tiles(row: u32) -> [u8; 4] {
    [0, 1, 2, 3].map(|i| ((row >> (i * 5)) & FIELD) as u8)
}

/// Pack four exponents into a 20-bit row, field 0 first.
#[inline]
pub fn tiles_to_row(tiles: [u8; 4]) -> u32 {
    tiles.iter().enumerate().fold(0, |row, (i, &t)| row | ((t as u32) << (i * 5)))
}

/// Compress non-empty tiles towards field 0 and merge equal neighbours once.
///
/// A freshly merged tile never merges again in the same pass. Two tiles at
/// `MAX_EXPONENT` stay apart since their sum would not fit in a field.
pub(crate) fn slide_row_left(row: u32) -> u32 {
    let mut out = [0u8; 4];
    let mut len = 0;
    let mut pending: Option<u8> = None;
    for tile in row_to_tiles(row).into_iter().filter(|&t| t != 0) {
        match pending {
            Some(prev) if prev == tile && tile < MAX_EXPONENT => {
                out[len] = tile + 1;
                len += 1;
                pending = None;
            }
            Some(prev) => {
                out[len] = prev;
                len += 1;
                pending = Some(tile);
            }
            None => pending = Some(tile),
        }
    }
    if let Some(prev) = pending {
        out[len] = prev;
    }
    tiles_to_row(out)
}

#[inline(always)]
fn shift_rows(board: BoardRaw, table: &[u32]) -> BoardRaw {
    (0..4).fold(0, |acc, row_idx| {
        let shift = row_idx * ROW_BITS;
        let row = ((board >> shift) & ROW_MASK) as usize;
        acc | ((get_row_entry(table, row) as BoardRaw) << shift)
    })
}

#[inline(always)]
fn get_row_entry(table: &[u32], idx: usize) -> u32 {
    debug_assert!(idx < ROW_TABLE_SIZE && table.len() == ROW_TABLE_SIZE);
    // SAFETY: tables are only built with ROW_TABLE_SIZE entries and `idx` is
    // masked to ROW_BITS bits by the caller.
    unsafe { *table.get_unchecked(idx) }
}

/// Fields that are mirrored across the diagonal of each 2x2 block.
const fn fields_mask(fields: [u32; 4]) -> BoardRaw {
    let mut m: BoardRaw = 0;
    let mut i = 0;
    while i < 4 {
        m |= 0x1f << (fields[i] * 5);
        i += 1;
    }
    m
}

const BLOCK_UPPER: BoardRaw = fields_mask([1, 3, 9, 11]);
const BLOCK_LOWER: BoardRaw = fields_mask([4, 6, 12, 14]);
const QUAD_TOP_RIGHT: BoardRaw = fields_mask([2, 3, 6, 7]);
const QUAD_BOTTOM_LEFT: BoardRaw = fields_mask([8, 9, 12, 13]);

/// Swap rows and columns: field `(r, c)` moves to `(c, r)`.
///
/// First transposes each 2x2 block in place (fields move 3 positions), then
/// swaps the top-right and bottom-left blocks (fields move 6 positions).
#[inline]
pub fn transpose(x: BoardRaw) -> BoardRaw {
    let a = (x & !(BLOCK_UPPER | BLOCK_LOWER))
        | ((x & BLOCK_UPPER) << 15)
        | ((x & BLOCK_LOWER) >> 15);
    (a & !(QUAD_TOP_RIGHT | QUAD_BOTTOM_LEFT))
        | ((a & QUAD_TOP_RIGHT) << 30)
        | ((a & QUAD_BOTTOM_LEFT) >> 30)
}
