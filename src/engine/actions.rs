//! Legal-move resolution.

use std::fmt;

use super::state::Board;
use super::{tables, Move};

/// A subset of {Up, Down, Left, Right}, stored as a 4-bit mask.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);
    pub const ALL: ActionSet = ActionSet(0b1111);

    #[inline]
    pub fn insert(&mut self, dir: Move) { self.0 |= 1 << dir.index(); }

    #[inline]
    pub fn contains(self, dir: Move) -> bool { self.0 & (1 << dir.index()) != 0 }

    #[inline]
    pub fn len(self) -> usize { self.0.count_ones() as usize }

    #[inline]
    pub fn is_empty(self) -> bool { self.0 == 0 }

    /// Members in `[Up, Down, Left, Right]` order.
    pub fn iter(self) -> impl Iterator<Item = Move> {
        Move::ALL.into_iter().filter(move |&dir| self.contains(dir))
    }

    /// The `n`-th member in iteration order.
    #[inline]
    pub fn nth(self, n: usize) -> Option<Move> { self.iter().nth(n) }
}

impl FromIterator<Move> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        let mut set = ActionSet::EMPTY;
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

impl fmt::Debug for ActionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Legal moves of a board along with the board each one produces.
///
/// Resolving legality requires applying every move, so the results are kept
/// for the caller instead of being thrown away.
#[derive(Clone, Copy, Debug)]
pub struct LegalMoves {
    actions: ActionSet,
    results: [Board; 4],
}

impl LegalMoves {
    pub fn resolve(board: Board) -> Self {
        let t = tables();
        let results = [t.move_up(board), t.move_down(board), t.move_left(board), t.move_right(board)];
        let actions = Move::ALL
            .into_iter()
            .filter(|dir| results[dir.index()] != board)
            .collect();
        LegalMoves { actions, results }
    }

    #[inline]
    pub fn actions(&self) -> ActionSet { self.actions }

    #[inline]
    pub fn is_empty(&self) -> bool { self.actions.is_empty() }

    /// Board reached by `dir`, or `None` when `dir` is not legal.
    #[inline]
    pub fn result(&self, dir: Move) -> Option<Board> {
        self.actions.contains(dir).then(|| self.results[dir.index()])
    }

    /// `(move, resulting board)` for every legal move.
    pub fn iter(&self) -> impl Iterator<Item = (Move, Board)> + '_ {
        self.actions.iter().map(move |dir| (dir, self.results[dir.index()]))
    }
}

/// Directions whose move changes `board`, with their results.
#[inline]
pub fn legal_moves(board: Board) -> LegalMoves { LegalMoves::resolve(board) }
