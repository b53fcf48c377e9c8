// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The board: an 8x8 grid of pieces, an index of where every piece stands, and a history of the moves that
//! produced the current arrangement, each of which can be taken back exactly.

use std::{fmt, ops::Deref};

use thiserror::Error;
use tracing::warn;

use crate::{
    core::{self, *},
    fen::{self, FenParseError},
};

/// Ways a request to mutate the board can violate its contract. None of these occur when the board is driven by
/// moves that came out of the legal move generator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("no piece on {0}")]
    EmptySource(Square),
    #[error("expected {expected} on {square}, found {found}")]
    PieceMismatch {
        square: Square,
        expected: Piece,
        found: Piece,
    },
    #[error("cannot capture own piece on {0}")]
    FriendlyCapture(Square),
    #[error("en-passant capture without an enemy pawn on {0}")]
    MissingEnPassantPawn(Square),
    #[error("en-passant destination {0} is occupied")]
    OccupiedEnPassantTarget(Square),
    #[error("no move to undo")]
    EmptyHistory,
    #[error("board no longer matches the last recorded move at {0}")]
    HistoryMismatch(Square),
    #[error("last move to {0} is not a promotion to that piece")]
    NotAPromotion(Square),
}

/// A piece removed from the board by a move, with enough information to put it back where it was, both on the
/// grid and in the piece list.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Capture {
    pub piece: Piece,
    pub square: Square,
    slot: usize,
}

/// A move that has been applied to the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub mov: Move,
    /// The piece that moved, as it was before moving. A promoted pawn is recorded as a pawn.
    pub piece: Piece,
    pub captured: Option<Capture>,
}

impl HistoryEntry {
    /// Whether this entry is a pawn advancing two ranks from its starting rank.
    pub fn is_double_pawn_push(&self) -> bool {
        self.piece.kind == PieceKind::Pawn
            && self.mov.from().rank() == self.piece.color.pawn_rank()
            && self.mov.is_two_rank_step()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    /// Occupant of every square, indexed by `Square::index`.
    grid: [Option<Piece>; 64],
    /// Every piece on the board and the square it stands on. Exactly one entry per occupied square.
    pieces: Vec<(Piece, Square)>,
    /// Every move applied through `move_piece` that has not been undone, oldest first.
    history: Vec<HistoryEntry>,
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Board {
        Board {
            grid: [None; 64],
            pieces: Vec::with_capacity(32),
            history: Vec::with_capacity(256),
        }
    }

    /// Creates a board holding the standard starting arrangement.
    pub fn starting_position() -> Board {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Board::new();
        for color in [Color::White, Color::Black] {
            for (file, kind) in core::files().zip(BACK_RANK) {
                board.insert(Square::of(color.home_rank(), file), Piece::new(color, kind), None);
                board.insert(
                    Square::of(color.pawn_rank(), file),
                    Piece::new(color, PieceKind::Pawn),
                    None,
                );
            }
        }

        board
    }

    /// Builds a board from the piece-placement field of a FEN string.
    pub fn from_placement(placement: &str) -> Result<Board, FenParseError> {
        fen::parse_placement(placement)
    }

    /// Renders the board as the piece-placement field of a FEN string.
    pub fn as_placement(&self) -> String {
        fen::render_placement(self)
    }

    /// Whether the given signed coordinates lie on the board.
    pub fn is_in_bound(rank: i8, file: i8) -> bool {
        (0..8).contains(&rank) && (0..8).contains(&file)
    }

    pub fn at(&self, square: Square) -> Option<Piece> {
        self.grid[square.index()]
    }

    /// The pieces on the board, in a stable order that `undo_last_move` preserves.
    pub fn pieces(&self) -> &[(Piece, Square)] {
        &self.pieces
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn last_move(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    pub fn king(&self, color: Color) -> Option<Square> {
        self.pieces
            .iter()
            .find(|(piece, _)| piece.is(color, PieceKind::King))
            .map(|&(_, square)| square)
    }

    /// Overwrites a square with the given occupant, or clears it. This does not record history.
    pub fn set_piece(&mut self, piece: Option<Piece>, square: Square) {
        match (self.at(square), piece) {
            (_, None) => {
                self.remove(square);
            }
            (Some(_), Some(piece)) => self.replace(square, piece),
            (None, Some(piece)) => self.insert(square, piece, None),
        }
    }

    /// Moves `piece` along `mov`, capturing whatever enemy piece the move lands on (or, for en-passant, passes
    /// beside), and records the move so that it can be undone.
    ///
    /// Castles are not special here: the king and rook are moved by two separate calls.
    pub fn move_piece(&mut self, piece: Piece, mov: Move) -> Result<(), BoardError> {
        let found = self
            .at(mov.from())
            .ok_or(BoardError::EmptySource(mov.from()))?;
        if found != piece {
            return Err(BoardError::PieceMismatch {
                square: mov.from(),
                expected: piece,
                found,
            });
        }

        let capture_square = if mov.is_en_passant() {
            if self.at(mov.to()).is_some() {
                return Err(BoardError::OccupiedEnPassantTarget(mov.to()));
            }

            let victim = mov.en_passant_victim();
            match self.at(victim) {
                Some(target) if target.is(piece.color.toggle(), PieceKind::Pawn) => {}
                _ => return Err(BoardError::MissingEnPassantPawn(victim)),
            }

            victim
        } else {
            mov.to()
        };

        let captured = match self.at(capture_square) {
            Some(target) if target.color == piece.color => {
                return Err(BoardError::FriendlyCapture(capture_square));
            }
            Some(_) => self.remove(capture_square).map(|(piece, slot)| Capture {
                piece,
                square: capture_square,
                slot,
            }),
            None => None,
        };

        self.relocate(mov.from(), mov.to(), piece);
        self.history.push(HistoryEntry {
            mov,
            piece,
            captured,
        });
        Ok(())
    }

    /// Takes back the most recent `move_piece`, restoring the mover to its origin as it was before moving and
    /// any captured piece to the square it was captured on.
    ///
    /// Fails without changing anything if the squares the move touched have since been overwritten.
    pub fn undo_last_move(&mut self) -> Result<(), BoardError> {
        let entry = *self.history.last().ok_or(BoardError::EmptyHistory)?;
        self.check_undoable(&entry)?;
        self.history.pop();
        self.relocate(entry.mov.to(), entry.mov.from(), entry.piece);
        if let Some(capture) = entry.captured {
            self.insert(capture.square, capture.piece, Some(capture.slot));
        }

        debug_assert!(self.is_consistent());
        Ok(())
    }

    /// Undoes moves until only `len` history entries remain.
    pub(crate) fn rewind(&mut self, len: usize) {
        while self.history.len() > len {
            if let Err(err) = self.undo_last_move() {
                warn!(%err, len, "stopped rewinding board");
                break;
            }
        }
    }

    /// The origin must be empty, the destination must hold the mover (or what it legitimately promoted to), and
    /// an en-passant victim's square must be empty again.
    fn check_undoable(&self, entry: &HistoryEntry) -> Result<(), BoardError> {
        let from = entry.mov.from();
        let to = entry.mov.to();
        if self.at(from).is_some() {
            return Err(BoardError::HistoryMismatch(from));
        }

        let promoted = entry
            .mov
            .promotion_piece()
            .map(|kind| Piece::new(entry.piece.color, kind));
        match self.at(to) {
            Some(piece) if piece == entry.piece || Some(piece) == promoted => {}
            _ => return Err(BoardError::HistoryMismatch(to)),
        }

        match entry.captured {
            Some(capture) if capture.square != to && self.at(capture.square).is_some() => {
                Err(BoardError::HistoryMismatch(capture.square))
            }
            _ => Ok(()),
        }
    }

    /// Opens a scope in which moves can be tried out. Every move made through the scope is undone when it is
    /// dropped, unless the scope is committed.
    pub fn scope(&mut self) -> Scope<'_> {
        let mark = self.history.len();
        Scope { board: self, mark }
    }
}

//
// Grid and piece-list writes.
//
// Every mutation of the board funnels through the four routines below, which are the only code that touches
// `grid` and `pieces`. Keeping them together is what keeps the piece list in step with the grid.
//

impl Board {
    fn slot_of(&self, square: Square) -> Option<usize> {
        self.pieces.iter().position(|&(_, sq)| sq == square)
    }

    fn insert(&mut self, square: Square, piece: Piece, slot: Option<usize>) {
        debug_assert!(self.grid[square.index()].is_none(), "insert onto occupied {}", square);
        self.grid[square.index()] = Some(piece);
        match slot {
            Some(slot) if slot <= self.pieces.len() => self.pieces.insert(slot, (piece, square)),
            _ => self.pieces.push((piece, square)),
        }
    }

    fn remove(&mut self, square: Square) -> Option<(Piece, usize)> {
        let piece = self.grid[square.index()].take()?;
        let slot = self.slot_of(square)?;
        self.pieces.remove(slot);
        Some((piece, slot))
    }

    fn replace(&mut self, square: Square, piece: Piece) {
        self.grid[square.index()] = Some(piece);
        match self.slot_of(square) {
            Some(slot) => self.pieces[slot] = (piece, square),
            None => self.pieces.push((piece, square)),
        }
    }

    fn relocate(&mut self, from: Square, to: Square, piece: Piece) {
        debug_assert!(self.grid[to.index()].is_none(), "relocate onto occupied {}", to);
        self.grid[from.index()] = None;
        self.grid[to.index()] = Some(piece);
        match self.slot_of(from) {
            Some(slot) => self.pieces[slot] = (piece, to),
            None => self.pieces.push((piece, to)),
        }
    }

    /// Whether the piece list and the grid describe the same arrangement.
    pub fn is_consistent(&self) -> bool {
        let occupied = self.grid.iter().filter(|cell| cell.is_some()).count();
        occupied == self.pieces.len()
            && self
                .pieces
                .iter()
                .all(|&(piece, square)| self.at(square) == Some(piece))
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rank in core::ranks().rev() {
            for file in core::files() {
                match self.at(Square::of(rank, file)) {
                    Some(piece) => write!(f, " {} ", piece)?,
                    None => write!(f, " . ")?,
                }
            }

            writeln!(f, "| {}", rank)?;
        }

        for _ in core::files() {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for file in core::files() {
            write!(f, " {} ", file)?;
        }

        writeln!(f)
    }
}

/// A window onto a board in which moves are provisional. Dropping the scope takes back every move made through
/// it, so a caller can inspect a hypothetical position without being able to leave it behind.
pub struct Scope<'a> {
    board: &'a mut Board,
    mark: usize,
}

impl Scope<'_> {
    pub fn move_piece(&mut self, piece: Piece, mov: Move) -> Result<(), BoardError> {
        self.board.move_piece(piece, mov)
    }

    /// Turns the pawn that the last move made through this scope carried to the back rank into `kind`. Rewinding
    /// the move turns it back into a pawn.
    pub fn promote(&mut self, kind: PieceKind) -> Result<(), BoardError> {
        let entry = match self.board.history.get(self.mark..).and_then(|moves| moves.last()) {
            Some(entry) => *entry,
            None => return Err(BoardError::EmptyHistory),
        };

        let to = entry.mov.to();
        if entry.piece.kind != PieceKind::Pawn || entry.mov.promotion_piece() != Some(kind) {
            return Err(BoardError::NotAPromotion(to));
        }

        self.board.replace(to, Piece::new(entry.piece.color, kind));
        Ok(())
    }

    /// Keeps the moves made through this scope.
    pub fn commit(mut self) {
        self.mark = self.board.history.len();
    }
}

impl Deref for Scope<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        self.board.rewind(self.mark);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(c: char) -> Piece {
        use std::convert::TryFrom;
        Piece::try_from(c).unwrap()
    }

    mod placement {
        use super::*;

        #[test]
        fn load_and_render() {
            let placement = "8/8/8/8/8/8/4P3/8";
            let board = Board::from_placement(placement).unwrap();
            assert_eq!(placement, board.as_placement());
            assert_eq!(Some(piece('P')), board.at(E2));
        }

        #[test]
        fn edge_squares() {
            let board = Board::from_placement("r6k/8/8/8/8/8/8/R6K").unwrap();
            assert_eq!(Some(piece('r')), board.at(A8));
            assert_eq!(Some(piece('k')), board.at(H8));
            assert_eq!(Some(piece('R')), board.at(A1));
            assert_eq!(Some(piece('K')), board.at(H1));
        }

        #[test]
        fn empty_compression() {
            let board = Board::from_placement("3p4/8/8/8/8/8/8/8").unwrap();
            assert_eq!("3p4/8/8/8/8/8/8/8", board.as_placement());
        }

        #[test]
        fn starting_position_matches_fen() {
            let board = Board::starting_position();
            assert_eq!(
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR",
                board.as_placement()
            );
            assert_eq!(32, board.pieces().len());
            assert!(board.is_consistent());
        }

        #[test]
        fn bounds() {
            assert!(Board::is_in_bound(0, 0));
            assert!(Board::is_in_bound(7, 7));
            assert!(!Board::is_in_bound(8, 0));
            assert!(!Board::is_in_bound(0, -1));
        }
    }

    mod moves {
        use super::*;

        #[test]
        fn quiet_move_and_undo() {
            let mut board = Board::starting_position();
            let before = board.clone();
            board.move_piece(piece('P'), Move::quiet(E2, E4)).unwrap();
            assert_eq!(None, board.at(E2));
            assert_eq!(Some(piece('P')), board.at(E4));
            assert!(board.is_consistent());

            board.undo_last_move().unwrap();
            assert_eq!(before, board);
        }

        #[test]
        fn capture_restores_piece_and_slot() {
            let mut board = Board::from_placement("8/8/8/3p4/4P3/8/8/8").unwrap();
            let before = board.pieces().to_vec();
            board.move_piece(piece('P'), Move::quiet(E4, D5)).unwrap();
            assert_eq!(1, board.pieces().len());
            let entry = board.last_move().unwrap();
            assert_eq!(Some(piece('p')), entry.captured.map(|c| c.piece));

            board.undo_last_move().unwrap();
            assert_eq!(before.as_slice(), board.pieces());
            assert_eq!(Some(piece('p')), board.at(D5));
        }

        #[test]
        fn en_passant_captures_beside() {
            let mut board = Board::from_placement("8/8/8/3pP3/8/8/8/8").unwrap();
            board
                .move_piece(piece('P'), Move::en_passant(E5, D6))
                .unwrap();
            assert_eq!(None, board.at(D5));
            assert_eq!(Some(piece('P')), board.at(D6));
            assert_eq!(
                Some(D5),
                board.last_move().and_then(|e| e.captured).map(|c| c.square)
            );

            board.undo_last_move().unwrap();
            assert_eq!(Some(piece('p')), board.at(D5));
            assert_eq!(Some(piece('P')), board.at(E5));
            assert_eq!(None, board.at(D6));
        }

        #[test]
        fn undo_reverts_promotion() {
            let mut board = Board::from_placement("8/4P3/8/8/8/8/8/8").unwrap();
            board
                .move_piece(piece('P'), Move::promotion(E7, E8, PieceKind::Queen))
                .unwrap();
            board.set_piece(Some(piece('Q')), E8);
            assert_eq!(vec![(piece('Q'), E8)], board.pieces().to_vec());

            board.undo_last_move().unwrap();
            assert_eq!(Some(piece('P')), board.at(E7));
            assert_eq!(None, board.at(E8));
        }

        #[test]
        fn undo_refuses_overwritten_origin() {
            let mut board = Board::starting_position();
            board.move_piece(piece('P'), Move::quiet(E2, E4)).unwrap();
            board.set_piece(Some(piece('N')), E2);
            let after = board.clone();

            assert_eq!(Err(BoardError::HistoryMismatch(E2)), board.undo_last_move());
            assert_eq!(after, board);
            assert_eq!(1, board.history().len());
            assert!(board.is_consistent());
        }

        #[test]
        fn undo_refuses_changed_destination() {
            let mut board = Board::starting_position();
            board.move_piece(piece('P'), Move::quiet(E2, E4)).unwrap();
            board.set_piece(None, E4);
            assert_eq!(Err(BoardError::HistoryMismatch(E4)), board.undo_last_move());

            board.set_piece(Some(piece('q')), E4);
            assert_eq!(Err(BoardError::HistoryMismatch(E4)), board.undo_last_move());

            board.set_piece(Some(piece('P')), E4);
            board.undo_last_move().unwrap();
            assert_eq!(Board::starting_position(), board);
        }

        #[test]
        fn undo_refuses_refilled_en_passant_square() {
            let mut board = Board::from_placement("8/8/8/3pP3/8/8/8/8").unwrap();
            board
                .move_piece(piece('P'), Move::en_passant(E5, D6))
                .unwrap();
            board.set_piece(Some(piece('n')), D5);
            assert_eq!(Err(BoardError::HistoryMismatch(D5)), board.undo_last_move());
            assert_eq!(Some(piece('P')), board.at(D6));
        }

        #[test]
        fn contract_violations() {
            let mut board = Board::from_placement("8/8/8/8/8/8/4PP2/8").unwrap();
            assert_eq!(
                Err(BoardError::EmptySource(E3)),
                board.move_piece(piece('P'), Move::quiet(E3, E4))
            );
            assert_eq!(
                Err(BoardError::FriendlyCapture(F2)),
                board.move_piece(piece('P'), Move::quiet(E2, F2))
            );
            assert!(matches!(
                board.move_piece(piece('N'), Move::quiet(E2, E3)),
                Err(BoardError::PieceMismatch { .. })
            ));
            assert_eq!(
                Err(BoardError::MissingEnPassantPawn(D2)),
                board.move_piece(piece('P'), Move::en_passant(E2, D3))
            );
            assert_eq!(Err(BoardError::EmptyHistory), board.undo_last_move());
            assert!(board.history().is_empty());
        }

        #[test]
        fn set_piece_keeps_index() {
            let mut board = Board::new();
            board.set_piece(Some(piece('k')), E8);
            board.set_piece(Some(piece('q')), E8);
            assert_eq!(vec![(piece('q'), E8)], board.pieces().to_vec());
            board.set_piece(None, E8);
            assert!(board.pieces().is_empty());
            assert!(board.is_consistent());
        }
    }

    mod scope {
        use super::*;

        #[test]
        fn drop_rolls_back() {
            let mut board = Board::starting_position();
            let before = board.clone();
            {
                let mut scope = board.scope();
                scope.move_piece(piece('N'), Move::quiet(G1, F3)).unwrap();
                scope.move_piece(piece('p'), Move::quiet(E7, E5)).unwrap();
                assert_eq!(Some(piece('N')), scope.at(F3));
            }

            assert_eq!(before, board);
        }

        #[test]
        fn failed_move_inside_scope_rolls_back() {
            let mut board = Board::starting_position();
            let before = board.clone();
            let mut attempt = || -> Result<(), BoardError> {
                let mut scope = board.scope();
                scope.move_piece(piece('P'), Move::quiet(D2, D4))?;
                scope.move_piece(piece('P'), Move::quiet(D4, D6))?;
                scope.move_piece(piece('P'), Move::quiet(A3, A4))?;
                scope.commit();
                Ok(())
            };

            assert_eq!(Err(BoardError::EmptySource(A3)), attempt());
            assert_eq!(before, board);
        }

        #[test]
        fn promotion_rolls_back() {
            let mut board = Board::from_placement("8/4P3/8/8/8/8/8/8").unwrap();
            let before = board.clone();
            {
                let mut scope = board.scope();
                scope
                    .move_piece(piece('P'), Move::promotion(E7, E8, PieceKind::Knight))
                    .unwrap();
                scope.promote(PieceKind::Knight).unwrap();
                assert_eq!(Some(piece('N')), scope.at(E8));
            }

            assert_eq!(before, board);
        }

        #[test]
        fn promote_requires_a_promotion_in_scope() {
            let mut board = Board::from_placement("8/8/8/8/8/8/p7/8").unwrap();
            let before = board.clone();
            {
                let mut scope = board.scope();
                assert_eq!(Err(BoardError::EmptyHistory), scope.promote(PieceKind::Queen));

                scope.move_piece(piece('p'), Move::quiet(A2, A1)).unwrap();
                assert_eq!(Err(BoardError::NotAPromotion(A1)), scope.promote(PieceKind::Queen));
                assert_eq!(Some(piece('p')), scope.at(A1));
            }

            assert_eq!(before, board);
        }

        #[test]
        fn promote_must_match_the_move() {
            let mut board = Board::from_placement("8/8/8/8/8/8/p7/8").unwrap();
            let mut scope = board.scope();
            scope
                .move_piece(piece('p'), Move::promotion(A2, A1, PieceKind::Rook))
                .unwrap();
            assert_eq!(Err(BoardError::NotAPromotion(A1)), scope.promote(PieceKind::Queen));
            scope.promote(PieceKind::Rook).unwrap();
            assert_eq!(Some(piece('r')), scope.at(A1));
        }

        #[test]
        fn commit_keeps_moves() {
            let mut board = Board::starting_position();
            {
                let mut scope = board.scope();
                scope.move_piece(piece('P'), Move::quiet(E2, E4)).unwrap();
                scope.commit();
            }

            assert_eq!(Some(piece('P')), board.at(E4));
            assert_eq!(1, board.history().len());
        }
    }
}
