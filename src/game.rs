// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The game: a board together with the state that the board alone does not capture (whose turn it is, castling
//! rights, the en-passant target and the move clocks), legal move generation, and making and taking back moves.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::{
    board::{Board, BoardError, Scope},
    check,
    core::*,
    fen::{self, FenParseError},
    movegen::{self, CastleOptions},
};

/// Everything about a game that is not the arrangement of pieces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub turn: Color,
    /// Castling bookkeeping, indexed by `Color as usize`.
    pub moved: [Moved; 2],
    /// The square a pawn skipped over with a double push on the previous move, if any.
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

impl GameState {
    pub fn moved(&self, color: Color) -> Moved {
        self.moved[color as usize]
    }

    /// Records that a move started or ended on `square`. A move touching a king or rook home square means that
    /// piece has either left it or been captured on it, and either way it can no longer castle.
    fn touch(&mut self, square: Square) {
        for color in [Color::White, Color::Black] {
            let moved = &mut self.moved[color as usize];
            if square == king_home(color) {
                moved.insert(Moved::KING);
            } else if square == kingside_rook_home(color) {
                moved.insert(Moved::KINGSIDE_ROOK);
            } else if square == queenside_rook_home(color) {
                moved.insert(Moved::QUEENSIDE_ROOK);
            }
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            turn: Color::White,
            moved: [Moved::NONE; 2],
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }
}

/// Whether the side to move can go on playing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
}

/// The state of the game before a move, and how long the board history was at that point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Snapshot {
    state: GameState,
    history_len: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameEngine {
    board: Board,
    state: GameState,
    snapshots: Vec<Snapshot>,
}

impl GameEngine {
    /// Creates a game from the standard starting position.
    pub fn new() -> GameEngine {
        GameEngine {
            board: Board::starting_position(),
            state: GameState::default(),
            snapshots: Vec::new(),
        }
    }

    /// Creates a game from a six-field FEN string.
    pub fn from_fen(fen: &str) -> Result<GameEngine, FenParseError> {
        let (board, state) = fen::parse_fen(fen)?;
        debug!(fen, "loaded position");
        Ok(GameEngine {
            board,
            state,
            snapshots: Vec::new(),
        })
    }

    /// Creates a game from the piece-placement field of a FEN string, with `turn` to move. Nobody may castle, no
    /// en-passant capture is available, and the clocks start over.
    pub fn from_placement(placement: &str, turn: Color) -> Result<GameEngine, FenParseError> {
        let board = Board::from_placement(placement)?;
        debug!(placement, %turn, "loaded placement");
        Ok(GameEngine {
            board,
            state: GameState {
                turn,
                moved: [Moved::ALL; 2],
                ..GameState::default()
            },
            snapshots: Vec::new(),
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn current_turn(&self) -> Color {
        self.state.turn
    }

    pub fn piece_list(&self) -> &[(Piece, Square)] {
        self.board.pieces()
    }

    pub fn to_placement_string(&self) -> String {
        self.board.as_placement()
    }

    pub fn as_fen(&self) -> String {
        fen::render_fen(&self.board, &self.state)
    }
}

//
// Check detection and castling eligibility.
//

impl GameEngine {
    /// Whether `square` is attacked by the opponent of the side to move.
    pub fn is_in_check(&self, square: Square) -> bool {
        check::is_attacked(&self.board, square, self.state.turn.toggle())
    }

    /// Whether the side to move's king is attacked. A side without a king is never in check.
    pub fn is_king_in_check(&self) -> bool {
        self.board
            .king(self.state.turn)
            .map_or(false, |king| self.is_in_check(king))
    }

    /// The castles available to the king on `king_square`. Empty if there is no king there.
    pub fn castling_moves(&self, king_square: Square) -> Vec<Move> {
        let color = match self.board.at(king_square) {
            Some(piece) if piece.kind == PieceKind::King => piece.color,
            _ => return Vec::new(),
        };

        let options = self.castle_options(king_square, color);
        let mut moves = Vec::with_capacity(2);
        if options.kingside {
            moves.extend(
                king_square
                    .offset(0, 2)
                    .map(|to| Move::kingside_castle(king_square, to)),
            );
        }
        if options.queenside {
            moves.extend(
                king_square
                    .offset(0, -2)
                    .map(|to| Move::queenside_castle(king_square, to)),
            );
        }

        moves
    }

    /// Each wing is judged on its own: the king and that wing's rook must both be unmoved and in place, the
    /// squares between them empty, and none of the squares the king stands on, crosses or lands on attacked.
    fn castle_options(&self, king_square: Square, color: Color) -> CastleOptions {
        if king_square != king_home(color) {
            return CastleOptions::default();
        }

        let rank = color.home_rank();
        let enemy = color.toggle();
        let wing_open = |rook_home: Square, between: &[File], king_path: &[File]| {
            self.board.at(rook_home) == Some(Piece::new(color, PieceKind::Rook))
                && between
                    .iter()
                    .all(|&file| self.board.at(Square::of(rank, file)).is_none())
                && king_path
                    .iter()
                    .all(|&file| !check::is_attacked(&self.board, Square::of(rank, file), enemy))
        };

        let moved = self.state.moved(color);
        CastleOptions {
            kingside: moved.can_castle_kingside()
                && wing_open(
                    kingside_rook_home(color),
                    &[FILE_F, FILE_G],
                    &[FILE_E, FILE_F, FILE_G],
                ),
            queenside: moved.can_castle_queenside()
                && wing_open(
                    queenside_rook_home(color),
                    &[FILE_B, FILE_C, FILE_D],
                    &[FILE_E, FILE_D, FILE_C],
                ),
        }
    }
}

//
// Legal move generation.
//

impl GameEngine {
    /// Returns every legal move of `piece`, which must stand on `square`. If it does not, there are no moves.
    pub fn generate_legal_moves(&mut self, piece: Piece, square: Square) -> Vec<Move> {
        if self.board.at(square) != Some(piece) {
            return Vec::new();
        }

        let castles = if piece.kind == PieceKind::King {
            self.castle_options(square, piece.color)
        } else {
            CastleOptions::default()
        };

        let mut candidates = Vec::new();
        for target in movegen::pseudo_legal_moves(&self.board, square, castles) {
            self.add_candidates(piece, square, target, &mut candidates);
        }

        if piece.kind == PieceKind::Pawn {
            if let Some(mov) = self.en_passant_from_state(piece.color, square) {
                if !candidates.contains(&mov) {
                    candidates.push(mov);
                }
            }
        }

        candidates.retain(|&mov| self.is_legal(piece, mov));
        candidates
    }

    /// Returns every legal move of the side to move.
    pub fn legal_moves(&mut self) -> Vec<Move> {
        let turn = self.state.turn;
        let ours: Vec<(Piece, Square)> = self
            .board
            .pieces()
            .iter()
            .copied()
            .filter(|(piece, _)| piece.color == turn)
            .collect();

        ours.into_iter()
            .flat_map(|(piece, square)| self.generate_legal_moves(piece, square))
            .collect()
    }

    pub fn status(&mut self) -> GameStatus {
        if !self.legal_moves().is_empty() {
            GameStatus::Ongoing
        } else if self.is_king_in_check() {
            GameStatus::Checkmate
        } else {
            GameStatus::Stalemate
        }
    }

    /// Resolves a move written in UCI notation (`e2e4`, `e7e8q`) against the legal moves of the side to move.
    pub fn parse_uci_move(&mut self, text: &str) -> Option<Move> {
        if !(4..=5).contains(&text.len()) {
            return None;
        }

        let from = text.get(0..2)?.parse::<Square>().ok()?;
        let to = text.get(2..4)?.parse::<Square>().ok()?;
        let promotion = match text.get(4..)?.chars().next() {
            Some(c) => Some(PieceKind::from_char(c)?),
            None => None,
        };

        let piece = self.board.at(from)?;
        if piece.color != self.state.turn {
            return None;
        }

        self.generate_legal_moves(piece, from)
            .into_iter()
            .find(|mov| mov.to() == to && mov.promotion_piece() == promotion)
    }

    /// Turns one pseudo-legal destination into the move or moves it stands for.
    fn add_candidates(&self, piece: Piece, from: Square, to: Square, candidates: &mut Vec<Move>) {
        let file_delta = to.file().as_u8() as i8 - from.file().as_u8() as i8;
        match piece.kind {
            PieceKind::Pawn if to.rank() == piece.color.promotion_rank() => candidates.extend(
                PieceKind::PROMOTIONS
                    .iter()
                    .map(|&kind| Move::promotion(from, to, kind)),
            ),
            PieceKind::Pawn if file_delta != 0 && self.board.at(to).is_none() => {
                candidates.push(Move::en_passant(from, to))
            }
            PieceKind::King if file_delta == 2 => candidates.push(Move::kingside_castle(from, to)),
            PieceKind::King if file_delta == -2 => {
                candidates.push(Move::queenside_castle(from, to))
            }
            _ => candidates.push(Move::quiet(from, to)),
        }
    }

    /// The en-passant capture offered by the game state's en-passant target, which is the only way to learn of
    /// one in a position loaded from FEN.
    fn en_passant_from_state(&self, color: Color, square: Square) -> Option<Move> {
        let target = self.state.en_passant?;
        if color != self.state.turn || square.rank() != color.en_passant_rank() {
            return None;
        }

        let adjacent = [-1, 1]
            .iter()
            .any(|&side| square.offset(color.forward(), side) == Some(target));
        if !adjacent || self.board.at(target).is_some() {
            return None;
        }

        let mov = Move::en_passant(square, target);
        match self.board.at(mov.en_passant_victim()) {
            Some(victim) if victim.is(color.toggle(), PieceKind::Pawn) => Some(mov),
            _ => None,
        }
    }

    /// Tries the move on the live board and reports whether it leaves the mover's king unattacked. The board is
    /// rolled back before returning.
    fn is_legal(&mut self, piece: Piece, mov: Move) -> bool {
        let color = piece.color;
        let mut scope = self.board.scope();
        if let Err(err) = play(&mut scope, piece, mov) {
            trace!(%mov, %err, "board refused candidate move");
            return false;
        }

        match scope.king(color) {
            Some(king) => !check::is_attacked(&scope, king, color.toggle()),
            None => true,
        }
    }
}

/// Performs every board step of a move: the piece itself, the rook's leg of a castle, and a promotion.
fn play(scope: &mut Scope<'_>, piece: Piece, mov: Move) -> Result<(), BoardError> {
    scope.move_piece(piece, mov)?;
    if let Some(kind) = mov.promotion_piece() {
        scope.promote(kind)?;
    }

    if let Some(rook_move) = mov.rook_castle_move(piece.color) {
        scope.move_piece(Piece::new(piece.color, PieceKind::Rook), rook_move)?;
    }

    Ok(())
}

//
// Make and undo.
//

impl GameEngine {
    /// Makes a move, updating the board and all of the game state to reflect it.
    ///
    /// The move is not checked for legality; it is assumed to come from `generate_legal_moves`. If the board
    /// refuses it, nothing changes.
    pub fn apply_move(&mut self, mov: Move) -> Result<(), BoardError> {
        let piece = self
            .board
            .at(mov.from())
            .ok_or(BoardError::EmptySource(mov.from()))?;
        let snapshot = Snapshot {
            state: self.state,
            history_len: self.board.history().len(),
        };
        let is_capture = mov.is_en_passant() || self.board.at(mov.to()).is_some();

        {
            let mut scope = self.board.scope();
            if let Err(err) = play(&mut scope, piece, mov) {
                warn!(%mov, %err, "board refused move");
                return Err(err);
            }

            scope.commit();
        }

        let state = &mut self.state;
        state.touch(mov.from());
        state.touch(mov.to());
        state.en_passant = if piece.kind == PieceKind::Pawn && mov.is_two_rank_step() {
            mov.from().offset(piece.color.forward(), 0)
        } else {
            None
        };

        if piece.kind == PieceKind::Pawn || is_capture {
            state.halfmove_clock = 0;
        } else {
            state.halfmove_clock = state.halfmove_clock.saturating_add(1);
        }

        if state.turn == Color::Black {
            state.fullmove_number = state.fullmove_number.saturating_add(1);
        }

        state.turn = state.turn.toggle();
        self.snapshots.push(snapshot);
        debug!(%mov, %piece, "applied move");
        Ok(())
    }

    /// Takes back the most recent `apply_move`, restoring the board and the game state exactly.
    pub fn undo_move(&mut self) -> Result<(), BoardError> {
        let snapshot = self.snapshots.pop().ok_or(BoardError::EmptyHistory)?;
        self.board.rewind(snapshot.history_len);
        self.state = snapshot.state;
        debug!(
            turn = %self.state.turn,
            remaining = self.snapshots.len(),
            "undid move"
        );
        Ok(())
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        GameEngine::new()
    }
}
