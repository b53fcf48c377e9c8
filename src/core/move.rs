// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::*;

/// What, beyond moving one piece from `from` to `to`, a move does.
///
/// At most one of these applies to any move, so castling and promotion flags can never be combined.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Special {
    None,
    /// A pawn capture onto the square an enemy pawn just skipped; the captured pawn sits beside the source.
    EnPassant,
    /// King moves two files toward the h-file rook, which lands next to it.
    KingsideCastle,
    /// King moves two files toward the a-file rook, which lands next to it.
    QueensideCastle,
    /// The pawn becomes the given piece on arrival.
    Promotion(PieceKind),
}

/// A move, as understood by the engine. For castles, `from` and `to` are the king's squares.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    from: Square,
    to: Square,
    special: Special,
}

impl Move {
    /// Constructs a new move from the source square to the destination square, which may or may not be a
    /// capture.
    pub fn quiet(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            special: Special::None,
        }
    }

    /// Constructs a new en passsant move from the source square to the destination square.
    pub fn en_passant(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            special: Special::EnPassant,
        }
    }

    /// Constructs a new move from the source square to the destination square, promoting the current piece to
    /// the given piece kind.
    pub fn promotion(from: Square, to: Square, promoted: PieceKind) -> Move {
        assert!(
            PieceKind::PROMOTIONS.contains(&promoted),
            "invalid promotion piece"
        );
        Move {
            from,
            to,
            special: Special::Promotion(promoted),
        }
    }

    /// Constructs a new kingside castle from the king's source square to its destination square.
    pub fn kingside_castle(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            special: Special::KingsideCastle,
        }
    }

    /// Constructs a new queenside castle from the king's source square to its destination square.
    pub fn queenside_castle(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            special: Special::QueensideCastle,
        }
    }

    pub fn from(self) -> Square {
        self.from
    }

    pub fn to(self) -> Square {
        self.to
    }

    pub fn special(self) -> Special {
        self.special
    }

    pub fn is_en_passant(self) -> bool {
        self.special == Special::EnPassant
    }

    pub fn is_kingside_castle(self) -> bool {
        self.special == Special::KingsideCastle
    }

    pub fn is_queenside_castle(self) -> bool {
        self.special == Special::QueensideCastle
    }

    pub fn is_castle(self) -> bool {
        self.is_kingside_castle() || self.is_queenside_castle()
    }

    /// If this move is a promotion, returns the piece kind that the pawn is being promoted to.
    pub fn promotion_piece(self) -> Option<PieceKind> {
        match self.special {
            Special::Promotion(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_promotion(self) -> bool {
        self.promotion_piece().is_some()
    }

    /// Whether this move advances a pawn two ranks. Only meaningful when the moving piece is a pawn.
    pub fn is_two_rank_step(self) -> bool {
        (self.to.rank().as_u8() as i8 - self.from.rank().as_u8() as i8).abs() == 2
            && self.to.file() == self.from.file()
    }

    /// The rook's leg of a castle, as a plain move, for the given color. `None` if this is not a castle.
    pub fn rook_castle_move(self, color: Color) -> Option<Move> {
        let rank = color.home_rank();
        match self.special {
            Special::KingsideCastle => Some(Move::quiet(
                Square::of(rank, FILE_H),
                Square::of(rank, FILE_F),
            )),
            Special::QueensideCastle => Some(Move::quiet(
                Square::of(rank, FILE_A),
                Square::of(rank, FILE_D),
            )),
            _ => None,
        }
    }

    /// The square of the pawn an en-passant move captures: beside the source, on the destination's file.
    pub fn en_passant_victim(self) -> Square {
        Square::of(self.from.rank(), self.to.file())
    }

    /// Returns an UCI-compatible string representation of this move.
    pub fn as_uci(self) -> String {
        match self.promotion_piece() {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind),
            None => format!("{}{}", self.from, self.to),
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_uci())
    }
}
