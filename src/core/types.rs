// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{convert::TryFrom, fmt, str::FromStr};

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SquareParseError {
    #[error("square index out of range: {0}")]
    OutOfRange(u8),
    #[error("invalid square: {0:?}")]
    InvalidName(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RankParseError {
    #[error("invalid char: {0}")]
    InvalidChar(char),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FileParseError {
    #[error("invalid char: {0}")]
    InvalidChar(char),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PieceParseError {
    #[error("invalid char: {0}")]
    InvalidChar(char),
}

/// A square on the chessboard, stored as `rank * 8 + file`.
///
/// Every `Square` value is on the board; constructors that could step off of it return `Option` or `Result`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Square(pub(in crate::core) u8);

impl Square {
    /// Creates a new Square composed of a given rank and file.
    pub const fn of(rank: Rank, file: File) -> Square {
        Square(rank.0 * 8 + file.0)
    }

    /// Creates a square from signed rank and file coordinates, if they lie on the board.
    pub fn from_coords(rank: i8, file: i8) -> Option<Square> {
        if crate::board::Board::is_in_bound(rank, file) {
            Some(Square((rank * 8 + file) as u8))
        } else {
            None
        }
    }

    /// Returns the rank of this square on the chessboard.
    pub const fn rank(self) -> Rank {
        Rank(self.0 >> 3)
    }

    /// Returns the file of this square on the chessboard.
    pub const fn file(self) -> File {
        File(self.0 & 7)
    }

    /// Returns the square `rank_delta` ranks and `file_delta` files away, or `None` if that walks off of the
    /// board.
    pub fn offset(self, rank_delta: i8, file_delta: i8) -> Option<Square> {
        Square::from_coords(
            self.rank().0 as i8 + rank_delta,
            self.file().0 as i8 + file_delta,
        )
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for Square {
    type Error = SquareParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value >= 64 {
            return Err(SquareParseError::OutOfRange(value));
        }

        Ok(Square(value))
    }
}

impl From<Square> for u8 {
    fn from(square: Square) -> u8 {
        square.0
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SquareParseError::InvalidName(s.to_owned());
        let mut chars = s.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => (file, rank),
            _ => return Err(invalid()),
        };

        let file = File::try_from(file).map_err(|_| invalid())?;
        let rank = Rank::try_from(rank).map_err(|_| invalid())?;
        Ok(Square::of(rank, file))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(u8);

impl Rank {
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl TryFrom<char> for Rank {
    type Error = RankParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '1'..='8' => Ok(Rank(value as u8 - b'1')),
            c => Err(RankParseError::InvalidChar(c)),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", (b'1' + self.0) as char)
    }
}

pub const RANK_1: Rank = Rank(0);
pub const RANK_2: Rank = Rank(1);
pub const RANK_3: Rank = Rank(2);
pub const RANK_4: Rank = Rank(3);
pub const RANK_5: Rank = Rank(4);
pub const RANK_6: Rank = Rank(5);
pub const RANK_7: Rank = Rank(6);
pub const RANK_8: Rank = Rank(7);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct File(u8);

impl File {
    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

impl TryFrom<char> for File {
    type Error = FileParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            'a'..='h' => Ok(File(value as u8 - b'a')),
            c => Err(FileParseError::InvalidChar(c)),
        }
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", (b'a' + self.0) as char)
    }
}

pub const FILE_A: File = File(0);
pub const FILE_B: File = File(1);
pub const FILE_C: File = File(2);
pub const FILE_D: File = File(3);
pub const FILE_E: File = File(4);
pub const FILE_F: File = File(5);
pub const FILE_G: File = File(6);
pub const FILE_H: File = File(7);

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn toggle(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The rank delta of a single pawn step for this color.
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    /// The rank this color's king and rooks start on.
    pub const fn home_rank(self) -> Rank {
        match self {
            Color::White => RANK_1,
            Color::Black => RANK_8,
        }
    }

    /// The rank this color's pawns start on, and may double push from.
    pub const fn pawn_rank(self) -> Rank {
        match self {
            Color::White => RANK_2,
            Color::Black => RANK_7,
        }
    }

    /// The rank this color's pawns promote on.
    pub const fn promotion_rank(self) -> Rank {
        match self {
            Color::White => RANK_8,
            Color::Black => RANK_1,
        }
    }

    /// The rank a pawn of this color must stand on to capture en-passant.
    pub const fn en_passant_rank(self) -> Rank {
        match self {
            Color::White => RANK_5,
            Color::Black => RANK_4,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "w"),
            Color::Black => write!(f, "b"),
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// The kinds a pawn may promote to.
    pub const PROMOTIONS: [PieceKind; 4] = [
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
    ];

    /// Lowercase FEN letter of this kind.
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    pub fn from_char(c: char) -> Option<PieceKind> {
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };

        Some(kind)
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Piece {
        Piece { color, kind }
    }

    pub fn is(self, color: Color, kind: PieceKind) -> bool {
        self.color == color && self.kind == kind
    }
}

impl TryFrom<char> for Piece {
    type Error = PieceParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let kind = PieceKind::from_char(value).ok_or(PieceParseError::InvalidChar(value))?;
        let color = if value.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        Ok(Piece { color, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = self.kind.as_char();
        match self.color {
            Color::White => write!(f, "{}", c.to_ascii_uppercase()),
            Color::Black => write!(f, "{}", c),
        }
    }
}

bitflags! {
    /// Castling bookkeeping for one color: which of the king and its two rooks have left their home squares.
    pub struct Moved: u8 {
        const NONE = 0;
        const KING = 0b0000_0001;
        const KINGSIDE_ROOK = 0b0000_0010;
        const QUEENSIDE_ROOK = 0b0000_0100;
        const ALL = Self::KING.bits | Self::KINGSIDE_ROOK.bits | Self::QUEENSIDE_ROOK.bits;
    }
}

impl Moved {
    pub fn can_castle_kingside(self) -> bool {
        !self.intersects(Moved::KING | Moved::KINGSIDE_ROOK)
    }

    pub fn can_castle_queenside(self) -> bool {
        !self.intersects(Moved::KING | Moved::QUEENSIDE_ROOK)
    }
}

/// Home square of the king of the given color.
pub const fn king_home(color: Color) -> Square {
    Square::of(color.home_rank(), FILE_E)
}

/// Home square of the kingside rook of the given color.
pub const fn kingside_rook_home(color: Color) -> Square {
    Square::of(color.home_rank(), FILE_H)
}

/// Home square of the queenside rook of the given color.
pub const fn queenside_rook_home(color: Color) -> Square {
    Square::of(color.home_rank(), FILE_A)
}

macro_rules! type_iterator {
    ($name:ident, $type:ident, $max:expr) => {
        pub struct $name(u8, u8);

        impl Iterator for $name {
            type Item = $type;

            fn next(&mut self) -> Option<Self::Item> {
                if self.0 >= self.1 {
                    None
                } else {
                    let next = self.0;
                    self.0 += 1;
                    Some($type(next))
                }
            }
        }

        impl ::std::iter::DoubleEndedIterator for $name {
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.1 <= self.0 {
                    None
                } else {
                    self.1 -= 1;
                    Some($type(self.1))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name(0, $max)
            }
        }
    };
}

type_iterator!(AllSquares, Square, 64);
type_iterator!(AllRanks, Rank, 8);
type_iterator!(AllFiles, File, 8);

pub fn squares() -> AllSquares {
    AllSquares::default()
}

pub fn ranks() -> AllRanks {
    AllRanks::default()
}

pub fn files() -> AllFiles {
    AllFiles::default()
}

macro_rules! square_consts {
    ($rank:ident: $($name:ident = $file:ident),*) => {
        $(pub const $name: Square = Square::of($rank, $file);)*
    };
}

square_consts!(RANK_1: A1 = FILE_A, B1 = FILE_B, C1 = FILE_C, D1 = FILE_D, E1 = FILE_E, F1 = FILE_F, G1 = FILE_G, H1 = FILE_H);
square_consts!(RANK_2: A2 = FILE_A, B2 = FILE_B, C2 = FILE_C, D2 = FILE_D, E2 = FILE_E, F2 = FILE_F, G2 = FILE_G, H2 = FILE_H);
square_consts!(RANK_3: A3 = FILE_A, B3 = FILE_B, C3 = FILE_C, D3 = FILE_D, E3 = FILE_E, F3 = FILE_F, G3 = FILE_G, H3 = FILE_H);
square_consts!(RANK_4: A4 = FILE_A, B4 = FILE_B, C4 = FILE_C, D4 = FILE_D, E4 = FILE_E, F4 = FILE_F, G4 = FILE_G, H4 = FILE_H);
square_consts!(RANK_5: A5 = FILE_A, B5 = FILE_B, C5 = FILE_C, D5 = FILE_D, E5 = FILE_E, F5 = FILE_F, G5 = FILE_G, H5 = FILE_H);
square_consts!(RANK_6: A6 = FILE_A, B6 = FILE_B, C6 = FILE_C, D6 = FILE_D, E6 = FILE_E, F6 = FILE_F, G6 = FILE_G, H6 = FILE_H);
square_consts!(RANK_7: A7 = FILE_A, B7 = FILE_B, C7 = FILE_C, D7 = FILE_D, E7 = FILE_E, F7 = FILE_F, G7 = FILE_G, H7 = FILE_H);
square_consts!(RANK_8: A8 = FILE_A, B8 = FILE_B, C8 = FILE_C, D8 = FILE_D, E8 = FILE_E, F8 = FILE_F, G8 = FILE_G, H8 = FILE_H);

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use super::*;

    #[test]
    fn square_rank_and_file() {
        assert_eq!(RANK_4, E4.rank());
        assert_eq!(FILE_E, E4.file());
        assert_eq!(28, E4.as_u8());
    }

    #[test]
    fn square_offsets_stay_on_board() {
        assert_eq!(Some(F6), E4.offset(2, 1));
        assert_eq!(None, H8.offset(1, 0));
        assert_eq!(None, A1.offset(0, -1));
    }

    #[test]
    fn square_parse_and_display() {
        assert_eq!(E4, "e4".parse::<Square>().unwrap());
        assert_eq!("h8", H8.to_string());
        assert!("e9".parse::<Square>().is_err());
        assert!("e44".parse::<Square>().is_err());
        assert_eq!(
            SquareParseError::OutOfRange(64),
            Square::try_from(64u8).unwrap_err()
        );
    }

    #[test]
    fn rank_and_file_chars() {
        assert_eq!(RANK_3, Rank::try_from('3').unwrap());
        assert_eq!(FILE_H, File::try_from('h').unwrap());
        assert_eq!(RankParseError::InvalidChar('9'), Rank::try_from('9').unwrap_err());
        assert_eq!(FileParseError::InvalidChar('i'), File::try_from('i').unwrap_err());
    }

    #[test]
    fn piece_chars() {
        let piece = Piece::try_from('N').unwrap();
        assert_eq!(Piece::new(Color::White, PieceKind::Knight), piece);
        assert_eq!("q", Piece::new(Color::Black, PieceKind::Queen).to_string());
        assert_eq!(
            PieceParseError::InvalidChar('x'),
            Piece::try_from('x').unwrap_err()
        );
    }

    #[test]
    fn moved_flags() {
        assert!(Moved::NONE.can_castle_kingside());
        assert!(!Moved::KINGSIDE_ROOK.can_castle_kingside());
        assert!(Moved::KINGSIDE_ROOK.can_castle_queenside());
        assert!(!Moved::KING.can_castle_queenside());
    }

    #[test]
    fn iterators_cover_board() {
        assert_eq!(64, squares().count());
        assert_eq!(Some(RANK_8), ranks().rev().next());
        assert_eq!(Some(FILE_A), files().next());
    }
}
