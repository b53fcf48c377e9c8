// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! FEN parsing and generation.
//!
//! FEN is a simple notation for chess positions: six space-separated fields giving the piece placement, the side
//! to move, castling availability, the en-passant target square, the halfmove clock and the fullmove number.
//! Boards and games are created by parsing FEN, and FEN can be produced from any board or game.

use std::{convert::TryFrom, fmt::Write};

use thiserror::Error;

use crate::{
    board::Board,
    core::{self, *},
    game::GameState,
};

/// Possible errors that can arise when parsing a FEN string.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FenParseError {
    #[error("missing {0} field")]
    MissingField(&'static str),
    #[error("unexpected trailing field: {0:?}")]
    TrailingField(String),
    #[error("expected 8 ranks, found {0}")]
    WrongRankCount(usize),
    #[error("rank {0} does not sum to 8")]
    RankDoesNotSumToEight(Rank),
    #[error("invalid digit: {0}")]
    InvalidDigit(char),
    #[error("unknown piece: {0}")]
    UnknownPiece(char),
    #[error("invalid side to move {0:?}: must be 'w' or 'b'")]
    InvalidSideToMove(String),
    #[error("invalid castle {0:?}")]
    InvalidCastle(String),
    #[error("invalid en-passant {0:?}: must be '-' or a square")]
    InvalidEnPassant(String),
    #[error("invalid halfmove {0:?}")]
    InvalidHalfmove(String),
    #[error("invalid fullmove {0:?}")]
    InvalidFullmove(String),
}

/// Parses the piece-placement field: ranks 8 down to 1 separated by `/`, digits for runs of empty squares.
pub(crate) fn parse_placement(placement: &str) -> Result<Board, FenParseError> {
    let rows: Vec<&str> = placement.split('/').collect();
    if rows.len() != 8 {
        return Err(FenParseError::WrongRankCount(rows.len()));
    }

    let mut board = Board::new();
    for (row, rank) in rows.into_iter().zip(core::ranks().rev()) {
        let mut file = 0;
        for c in row.chars() {
            // digits 1 through 8 indicate empty squares.
            if let Some(run) = c.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(FenParseError::InvalidDigit(c));
                }

                file += run as i8;
                if file > 8 {
                    return Err(FenParseError::RankDoesNotSumToEight(rank));
                }

                continue;
            }

            let piece = Piece::try_from(c).map_err(|_| FenParseError::UnknownPiece(c))?;
            let square = Square::from_coords(rank.as_u8() as i8, file)
                .ok_or(FenParseError::RankDoesNotSumToEight(rank))?;
            board.set_piece(Some(piece), square);
            file += 1;
        }

        if file != 8 {
            return Err(FenParseError::RankDoesNotSumToEight(rank));
        }
    }

    Ok(board)
}

pub(crate) fn render_placement(board: &Board) -> String {
    let mut buf = String::new();
    for rank in core::ranks().rev() {
        let mut empty_squares = 0;
        for file in core::files() {
            match board.at(Square::of(rank, file)) {
                Some(piece) => {
                    if empty_squares != 0 {
                        write!(&mut buf, "{}", empty_squares).unwrap();
                    }
                    write!(&mut buf, "{}", piece).unwrap();
                    empty_squares = 0;
                }
                None => empty_squares += 1,
            }
        }

        if empty_squares != 0 {
            write!(&mut buf, "{}", empty_squares).unwrap();
        }

        if rank != RANK_1 {
            buf.push('/');
        }
    }

    buf
}

fn parse_side_to_move(field: &str) -> Result<Color, FenParseError> {
    match field {
        "w" => Ok(Color::White),
        "b" => Ok(Color::Black),
        _ => Err(FenParseError::InvalidSideToMove(field.to_owned())),
    }
}

/// Castling availability becomes moved flags: a wing missing from the field is treated as if its rook had
/// moved.
fn parse_castling(field: &str) -> Result<[Moved; 2], FenParseError> {
    let rooks = Moved::KINGSIDE_ROOK | Moved::QUEENSIDE_ROOK;
    let mut moved = [rooks, rooks];
    if field == "-" {
        return Ok(moved);
    }

    for c in field.chars() {
        let (color, rook) = match c {
            'K' => (Color::White, Moved::KINGSIDE_ROOK),
            'Q' => (Color::White, Moved::QUEENSIDE_ROOK),
            'k' => (Color::Black, Moved::KINGSIDE_ROOK),
            'q' => (Color::Black, Moved::QUEENSIDE_ROOK),
            _ => return Err(FenParseError::InvalidCastle(field.to_owned())),
        };

        // a repeated letter is as malformed as an unknown one.
        if !moved[color as usize].contains(rook) {
            return Err(FenParseError::InvalidCastle(field.to_owned()));
        }

        moved[color as usize].remove(rook);
    }

    Ok(moved)
}

fn parse_en_passant(field: &str) -> Result<Option<Square>, FenParseError> {
    if field == "-" {
        return Ok(None);
    }

    field
        .parse::<Square>()
        .map(Some)
        .map_err(|_| FenParseError::InvalidEnPassant(field.to_owned()))
}

/// Parses a complete six-field FEN string into a board and the game state that goes with it.
pub(crate) fn parse_fen(fen: &str) -> Result<(Board, GameState), FenParseError> {
    let mut fields = fen.split_whitespace();
    let mut next = |name: &'static str| fields.next().ok_or(FenParseError::MissingField(name));

    let board = parse_placement(next("piece placement")?)?;
    let turn = parse_side_to_move(next("side to move")?)?;
    let moved = parse_castling(next("castling")?)?;
    let en_passant = parse_en_passant(next("en-passant")?)?;
    let halfmove = next("halfmove clock")?;
    let halfmove_clock = halfmove
        .parse::<u32>()
        .map_err(|_| FenParseError::InvalidHalfmove(halfmove.to_owned()))?;
    let fullmove = next("fullmove number")?;
    let fullmove_number = fullmove
        .parse::<u32>()
        .map_err(|_| FenParseError::InvalidFullmove(fullmove.to_owned()))?;

    if let Some(extra) = fields.next() {
        return Err(FenParseError::TrailingField(extra.to_owned()));
    }

    let state = GameState {
        turn,
        moved,
        en_passant,
        halfmove_clock,
        fullmove_number,
    };
    Ok((board, state))
}

pub(crate) fn render_fen(board: &Board, state: &GameState) -> String {
    let mut buf = render_placement(board);
    write!(&mut buf, " {} ", state.turn).unwrap();

    let mut castles = String::new();
    for (color, king, queen) in [(Color::White, 'K', 'Q'), (Color::Black, 'k', 'q')] {
        let moved = state.moved[color as usize];
        if moved.can_castle_kingside() {
            castles.push(king);
        }
        if moved.can_castle_queenside() {
            castles.push(queen);
        }
    }

    if castles.is_empty() {
        castles.push('-');
    }

    buf.push_str(&castles);
    buf.push(' ');
    match state.en_passant {
        Some(square) => {
            write!(&mut buf, "{}", square).unwrap();
        }
        None => buf.push('-'),
    }

    write!(
        &mut buf,
        " {} {}",
        state.halfmove_clock, state.fullmove_number
    )
    .unwrap();
    buf
}
