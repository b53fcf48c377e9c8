// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Pseudo-legal move generation: where a piece could go if its own king's safety did not matter.

use crate::{board::Board, core::*};

/// A step on the board, as `(rank delta, file delta)`.
pub type Offset = (i8, i8);

pub const KNIGHT_OFFSETS: [Offset; 8] = [
    (1, 2),
    (1, -2),
    (2, 1),
    (2, -1),
    (-1, 2),
    (-1, -2),
    (-2, 1),
    (-2, -1),
];

pub const BISHOP_DIRECTIONS: [Offset; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub const ROOK_DIRECTIONS: [Offset; 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

pub const QUEEN_DIRECTIONS: [Offset; 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Kings step once in every direction a queen slides.
pub const KING_OFFSETS: [Offset; 8] = QUEEN_DIRECTIONS;

/// How a kind of piece moves.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Movement {
    /// Forward pushes, diagonal captures, en-passant.
    Pawn,
    /// A single jump by each offset.
    Leap(&'static [Offset]),
    /// Repeated steps along each direction until something is in the way.
    Slide(&'static [Offset]),
}

impl PieceKind {
    pub const fn movement(self) -> Movement {
        match self {
            PieceKind::Pawn => Movement::Pawn,
            PieceKind::Knight => Movement::Leap(&KNIGHT_OFFSETS),
            PieceKind::Bishop => Movement::Slide(&BISHOP_DIRECTIONS),
            PieceKind::Rook => Movement::Slide(&ROOK_DIRECTIONS),
            PieceKind::Queen => Movement::Slide(&QUEEN_DIRECTIONS),
            PieceKind::King => Movement::Leap(&KING_OFFSETS),
        }
    }
}

/// Which castling destinations to add to a king's moves. The generator does not know about castling rights; the
/// caller decides.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CastleOptions {
    pub kingside: bool,
    pub queenside: bool,
}

/// Returns every square the piece on `square` could move to, ignoring whether its own king would be left in
/// check. An empty square has no moves.
pub fn pseudo_legal_moves(board: &Board, square: Square, castles: CastleOptions) -> Vec<Square> {
    let piece = match board.at(square) {
        Some(piece) => piece,
        None => return Vec::new(),
    };

    let mut targets = Vec::with_capacity(28);
    match piece.kind.movement() {
        Movement::Pawn => generate_pawn_moves(board, piece.color, square, &mut targets),
        Movement::Leap(offsets) => {
            generate_leaper_moves(board, piece.color, square, offsets, &mut targets)
        }
        Movement::Slide(directions) => {
            generate_slider_moves(board, piece.color, square, directions, &mut targets)
        }
    }

    if piece.kind == PieceKind::King {
        generate_castle_moves(square, castles, &mut targets);
    }

    targets
}

fn generate_pawn_moves(board: &Board, us: Color, square: Square, targets: &mut Vec<Square>) {
    let up = us.forward();

    // Single and double pawn pushes.
    if let Some(single) = square.offset(up, 0) {
        if board.at(single).is_none() {
            targets.push(single);
            if square.rank() == us.pawn_rank() {
                if let Some(double) = square.offset(2 * up, 0) {
                    if board.at(double).is_none() {
                        targets.push(double);
                    }
                }
            }
        }
    }

    // Captures, including en-passant.
    for side in [-1, 1] {
        let target = match square.offset(up, side) {
            Some(target) => target,
            None => continue,
        };

        match board.at(target) {
            Some(piece) if piece.color != us => targets.push(target),
            Some(_) => {}
            None => {
                if can_capture_en_passant(board, us, square, target) {
                    targets.push(target);
                }
            }
        }
    }
}

/// Whether a pawn of color `us` on `square` may capture en-passant by moving to `target`, judging by the board's
/// last move: it must have been an enemy pawn's double push that landed beside `square` on `target`'s file.
pub fn can_capture_en_passant(board: &Board, us: Color, square: Square, target: Square) -> bool {
    match board.last_move() {
        Some(entry) => {
            entry.piece.color != us
                && entry.is_double_pawn_push()
                && entry.mov.to() == Square::of(square.rank(), target.file())
                && square.offset(us.forward(), 0).map(|s| s.rank()) == Some(target.rank())
        }
        None => false,
    }
}

fn generate_leaper_moves(
    board: &Board,
    us: Color,
    square: Square,
    offsets: &[Offset],
    targets: &mut Vec<Square>,
) {
    for &(rank_delta, file_delta) in offsets {
        if let Some(target) = square.offset(rank_delta, file_delta) {
            match board.at(target) {
                Some(piece) if piece.color == us => {}
                _ => targets.push(target),
            }
        }
    }
}

fn generate_slider_moves(
    board: &Board,
    us: Color,
    square: Square,
    directions: &[Offset],
    targets: &mut Vec<Square>,
) {
    for &(rank_delta, file_delta) in directions {
        let mut cursor = square;
        while let Some(target) = cursor.offset(rank_delta, file_delta) {
            match board.at(target) {
                None => targets.push(target),
                Some(piece) => {
                    if piece.color != us {
                        targets.push(target);
                    }
                    break;
                }
            }

            cursor = target;
        }
    }
}

fn generate_castle_moves(square: Square, castles: CastleOptions, targets: &mut Vec<Square>) {
    if castles.kingside {
        targets.extend(square.offset(0, 2));
    }
    if castles.queenside {
        targets.extend(square.offset(0, -2));
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, convert::TryFrom};

    use super::*;

    fn assert_moves_generated(placement: &'static str, square: Square, expected: &[Square]) {
        let board = Board::from_placement(placement).unwrap();
        assert_moves_generated_on(&board, square, CastleOptions::default(), expected);
    }

    fn assert_moves_generated_on(
        board: &Board,
        square: Square,
        castles: CastleOptions,
        expected: &[Square],
    ) {
        let moves = pseudo_legal_moves(board, square, castles);
        let generated: HashSet<_> = moves.iter().copied().collect();
        assert_eq!(moves.len(), generated.len(), "duplicate moves: {:?}", moves);

        let expected: HashSet<_> = expected.iter().copied().collect();
        if generated != expected {
            println!("{}", board);
            println!("generated: {:?}", generated);
            println!("expected:  {:?}", expected);
            panic!("move sets differ for {}", square);
        }
    }

    fn piece(c: char) -> Piece {
        Piece::try_from(c).unwrap()
    }

    #[test]
    fn empty_square_has_no_moves() {
        assert_moves_generated("8/8/8/8/8/8/8/8", E4, &[]);
    }

    mod pawns {
        use super::*;

        #[test]
        fn white_pawn_start() {
            assert_moves_generated("8/8/8/8/8/8/4P3/8", E2, &[E3, E4]);
        }

        #[test]
        fn black_pawn_start() {
            assert_moves_generated("8/3p4/8/8/8/8/8/8", D7, &[D6, D5]);
        }

        #[test]
        fn white_pawn_single() {
            assert_moves_generated("8/8/8/8/5P2/8/8/8", F4, &[F5]);
        }

        #[test]
        fn blocked_forward() {
            assert_moves_generated("8/8/8/8/8/4p3/4P3/8", E2, &[]);
        }

        #[test]
        fn no_double_push_when_far_square_blocked() {
            assert_moves_generated("8/8/8/8/4p3/8/4P3/8", E2, &[E3]);
        }

        #[test]
        fn captures() {
            assert_moves_generated("8/8/8/8/8/3p1p2/4P3/8", E2, &[D3, F3, E3, E4]);
        }

        #[test]
        fn no_capture_of_own_piece() {
            assert_moves_generated("8/8/8/8/8/3P1p2/4P3/8", E2, &[F3, E3, E4]);
        }

        #[test]
        fn edge_file() {
            assert_moves_generated("8/8/8/8/8/1p6/P7/8", A2, &[A3, A4, B3]);
        }

        #[test]
        fn last_rank_pawn_has_no_moves() {
            assert_moves_generated("4P3/8/8/8/8/8/8/8", E8, &[]);
        }

        #[test]
        fn en_passant_after_double_push() {
            let mut board = Board::from_placement("8/3p4/8/4P3/8/8/8/8").unwrap();
            board.move_piece(piece('p'), Move::quiet(D7, D5)).unwrap();
            assert_moves_generated_on(&board, E5, CastleOptions::default(), &[E6, D6]);
        }

        #[test]
        fn black_en_passant_after_double_push() {
            let mut board = Board::from_placement("8/8/8/8/3p4/8/2P5/8").unwrap();
            board.move_piece(piece('P'), Move::quiet(C2, C4)).unwrap();
            assert_moves_generated_on(&board, D4, CastleOptions::default(), &[D3, C3]);
        }

        #[test]
        fn no_en_passant_after_single_steps() {
            let mut board = Board::from_placement("8/8/3p4/4P3/8/8/8/8").unwrap();
            board.move_piece(piece('p'), Move::quiet(D6, D5)).unwrap();
            assert_moves_generated_on(&board, E5, CastleOptions::default(), &[E6]);
        }

        #[test]
        fn no_en_passant_for_non_adjacent_pawn() {
            let mut board = Board::from_placement("8/3p4/8/5P2/8/8/8/8").unwrap();
            board.move_piece(piece('p'), Move::quiet(D7, D5)).unwrap();
            assert_moves_generated_on(&board, F5, CastleOptions::default(), &[F6]);
        }
    }

    mod knights {
        use super::*;

        #[test]
        fn center() {
            assert_moves_generated(
                "8/8/8/8/3N4/8/8/8",
                D4,
                &[B3, B5, C2, C6, E2, E6, F3, F5],
            );
        }

        #[test]
        fn corner() {
            assert_moves_generated("8/8/8/8/8/8/8/N7", A1, &[B3, C2]);
        }

        #[test]
        fn friendly_blocks_enemy_captures() {
            assert_moves_generated("8/8/8/8/8/1P6/2p5/N7", A1, &[C2]);
        }
    }

    mod sliders {
        use super::*;

        #[test]
        fn bishop_smoke_test() {
            assert_moves_generated(
                "8/8/8/8/3B4/8/8/8",
                D4,
                &[E5, F6, G7, H8, E3, F2, G1, C3, B2, A1, C5, B6, A7],
            );
        }

        #[test]
        fn bishop_captures_stop_rays() {
            assert_moves_generated("8/8/8/2p1p3/3B4/2p1p3/8/8", D4, &[E5, E3, C5, C3]);
        }

        #[test]
        fn rook_blocked_by_own_piece() {
            assert_moves_generated(
                "8/8/8/8/8/8/R3P3/8",
                A2,
                &[A1, A3, A4, A5, A6, A7, A8, B2, C2, D2],
            );
        }

        #[test]
        fn rook_captures() {
            assert_moves_generated(
                "r7/8/8/8/8/8/8/R2n4",
                A1,
                &[A2, A3, A4, A5, A6, A7, A8, B1, C1, D1],
            );
        }

        #[test]
        fn queen_combines_rook_and_bishop() {
            assert_moves_generated("8/8/8/8/8/8/PP6/QP6", A1, &[]);
            assert_moves_generated("8/8/8/8/8/8/pp6/Qp6", A1, &[A2, B1, B2]);
            assert_moves_generated(
                "8/8/8/8/8/2p5/8/Q1p5",
                A1,
                &[A2, A3, A4, A5, A6, A7, A8, B1, C1, B2, C3],
            );
        }
    }

    mod kings {
        use super::*;

        #[test]
        fn one_step_each_way() {
            assert_moves_generated(
                "8/8/8/8/3K4/8/8/8",
                D4,
                &[C3, C4, C5, D3, D5, E3, E4, E5],
            );
        }

        #[test]
        fn castle_destinations_only_when_asked() {
            let board = Board::from_placement("8/8/8/8/8/8/8/R3K2R").unwrap();
            assert_moves_generated_on(
                &board,
                E1,
                CastleOptions::default(),
                &[D1, F1, D2, E2, F2],
            );
            assert_moves_generated_on(
                &board,
                E1,
                CastleOptions {
                    kingside: true,
                    queenside: true,
                },
                &[D1, F1, D2, E2, F2, G1, C1],
            );
            assert_moves_generated_on(
                &board,
                E1,
                CastleOptions {
                    kingside: false,
                    queenside: true,
                },
                &[D1, F1, D2, E2, F2, C1],
            );
        }
    }
}
