// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Attack detection, by scanning outward from the attacked square.

use crate::{
    board::Board,
    core::*,
    movegen::{Offset, BISHOP_DIRECTIONS, KING_OFFSETS, KNIGHT_OFFSETS, ROOK_DIRECTIONS},
};

/// Returns whether any piece of color `by` attacks `target`.
///
/// Rather than generating the moves of every enemy piece, pretend each kind of piece stands on `target` and look
/// for an enemy piece of that kind where it would land. Attacks are symmetric for everything except pawns, which
/// are looked for one rank behind `target` from the attacker's point of view.
pub fn is_attacked(board: &Board, target: Square, by: Color) -> bool {
    let behind = -by.forward();
    let pawn_attack = [-1, 1].iter().any(|&side| {
        target
            .offset(behind, side)
            .and_then(|square| board.at(square))
            .map_or(false, |piece| piece.is(by, PieceKind::Pawn))
    });

    pawn_attack
        || leaper_attacks(board, target, by, &KNIGHT_OFFSETS, PieceKind::Knight)
        || leaper_attacks(board, target, by, &KING_OFFSETS, PieceKind::King)
        || slider_attacks(board, target, by, &ROOK_DIRECTIONS, PieceKind::Rook)
        || slider_attacks(board, target, by, &BISHOP_DIRECTIONS, PieceKind::Bishop)
}

fn leaper_attacks(
    board: &Board,
    target: Square,
    by: Color,
    offsets: &[Offset],
    kind: PieceKind,
) -> bool {
    offsets.iter().any(|&(rank_delta, file_delta)| {
        target
            .offset(rank_delta, file_delta)
            .and_then(|square| board.at(square))
            .map_or(false, |piece| piece.is(by, kind))
    })
}

/// Queens attack along both the rook and the bishop rays, so they count for either `kind`.
fn slider_attacks(
    board: &Board,
    target: Square,
    by: Color,
    directions: &[Offset],
    kind: PieceKind,
) -> bool {
    directions.iter().any(|&(rank_delta, file_delta)| {
        let mut cursor = target;
        while let Some(square) = cursor.offset(rank_delta, file_delta) {
            if let Some(piece) = board.at(square) {
                return piece.color == by && (piece.kind == kind || piece.kind == PieceKind::Queen);
            }

            cursor = square;
        }

        false
    })
}
