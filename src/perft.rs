// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Leaf-node counting over the legal move tree, for checking move generation against known totals.

use tracing::warn;

use crate::{core::Move, game::GameEngine};

/// Counts the positions reachable from `engine` in exactly `depth` moves. The engine is left as it was found.
pub fn perft(engine: &mut GameEngine, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = engine.legal_moves();
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .into_iter()
        .map(|mov| perft_after(engine, mov, depth - 1))
        .sum()
}

/// Like `perft`, but broken down by the first move.
pub fn divide(engine: &mut GameEngine, depth: u32) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }

    engine
        .legal_moves()
        .into_iter()
        .map(|mov| (mov, perft_after(engine, mov, depth - 1)))
        .collect()
}

fn perft_after(engine: &mut GameEngine, mov: Move, depth: u32) -> u64 {
    if engine.apply_move(mov).is_err() {
        return 0;
    }

    let nodes = perft(engine, depth);
    if let Err(err) = engine.undo_move() {
        warn!(%mov, %err, "failed to take back move during perft");
    }

    nodes
}
