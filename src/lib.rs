// Copyright 2017-2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `tempo` knows the rules of chess.
//!
//! Given a position, `tempo` lists the legal moves of any piece, makes and takes back moves while keeping track of
//! turn, castling rights, en-passant and the move clocks, and answers whether a square is attacked. Positions come
//! in and go out as FEN.
//!
//! ```
//! use tempo::{core::*, GameEngine};
//!
//! let mut game = GameEngine::new();
//! let moves = game.generate_legal_moves(Piece::new(Color::White, PieceKind::Pawn), E2);
//! assert_eq!(2, moves.len());
//!
//! game.apply_move(Move::quiet(E2, E4)).unwrap();
//! assert_eq!(Color::Black, game.current_turn());
//! game.undo_move().unwrap();
//! ```

pub mod board;
pub mod check;
pub mod core;
pub mod fen;
pub mod game;
pub mod movegen;
pub mod perft;

pub use board::Board;
pub use game::{GameEngine, GameState, GameStatus};
