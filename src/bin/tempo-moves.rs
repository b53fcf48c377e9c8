// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use serde::Serialize;
use structopt::StructOpt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tempo::core::{Move, Special};
use tempo::GameEngine;

/// Lists the legal moves of a position.
#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,

    /// Print the moves as a JSON array instead of one UCI move per line.
    #[structopt(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct MoveRecord {
    uci: String,
    from: String,
    to: String,
    special: Special,
}

impl From<Move> for MoveRecord {
    fn from(mov: Move) -> MoveRecord {
        MoveRecord {
            uci: mov.as_uci(),
            from: mov.from().to_string(),
            to: mov.to().to_string(),
            special: mov.special(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let ops = Options::from_args();
    let mut engine = GameEngine::from_fen(&ops.fen)?;
    let moves = engine.legal_moves();
    if ops.json {
        let records: Vec<MoveRecord> = moves.into_iter().map(MoveRecord::from).collect();
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else {
        for mov in moves {
            println!("{}", mov.as_uci());
        }
    }

    Ok(())
}
