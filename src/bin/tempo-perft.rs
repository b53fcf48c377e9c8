// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::time::Instant;

use structopt::StructOpt;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tempo::perft;
use tempo::GameEngine;

/// Counts the leaf nodes of the legal move tree of a position.
#[derive(Debug, StructOpt)]
struct Options {
    /// The depth to search to.
    #[structopt(short, long)]
    depth: u32,

    /// FEN representation of the position to analyze. Defaults to the starting position.
    #[structopt(name = "FEN", default_value = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")]
    fen: String,

    /// Print the count below each legal move of the position as well as the total.
    #[structopt(long)]
    divide: bool,
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let ops = Options::from_args();
    let mut engine = GameEngine::from_fen(&ops.fen)?;
    let start = Instant::now();
    let total = if ops.divide {
        let breakdown = perft::divide(&mut engine, ops.depth);
        for (mov, nodes) in &breakdown {
            println!("{}: {}", mov, nodes);
        }

        println!();
        breakdown.iter().map(|&(_, nodes)| nodes).sum()
    } else {
        perft::perft(&mut engine, ops.depth)
    };

    println!("{}", total);
    tracing::info!(depth = ops.depth, nodes = total, elapsed = ?start.elapsed(), "perft finished");
    Ok(())
}
