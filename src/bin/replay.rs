use std::path::PathBuf;
use std::process::ExitCode;

use chess_rules::Game;
use clap::Parser;
use serde::Serialize;

/// Replay a PGN file and print the final position as JSON.
#[derive(Debug, Parser)]
#[command(about)]
struct Args {
    /// PGN file in verbose move notation.
    path: PathBuf,
}

#[derive(Serialize)]
struct Summary {
    fen: String,
    pgn: String,
    plies: usize,
    state: chess_rules::GameState,
    result: Option<chess_rules::GameResult>,
    repetition_claimable: bool,
    fifty_moves_claimable: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let text = match std::fs::read_to_string(&args.path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("cannot read {}: {e}", args.path.display());
            return ExitCode::FAILURE;
        }
    };
    let game = match Game::from_pgn(&text) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("{}: {e}", args.path.display());
            return ExitCode::FAILURE;
        }
    };

    let summary = Summary {
        fen: game.fen(),
        pgn: game.pgn(),
        plies: game.history().len(),
        state: game.state(),
        result: game.result(),
        repetition_claimable: game.can_claim_repetition(),
        fifty_moves_claimable: game.can_claim_fifty_moves(),
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
