use std::process::ExitCode;
use std::time::Instant;

use chess_rules::fen::FEN_STARTPOS;
use chess_rules::perft::divide;
use chess_rules::Board;
use clap::Parser;

/// Count the positions reachable from a position, split by root move.
#[derive(Debug, Parser)]
#[command(about)]
struct Args {
    /// Position to start from.
    #[arg(short, long, default_value = FEN_STARTPOS)]
    fen: String,

    /// Plies to search.
    #[arg(short, long, default_value = "4")]
    depth: usize,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let board = match Board::from_fen(&args.fen) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let start = Instant::now();
    let split = divide(&board, args.depth);
    for (mv, nodes) in &split {
        println!("{mv}\t{nodes}");
    }
    let total: u64 = split.iter().map(|(_, n)| n).sum();
    let elapsed = start.elapsed();
    println!("\n{total} nodes at depth {} in {elapsed:.2?}", args.depth);
    ExitCode::SUCCESS
}
