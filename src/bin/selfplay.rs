use chess_rules::Game;
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Play random legal moves until the game ends or the ply limit is reached.
#[derive(Debug, Parser)]
#[command(about)]
struct Args {
    /// Seed for the move picker.
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Stop after this many plies.
    #[arg(short, long, default_value = "300")]
    max_plies: usize,
}

fn main() {
    let args = Args::parse();
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut game = Game::new();
    let mut plies = 0;

    while !game.is_game_over() && plies < args.max_plies {
        let side = game.side_to_move();
        let moves = game.legal_moves(side);
        let Some(mv) = moves.choose(&mut rng) else {
            break;
        };
        if let Err(e) = game.make_move(side, mv.from, mv.to, mv.promotion) {
            eprintln!("{e}");
            break;
        }
        plies += 1;

        // random play rarely mates; take the draws that are on offer
        let claimed = if game.can_claim_repetition() {
            Some(game.claim_repetition())
        } else if game.can_claim_fifty_moves() {
            Some(game.claim_fifty_moves())
        } else {
            None
        };
        if let Some(Err(e)) = claimed {
            eprintln!("draw claim refused: {e}");
            break;
        }
    }

    println!("{}", game.pgn());
    match game.result() {
        Some(result) => eprintln!("Game over after {plies} plies: {:?} ({result})", game.state()),
        None => eprintln!("Stopped after {plies} plies: {}", game.fen()),
    }
}
