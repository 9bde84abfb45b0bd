use chess_rules::fen::FEN_STARTPOS;
use chess_rules::history::MoveHistory;
use chess_rules::legality::legal_moves;
use chess_rules::{Board, ChessError, Color, Coord, Game, GameResult, GameState, KingStatus, Move};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn play(game: &mut Game, uci: &str) -> chess_rules::Result<chess_rules::MoveOutcome> {
    let mv = Move::from_uci(uci).unwrap();
    let side = game.side_to_move();
    game.make_move(side, mv.from, mv.to, mv.promotion)
}

fn sq(s: &str) -> Coord {
    s.parse().unwrap()
}

#[test]
fn random_playouts_undo_back_to_every_earlier_position() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut board = Board::new();
        let mut history = MoveHistory::new();
        let mut fens = vec![board.to_fen()];

        for _ in 0..120 {
            let moves = legal_moves(&board, board.side_to_move());
            let Some(mv) = moves.choose(&mut rng) else {
                break;
            };
            history.apply(&mut board, mv).unwrap();
            fens.push(board.to_fen());
        }

        while let Some(expected) = fens.pop() {
            assert_eq!(board.to_fen(), expected, "seed {seed}");
            if history.undo(&mut board).is_err() {
                break;
            }
        }
        assert!(fens.is_empty());
        assert_eq!(board, Board::new());
    }
}

#[test]
fn random_games_replay_from_their_own_pgn() {
    for seed in 0..6 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut game = Game::new();
        for _ in 0..200 {
            let side = game.side_to_move();
            let moves = game.legal_moves(side);
            let Some(mv) = moves.choose(&mut rng) else {
                break;
            };
            game.make_move(side, mv.from, mv.to, mv.promotion).unwrap();
        }

        let replayed = Game::from_pgn(&game.pgn()).unwrap();
        assert_eq!(replayed.fen(), game.fen(), "seed {seed}");
        assert_eq!(replayed.state(), game.state(), "seed {seed}");
    }
}

#[test]
fn repetition_is_claimable_only_on_the_third_occurrence() {
    let mut game = Game::new();
    let cycle = ["g1f3", "g8f6", "f3g1", "f6g8"];

    for uci in cycle {
        play(&mut game, uci).unwrap();
    }
    assert_eq!(game.repetition_count(), 2);
    assert!(matches!(game.claim_repetition(), Err(ChessError::IllegalState(_))));

    for uci in cycle {
        play(&mut game, uci).unwrap();
    }
    assert_eq!(game.repetition_count(), 3);
    game.claim_repetition().unwrap();
    assert_eq!(game.state(), GameState::DrawByRepetition);
    assert_eq!(game.result(), Some(GameResult::Draw));
    assert!(game.pgn().ends_with("1/2-1/2"));
}

#[test]
fn undo_forgets_repeated_positions() {
    let mut game = Game::new();
    for uci in ["g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8"] {
        play(&mut game, uci).unwrap();
    }
    assert!(game.can_claim_repetition());
    game.undo_move().unwrap();
    assert!(!game.can_claim_repetition());
}

#[test]
fn both_sides_castle() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    let outcome = play(&mut game, "e1g1").unwrap();
    assert_eq!(outcome.notation, "O-O");
    assert_eq!(outcome.fen, "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");

    let outcome = play(&mut game, "e8c8").unwrap();
    assert_eq!(outcome.notation, "O-O-O");
    assert_eq!(outcome.fen, "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");
    assert_eq!(game.pgn(), "1. O-O O-O-O");

    game.undo_move().unwrap();
    game.undo_move().unwrap();
    assert_eq!(game.fen(), "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
}

#[test]
fn castling_needs_the_right_and_a_safe_path() {
    // rook has moved away and back: the right is gone
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    for uci in ["h1h2", "a8a7", "h2h1", "a7a8"] {
        play(&mut game, uci).unwrap();
    }
    let err = play(&mut game, "e1g1").unwrap_err();
    assert!(matches!(err, ChessError::IllegalMove { .. }));
    assert!(play(&mut game, "e1c1").is_ok());

    // bishop on a6 covers f1
    let mut game = Game::from_fen("4k3/8/b7/8/8/8/8/4K2R w K - 0 1").unwrap();
    let before = game.fen();
    assert!(matches!(play(&mut game, "e1g1"), Err(ChessError::IllegalMove { .. })));
    assert_eq!(game.fen(), before);
}

#[test]
fn en_passant_capture_and_expiry() {
    let mut game = Game::new();
    for uci in ["e2e4", "a7a6", "e4e5", "d7d5"] {
        play(&mut game, uci).unwrap();
    }
    assert!(game.legal_moves(Color::White).contains(&Move::new(sq("e5"), sq("d6"))));

    let outcome = play(&mut game, "e5d6").unwrap();
    assert_eq!(outcome.notation, "e5xd6");
    assert_eq!(
        outcome.fen,
        "rnbqkbnr/1pp1pppp/p2P4/8/8/8/PPPP1PPP/RNBQKBNR b KQkq - 0 3"
    );

    // the right lapses when not used at once
    let mut game = Game::new();
    for uci in ["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"] {
        play(&mut game, uci).unwrap();
    }
    assert!(matches!(play(&mut game, "e5d6"), Err(ChessError::IllegalMove { .. })));
}

#[test]
fn stalemate_ends_the_game_as_a_draw() {
    let mut game = Game::from_fen("7k/8/8/5Q2/8/8/8/K7 w - - 0 1").unwrap();
    let outcome = play(&mut game, "f5f7").unwrap();
    assert_eq!(outcome.notation, "Qf5-f7.");
    assert_eq!(outcome.king_status, KingStatus::Stalemate);
    assert_eq!(outcome.state, GameState::Stalemate);
    assert_eq!(outcome.result, Some(GameResult::Draw));
    assert_eq!(game.pgn(), "1. Qf5-f7. 1/2-1/2");
}

#[test]
fn a_game_can_start_already_decided() {
    let game = Game::from_fen("3R2k1/5ppp/8/8/8/8/8/6K1 b - - 0 1").unwrap();
    assert_eq!(game.state(), GameState::Checkmate);
    assert_eq!(game.result(), Some(GameResult::WhiteWins));
    assert!(game.legal_moves(Color::Black).is_empty());
}

#[test]
fn failed_moves_change_nothing() {
    let mut game = Game::new();
    for uci in ["e2e4", "f7f6"] {
        play(&mut game, uci).unwrap();
    }
    play(&mut game, "d1h5").unwrap();
    let fen = game.fen();
    let pgn = game.pgn();

    // in check from h5: a pawn push elsewhere does not answer it
    let err = play(&mut game, "a7a6").unwrap_err();
    assert!(matches!(err, ChessError::IllegalMove { .. }));
    let err = game.make_move(Color::White, sq("a2"), sq("a3"), None).unwrap_err();
    assert!(matches!(err, ChessError::IllegalMove { .. }));
    assert_eq!(game.fen(), fen);
    assert_eq!(game.pgn(), pgn);
    assert_eq!(game.state(), GameState::Check);

    assert!(Game::from_fen("not a fen").is_err());
    assert_eq!(Game::new().fen(), FEN_STARTPOS);
}
