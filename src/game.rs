// =============================================================================
// Game state machine
//
// `Game` owns the board, the undo history, the move record and the list of
// position keys seen so far. It is the single public entry point for changing
// a game. Every mutating call validates fully before touching anything, so a
// failed call leaves the game exactly as it was.
//
// The engine keeps no locks: callers must serialize access to one game.
// =============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::coord::Coord;
use crate::error::{ChessError, Result};
use crate::history::MoveHistory;
use crate::legality::{self, KingStatus};
use crate::movegen;
use crate::moves::Move;
use crate::pgn::{self, GameRecord};
use crate::piece::{Color, Piece, PieceType};
use crate::special;

/// Occurrences of one position needed before a repetition draw can be claimed.
pub const REPETITION_THRESHOLD: usize = 3;

/// Half-moves without a pawn move or capture needed for a fifty-move claim.
pub const FIFTY_MOVE_THRESHOLD: u32 = 100;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum GameState {
    InProgress,
    /// The side to move is in check; the game goes on.
    Check,
    Checkmate,
    Stalemate,
    DrawByAgreement,
    DrawByRepetition,
    DrawByFiftyMoves,
    DrawByInsufficientMaterial,
    Resigned,
    TimeForfeit,
}

impl GameState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, GameState::InProgress | GameState::Check)
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
}

impl GameResult {
    pub fn win_for(color: Color) -> Self {
        match color {
            Color::White => GameResult::WhiteWins,
            Color::Black => GameResult::BlackWins,
        }
    }

    pub fn as_pgn(self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
        }
    }

    pub fn from_pgn(token: &str) -> Option<Self> {
        match token {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" => Some(GameResult::Draw),
            _ => None,
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_pgn())
    }
}

/// State update returned for every applied move.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub fen: String,
    pub notation: String,
    /// Status of the side now to move.
    pub king_status: KingStatus,
    pub is_game_over: bool,
    pub result: Option<GameResult>,
    pub state: GameState,
}

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    history: MoveHistory,
    record: GameRecord,
    /// Repetition key of every position reached, starting position included.
    position_keys: Vec<String>,
    state: GameState,
    result: Option<GameResult>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// A game from the standard starting position.
    pub fn new() -> Self {
        Self::from_board(Board::new())
    }

    pub fn from_initial_position() -> Self {
        Self::new()
    }

    pub fn from_fen(text: &str) -> Result<Self> {
        Ok(Self::from_board(Board::from_fen(text)?))
    }

    /// Replays PGN move text, from the position in a `FEN` tag if there is one
    /// and from the starting position otherwise.
    ///
    /// Each ply must be played by the side its move number names. The written
    /// result is not applied; the returned game's state is whatever the
    /// replayed moves lead to.
    pub fn from_pgn(text: &str) -> Result<Self> {
        let parsed = pgn::parse(text)?;
        let mut game = match parsed.tag("FEN") {
            Some(fen) => Game::from_fen(fen)?,
            None => Game::new(),
        };
        for (side, mv) in parsed.sided_plies() {
            game.make_move(side, mv.from, mv.to, mv.promotion)?;
        }
        Ok(game)
    }

    fn from_board(board: Board) -> Self {
        let mut game = Game {
            record: GameRecord::new(board.fullmove_number(), board.side_to_move()),
            position_keys: vec![board.position_key()],
            board,
            history: MoveHistory::new(),
            state: GameState::InProgress,
            result: None,
        };
        let status = legality::king_status(&game.board, game.board.side_to_move());
        game.classify_position(status);
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    pub fn fen(&self) -> String {
        self.board.to_fen()
    }

    /// Full move text of the game so far, ending with the result once it is over.
    pub fn pgn(&self) -> String {
        self.record.movetext(self.result)
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn history(&self) -> &MoveHistory {
        &self.history
    }

    /// Legal moves for `side`; none once the game is over.
    pub fn legal_moves(&self, side: Color) -> Vec<Move> {
        if self.is_game_over() {
            return Vec::new();
        }
        legality::legal_moves(&self.board, side)
    }

    pub fn king_status(&self, side: Color) -> KingStatus {
        legality::king_status(&self.board, side)
    }

    /// How many times the current position has occurred, counting now.
    pub fn repetition_count(&self) -> usize {
        let Some(current) = self.position_keys.last() else {
            return 0;
        };
        self.position_keys.iter().filter(|k| *k == current).count()
    }

    pub fn can_claim_repetition(&self) -> bool {
        self.repetition_count() >= REPETITION_THRESHOLD
    }

    pub fn can_claim_fifty_moves(&self) -> bool {
        self.board.halfmove_clock() >= FIFTY_MOVE_THRESHOLD
    }

    fn ensure_in_progress(&self) -> Result<()> {
        if self.is_game_over() {
            return Err(ChessError::illegal_state(format!(
                "the game is over ({:?})",
                self.state
            )));
        }
        Ok(())
    }

    /// Plays `from`-`to` for `side`.
    ///
    /// Fails with `MissingPromotion` when a pawn reaches the last rank without a
    /// promotion piece, and with `IllegalMove` for anything else the rules forbid.
    pub fn make_move(
        &mut self,
        side: Color,
        from: Coord,
        to: Coord,
        promotion: Option<PieceType>,
    ) -> Result<MoveOutcome> {
        self.ensure_in_progress()?;

        let mv = Move {
            from,
            to,
            promotion,
        };
        if side != self.board.side_to_move() {
            return Err(ChessError::illegal_move(
                mv,
                format!("it is {} to move", self.board.side_to_move()),
            ));
        }
        let piece = match self.board.piece_at(from) {
            Some(p) if p.color == side => p,
            Some(_) => {
                return Err(ChessError::illegal_move(mv, format!("{from} holds an opponent's piece")))
            }
            None => return Err(ChessError::illegal_move(mv, format!("no piece on {from}"))),
        };

        let legal = legality::legal_moves_from(&self.board, from);
        if !legal.contains(&mv) {
            let plain = Move::new(from, to);
            let promoted = Move::with_promotion(from, to, PieceType::Queen);
            if legal.contains(&plain) || legal.contains(&promoted) {
                special::check_promotion(piece, &mv)?;
            }
            return Err(self.explain_illegal(piece, &mv));
        }

        let notation = self.history.apply(&mut self.board, &mv)?;
        self.record.push(notation);
        self.position_keys.push(self.board.position_key());
        // the suffix already carries the status of the side now to move
        let status = notation.king_status();
        self.classify_position(status);

        Ok(MoveOutcome {
            fen: self.fen(),
            notation: notation.to_string(),
            king_status: status,
            is_game_over: self.is_game_over(),
            result: self.result,
            state: self.state,
        })
    }

    fn explain_illegal(&self, piece: Piece, mv: &Move) -> ChessError {
        let pseudo = movegen::pseudo_legal_moves_from(&self.board, mv.from);
        let reason = if !pseudo.contains(mv) {
            format!("a {} cannot move from {} to {} here", piece.piece_type, mv.from, mv.to)
        } else if special::castle_side_of(piece, mv.from, mv.to).is_some() {
            "cannot castle out of, through or into check".to_string()
        } else {
            "it would leave the king in check".to_string()
        };
        ChessError::illegal_move(mv, reason)
    }

    /// Sets the state from `status`, the king status of the side to move.
    fn classify_position(&mut self, status: KingStatus) {
        let side = self.board.side_to_move();
        let (state, result) = match status {
            KingStatus::Checkmate => (
                GameState::Checkmate,
                Some(GameResult::win_for(side.opposite())),
            ),
            KingStatus::Stalemate => (GameState::Stalemate, Some(GameResult::Draw)),
            _ if self.board.has_insufficient_material() => {
                (GameState::DrawByInsufficientMaterial, Some(GameResult::Draw))
            }
            KingStatus::Check => (GameState::Check, None),
            KingStatus::Safe => (GameState::InProgress, None),
        };
        self.state = state;
        self.result = result;
    }

    /// Takes back the last move. Not available once the game is over.
    pub fn undo_move(&mut self) -> Result<Move> {
        self.ensure_in_progress()?;
        let mv = self.history.undo(&mut self.board)?;
        self.record.pop();
        self.position_keys.pop();
        let status = legality::king_status(&self.board, self.board.side_to_move());
        self.classify_position(status);
        Ok(mv)
    }

    pub fn resign(&mut self, side: Color) -> Result<()> {
        self.ensure_in_progress()?;
        self.finish(GameState::Resigned, GameResult::win_for(side.opposite()));
        Ok(())
    }

    /// Loss for `side` on time, reported by the clock outside the engine.
    pub fn forfeit_on_time(&mut self, side: Color) -> Result<()> {
        self.ensure_in_progress()?;
        self.finish(GameState::TimeForfeit, GameResult::win_for(side.opposite()));
        Ok(())
    }

    pub fn agree_draw(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        self.finish(GameState::DrawByAgreement, GameResult::Draw);
        Ok(())
    }

    /// Draw when the current position has occurred at least three times.
    pub fn claim_repetition(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        if !self.can_claim_repetition() {
            return Err(ChessError::illegal_state(format!(
                "the position has occurred {} time(s), {REPETITION_THRESHOLD} needed",
                self.repetition_count()
            )));
        }
        self.finish(GameState::DrawByRepetition, GameResult::Draw);
        Ok(())
    }

    /// Draw after 100 half-moves without a pawn move or capture.
    pub fn claim_fifty_moves(&mut self) -> Result<()> {
        self.ensure_in_progress()?;
        if !self.can_claim_fifty_moves() {
            return Err(ChessError::illegal_state(format!(
                "half-move clock is {}, {FIFTY_MOVE_THRESHOLD} needed",
                self.board.halfmove_clock()
            )));
        }
        self.finish(GameState::DrawByFiftyMoves, GameResult::Draw);
        Ok(())
    }

    fn finish(&mut self, state: GameState, result: GameResult) {
        self.state = state;
        self.result = Some(result);
    }
}
