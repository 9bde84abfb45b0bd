use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::coord::Coord;
use crate::error::ChessError;
use crate::game::{Game, GameResult, GameState};
use crate::legality::KingStatus;
use crate::piece::{Color, PieceType};

#[derive(Serialize)]
struct SquarePiece {
    piece_type: String,
    color: Color,
}

#[derive(Serialize)]
struct MoveJson {
    from: Coord,
    to: Coord,
    promotion: Option<String>,
}

#[derive(Serialize)]
struct BoardState {
    /// Rank 8 first, file a first, as the board is drawn.
    squares: Vec<Vec<Option<SquarePiece>>>,
    fen: String,
    pgn: String,
    current_turn: Color,
    state: GameState,
    king_status: KingStatus,
    game_over: bool,
    result: Option<GameResult>,
    legal_moves: Vec<MoveJson>,
    last_move: Option<MoveJson>,
}

fn to_js_error(err: ChessError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}

fn parse_square(text: &str) -> Result<Coord, JsValue> {
    text.parse::<Coord>().map_err(to_js_error)
}

fn parse_color(text: &str) -> Result<Color, JsValue> {
    match text.to_ascii_lowercase().as_str() {
        "white" | "w" => Ok(Color::White),
        "black" | "b" => Ok(Color::Black),
        other => Err(js_sys::Error::new(&format!("unknown side '{other}'")).into()),
    }
}

/// Accepts a letter ("q") or a piece name ("Queen").
fn parse_promotion(text: &str) -> Result<PieceType, JsValue> {
    let lower = text.to_ascii_lowercase();
    let piece = match lower.as_str() {
        "queen" => Some(PieceType::Queen),
        "rook" => Some(PieceType::Rook),
        "bishop" => Some(PieceType::Bishop),
        "knight" => Some(PieceType::Knight),
        _ if lower.len() == 1 => lower.chars().next().and_then(PieceType::from_letter),
        _ => None,
    };
    piece.ok_or_else(|| js_sys::Error::new(&format!("unknown promotion piece '{text}'")).into())
}

fn move_json(mv: &crate::moves::Move) -> MoveJson {
    MoveJson {
        from: mv.from,
        to: mv.to,
        promotion: mv.promotion.map(|p| p.to_string()),
    }
}

fn build_board_state(game: &Game) -> BoardState {
    let board = game.board();
    let squares = (0..8u8)
        .rev()
        .map(|row| {
            (0..8u8)
                .map(|col| {
                    Coord::new(col, row).and_then(|c| board.piece_at(c)).map(|p| SquarePiece {
                        piece_type: p.piece_type.to_string(),
                        color: p.color,
                    })
                })
                .collect()
        })
        .collect();

    let side = game.side_to_move();
    BoardState {
        squares,
        fen: game.fen(),
        pgn: game.pgn(),
        current_turn: side,
        state: game.state(),
        king_status: game.king_status(side),
        game_over: game.is_game_over(),
        result: game.result(),
        legal_moves: game.legal_moves(side).iter().map(move_json).collect(),
        last_move: game.history().last().map(|undo| move_json(&undo.mv)),
    }
}

#[wasm_bindgen]
pub fn build_timestamp() -> String {
    env!("BUILD_TIMESTAMP").to_string()
}

#[wasm_bindgen(js_name = Game)]
pub struct WasmGame {
    game: Game,
}

#[wasm_bindgen(js_class = Game)]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame { game: Game::new() }
    }

    pub fn from_fen(fen: &str) -> Result<WasmGame, JsValue> {
        let game = Game::from_fen(fen).map_err(to_js_error)?;
        Ok(WasmGame { game })
    }

    pub fn from_pgn(pgn: &str) -> Result<WasmGame, JsValue> {
        let game = Game::from_pgn(pgn).map_err(to_js_error)?;
        Ok(WasmGame { game })
    }

    pub fn get_board_state(&self) -> JsValue {
        to_js(&build_board_state(&self.game))
    }

    pub fn make_move(
        &mut self,
        side: &str,
        from: &str,
        to: &str,
        promotion: Option<String>,
    ) -> Result<JsValue, JsValue> {
        let side = parse_color(side)?;
        let from = parse_square(from)?;
        let to = parse_square(to)?;
        let promotion = promotion.as_deref().map(parse_promotion).transpose()?;
        let outcome = self
            .game
            .make_move(side, from, to, promotion)
            .map_err(to_js_error)?;
        Ok(to_js(&outcome))
    }

    pub fn undo_move(&mut self) -> Result<JsValue, JsValue> {
        let mv = self.game.undo_move().map_err(to_js_error)?;
        Ok(to_js(&move_json(&mv)))
    }

    pub fn resign(&mut self, side: &str) -> Result<(), JsValue> {
        let side = parse_color(side)?;
        self.game.resign(side).map_err(to_js_error)
    }

    pub fn forfeit_on_time(&mut self, side: &str) -> Result<(), JsValue> {
        let side = parse_color(side)?;
        self.game.forfeit_on_time(side).map_err(to_js_error)
    }

    pub fn agree_draw(&mut self) -> Result<(), JsValue> {
        self.game.agree_draw().map_err(to_js_error)
    }

    pub fn claim_repetition(&mut self) -> Result<(), JsValue> {
        self.game.claim_repetition().map_err(to_js_error)
    }

    pub fn claim_fifty_moves(&mut self) -> Result<(), JsValue> {
        self.game.claim_fifty_moves().map_err(to_js_error)
    }

    pub fn fen(&self) -> String {
        self.game.fen()
    }

    pub fn pgn(&self) -> String {
        self.game.pgn()
    }

    pub fn legal_moves(&self, side: &str) -> Result<JsValue, JsValue> {
        let side = parse_color(side)?;
        let moves: Vec<MoveJson> = self.game.legal_moves(side).iter().map(move_json).collect();
        Ok(to_js(&moves))
    }

    pub fn get_legal_moves_for_square(&self, square: &str) -> Result<JsValue, JsValue> {
        let from = parse_square(square)?;
        let moves: Vec<MoveJson> = self
            .game
            .legal_moves(self.game.side_to_move())
            .iter()
            .filter(|m| m.from == from)
            .map(move_json)
            .collect();
        Ok(to_js(&moves))
    }

    pub fn king_status(&self, side: &str) -> Result<JsValue, JsValue> {
        let side = parse_color(side)?;
        Ok(to_js(&self.game.king_status(side)))
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
