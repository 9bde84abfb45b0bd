pub mod board;
pub mod coord;
pub mod error;
pub mod fen;
pub mod game;
pub mod history;
pub mod legality;
pub mod movegen;
pub mod moves;
pub mod notation;
pub mod perft;
pub mod pgn;
pub mod piece;
pub mod rays;
pub mod special;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use board::Board;
pub use coord::Coord;
pub use error::{ChessError, Result};
pub use game::{Game, GameResult, GameState, MoveOutcome};
pub use legality::KingStatus;
pub use moves::Move;
pub use notation::Notation;
pub use piece::{Color, Piece, PieceType};
