// =============================================================================
// Legality filter and check detection
//
// A pseudo-legal move is kept only if, after applying it to a scratch copy of
// the board, the mover's king is not attacked. Castling additionally requires
// that the king is not in check and does not cross or land on an attacked
// square.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::coord::Coord;
use crate::movegen;
use crate::moves::Move;
use crate::piece::Color;
use crate::special::{self, CastlingSquares};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum KingStatus {
    Safe,
    Check,
    Checkmate,
    Stalemate,
}

impl KingStatus {
    pub fn is_check(self) -> bool {
        matches!(self, KingStatus::Check | KingStatus::Checkmate)
    }
}

/// The board as `color` would move on it. The en passant target only ever
/// belongs to the side to move.
fn view_for(board: &Board, color: Color) -> Board {
    let mut view = *board;
    if color != board.side_to_move() {
        view.set_en_passant_target(None);
    }
    view
}

/// All legal moves for `color`, sorted and free of duplicates.
pub fn legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let view = view_for(board, color);
    let mut moves: Vec<Move> = movegen::pseudo_legal_moves(&view, color)
        .into_iter()
        .filter(|mv| is_safe(&view, color, mv))
        .collect();
    moves.sort();
    moves.dedup();
    moves
}

/// Legal moves of the piece standing on `from`.
pub fn legal_moves_from(board: &Board, from: Coord) -> Vec<Move> {
    let Some(piece) = board.piece_at(from) else {
        return Vec::new();
    };
    let view = view_for(board, piece.color);
    let mut moves: Vec<Move> = movegen::pseudo_legal_moves_from(&view, from)
        .into_iter()
        .filter(|mv| is_safe(&view, piece.color, mv))
        .collect();
    moves.sort();
    moves
}

pub fn has_legal_move(board: &Board, color: Color) -> bool {
    let view = view_for(board, color);
    movegen::pseudo_legal_moves(&view, color)
        .iter()
        .any(|mv| is_safe(&view, color, mv))
}

/// Whether a pseudo-legal move of `color` leaves its own king unattacked.
pub(crate) fn is_safe(board: &Board, color: Color, mv: &Move) -> bool {
    if let Some(piece) = board.piece_at(mv.from) {
        if let Some(side) = special::castle_side_of(piece, mv.from, mv.to) {
            let squares = CastlingSquares::new(color, side);
            let attacker = color.opposite();
            if board.is_square_attacked_by(squares.king_from, attacker)
                || squares
                    .king_path()
                    .iter()
                    .any(|&c| board.is_square_attacked_by(c, attacker))
            {
                return false;
            }
        }
    }

    let mut scratch = *board;
    match scratch.apply_move(mv) {
        Ok(_) => !scratch.is_in_check(color),
        Err(_) => false,
    }
}

pub fn king_status(board: &Board, color: Color) -> KingStatus {
    let in_check = board.is_in_check(color);
    match (in_check, has_legal_move(board, color)) {
        (true, true) => KingStatus::Check,
        (true, false) => KingStatus::Checkmate,
        (false, true) => KingStatus::Safe,
        (false, false) => KingStatus::Stalemate,
    }
}
