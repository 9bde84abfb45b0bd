// =============================================================================
// Pseudo-legal move generation
//
// Moves are generated per piece kind by exhaustive match; none of them are
// checked for leaving the mover's king attacked (see `legality`). Castling
// candidates are only gated by the castling flag and the empty squares between
// king and rook here.
// =============================================================================

use crate::board::Board;
use crate::coord::Coord;
use crate::moves::Move;
use crate::piece::{Color, PieceType};
use crate::rays::{self, Direction, Ray};
use crate::special::{CastleSide, CastlingSquares};

pub fn pseudo_legal_moves(board: &Board, color: Color) -> Vec<Move> {
    let mut moves = Vec::new();
    for (from, piece) in board.pieces().filter(|(_, p)| p.color == color) {
        moves_from(board, from, piece.piece_type, color, &mut moves);
    }
    moves
}

/// Pseudo-legal moves of the piece standing on `from`, if any.
pub fn pseudo_legal_moves_from(board: &Board, from: Coord) -> Vec<Move> {
    let mut moves = Vec::new();
    if let Some(piece) = board.piece_at(from) {
        moves_from(board, from, piece.piece_type, piece.color, &mut moves);
    }
    moves
}

fn moves_from(board: &Board, from: Coord, kind: PieceType, color: Color, moves: &mut Vec<Move>) {
    match kind {
        PieceType::Pawn => generate_pawn_moves(board, from, color, moves),
        PieceType::Knight => generate_jumps(board, from, color, &rays::KNIGHT_JUMPS, moves),
        PieceType::Bishop => generate_sliding_moves(board, from, color, &rays::DIAGONAL, moves),
        PieceType::Rook => generate_sliding_moves(board, from, color, &rays::ORTHOGONAL, moves),
        PieceType::Queen => generate_sliding_moves(board, from, color, &rays::ALL_DIRECTIONS, moves),
        PieceType::King => {
            generate_jumps(board, from, color, &rays::ALL_DIRECTIONS, moves);
            generate_castling_candidates(board, from, color, moves);
        }
    }
}

/// Pushes one move, or one per promotion choice when it lands on the last rank.
fn push_pawn_move(from: Coord, to: Coord, color: Color, moves: &mut Vec<Move>) {
    if to.row() == color.promotion_row() {
        for pt in PieceType::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, pt));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}

fn generate_pawn_moves(board: &Board, from: Coord, color: Color, moves: &mut Vec<Move>) {
    let dir = color.pawn_direction();

    // Single push, then double push from the starting rank through two empty squares
    if let Some(forward) = from.offset(dir, 0).filter(|&c| board.piece_at(c).is_none()) {
        push_pawn_move(from, forward, color, moves);

        if from.row() == color.pawn_start_row() {
            if let Some(double) = forward.offset(dir, 0).filter(|&c| board.piece_at(c).is_none()) {
                moves.push(Move::new(from, double));
            }
        }
    }

    // Captures (including en passant)
    for dc in [-1, 1] {
        let Some(to) = from.offset(dir, dc) else {
            continue;
        };
        let is_capture = board.piece_at(to).is_some_and(|p| p.color != color);
        let is_en_passant = board.en_passant_target() == Some(to);
        if is_capture || is_en_passant {
            push_pawn_move(from, to, color, moves);
        }
    }
}

fn generate_jumps(
    board: &Board,
    from: Coord,
    color: Color,
    offsets: &[Direction],
    moves: &mut Vec<Move>,
) {
    for to in rays::jumps(from, offsets) {
        if board.piece_at(to).is_some_and(|p| p.color == color) {
            continue;
        }
        moves.push(Move::new(from, to));
    }
}

/// Ray-casts in each direction, stopping at the first occupied square and
/// including it only when it holds an enemy piece.
fn generate_sliding_moves(
    board: &Board,
    from: Coord,
    color: Color,
    directions: &[Direction],
    moves: &mut Vec<Move>,
) {
    for &dir in directions {
        for to in Ray::new(from, dir) {
            match board.piece_at(to) {
                Some(p) => {
                    if p.color != color {
                        moves.push(Move::new(from, to));
                    }
                    break;
                }
                None => moves.push(Move::new(from, to)),
            }
        }
    }
}

fn generate_castling_candidates(board: &Board, from: Coord, color: Color, moves: &mut Vec<Move>) {
    for side in CastleSide::BOTH {
        if !board.castling_rights().get(color, side) {
            continue;
        }
        let squares = CastlingSquares::new(color, side);
        if from != squares.king_from {
            continue;
        }
        if squares.must_be_empty().iter().all(|&c| board.piece_at(c).is_none()) {
            moves.push(Move::new(from, squares.king_to));
        }
    }
}
