// =============================================================================
// Special moves: castling rights bookkeeping, the en passant target lifecycle
// and promotion validation.
//
// Only standard chess castling is supported: king on the e-file, rooks on the
// a- and h-files of the back rank.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::{ChessError, Result};
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};

const KING_COL: u8 = 4;
const KINGSIDE_ROOK_COL: u8 = 7;
const QUEENSIDE_ROOK_COL: u8 = 0;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub struct CastlingRights {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::none()
    }
}

impl CastlingRights {
    pub fn none() -> Self {
        CastlingRights {
            white_kingside: false,
            white_queenside: false,
            black_kingside: false,
            black_queenside: false,
        }
    }

    pub fn all() -> Self {
        CastlingRights {
            white_kingside: true,
            white_queenside: true,
            black_kingside: true,
            black_queenside: true,
        }
    }

    pub fn get(&self, color: Color, side: CastleSide) -> bool {
        match (color, side) {
            (Color::White, CastleSide::KingSide) => self.white_kingside,
            (Color::White, CastleSide::QueenSide) => self.white_queenside,
            (Color::Black, CastleSide::KingSide) => self.black_kingside,
            (Color::Black, CastleSide::QueenSide) => self.black_queenside,
        }
    }

    pub fn set(&mut self, color: Color, side: CastleSide, value: bool) {
        let flag = match (color, side) {
            (Color::White, CastleSide::KingSide) => &mut self.white_kingside,
            (Color::White, CastleSide::QueenSide) => &mut self.white_queenside,
            (Color::Black, CastleSide::KingSide) => &mut self.black_kingside,
            (Color::Black, CastleSide::QueenSide) => &mut self.black_queenside,
        };
        *flag = value;
    }

    pub fn clear_color(&mut self, color: Color) {
        self.set(color, CastleSide::KingSide, false);
        self.set(color, CastleSide::QueenSide, false);
    }

    pub fn any(&self) -> bool {
        self.white_kingside || self.white_queenside || self.black_kingside || self.black_queenside
    }

    /// FEN castling field, `-` when no rights remain.
    pub fn to_fen(&self) -> String {
        let mut s = String::new();
        for (flag, c) in [
            (self.white_kingside, 'K'),
            (self.white_queenside, 'Q'),
            (self.black_kingside, 'k'),
            (self.black_queenside, 'q'),
        ] {
            if flag {
                s.push(c);
            }
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }

    /// Parses the FEN castling field. Letters must be unique and in `KQkq` order.
    pub fn from_fen(field: &str) -> Option<Self> {
        let mut rights = CastlingRights::none();
        if field == "-" {
            return Some(rights);
        }
        if field.is_empty() {
            return None;
        }
        let mut last = None;
        for c in field.chars() {
            let pos = "KQkq".find(c)?;
            if last.is_some_and(|l| pos <= l) {
                return None;
            }
            last = Some(pos);
            match c {
                'K' => rights.white_kingside = true,
                'Q' => rights.white_queenside = true,
                'k' => rights.black_kingside = true,
                _ => rights.black_queenside = true,
            }
        }
        Some(rights)
    }
}

/// The fixed squares involved in one castling move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CastlingSquares {
    pub king_from: Coord,
    pub king_to: Coord,
    pub rook_from: Coord,
    pub rook_to: Coord,
}

impl CastlingSquares {
    pub fn new(color: Color, side: CastleSide) -> Self {
        let row = color.back_rank();
        let (king_to, rook_from, rook_to) = match side {
            CastleSide::KingSide => (6, KINGSIDE_ROOK_COL, 5),
            CastleSide::QueenSide => (2, QUEENSIDE_ROOK_COL, 3),
        };
        CastlingSquares {
            king_from: Coord::at(KING_COL, row),
            king_to: Coord::at(king_to, row),
            rook_from: Coord::at(rook_from, row),
            rook_to: Coord::at(rook_to, row),
        }
    }

    /// Squares between king and rook, all of which must be empty.
    pub fn must_be_empty(&self) -> Vec<Coord> {
        let row = self.king_from.row();
        let (lo, hi) = if self.rook_from.col() < self.king_from.col() {
            (self.rook_from.col() + 1, self.king_from.col())
        } else {
            (self.king_from.col() + 1, self.rook_from.col())
        };
        (lo..hi).map(|col| Coord::at(col, row)).collect()
    }

    /// Squares the king crosses and lands on, none of which may be attacked.
    pub fn king_path(&self) -> [Coord; 2] {
        [self.rook_to, self.king_to]
    }
}

/// Which castling a king move is, if it is one.
pub fn castle_side_of(piece: Piece, from: Coord, to: Coord) -> Option<CastleSide> {
    if piece.piece_type != PieceType::King
        || from != Coord::at(KING_COL, piece.color.back_rank())
        || to.row() != from.row()
    {
        return None;
    }
    match to.col() as i8 - from.col() as i8 {
        2 => Some(CastleSide::KingSide),
        -2 => Some(CastleSide::QueenSide),
        _ => None,
    }
}

/// Clears the rights lost by moving `piece` from `from` to `to`.
///
/// A king move loses both of its color's rights; a rook leaving its corner, or
/// any piece landing on a corner (capturing the rook there), loses that corner's.
pub fn update_castling_rights(rights: &mut CastlingRights, piece: Piece, from: Coord, to: Coord) {
    if piece.piece_type == PieceType::King {
        rights.clear_color(piece.color);
    }
    for square in [from, to] {
        if let Some((color, side)) = rook_corner(square) {
            rights.set(color, side, false);
        }
    }
}

fn rook_corner(square: Coord) -> Option<(Color, CastleSide)> {
    let color = match square.row() {
        0 => Color::White,
        7 => Color::Black,
        _ => return None,
    };
    match square.col() {
        KINGSIDE_ROOK_COL => Some((color, CastleSide::KingSide)),
        QUEENSIDE_ROOK_COL => Some((color, CastleSide::QueenSide)),
        _ => None,
    }
}

/// Whether the pieces required by a castling right stand on their home squares.
pub fn castling_pieces_home(
    piece_at: impl Fn(Coord) -> Option<Piece>,
    color: Color,
    side: CastleSide,
) -> bool {
    let squares = CastlingSquares::new(color, side);
    piece_at(squares.king_from) == Some(Piece::new(PieceType::King, color))
        && piece_at(squares.rook_from) == Some(Piece::new(PieceType::Rook, color))
}

/// The square skipped by a two-square pawn advance, valid for exactly one reply.
pub fn en_passant_target_after(piece: Piece, from: Coord, to: Coord) -> Option<Coord> {
    if piece.piece_type != PieceType::Pawn || from.col() != to.col() {
        return None;
    }
    let (dr, _) = from.delta_to(to);
    if dr.abs() != 2 {
        return None;
    }
    from.offset(dr / 2, 0)
}

/// The square of the pawn removed by an en passant capture landing on `target`.
pub fn en_passant_victim(mover: Color, target: Coord) -> Option<Coord> {
    target.offset(-mover.pawn_direction(), 0)
}

/// Checks the promotion field of a move made by `piece`.
///
/// A pawn landing on the last rank must name a promotion piece; every other
/// move must not name one.
pub fn check_promotion(piece: Piece, mv: &Move) -> Result<()> {
    let reaches_last_rank =
        piece.piece_type == PieceType::Pawn && mv.to.row() == piece.color.promotion_row();
    match (reaches_last_rank, mv.promotion) {
        (true, None) => Err(ChessError::MissingPromotion {
            from: mv.from,
            to: mv.to,
        }),
        (true, Some(pt)) if !pt.is_promotion_choice() => {
            Err(ChessError::illegal_move(mv, format!("cannot promote to a {pt}")))
        }
        (false, Some(_)) => Err(ChessError::illegal_move(
            mv,
            "only a pawn reaching the last rank can promote",
        )),
        _ => Ok(()),
    }
}
