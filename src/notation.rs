// =============================================================================
// Verbose algebraic notation
//
// Every non-castling token spells out the origin square, so a token can be
// turned back into a move without looking at the board:
//
//   e2-e4      pawn move          Ng1-f3     piece move
//   e4xd5      pawn capture       Bb5xc6     piece capture
//   e7-e8=Q    promotion          d7xe8=N    capturing promotion
//   O-O        kingside castle    O-O-O      queenside castle
//
// followed by at most one of `+` (check), `#` (checkmate) or `.` (stalemate).
// The same text is used on the wire and in the persisted move list.
// =============================================================================

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::{ChessError, Result};
use crate::legality::KingStatus;
use crate::moves::Move;
use crate::piece::{Color, PieceType};
use crate::rays;
use crate::special::{CastleSide, CastlingSquares};

const KINGSIDE_CASTLE: &str = "O-O";
const QUEENSIDE_CASTLE: &str = "O-O-O";

/// Status marker appended to a token. Only one can apply to a ply.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
pub enum Suffix {
    Check,
    Checkmate,
    Stalemate,
}

impl Suffix {
    pub fn symbol(self) -> char {
        match self {
            Suffix::Check => '+',
            Suffix::Checkmate => '#',
            Suffix::Stalemate => '.',
        }
    }

    pub fn from_symbol(c: char) -> Option<Suffix> {
        match c {
            '+' => Some(Suffix::Check),
            '#' => Some(Suffix::Checkmate),
            '.' => Some(Suffix::Stalemate),
            _ => None,
        }
    }

    /// The marker describing the opponent's king after a ply.
    pub fn from_status(status: KingStatus) -> Option<Suffix> {
        match status {
            KingStatus::Safe => None,
            KingStatus::Check => Some(Suffix::Check),
            KingStatus::Checkmate => Some(Suffix::Checkmate),
            KingStatus::Stalemate => Some(Suffix::Stalemate),
        }
    }
}

/// The shape of a token, one per grammar production.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotationKind {
    PawnMove,
    PieceMove,
    PawnCapture,
    PieceCapture,
    Promotion,
    CapturingPromotion,
    Castle,
}

/// One validated ply token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Notation {
    Castle {
        side: CastleSide,
        suffix: Option<Suffix>,
    },
    Standard {
        piece: PieceType,
        from: Coord,
        to: Coord,
        capture: bool,
        promotion: Option<PieceType>,
        suffix: Option<Suffix>,
    },
}

impl Notation {
    /// Builds the token for `mv` played by a `piece`.
    ///
    /// King moves of two files from the e-file on the back rank become castling tokens.
    pub fn encode(
        mv: &Move,
        piece: PieceType,
        capture: bool,
        suffix: Option<Suffix>,
    ) -> Result<Notation> {
        let (dr, dc) = mv.from.delta_to(mv.to);
        if piece == PieceType::King && dr == 0 && dc.abs() == 2 && mv.from.col() == 4 {
            let row = mv.from.row();
            if (row == 0 || row == 7) && !capture && mv.promotion.is_none() {
                let side = if dc > 0 {
                    CastleSide::KingSide
                } else {
                    CastleSide::QueenSide
                };
                return Ok(Notation::Castle { side, suffix });
            }
        }

        validate_geometry(piece, mv.from, mv.to, capture, mv.promotion).map_err(|e| match e {
            ChessError::Format { reason, .. } => ChessError::illegal_move(mv, reason),
            other => other,
        })?;
        Ok(Notation::Standard {
            piece,
            from: mv.from,
            to: mv.to,
            capture,
            promotion: mv.promotion,
            suffix,
        })
    }

    pub fn kind(&self) -> NotationKind {
        match *self {
            Notation::Castle { .. } => NotationKind::Castle,
            Notation::Standard {
                piece,
                capture,
                promotion,
                ..
            } => match (piece, capture, promotion.is_some()) {
                (PieceType::Pawn, false, true) => NotationKind::Promotion,
                (PieceType::Pawn, true, true) => NotationKind::CapturingPromotion,
                (PieceType::Pawn, false, false) => NotationKind::PawnMove,
                (PieceType::Pawn, true, false) => NotationKind::PawnCapture,
                (_, false, _) => NotationKind::PieceMove,
                (_, true, _) => NotationKind::PieceCapture,
            },
        }
    }

    pub fn suffix(&self) -> Option<Suffix> {
        match *self {
            Notation::Castle { suffix, .. } | Notation::Standard { suffix, .. } => suffix,
        }
    }

    /// Status of the opponent's king after this ply, as its suffix records it.
    pub fn king_status(&self) -> KingStatus {
        match self.suffix() {
            None => KingStatus::Safe,
            Some(Suffix::Check) => KingStatus::Check,
            Some(Suffix::Checkmate) => KingStatus::Checkmate,
            Some(Suffix::Stalemate) => KingStatus::Stalemate,
        }
    }

    /// The move this token describes when played by `color`.
    ///
    /// Only castling tokens depend on the color.
    pub fn to_move(&self, color: Color) -> Move {
        match *self {
            Notation::Castle { side, .. } => {
                let squares = CastlingSquares::new(color, side);
                Move::new(squares.king_from, squares.king_to)
            }
            Notation::Standard {
                from,
                to,
                promotion,
                ..
            } => Move {
                from,
                to,
                promotion,
            },
        }
    }
}

impl fmt::Display for Notation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Notation::Castle { side, .. } => match side {
                CastleSide::KingSide => f.write_str(KINGSIDE_CASTLE)?,
                CastleSide::QueenSide => f.write_str(QUEENSIDE_CASTLE)?,
            },
            Notation::Standard {
                piece,
                from,
                to,
                capture,
                promotion,
                ..
            } => {
                if piece != PieceType::Pawn {
                    write!(f, "{}", piece.letter())?;
                }
                write!(f, "{from}{}{to}", if capture { 'x' } else { '-' })?;
                if let Some(pt) = promotion {
                    write!(f, "={}", pt.letter())?;
                }
            }
        }
        if let Some(suffix) = self.suffix() {
            write!(f, "{}", suffix.symbol())?;
        }
        Ok(())
    }
}

fn notation_error(token: &str, reason: &str) -> ChessError {
    ChessError::format("notation", format!("'{token}': {reason}"))
}

impl FromStr for Notation {
    type Err = ChessError;

    fn from_str(token: &str) -> Result<Notation> {
        if !token.is_ascii() || token.is_empty() {
            return Err(notation_error(token, "empty or non-ASCII token"));
        }

        let (body, suffix) = match token.chars().last().and_then(Suffix::from_symbol) {
            Some(s) => (&token[..token.len() - 1], Some(s)),
            None => (token, None),
        };

        match body {
            KINGSIDE_CASTLE => {
                return Ok(Notation::Castle {
                    side: CastleSide::KingSide,
                    suffix,
                })
            }
            QUEENSIDE_CASTLE => {
                return Ok(Notation::Castle {
                    side: CastleSide::QueenSide,
                    suffix,
                })
            }
            _ => {}
        }

        let (piece, rest) = match body.chars().next() {
            Some(c @ ('K' | 'Q' | 'R' | 'B' | 'N')) => {
                (PieceType::from_letter(c).unwrap_or(PieceType::Pawn), &body[1..])
            }
            _ => (PieceType::Pawn, body),
        };

        if rest.len() != 5 && rest.len() != 7 {
            return Err(notation_error(token, "expected <from>-<to> or <from>x<to>"));
        }
        let from = Coord::from_algebraic(&rest[0..2])
            .ok_or_else(|| notation_error(token, "bad origin square"))?;
        let capture = match &rest[2..3] {
            "-" => false,
            "x" => true,
            _ => return Err(notation_error(token, "expected '-' or 'x' between squares")),
        };
        let to = Coord::from_algebraic(&rest[3..5])
            .ok_or_else(|| notation_error(token, "bad destination square"))?;
        let promotion = match &rest[5..] {
            "" => None,
            promo => {
                let letter = promo
                    .strip_prefix('=')
                    .and_then(|l| l.chars().next())
                    .filter(|c| c.is_ascii_uppercase())
                    .ok_or_else(|| notation_error(token, "promotion must be written =Q, =R, =B or =N"))?;
                let pt = PieceType::from_letter(letter)
                    .filter(|pt| pt.is_promotion_choice())
                    .ok_or_else(|| notation_error(token, "promotion must be to Q, R, B or N"))?;
                Some(pt)
            }
        };

        validate_geometry(piece, from, to, capture, promotion)?;
        Ok(Notation::Standard {
            piece,
            from,
            to,
            capture,
            promotion,
            suffix,
        })
    }
}

/// Checks that a piece of this kind could ever make this move, board aside.
///
/// Pawn color is implied by the ranks involved; a pawn landing on rank 1 or 8
/// must carry a promotion piece.
fn validate_geometry(
    piece: PieceType,
    from: Coord,
    to: Coord,
    capture: bool,
    promotion: Option<PieceType>,
) -> Result<()> {
    let token = || format!("{from}{}{to}", if capture { 'x' } else { '-' });
    let fail = |reason: &str| Err(notation_error(&token(), reason));

    let (dr, dc) = from.delta_to(to);
    if (dr, dc) == (0, 0) {
        return fail("origin and destination are the same square");
    }

    if piece != PieceType::Pawn {
        if promotion.is_some() {
            return fail("only pawns promote");
        }
        let ok = match piece {
            PieceType::King => rays::is_adjacent(dr, dc),
            PieceType::Queen => rays::is_orthogonal(dr, dc) || rays::is_diagonal(dr, dc),
            PieceType::Rook => rays::is_orthogonal(dr, dc),
            PieceType::Bishop => rays::is_diagonal(dr, dc),
            PieceType::Knight => rays::is_knight_jump(dr, dc),
            PieceType::Pawn => true,
        };
        return if ok {
            Ok(())
        } else {
            fail(&format!("a {piece} cannot move that way"))
        };
    }

    if from.row() == 0 || from.row() == 7 {
        return fail("a pawn can never stand on the first or last rank");
    }

    let shape_ok = if capture {
        dr.abs() == 1 && dc.abs() == 1
    } else {
        dc == 0
            && (dr.abs() == 1
                || (from.row() == Color::White.pawn_start_row() && dr == 2)
                || (from.row() == Color::Black.pawn_start_row() && dr == -2))
    };
    if !shape_ok {
        return fail("a pawn cannot move that way");
    }

    let on_last_rank = to.row() == 0 || to.row() == 7;
    match (on_last_rank, promotion) {
        (true, None) => Err(ChessError::MissingPromotion { from, to }),
        (false, Some(_)) => fail("promotion before the last rank"),
        _ => Ok(()),
    }
}

/// Renders one ply; shorthand for [`Notation::encode`] followed by `to_string`.
pub fn encode(mv: &Move, piece: PieceType, capture: bool, suffix: Option<Suffix>) -> Result<String> {
    Ok(Notation::encode(mv, piece, capture, suffix)?.to_string())
}

/// Parses one ply token; shorthand for `text.parse::<Notation>()`.
pub fn decode(text: &str) -> Result<Notation> {
    text.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coord {
        Coord::from_algebraic(s).unwrap()
    }

    #[test]
    fn tokens_round_trip_through_the_parser() {
        let tokens = [
            "e2-e4", "e7-e5", "e4xd5", "Ng1-f3", "Bb5xc6+", "Qd1-h5", "Ke1-e2", "Ra1xa8#",
            "e7-e8=Q", "d7xe8=N#", "b2-b1=R", "g2xh1=B+", "O-O", "O-O-O+", "O-O#", "Qf6-f7.",
            "a7-a6", "h2-h4",
        ];
        for token in tokens {
            let notation: Notation = token.parse().unwrap();
            assert_eq!(notation.to_string(), token);
        }
    }

    #[test]
    fn decode_recovers_the_encoded_move() {
        let cases = [
            (Move::from_uci("e2e4").unwrap(), PieceType::Pawn, false, None),
            (Move::from_uci("g1f3").unwrap(), PieceType::Knight, false, Some(Suffix::Check)),
            (Move::from_uci("a7b8q").unwrap(), PieceType::Pawn, true, Some(Suffix::Checkmate)),
            (Move::from_uci("c1h6").unwrap(), PieceType::Bishop, true, Some(Suffix::Stalemate)),
        ];
        for (mv, piece, capture, suffix) in cases {
            let text = encode(&mv, piece, capture, suffix).unwrap();
            let decoded = decode(&text).unwrap();
            assert_eq!(decoded.to_move(Color::White), mv, "{text}");
            assert_eq!(decoded.suffix(), suffix);
        }
    }

    #[test]
    fn kinds() {
        let kind = |s: &str| s.parse::<Notation>().unwrap().kind();
        assert_eq!(kind("e2-e4"), NotationKind::PawnMove);
        assert_eq!(kind("e4xd5"), NotationKind::PawnCapture);
        assert_eq!(kind("Ng1-f3"), NotationKind::PieceMove);
        assert_eq!(kind("Ng1xf3"), NotationKind::PieceCapture);
        assert_eq!(kind("a7-a8=Q"), NotationKind::Promotion);
        assert_eq!(kind("a7xb8=Q"), NotationKind::CapturingPromotion);
        assert_eq!(kind("O-O-O"), NotationKind::Castle);
    }

    #[test]
    fn castling_resolves_by_color() {
        let short: Notation = "O-O".parse().unwrap();
        assert_eq!(short.to_move(Color::White), Move::new(sq("e1"), sq("g1")));
        assert_eq!(short.to_move(Color::Black), Move::new(sq("e8"), sq("g8")));
        let long: Notation = "O-O-O".parse().unwrap();
        assert_eq!(long.to_move(Color::Black), Move::new(sq("e8"), sq("c8")));

        let encoded = Notation::encode(&Move::new(sq("e8"), sq("c8")), PieceType::King, false, None).unwrap();
        assert_eq!(encoded.to_string(), "O-O-O");
    }

    #[test]
    fn piece_geometry_is_enforced() {
        for token in ["Ke1-e3", "Qd1-e3", "Ra1-b2", "Bc1-c3", "Ng1-g3", "Ng1-f4", "Ke1-g1"] {
            assert!(matches!(token.parse::<Notation>(), Err(ChessError::Format { .. })), "{token}");
        }
        for token in ["Ke1-d2", "Qd1-a4", "Qd1-d8", "Ra1-a8", "Bc1-h6", "Ng1-h3", "Nb1-d2"] {
            assert!(token.parse::<Notation>().is_ok(), "{token}");
        }
    }

    #[test]
    fn pawn_geometry_is_enforced() {
        for token in [
            "e2-e5", "e3-e5", "e4-d5", "e4xe5", "e4xc6", "e1-e2", "e8-e7", "e7-e5=Q", "e6-e7=Q", "Pe2-e4",
        ] {
            assert!(matches!(token.parse::<Notation>(), Err(ChessError::Format { .. })), "{token}");
        }
        // black pushes down the board, white up
        for token in ["e7-e5", "e2-e4", "e3-e2", "e6-e7"] {
            assert!(token.parse::<Notation>().is_ok(), "{token}");
        }
    }

    #[test]
    fn last_rank_needs_a_promotion() {
        assert_eq!(
            "e7-e8".parse::<Notation>(),
            Err(ChessError::MissingPromotion { from: sq("e7"), to: sq("e8") })
        );
        assert!(matches!("d2xe1".parse::<Notation>(), Err(ChessError::MissingPromotion { .. })));
        for token in ["e7-e8=K", "e7-e8=P", "e7-e8=q", "e7-e8Q", "Ng1-f3=Q"] {
            assert!(matches!(token.parse::<Notation>(), Err(ChessError::Format { .. })), "{token}");
        }
    }

    #[test]
    fn malformed_tokens() {
        for token in ["", "e2e4", "e2_e4", "Zg1-f3", "Ng1-f3++", "O-O-O-O", "0-0", "i2-i4", "é2-e4"] {
            assert!(matches!(token.parse::<Notation>(), Err(ChessError::Format { .. })), "{token:?}");
        }
    }

    #[test]
    fn encode_rejects_impossible_moves() {
        let mv = Move::from_uci("e2e5").unwrap();
        assert!(matches!(
            Notation::encode(&mv, PieceType::Pawn, false, None),
            Err(ChessError::IllegalMove { .. })
        ));
    }
}
