use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::piece::PieceType;

/// One ply as a pair of squares plus the promotion choice, if any.
///
/// Ordered by (from, to, promotion), which with [`Coord`]'s column-major
/// ordering gives a reproducible enumeration order.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Move {
    pub from: Coord,
    pub to: Coord,
    pub promotion: Option<PieceType>,
}

impl Move {
    pub fn new(from: Coord, to: Coord) -> Self {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    pub fn with_promotion(from: Coord, to: Coord, promotion: PieceType) -> Self {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Convert to UCI notation, e.g. "e2e4", "a7a8q"
    pub fn to_uci(&self) -> String {
        let promo = match self.promotion {
            Some(pt) => pt.letter().to_ascii_lowercase().to_string(),
            None => String::new(),
        };
        format!("{}{}{promo}", self.from, self.to)
    }

    /// Parse from UCI notation
    pub fn from_uci(s: &str) -> Option<Move> {
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return None;
        }
        let from = Coord::from_algebraic(&s[0..2])?;
        let to = Coord::from_algebraic(&s[2..4])?;
        let promotion = match s[4..].chars().next() {
            Some(c) if c.is_ascii_lowercase() => {
                Some(PieceType::from_letter(c).filter(|pt| pt.is_promotion_choice())?)
            }
            Some(_) => return None,
            None => None,
        };
        Some(Move {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uci())
    }
}
