use crate::coord::Coord;

/// Every way an engine operation can fail.
///
/// Failing operations leave the game exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChessError {
    /// Malformed FEN, PGN, notation or square text.
    #[error("malformed {what}: {reason}")]
    Format { what: &'static str, reason: String },

    /// The move breaks piece geometry or occupancy, or leaves the mover's king attacked.
    #[error("illegal move {mv}: {reason}")]
    IllegalMove { mv: String, reason: String },

    /// The operation is not valid in the game's current phase.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A pawn reached the last rank without a promotion choice.
    #[error("pawn move {from}-{to} reaches the last rank without a promotion piece")]
    MissingPromotion { from: Coord, to: Coord },
}

impl ChessError {
    pub(crate) fn format(what: &'static str, reason: impl Into<String>) -> Self {
        ChessError::Format {
            what,
            reason: reason.into(),
        }
    }

    pub(crate) fn illegal_move(mv: impl ToString, reason: impl Into<String>) -> Self {
        ChessError::IllegalMove {
            mv: mv.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn illegal_state(reason: impl Into<String>) -> Self {
        ChessError::IllegalState(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, ChessError>;
