use crate::board::{Board, Undo};
use crate::error::{ChessError, Result};
use crate::legality;
use crate::moves::Move;
use crate::notation::{Notation, Suffix};
use crate::piece::PieceType;

/// Undo stack of applied moves.
///
/// Each entry stores only what the move changed, so memory grows with the number
/// of plies rather than with board copies. There is no redo: applying a move after
/// an undo starts a new line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MoveHistory {
    entries: Vec<Undo>,
}

impl MoveHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies `mv` to `board` and records it, returning the ply's notation.
    ///
    /// The move is not checked for legality here. On error the board is unchanged.
    pub fn apply(&mut self, board: &mut Board, mv: &Move) -> Result<Notation> {
        let piece = board
            .piece_at(mv.from)
            .ok_or_else(|| ChessError::illegal_move(mv, format!("no piece on {}", mv.from)))?;
        let capture = board.piece_at(mv.to).is_some()
            || (piece.piece_type == PieceType::Pawn
                && mv.from.col() != mv.to.col()
                && board.en_passant_target() == Some(mv.to));

        let undo = board.apply_move(mv)?;
        let status = legality::king_status(board, board.side_to_move());
        match Notation::encode(mv, piece.piece_type, capture, Suffix::from_status(status)) {
            Ok(notation) => {
                self.entries.push(undo);
                Ok(notation)
            }
            Err(e) => {
                board.undo_move(&undo);
                Err(e)
            }
        }
    }

    /// Takes back the most recent move, restoring the board exactly.
    pub fn undo(&mut self, board: &mut Board) -> Result<Move> {
        let undo = self
            .entries
            .pop()
            .ok_or_else(|| ChessError::illegal_state("no moves to undo"))?;
        board.undo_move(&undo);
        Ok(undo.mv)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Undo> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Undo> {
        self.entries.iter()
    }
}
