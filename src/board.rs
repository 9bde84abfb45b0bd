use std::fmt;

use crate::coord::Coord;
use crate::error::{ChessError, Result};
use crate::fen;
use crate::moves::Move;
use crate::piece::{Color, Piece, PieceType};
use crate::rays::{self, Ray};
use crate::special::{self, CastlingRights, CastlingSquares};

/// Everything needed to take back one applied move.
///
/// Holds the deltas of the move rather than a copy of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Undo {
    pub mv: Move,
    /// The piece as it stood on `mv.from` (a pawn for promotions).
    pub moved: Piece,
    /// The captured piece and the square it was taken on (differs from `mv.to` en passant).
    pub captured: Option<(Piece, Coord)>,
    pub castling: CastlingRights,
    pub en_passant: Option<Coord>,
    pub halfmove_clock: u32,
}

/// A chess position.
///
/// `squares` is indexed `[row][col]` with row 0 = rank 1 and col 0 = file a.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    squares: [[Option<Piece>; 8]; 8],
    kings: [Coord; 2],
    side_to_move: Color,
    castling: CastlingRights,
    en_passant: Option<Coord>,
    halfmove_clock: u32,
    fullmove_number: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// A board with no pieces, for the FEN parser to fill in.
    pub(crate) fn empty() -> Self {
        Board {
            squares: [[None; 8]; 8],
            kings: [Coord::at(4, 0), Coord::at(4, 7)],
            side_to_move: Color::White,
            castling: CastlingRights::none(),
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
        }
    }

    /// The standard starting position.
    pub fn new() -> Self {
        const BACK_RANK: [PieceType; 8] = [
            PieceType::Rook,
            PieceType::Knight,
            PieceType::Bishop,
            PieceType::Queen,
            PieceType::King,
            PieceType::Bishop,
            PieceType::Knight,
            PieceType::Rook,
        ];

        let mut board = Board::empty();
        for color in [Color::White, Color::Black] {
            for (col, pt) in BACK_RANK.iter().enumerate() {
                board.put(Coord::at(col as u8, color.back_rank()), Some(Piece::new(*pt, color)));
                board.put(
                    Coord::at(col as u8, color.pawn_start_row()),
                    Some(Piece::new(PieceType::Pawn, color)),
                );
            }
        }
        board.castling = CastlingRights::all();
        board
    }

    pub fn from_fen(text: &str) -> Result<Self> {
        fen::parse(text)
    }

    pub fn to_fen(&self) -> String {
        fen::serialize(self)
    }

    pub fn piece_at(&self, c: Coord) -> Option<Piece> {
        self.squares[c.row() as usize][c.col() as usize]
    }

    /// Places (or clears) a square, keeping the king cache current.
    pub(crate) fn put(&mut self, c: Coord, piece: Option<Piece>) {
        self.squares[c.row() as usize][c.col() as usize] = piece;
        if let Some(p) = piece {
            if p.piece_type == PieceType::King {
                self.kings[p.color.index()] = c;
            }
        }
    }

    pub fn king_square(&self, color: Color) -> Coord {
        self.kings[color.index()]
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    pub fn en_passant_target(&self) -> Option<Coord> {
        self.en_passant
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub(crate) fn set_side_to_move(&mut self, color: Color) {
        self.side_to_move = color;
    }

    pub(crate) fn set_castling_rights(&mut self, rights: CastlingRights) {
        self.castling = rights;
    }

    pub(crate) fn set_en_passant_target(&mut self, target: Option<Coord>) {
        self.en_passant = target;
    }

    pub(crate) fn set_clocks(&mut self, halfmove_clock: u32, fullmove_number: u32) {
        self.halfmove_clock = halfmove_clock;
        self.fullmove_number = fullmove_number;
    }

    /// Every occupied square with its piece, rank 1 first.
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        Coord::all().filter_map(move |c| self.piece_at(c).map(|p| (c, p)))
    }

    pub fn is_square_attacked_by(&self, target: Coord, attacker: Color) -> bool {
        let holds = |c: Coord, types: &[PieceType]| {
            self.piece_at(c)
                .is_some_and(|p| p.color == attacker && types.contains(&p.piece_type))
        };

        if rays::jumps(target, &rays::KNIGHT_JUMPS).any(|c| holds(c, &[PieceType::Knight])) {
            return true;
        }

        if rays::jumps(target, &rays::ALL_DIRECTIONS).any(|c| holds(c, &[PieceType::King])) {
            return true;
        }

        // A pawn one row behind the target (from the attacker's side) on an adjacent file
        let behind = -attacker.pawn_direction();
        if [-1, 1]
            .iter()
            .filter_map(|&dc| target.offset(behind, dc))
            .any(|c| holds(c, &[PieceType::Pawn]))
        {
            return true;
        }

        let slider_hits = |dirs: &[rays::Direction], types: &[PieceType]| {
            dirs.iter().any(|&dir| {
                Ray::new(target, dir)
                    .find(|&c| self.piece_at(c).is_some())
                    .is_some_and(|c| holds(c, types))
            })
        };

        slider_hits(&rays::ORTHOGONAL, &[PieceType::Rook, PieceType::Queen])
            || slider_hits(&rays::DIAGONAL, &[PieceType::Bishop, PieceType::Queen])
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        self.is_square_attacked_by(self.king_square(color), color.opposite())
    }

    /// Whether the side to move has a pawn placed to capture on the en passant target.
    pub fn en_passant_capturable(&self) -> bool {
        let Some(target) = self.en_passant else {
            return false;
        };
        let mover = self.side_to_move;
        let pawn = Some(Piece::new(PieceType::Pawn, mover));
        [-1, 1]
            .iter()
            .filter_map(|&dc| target.offset(-mover.pawn_direction(), dc))
            .any(|c| self.piece_at(c) == pawn)
    }

    /// Key identifying a position for repetition purposes.
    ///
    /// Two positions share a key when piece placement, side to move and castling
    /// rights match and the same en passant capture (if any) is available.
    pub fn position_key(&self) -> String {
        let ep = match self.en_passant {
            Some(target) if self.en_passant_capturable() => target.to_string(),
            _ => "-".to_string(),
        };
        format!(
            "{} {} {} {ep}",
            fen::placement(self),
            fen::color_field(self.side_to_move),
            self.castling.to_fen()
        )
    }

    /// Neither side can ever deliver mate: K v K, K+minor v K, or only
    /// same-coloured bishops beside the kings.
    pub fn has_insufficient_material(&self) -> bool {
        let mut minors = Vec::new();
        for (c, p) in self.pieces() {
            match p.piece_type {
                PieceType::King => {}
                PieceType::Knight | PieceType::Bishop => minors.push((c, p)),
                _ => return false,
            }
        }
        match minors.as_slice() {
            [] | [_] => true,
            bishops => {
                bishops.iter().all(|(_, p)| p.piece_type == PieceType::Bishop)
                    && bishops.iter().all(|(c, _)| c.is_light() == bishops[0].0.is_light())
            }
        }
    }

    /// Applies a move without any legality checking, returning what is needed to undo it.
    ///
    /// Handles captures (including en passant), promotion, the rook half of castling,
    /// castling rights, the en passant target and both move counters.
    pub(crate) fn apply_move(&mut self, mv: &Move) -> Result<Undo> {
        let piece = self
            .piece_at(mv.from)
            .ok_or_else(|| ChessError::illegal_move(mv, format!("no piece on {}", mv.from)))?;

        let mut undo = Undo {
            mv: *mv,
            moved: piece,
            captured: None,
            castling: self.castling,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
        };

        let is_pawn_move = piece.piece_type == PieceType::Pawn;

        if let Some(captured) = self.piece_at(mv.to) {
            undo.captured = Some((captured, mv.to));
        } else if is_pawn_move && mv.from.col() != mv.to.col() && self.en_passant == Some(mv.to) {
            if let Some(victim) = special::en_passant_victim(piece.color, mv.to) {
                undo.captured = self.piece_at(victim).map(|p| (p, victim));
                self.put(victim, None);
            }
        }

        self.put(mv.from, None);
        let landed = match mv.promotion {
            Some(pt) => Piece::new(pt, piece.color),
            None => piece,
        };
        self.put(mv.to, Some(landed));

        if let Some(side) = special::castle_side_of(piece, mv.from, mv.to) {
            let squares = CastlingSquares::new(piece.color, side);
            let rook = self.piece_at(squares.rook_from);
            self.put(squares.rook_from, None);
            self.put(squares.rook_to, rook);
        }

        special::update_castling_rights(&mut self.castling, piece, mv.from, mv.to);
        self.en_passant = special::en_passant_target_after(piece, mv.from, mv.to);

        if is_pawn_move || undo.captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if piece.color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = self.side_to_move.opposite();

        Ok(undo)
    }

    /// Exactly reverses the [`Board::apply_move`] that produced `undo`.
    pub(crate) fn undo_move(&mut self, undo: &Undo) {
        let mv = undo.mv;
        self.side_to_move = undo.moved.color;
        if undo.moved.color == Color::Black {
            self.fullmove_number -= 1;
        }

        self.put(mv.to, None);
        self.put(mv.from, Some(undo.moved));

        if let Some(side) = special::castle_side_of(undo.moved, mv.from, mv.to) {
            let squares = CastlingSquares::new(undo.moved.color, side);
            let rook = self.piece_at(squares.rook_to);
            self.put(squares.rook_to, None);
            self.put(squares.rook_from, rook);
        }

        if let Some((piece, square)) = undo.captured {
            self.put(square, Some(piece));
        }

        self.castling = undo.castling;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in (0..8u8).rev() {
            write!(f, "{} ", row + 1)?;
            for col in 0..8u8 {
                let c = self.piece_at(Coord::at(col, row)).map_or('.', Piece::to_fen_char);
                write!(f, " {c}")?;
            }
            writeln!(f)?;
        }
        write!(f, "   a b c d e f g h")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coord {
        Coord::from_algebraic(s).unwrap()
    }

    fn mv(s: &str) -> Move {
        Move::from_uci(s).unwrap()
    }

    #[test]
    fn starting_position_layout() {
        let board = Board::new();
        assert_eq!(board.pieces().count(), 32);
        assert_eq!(board.king_square(Color::White), sq("e1"));
        assert_eq!(board.king_square(Color::Black), sq("e8"));
        assert_eq!(board.piece_at(sq("d8")), Some(Piece::new(PieceType::Queen, Color::Black)));
        assert_eq!(board.side_to_move(), Color::White);
    }

    #[test]
    fn attacks_from_every_piece_kind() {
        let board = Board::from_fen("4k3/8/8/3q4/8/1N6/5p2/R3K3 w Q - 0 1").unwrap();
        // knight b3
        assert!(board.is_square_attacked_by(sq("c5"), Color::White));
        // rook a1 along the rank up to the king
        assert!(board.is_square_attacked_by(sq("d1"), Color::White));
        // black pawn f2 attacks e1 and g1
        assert!(board.is_square_attacked_by(sq("e1"), Color::Black));
        assert!(board.is_square_attacked_by(sq("g1"), Color::Black));
        // queen d5 down the file to d1; the b3 knight blocks the diagonal to a2
        assert!(board.is_square_attacked_by(sq("d1"), Color::Black));
        assert!(!board.is_square_attacked_by(sq("a2"), Color::Black));
        assert!(!board.is_square_attacked_by(sq("h5"), Color::White));
    }

    #[test]
    fn blocked_slider_does_not_attack() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K2r w - - 0 1").unwrap();
        assert!(board.is_in_check(Color::White));
        let board = Board::from_fen("4k3/4r3/8/8/8/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(!board.is_in_check(Color::White));
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3").unwrap();
        let before = board;
        let undo = board.apply_move(&mv("e5f6")).unwrap();
        assert_eq!(board.piece_at(sq("f5")), None);
        assert_eq!(board.piece_at(sq("f6")), Some(Piece::new(PieceType::Pawn, Color::White)));
        assert_eq!(undo.captured, Some((Piece::new(PieceType::Pawn, Color::Black), sq("f5"))));
        assert_eq!(board.halfmove_clock(), 0);

        board.undo_move(&undo);
        assert_eq!(board, before);
    }

    #[test]
    fn castling_moves_the_rook_and_undo_restores_it() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 3 10").unwrap();
        let before = board;
        let undo = board.apply_move(&mv("e8c8")).unwrap();
        assert_eq!(board.piece_at(sq("d8")), Some(Piece::new(PieceType::Rook, Color::Black)));
        assert_eq!(board.piece_at(sq("a8")), None);
        assert_eq!(board.king_square(Color::Black), sq("c8"));
        assert_eq!(board.castling_rights().to_fen(), "KQ");
        assert_eq!(board.fullmove_number(), 11);
        assert_eq!(board.halfmove_clock(), 4);

        board.undo_move(&undo);
        assert_eq!(board, before);
    }

    #[test]
    fn promotion_undo_restores_the_pawn() {
        let mut board = Board::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let before = board;
        let undo = board
            .apply_move(&Move::with_promotion(sq("a7"), sq("b8"), PieceType::Queen))
            .unwrap();
        assert_eq!(board.piece_at(sq("b8")), Some(Piece::new(PieceType::Queen, Color::White)));
        board.undo_move(&undo);
        assert_eq!(board, before);
    }

    #[test]
    fn double_push_sets_target_for_one_reply() {
        let mut board = Board::new();
        board.apply_move(&mv("e2e4")).unwrap();
        assert_eq!(board.en_passant_target(), Some(sq("e3")));
        board.apply_move(&mv("g8f6")).unwrap();
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn apply_from_empty_square_fails() {
        let mut board = Board::new();
        assert!(matches!(board.apply_move(&mv("e4e5")), Err(ChessError::IllegalMove { .. })));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn insufficient_material_cases() {
        let cases = [
            ("4k3/8/8/8/8/8/8/4K3 w - - 0 1", true),
            ("4k3/8/8/8/8/8/8/4KN2 w - - 0 1", true),
            ("2b1k3/8/8/8/8/8/8/4KB2 w - - 0 1", true),
            ("3bk3/8/8/8/8/8/8/4KB2 w - - 0 1", false),
            ("4k3/8/8/8/8/8/8/3NKN2 w - - 0 1", false),
            ("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1", false),
        ];
        for (fen, expected) in cases {
            assert_eq!(Board::from_fen(fen).unwrap().has_insufficient_material(), expected, "{fen}");
        }
    }

    #[test]
    fn position_key_ignores_unusable_en_passant() {
        let mut board = Board::new();
        board.apply_move(&mv("e2e4")).unwrap();
        assert!(!board.en_passant_capturable());
        assert!(board.position_key().ends_with(" b KQkq -"));

        let board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3").unwrap();
        assert!(board.en_passant_capturable());
        assert!(board.position_key().ends_with(" b KQkq e3"));
    }
}
