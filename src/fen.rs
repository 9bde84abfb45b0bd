// =============================================================================
// FEN codec
//
// Six whitespace-separated fields: placement, active color, castling rights,
// en passant target, half-move clock, full-move number. Parsing validates the
// whole position before returning it; serializing is the structural inverse.
// =============================================================================

use crate::board::Board;
use crate::coord::Coord;
use crate::error::{ChessError, Result};
use crate::piece::{Color, Piece, PieceType};
use crate::special::{self, CastleSide, CastlingRights};

/// FEN string for the starting position of chess.
pub const FEN_STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const MAX_PAWNS: usize = 8;
const MAX_OTHER_PIECES: usize = 10;
/// Upper bound for both move counters; keeps later increments far from overflow.
const MAX_COUNTER: u32 = 1_000_000;

fn fen_error(reason: impl Into<String>) -> ChessError {
    ChessError::format("FEN", reason)
}

pub fn parse(text: &str) -> Result<Board> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    if fields.len() != 6 {
        return Err(fen_error(format!("expected 6 fields, got {}", fields.len())));
    }

    let mut board = Board::empty();
    parse_placement(&mut board, fields[0])?;
    validate_material(&board)?;

    let side = match fields[1] {
        "w" => Color::White,
        "b" => Color::Black,
        other => return Err(fen_error(format!("invalid active color '{other}'"))),
    };
    board.set_side_to_move(side);

    let castling = CastlingRights::from_fen(fields[2])
        .ok_or_else(|| fen_error(format!("invalid castling field '{}'", fields[2])))?;
    for color in [Color::White, Color::Black] {
        for castle in CastleSide::BOTH {
            if castling.get(color, castle)
                && !special::castling_pieces_home(|c| board.piece_at(c), color, castle)
            {
                return Err(fen_error(format!(
                    "{color} {castle:?} castling right without king and rook on their home squares"
                )));
            }
        }
    }
    board.set_castling_rights(castling);

    board.set_en_passant_target(parse_en_passant(&board, fields[3])?);

    let halfmove_clock = parse_counter(fields[4], "half-move clock")?;
    let fullmove_number = parse_counter(fields[5], "full-move number")?;
    if fullmove_number == 0 {
        return Err(fen_error("full-move number must be at least 1"));
    }
    board.set_clocks(halfmove_clock, fullmove_number);

    if board.is_in_check(side.opposite()) {
        return Err(fen_error(format!(
            "{} is in check but it is {side} to move",
            side.opposite()
        )));
    }

    Ok(board)
}

/// A move counter: plain ASCII digits, at most [`MAX_COUNTER`].
fn parse_counter(field: &str, what: &str) -> Result<u32> {
    let invalid = || fen_error(format!("invalid {what} '{field}'"));
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let value = field.parse::<u32>().map_err(|_| invalid())?;
    if value > MAX_COUNTER {
        return Err(fen_error(format!("{what} {value} exceeds {MAX_COUNTER}")));
    }
    Ok(value)
}

fn parse_placement(board: &mut Board, field: &str) -> Result<()> {
    let ranks: Vec<&str> = field.split('/').collect();
    if ranks.len() != 8 {
        return Err(fen_error(format!("expected 8 ranks, got {}", ranks.len())));
    }

    for (i, rank_str) in ranks.iter().enumerate() {
        // FEN lists rank 8 first
        let row = 7 - i as u8;
        let mut col: u8 = 0;
        let mut after_run = false;
        for ch in rank_str.chars() {
            if let Some(run) = ch.to_digit(10) {
                if !(1..=8).contains(&run) {
                    return Err(fen_error(format!("invalid empty-square count '{ch}'")));
                }
                if after_run {
                    return Err(fen_error(format!(
                        "rank {} splits a run of empty squares",
                        row + 1
                    )));
                }
                after_run = true;
                col += run as u8;
            } else {
                after_run = false;
                let piece = Piece::from_fen_char(ch)
                    .ok_or_else(|| fen_error(format!("invalid piece character '{ch}'")))?;
                let square = Coord::new(col, row)
                    .ok_or_else(|| fen_error(format!("rank {} has more than 8 squares", row + 1)))?;
                if piece.piece_type == PieceType::Pawn && (row == 0 || row == 7) {
                    return Err(fen_error(format!("pawn on the back rank at {square}")));
                }
                board.put(square, Some(piece));
                col += 1;
            }
            if col > 8 {
                return Err(fen_error(format!("rank {} has more than 8 squares", row + 1)));
            }
        }
        if col != 8 {
            return Err(fen_error(format!("rank {} has {col} squares instead of 8", row + 1)));
        }
    }
    Ok(())
}

/// Exactly one king, at most 8 pawns and at most 10 of any other kind per side.
///
/// Promotion accounting (pawns plus promoted extras) is not checked.
fn validate_material(board: &Board) -> Result<()> {
    for color in [Color::White, Color::Black] {
        let mut counts = [0usize; 6];
        for (_, p) in board.pieces().filter(|(_, p)| p.color == color) {
            counts[p.piece_type.index()] += 1;
        }
        for pt in PieceType::ALL {
            let count = counts[pt.index()];
            let allowed = match pt {
                PieceType::King => 1..=1,
                PieceType::Pawn => 0..=MAX_PAWNS,
                _ => 0..=MAX_OTHER_PIECES,
            };
            if !allowed.contains(&count) {
                return Err(fen_error(format!(
                    "{color} has {count} {pt}s (allowed {}..={})",
                    allowed.start(),
                    allowed.end()
                )));
            }
        }
    }
    Ok(())
}

/// The target must sit behind an enemy pawn that could just have advanced two squares.
fn parse_en_passant(board: &Board, field: &str) -> Result<Option<Coord>> {
    if field == "-" {
        return Ok(None);
    }
    let target = Coord::from_algebraic(field)
        .ok_or_else(|| fen_error(format!("invalid en passant square '{field}'")))?;

    let mover = board.side_to_move();
    let expected_row = match mover {
        Color::White => 5,
        Color::Black => 2,
    };
    if target.row() != expected_row {
        return Err(fen_error(format!(
            "en passant square {target} is not on rank {} with {mover} to move",
            expected_row + 1
        )));
    }

    let pusher = mover.opposite();
    let pawn_square = special::en_passant_victim(mover, target);
    let origin = target.offset(-pusher.pawn_direction(), 0);
    let pawn_present = pawn_square
        .and_then(|c| board.piece_at(c))
        .is_some_and(|p| p == Piece::new(PieceType::Pawn, pusher));
    let path_clear =
        board.piece_at(target).is_none() && origin.and_then(|c| board.piece_at(c)).is_none();
    if !pawn_present || !path_clear {
        return Err(fen_error(format!(
            "en passant square {target} does not follow a two-square pawn advance"
        )));
    }
    Ok(Some(target))
}

pub fn serialize(board: &Board) -> String {
    let ep = board
        .en_passant_target()
        .map_or_else(|| "-".to_string(), |c| c.to_string());
    format!(
        "{} {} {} {ep} {} {}",
        placement(board),
        color_field(board.side_to_move()),
        board.castling_rights().to_fen(),
        board.halfmove_clock(),
        board.fullmove_number()
    )
}

/// The piece-placement field, empty squares run-length encoded per rank.
pub fn placement(board: &Board) -> String {
    let mut out = String::with_capacity(72);
    for row in (0..8u8).rev() {
        let mut empty = 0;
        for col in 0..8u8 {
            match board.piece_at(Coord::at(col, row)) {
                Some(p) => {
                    if empty > 0 {
                        out.push_str(&empty.to_string());
                        empty = 0;
                    }
                    out.push(p.to_fen_char());
                }
                None => empty += 1,
            }
        }
        if empty > 0 {
            out.push_str(&empty.to_string());
        }
        if row > 0 {
            out.push('/');
        }
    }
    out
}

pub fn color_field(color: Color) -> &'static str {
    match color {
        Color::White => "w",
        Color::Black => "b",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: [&str; 6] = [
        FEN_STARTPOS,
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        "rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3",
        "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
        "8/8/8/8/8/8/8/K6k b - - 99 120",
    ];

    #[test]
    fn serialize_inverts_parse() {
        for fen in CORPUS {
            let board = parse(fen).unwrap();
            assert_eq!(serialize(&board), fen);
            assert_eq!(parse(&serialize(&board)).unwrap(), board);
        }
    }

    #[test]
    fn start_position_matches_constructor() {
        assert_eq!(parse(FEN_STARTPOS).unwrap(), Board::new());
        assert_eq!(serialize(&Board::new()), FEN_STARTPOS);
    }

    #[test]
    fn rejects_structural_errors() {
        let bad = [
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1",
            "rnbqkbnr/pppppppp/9/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/ppppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/ppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNX w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkX - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - -1 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - +5 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 +1",
            "rnbqkbnr/pppppppp/44/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1R w KQkq - 0 1",
        ];
        for fen in bad {
            assert!(matches!(parse(fen), Err(ChessError::Format { .. })), "{fen}");
        }
    }

    #[test]
    fn move_counters_are_bounded() {
        let fen = |half: u32, full: u32| format!("4k3/8/8/8/8/8/8/R3K3 w - - {half} {full}");
        let board = parse(&fen(MAX_COUNTER, MAX_COUNTER)).unwrap();
        assert_eq!(board.halfmove_clock(), MAX_COUNTER);
        assert_eq!(board.fullmove_number(), MAX_COUNTER);

        for bad in [fen(u32::MAX, 1), fen(0, u32::MAX), fen(MAX_COUNTER + 1, 1)] {
            assert!(matches!(parse(&bad), Err(ChessError::Format { .. })), "{bad}");
        }
        assert!(parse("4k3/8/8/8/8/8/8/R3K3 w - - 4294967296 1").is_err());
    }

    #[test]
    fn rejects_bad_material() {
        let bad = [
            // no white king
            "4k3/8/8/8/8/8/8/8 w - - 0 1",
            // two black kings
            "3kk3/8/8/8/8/8/8/4K3 w - - 0 1",
            // nine white pawns
            "4k3/8/8/8/8/P7/PPPPPPPP/4K3 w - - 0 1",
            // pawn on the first rank
            "4k3/8/8/8/8/8/8/P3K3 w - - 0 1",
        ];
        for fen in bad {
            assert!(matches!(parse(fen), Err(ChessError::Format { .. })), "{fen}");
        }
        // ten knights are allowed, eleven are not
        assert!(parse("NNNNNNNN/NN6/8/8/8/8/8/k3K3 b - - 0 1").is_ok());
        assert!(parse("NNNNNNNN/NNN5/8/8/8/8/8/k3K3 b - - 0 1").is_err());
    }

    #[test]
    fn castling_requires_home_squares() {
        assert!(parse("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").is_ok());
        assert!(parse("r3k2r/8/8/8/8/8/8/R3K1R1 w K - 0 1").is_err());
        assert!(parse("r3k2r/8/8/8/8/8/8/R4K1R w Q - 0 1").is_err());
        assert!(parse("1r2k2r/8/8/8/8/8/8/R3K2R w q - 0 1").is_err());
    }

    #[test]
    fn en_passant_must_follow_a_double_push() {
        assert!(parse("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2").is_ok());
        // wrong rank for the side to move
        assert!(parse("4k3/8/8/3pP3/8/8/8/4K3 w - d3 0 2").is_err());
        // no pawn in front of the target
        assert!(parse("4k3/8/8/4P3/8/8/8/4K3 w - d6 0 2").is_err());
        assert!(parse("4k3/8/8/3pP3/8/8/8/4K3 w - z6 0 2").is_err());
    }

    #[test]
    fn rejects_side_not_to_move_in_check() {
        assert!(parse("4k3/8/8/8/8/8/8/4KR2 w - - 0 1").is_ok());
        assert!(parse("4k3/4R3/8/8/8/8/8/4K3 w - - 0 1").is_err());
    }
}
