// =============================================================================
// PGN move text: the game record written by the engine and the reader that
// turns move text back into plies.
//
// Tokens use the verbose notation from `notation`, not minimal SAN, so each
// ply maps to (from, to, promotion) without consulting the board.
// =============================================================================

use std::fmt::Write;

use crate::error::{ChessError, Result};
use crate::game::GameResult;
use crate::moves::Move;
use crate::notation::Notation;
use crate::piece::Color;

/// Ordered plies of a game, rendered as PGN move text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameRecord {
    first_move_number: u32,
    first_color: Color,
    plies: Vec<Notation>,
}

impl Default for GameRecord {
    fn default() -> Self {
        Self::new(1, Color::White)
    }
}

impl GameRecord {
    /// An empty record whose first ply is `first_color`'s move number `first_move_number`.
    pub fn new(first_move_number: u32, first_color: Color) -> Self {
        GameRecord {
            first_move_number,
            first_color,
            plies: Vec::new(),
        }
    }

    pub fn push(&mut self, ply: Notation) {
        self.plies.push(ply);
    }

    /// Drops the last ply when it is taken back.
    pub(crate) fn pop(&mut self) -> Option<Notation> {
        self.plies.pop()
    }

    pub fn plies(&self) -> &[Notation] {
        &self.plies
    }

    pub fn len(&self) -> usize {
        self.plies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plies.is_empty()
    }

    /// Move text such as `1. e2-e4 e7-e5 2. Ng1-f3`, with the result token appended
    /// when the game is over.
    pub fn movetext(&self, result: Option<GameResult>) -> String {
        let mut out = String::new();
        let mut number = self.first_move_number;
        let mut color = self.first_color;

        for (i, ply) in self.plies.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            match color {
                Color::White => {
                    let _ = write!(out, "{number}. ");
                }
                Color::Black if i == 0 => {
                    let _ = write!(out, "{number}... ");
                }
                Color::Black => {}
            }
            let _ = write!(out, "{ply}");

            if color == Color::Black {
                number += 1;
            }
            color = color.opposite();
        }

        if let Some(result) = result {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(result.as_pgn());
        }
        out
    }
}

/// One numbered move. White's ply is missing when the text starts with Black
/// to move (`12... e7-e5`); Black's when the game ended after White's move.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgnMove {
    pub number: u32,
    pub white: Option<Notation>,
    pub black: Option<Notation>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: Vec<(String, String)>,
    pub moves: Vec<PgnMove>,
    pub result: Option<GameResult>,
}

impl PgnGame {
    /// Value of the first tag named `key`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The plies in order with the side that plays each one.
    pub fn sided_plies(&self) -> Vec<(Color, Move)> {
        let mut plies = Vec::with_capacity(self.moves.len() * 2);
        for m in &self.moves {
            if let Some(white) = &m.white {
                plies.push((Color::White, white.to_move(Color::White)));
            }
            if let Some(black) = &m.black {
                plies.push((Color::Black, black.to_move(Color::Black)));
            }
        }
        plies
    }

    /// The plies in order, castling resolved by whose turn it is.
    pub fn plies(&self) -> Vec<Move> {
        self.sided_plies().into_iter().map(|(_, mv)| mv).collect()
    }
}

fn pgn_error(reason: impl Into<String>) -> ChessError {
    ChessError::format("PGN", reason)
}

/// Parses a `[Key "Value"]` (or `[Key Value]`) tag line.
fn parse_tag(line: &str) -> Result<(String, String)> {
    let inner = line
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .ok_or_else(|| pgn_error(format!("unterminated tag line '{line}'")))?;
    let (key, value) = inner
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| pgn_error(format!("tag line without a value '{line}'")))?;
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Ok((key.to_string(), value.to_string()))
}

/// Removes `{...}` comments and `;` comments running to the end of the line.
fn strip_comments(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if !chars.by_ref().any(|c| c == '}') {
                    return Err(pgn_error("unterminated '{' comment"));
                }
                out.push(' ');
            }
            ';' => {
                if chars.by_ref().any(|c| c == '\n') {
                    out.push('\n');
                }
            }
            '}' => return Err(pgn_error("'}' without an opening '{'")),
            c => out.push(c),
        }
    }
    Ok(out)
}

/// Splits a leading move number off a token: `12.` is White's move 12 and
/// `12...` Black's. Returns the number, the side it announces and the rest.
fn split_move_number(token: &str) -> Result<Option<(u32, Color, &str)>> {
    let digits = token.len() - token.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return Ok(None);
    }
    let rest = &token[digits..];
    let after_dots = rest.trim_start_matches('.');
    let color = match rest.len() - after_dots.len() {
        0 => return Ok(None),
        1 => Color::White,
        3 => Color::Black,
        _ => return Err(pgn_error(format!("malformed move number '{token}'"))),
    };
    let number = token[..digits]
        .parse::<u32>()
        .ok()
        .filter(|&n| n > 0)
        .ok_or_else(|| pgn_error(format!("invalid move number in '{token}'")))?;
    Ok(Some((number, color, after_dots)))
}

/// Tracks whose ply comes next while the move text is read.
struct Pairing {
    number: u32,
    color: Color,
    moves: Vec<PgnMove>,
}

impl Pairing {
    fn new() -> Self {
        Pairing {
            number: 1,
            color: Color::White,
            moves: Vec::new(),
        }
    }

    /// A stated move number either sets the start (before any ply) or must
    /// agree with the running count.
    fn announce(&mut self, number: u32, color: Color) -> Result<()> {
        if self.moves.is_empty() {
            self.number = number;
            self.color = color;
        } else if (number, color) != (self.number, self.color) {
            let expected = match self.color {
                Color::White => format!("{}.", self.number),
                Color::Black => format!("{}...", self.number),
            };
            return Err(pgn_error(format!(
                "move number {number} for {color} where {expected} was expected"
            )));
        }
        Ok(())
    }

    fn push(&mut self, ply: Notation) {
        match self.color {
            Color::White => self.moves.push(PgnMove {
                number: self.number,
                white: Some(ply),
                black: None,
            }),
            Color::Black => match self.moves.last_mut() {
                Some(m) if m.number == self.number && m.black.is_none() => m.black = Some(ply),
                _ => self.moves.push(PgnMove {
                    number: self.number,
                    white: None,
                    black: Some(ply),
                }),
            },
        }
        if self.color == Color::Black {
            self.number += 1;
        }
        self.color = self.color.opposite();
    }
}

/// Reads move text into numbered (white, black) pairs.
///
/// Tag lines, comments and the result token are dropped. Move numbers set the
/// starting move and side (`12...` starts with Black) and must then follow
/// the plies in order; every other token must be a valid ply in verbose notation.
pub fn parse(text: &str) -> Result<PgnGame> {
    let mut game = PgnGame::default();
    let mut body = String::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            game.tags.push(parse_tag(trimmed)?);
        } else {
            body.push_str(line);
            body.push('\n');
        }
    }

    let body = strip_comments(&body)?;
    let mut pairing = Pairing::new();
    for token in body.split_whitespace() {
        if game.result.is_some() {
            return Err(pgn_error(format!("'{token}' after the game result")));
        }
        if let Some(result) = GameResult::from_pgn(token) {
            game.result = Some(result);
            continue;
        }
        if token == "*" {
            continue;
        }
        let ply = match split_move_number(token)? {
            Some((number, color, rest)) => {
                pairing.announce(number, color)?;
                if rest.is_empty() {
                    continue;
                }
                rest
            }
            None => token,
        };
        pairing.push(ply.parse::<Notation>()?);
    }

    game.moves = pairing.moves;
    Ok(game)
}
