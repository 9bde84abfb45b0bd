use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ChessError;

/// One of the 64 squares.
///
/// Stored zero-based: `col` 0 = file a, `row` 0 = rank 1. Field order makes the
/// derived ordering column-major, which is the order moves are enumerated in.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(into = "String", try_from = "String")]
pub struct Coord {
    col: u8,
    row: u8,
}

impl Coord {
    /// Builds a coordinate from zero-based column and row, `None` when off the board.
    pub fn new(col: u8, row: u8) -> Option<Coord> {
        (col < 8 && row < 8).then_some(Coord { col, row })
    }

    /// Const constructor for squares known to be on the board.
    pub(crate) const fn at(col: u8, row: u8) -> Coord {
        debug_assert!(col < 8 && row < 8);
        Coord { col, row }
    }

    /// Builds a coordinate from one-based file and rank (both 1..=8).
    pub fn from_file_rank(file: u8, rank: u8) -> Option<Coord> {
        if file == 0 || rank == 0 {
            return None;
        }
        Coord::new(file - 1, rank - 1)
    }

    pub fn from_algebraic(s: &str) -> Option<Coord> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].checked_sub(b'a')?;
        let row = bytes[1].checked_sub(b'1')?;
        Coord::new(col, row)
    }

    pub fn col(self) -> u8 {
        self.col
    }

    pub fn row(self) -> u8 {
        self.row
    }

    /// One-based file, 1 = a.
    pub fn file(self) -> u8 {
        self.col + 1
    }

    /// One-based rank, 1 = rank 1.
    pub fn rank(self) -> u8 {
        self.row + 1
    }

    /// Square index 0..64, a1 = 0, h8 = 63.
    pub fn index(self) -> usize {
        self.row as usize * 8 + self.col as usize
    }

    pub fn file_char(self) -> char {
        (b'a' + self.col) as char
    }

    pub fn rank_char(self) -> char {
        (b'1' + self.row) as char
    }

    /// The square `dr` rows and `dc` columns away, if it is on the board.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Coord> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if (0..8).contains(&row) && (0..8).contains(&col) {
            Some(Coord::at(col as u8, row as u8))
        } else {
            None
        }
    }

    /// Signed (row, column) distance from `self` to `other`.
    pub fn delta_to(self, other: Coord) -> (i8, i8) {
        (
            other.row as i8 - self.row as i8,
            other.col as i8 - self.col as i8,
        )
    }

    /// Whether the square is light-coloured (h1 is light).
    pub fn is_light(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// All 64 squares, rank 1 first, a-file to h-file within a rank.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..8u8).flat_map(|row| (0..8u8).map(move |col| Coord::at(col, row)))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file_char(), self.rank_char())
    }
}

impl FromStr for Coord {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Coord::from_algebraic(s).ok_or_else(|| ChessError::format("square", format!("'{s}'")))
    }
}

impl From<Coord> for String {
    fn from(c: Coord) -> String {
        c.to_string()
    }
}

impl TryFrom<String> for Coord {
    type Error = ChessError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}
