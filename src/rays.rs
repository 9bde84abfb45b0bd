// Board geometry shared by move generation and attack detection.
//
// Directions are (row delta, column delta) pairs; row 0 = rank 1, col 0 = file a.

use crate::coord::Coord;

pub type Direction = (i8, i8);

pub const ORTHOGONAL: [Direction; 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

pub const DIAGONAL: [Direction; 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

#[rustfmt::skip]
pub const ALL_DIRECTIONS: [Direction; 8] = [
    (0, 1), (0, -1), (1, 0), (-1, 0),
    (1, 1), (1, -1), (-1, 1), (-1, -1),
];

#[rustfmt::skip]
pub const KNIGHT_JUMPS: [Direction; 8] = [
    (-2, -1), (-2, 1), (-1, -2), (-1, 2),
    (1, -2), (1, 2), (2, -1), (2, 1),
];

/// Walks from (but not including) `origin` in one direction until the board edge.
#[derive(Clone, Debug)]
pub struct Ray {
    current: Coord,
    dir: Direction,
}

impl Ray {
    pub fn new(origin: Coord, dir: Direction) -> Self {
        Ray {
            current: origin,
            dir,
        }
    }
}

impl Iterator for Ray {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        let next = self.current.offset(self.dir.0, self.dir.1)?;
        self.current = next;
        Some(next)
    }
}

/// Squares one jump away from `origin` for each offset, bounded by the board edges.
pub fn jumps(origin: Coord, offsets: &[Direction]) -> impl Iterator<Item = Coord> + '_ {
    offsets
        .iter()
        .filter_map(move |&(dr, dc)| origin.offset(dr, dc))
}

/// Unit step from `from` towards `to` when the two share a rank, file or diagonal.
pub fn line_direction(from: Coord, to: Coord) -> Option<Direction> {
    let (dr, dc) = from.delta_to(to);
    if (dr, dc) == (0, 0) {
        return None;
    }
    if dr == 0 || dc == 0 || dr.abs() == dc.abs() {
        Some((dr.signum(), dc.signum()))
    } else {
        None
    }
}

/// Squares strictly between `from` and `to`; empty when they are not aligned.
pub fn between(from: Coord, to: Coord) -> Vec<Coord> {
    match line_direction(from, to) {
        Some(dir) => Ray::new(from, dir).take_while(|&c| c != to).collect(),
        None => Vec::new(),
    }
}

pub fn is_orthogonal(dr: i8, dc: i8) -> bool {
    (dr == 0) != (dc == 0)
}

pub fn is_diagonal(dr: i8, dc: i8) -> bool {
    dr != 0 && dr.abs() == dc.abs()
}

pub fn is_knight_jump(dr: i8, dc: i8) -> bool {
    matches!((dr.abs(), dc.abs()), (1, 2) | (2, 1))
}

pub fn is_adjacent(dr: i8, dc: i8) -> bool {
    (dr, dc) != (0, 0) && dr.abs() <= 1 && dc.abs() <= 1
}
