// =============================================================================
// Perft: counts leaf positions of the legal move tree to a fixed depth.
// Used to check the move generator against known node counts.
// =============================================================================

use crate::board::Board;
use crate::legality;
use crate::moves::Move;

/// Number of positions reachable in exactly `depth` plies.
///
/// Counts in bulk at depth 1: the moves are counted, not made.
pub fn perft(board: &Board, depth: usize) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = legality::legal_moves(board, board.side_to_move());
    if depth == 1 {
        return moves.len() as u64;
    }

    moves.iter().fold(0, |nodes, mv| {
        nodes + child(board, mv).map_or(0, |next| perft(&next, depth - 1))
    })
}

/// Per-root-move node counts, in move order. Their sum is `perft(board, depth)`.
pub fn divide(board: &Board, depth: usize) -> Vec<(Move, u64)> {
    if depth == 0 {
        return Vec::new();
    }
    legality::legal_moves(board, board.side_to_move())
        .into_iter()
        .map(|mv| {
            let nodes = child(board, &mv).map_or(0, |next| perft(&next, depth - 1));
            (mv, nodes)
        })
        .collect()
}

fn child(board: &Board, mv: &Move) -> Option<Board> {
    let mut next = *board;
    next.apply_move(mv).ok().map(|_| next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_counts_from_the_start() {
        let board = Board::new();
        assert_eq!(perft(&board, 0), 1);
        assert_eq!(perft(&board, 1), 20);
        assert_eq!(perft(&board, 2), 400);
    }

    #[test]
    fn divide_sums_to_perft() {
        let board = Board::new();
        let split = divide(&board, 2);
        assert_eq!(split.len(), 20);
        assert!(split.iter().all(|(_, n)| *n == 20));
        assert_eq!(split.iter().map(|(_, n)| n).sum::<u64>(), perft(&board, 2));
    }
}
