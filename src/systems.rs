#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Allow truncation when casting from usize to i32 since board dimensions are always small enough to fit in i32
    clippy::cast_possible_truncation,
    // Allow potential wrapping when casting between types of same size as we validate values are in range
    clippy::cast_possible_wrap
)]

use log::trace;

use crate::components::{Board, Piece, Shape};

/// Result of one gravity step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    Advanced,
    /// The piece could not move down and was merged; full rows were swept.
    Locked { rows_cleared: usize },
}

/// Places `shape` at the top of the board, horizontally centered.
#[must_use]
pub fn spawn_piece(board: &Board, shape: Shape) -> Piece {
    let x = (board.width / 2) as i32 - (shape.width() / 2) as i32;
    trace!("Spawning {:?} at x={x}", shape.kind);
    Piece::new(shape, x, 0)
}

/// Shifts the piece one column; returns false and leaves it in place on collision.
pub fn move_piece(board: &Board, piece: &mut Piece, dir: i32) -> bool {
    piece.x += dir;
    if board.collides(piece) {
        piece.x -= dir;
        return false;
    }
    true
}

/// Rotates clockwise, then searches horizontal kicks +1, -1, +2, -2, ...
/// The search stops once the next step would exceed the rotated width, in
/// which case the piece is restored untouched.
pub fn rotate_piece(board: &Board, piece: &mut Piece) -> bool {
    let original_shape = piece.shape.clone();
    let original_x = piece.x;

    piece.shape = piece.shape.rotated_cw();
    let mut step: i32 = 1;
    while board.collides(piece) {
        piece.x += step;
        step = -(step + step.signum());
        if step > piece.shape.width() as i32 {
            piece.shape = original_shape;
            piece.x = original_x;
            return false;
        }
    }

    trace!("Rotated to x={} (kick {})", piece.x, piece.x - original_x);
    true
}

/// Moves the piece down one row, or locks it into the board and sweeps.
pub fn drop_piece(board: &mut Board, piece: &mut Piece) -> DropOutcome {
    piece.y += 1;
    if !board.collides(piece) {
        return DropOutcome::Advanced;
    }

    piece.y -= 1;
    board.merge(piece);
    let rows_cleared = board.sweep();
    DropOutcome::Locked { rows_cleared }
}
