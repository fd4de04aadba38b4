//! Falling piece: collision, movement, rotation with a single wall kick, and locking.

use crate::board::Board;
use crate::shapes::{Rotation, ShapeKind};

/// Spawn row: pieces start partly above the visible board.
pub const SPAWN_Y: i32 = -2;

/// Result of committing a piece into the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockOutcome {
    /// Full rows removed by this lock.
    pub cleared_rows: u32,
    /// At least one block locked above row 0.
    pub topped_out: bool,
}

/// Active piece with position and rotation index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub kind: ShapeKind,
    pub color: u8,
    pub rotation: usize,
    pub x: i32,
    pub y: i32,
}

impl Piece {
    /// New piece at the spawn origin for a board `board_width` cells wide.
    pub fn spawn(kind: ShapeKind, board_width: usize) -> Self {
        Self {
            kind,
            color: kind.color_id(),
            rotation: 0,
            x: board_width as i32 / 2 - 2,
            y: SPAWN_Y,
        }
    }

    pub fn shape(&self) -> &'static Rotation {
        self.kind.rotation(self.rotation)
    }

    fn next_rotation(&self) -> usize {
        (self.rotation + 1) % self.kind.rotations().len()
    }

    /// Absolute board coordinates of every block of the current rotation.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.shape()
            .occupied()
            .map(move |(c, r)| (self.x + c, self.y + r))
    }

    /// True if `rotation` placed at the current origin offset by (dx, dy) would hit a
    /// wall, the floor, or a locked block. Blocks above the board never collide.
    pub fn collides_at(&self, board: &Board, dx: i32, dy: i32, rotation: &Rotation) -> bool {
        rotation
            .occupied()
            .any(|(c, r)| board.is_occupied(self.x + c + dx, self.y + r + dy))
    }

    /// One step down. Returns false when blocked; the piece is then due to lock.
    pub fn move_down(&mut self, board: &Board) -> bool {
        if self.collides_at(board, 0, 1, self.shape()) {
            return false;
        }
        self.y += 1;
        true
    }

    pub fn move_left(&mut self, board: &Board) -> bool {
        self.shift(board, -1)
    }

    pub fn move_right(&mut self, board: &Board) -> bool {
        self.shift(board, 1)
    }

    fn shift(&mut self, board: &Board, dx: i32) -> bool {
        if self.collides_at(board, dx, 0, self.shape()) {
            return false;
        }
        self.x += dx;
        true
    }

    /// Clockwise rotation. If the next state collides in place, one horizontal kick is
    /// tried: towards the centre (-1 on the right half, +1 otherwise). If that also
    /// collides nothing changes.
    pub fn rotate(&mut self, board: &Board) -> bool {
        let next_index = self.next_rotation();
        let next = self.kind.rotation(next_index);
        let mut kick = 0;
        if self.collides_at(board, 0, 0, next) {
            kick = if self.x > board.width() as i32 / 2 { -1 } else { 1 };
        }
        if self.collides_at(board, kick, 0, next) {
            return false;
        }
        self.x += kick;
        self.rotation = next_index;
        true
    }

    /// Writes the piece into the board and clears any rows it completes.
    /// Blocks above row 0 are never written; their presence tops the game out.
    pub fn lock(&self, board: &mut Board) -> LockOutcome {
        let mut topped_out = false;
        for (x, y) in self.cells() {
            if y < 0 {
                topped_out = true;
                continue;
            }
            board.set_cell(x, y, self.color);
        }
        LockOutcome {
            cleared_rows: board.clear_full_rows(),
            topped_out,
        }
    }
}
