//! Playfield grid: cell storage, collision queries, full-row clearing.

use std::collections::VecDeque;

/// Default playfield width in cells.
pub const DEFAULT_COLS: u16 = 10;
/// Default playfield height in cells.
pub const DEFAULT_ROWS: u16 = 20;

/// Single cell: empty, or a locked block of a given colour id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Occupied(u8),
}

impl Cell {
    pub fn is_occupied(self) -> bool {
        matches!(self, Self::Occupied(_))
    }
}

/// Grid of cells. y=0 is the top row; rows are stored [0..height].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<Cell>>,
}

impl Board {
    pub fn new(width: u16, height: u16) -> Self {
        let (w, h) = (width as usize, height as usize);
        Self {
            width: w,
            height: h,
            rows: (0..h).map(|_| vec![Cell::Empty; w]).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    /// Collision query. Side walls and the floor count as occupied; anything above
    /// row 0 is free so pieces can move through the spawn buffer.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return true;
        }
        if y < 0 {
            return false;
        }
        self.get(x, y).is_some_and(Cell::is_occupied)
    }

    /// Writes a locked block. Out-of-grid coordinates are ignored.
    pub fn set_cell(&mut self, x: i32, y: i32, color: u8) {
        if x < 0 || y < 0 {
            return;
        }
        if let Some(cell) = self
            .rows
            .get_mut(y as usize)
            .and_then(|row| row.get_mut(x as usize))
        {
            *cell = Cell::Occupied(color);
        }
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|c| c.is_occupied()))
    }

    /// Removes every full row, one at a time from the top down: each removal drops the
    /// rows above it by one and inserts a fresh empty row at the top.
    /// Returns how many rows were removed.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        for y in 0..self.height {
            if self.is_row_full(y) {
                self.rows.remove(y);
                self.rows.push_front(vec![Cell::Empty; self.width]);
                cleared += 1;
            }
        }
        cleared
    }

    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.fill(Cell::Empty);
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }
}
