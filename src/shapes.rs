//! Shape catalog: the seven tetrominoes and their rotation bitmaps.

/// Largest bitmap side (the I piece).
pub const MAX_SIZE: usize = 4;

/// One orientation of a shape: an N×N occupancy bitmap (N in 2..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    size: u8,
    cells: [[bool; MAX_SIZE]; MAX_SIZE],
}

impl Rotation {
    const fn from_rows<const N: usize>(rows: [[u8; N]; N]) -> Self {
        let mut cells = [[false; MAX_SIZE]; MAX_SIZE];
        let mut r = 0;
        while r < N {
            let mut c = 0;
            while c < N {
                cells[r][c] = rows[r][c] != 0;
                c += 1;
            }
            r += 1;
        }
        Self {
            size: N as u8,
            cells,
        }
    }

    /// Side length of the bitmap.
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// Occupied cells as (col, row) offsets from the bitmap's top-left corner, row-major.
    pub fn occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let n = self.size();
        (0..n).flat_map(move |r| {
            (0..n)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (c as i32, r as i32))
        })
    }
}

const Z: [Rotation; 2] = [
    Rotation::from_rows([[1, 1, 0], [0, 1, 1], [0, 0, 0]]),
    Rotation::from_rows([[0, 0, 1], [0, 1, 1], [0, 1, 0]]),
];

const S: [Rotation; 2] = [
    Rotation::from_rows([[0, 1, 1], [1, 1, 0], [0, 0, 0]]),
    Rotation::from_rows([[1, 0, 0], [1, 1, 0], [0, 1, 0]]),
];

const T: [Rotation; 4] = [
    Rotation::from_rows([[0, 1, 0], [1, 1, 1], [0, 0, 0]]),
    Rotation::from_rows([[0, 1, 0], [0, 1, 1], [0, 1, 0]]),
    Rotation::from_rows([[0, 0, 0], [1, 1, 1], [0, 1, 0]]),
    Rotation::from_rows([[0, 1, 0], [1, 1, 0], [0, 1, 0]]),
];

const O: [Rotation; 1] = [Rotation::from_rows([[1, 1], [1, 1]])];

const L: [Rotation; 4] = [
    Rotation::from_rows([[0, 0, 1], [1, 1, 1], [0, 0, 0]]),
    Rotation::from_rows([[0, 1, 0], [0, 1, 0], [0, 1, 1]]),
    Rotation::from_rows([[0, 0, 0], [1, 1, 1], [1, 0, 0]]),
    Rotation::from_rows([[1, 1, 0], [0, 1, 0], [0, 1, 0]]),
];

const I: [Rotation; 2] = [
    Rotation::from_rows([[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]]),
    Rotation::from_rows([[0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0]]),
];

const J: [Rotation; 4] = [
    Rotation::from_rows([[1, 0, 0], [1, 1, 1], [0, 0, 0]]),
    Rotation::from_rows([[0, 1, 1], [0, 1, 0], [0, 1, 0]]),
    Rotation::from_rows([[0, 0, 0], [1, 1, 1], [0, 0, 1]]),
    Rotation::from_rows([[0, 1, 0], [0, 1, 0], [1, 1, 0]]),
];

/// Tetromino kinds, in colour-id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Z,
    S,
    T,
    O,
    L,
    I,
    J,
}

impl ShapeKind {
    pub const ALL: [Self; 7] = [Self::Z, Self::S, Self::T, Self::O, Self::L, Self::I, Self::J];

    /// Ordered rotation states; rotating clockwise walks this list and wraps.
    pub fn rotations(self) -> &'static [Rotation] {
        match self {
            Self::Z => &Z,
            Self::S => &S,
            Self::T => &T,
            Self::O => &O,
            Self::L => &L,
            Self::I => &I,
            Self::J => &J,
        }
    }

    pub fn rotation(self, index: usize) -> &'static Rotation {
        let rotations = self.rotations();
        &rotations[index % rotations.len()]
    }

    /// Colour id written into the board on lock (index into the theme's piece palette).
    pub fn color_id(self) -> u8 {
        match self {
            Self::Z => 0, // red
            Self::S => 1, // green
            Self::T => 2, // yellow
            Self::O => 3, // blue
            Self::L => 4, // purple
            Self::I => 5, // cyan
            Self::J => 6, // orange
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % Self::ALL.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rotation_has_four_cells() {
        for kind in ShapeKind::ALL {
            for (i, rot) in kind.rotations().iter().enumerate() {
                assert_eq!(rot.occupied().count(), 4, "{:?} rotation {}", kind, i);
            }
        }
    }

    #[test]
    fn rotation_counts() {
        let counts: Vec<usize> = ShapeKind::ALL
            .iter()
            .map(|k| k.rotations().len())
            .collect();
        assert_eq!(counts, vec![2, 2, 4, 1, 4, 2, 4]);
    }

    #[test]
    fn bitmap_sizes() {
        assert_eq!(ShapeKind::O.rotation(0).size(), 2);
        assert_eq!(ShapeKind::I.rotation(0).size(), 4);
        assert_eq!(ShapeKind::T.rotation(0).size(), 3);
    }

    #[test]
    fn rotation_index_wraps() {
        assert_eq!(ShapeKind::Z.rotation(2), ShapeKind::Z.rotation(0));
        assert_eq!(ShapeKind::O.rotation(3), ShapeKind::O.rotation(0));
    }

    #[test]
    fn occupied_is_row_major() {
        let cells: Vec<_> = ShapeKind::S.rotation(0).occupied().collect();
        assert_eq!(cells, vec![(1, 0), (2, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn colour_ids_are_distinct() {
        let mut ids: Vec<u8> = ShapeKind::ALL.iter().map(|k| k.color_id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 7);
    }
}
