//! Integer grid cells and boolean masks over a `width x height` grid.

use serde::{Deserialize, Serialize};

/// A cell on the terrain grid. Coordinates are signed so that neighbours of
/// edge cells can be expressed and rejected by bounds checks.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Straight-line distance between two cell centres.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        (dx * dx + dy * dy).sqrt()
    }

    /// 4-connected neighbours in +x, -x, +y, -y order (may be out of bounds).
    pub fn neighbors4(self) -> [Cell; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }
}

impl From<(i32, i32)> for Cell {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Cell> for (i32, i32) {
    fn from(cell: Cell) -> Self {
        (cell.x, cell.y)
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row-major boolean mask. Out-of-bounds reads are `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl Mask {
    /// An all-`false` mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, false)
    }

    pub fn filled(width: usize, height: usize, value: bool) -> Self {
        Self {
            width,
            height,
            bits: vec![value; width * height],
        }
    }

    pub fn from_fn(width: usize, height: usize, f: impl Fn(Cell) -> bool) -> Self {
        let mut mask = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                mask.bits[y * width + x] = f(Cell::new(x as i32, y as i32));
            }
        }
        mask
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Row-major index of an in-bounds cell.
    pub fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.index_of(cell).is_some()
    }

    pub fn get(&self, cell: Cell) -> bool {
        self.index_of(cell).map(|i| self.bits[i]).unwrap_or(false)
    }

    /// Set an in-bounds cell. Returns `false` if the cell was out of bounds.
    pub fn set(&mut self, cell: Cell, value: bool) -> bool {
        match self.index_of(cell) {
            Some(i) => {
                self.bits[i] = value;
                true
            }
            None => false,
        }
    }

    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|b| **b).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.bits.iter().any(|b| *b)
    }

    /// Set cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let width = self.width;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(i, _)| Cell::new((i % width) as i32, (i / width) as i32))
    }

    /// Element-wise AND. Both masks must share a shape.
    pub fn and(&self, other: &Mask) -> Mask {
        self.zip_with(other, |a, b| a && b)
    }

    /// Element-wise OR. Both masks must share a shape.
    pub fn or(&self, other: &Mask) -> Mask {
        self.zip_with(other, |a, b| a || b)
    }

    pub fn not(&self) -> Mask {
        Mask {
            width: self.width,
            height: self.height,
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    fn zip_with(&self, other: &Mask, f: impl Fn(bool, bool) -> bool) -> Mask {
        debug_assert_eq!(self.shape(), other.shape());
        Mask {
            width: self.width,
            height: self.height,
            bits: self
                .bits
                .iter()
                .zip(&other.bits)
                .map(|(a, b)| f(*a, *b))
                .collect(),
        }
    }
}
