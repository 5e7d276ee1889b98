//! Airborne contamination field.
//!
//! Each cell holds an unsigned 8-bit level. Infected agents OR a fixed
//! concentration into their cell; ventilation right-shifts every cell once
//! per tick, so an untouched level `L0` reads `L0 >> 2n` after `n` passes.

use serde::{Deserialize, Serialize};

use crate::constants::droplets::VENTILATION_SHIFT;
use crate::grid::Cell;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Miasma {
    width: usize,
    height: usize,
    levels: Vec<u8>,
}

impl Miasma {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            levels: vec![0; width * height],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    /// Level at a cell; `0` outside the grid.
    pub fn level(&self, cell: Cell) -> u8 {
        self.index_of(cell).map(|i| self.levels[i]).unwrap_or(0)
    }

    /// OR `concentration` into a cell. Idempotent for a repeated value and
    /// saturating at `0xFF` by construction. No-op outside the grid.
    pub fn contaminate(&mut self, cell: Cell, concentration: u8) {
        if let Some(i) = self.index_of(cell) {
            self.levels[i] |= concentration;
        }
    }

    /// Decay every cell by one ventilation pass.
    pub fn ventilate(&mut self) {
        for level in &mut self.levels {
            *level >>= VENTILATION_SHIFT;
        }
    }

    /// Row-major levels, for overlay rendering.
    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    pub fn contaminated_cells(&self) -> usize {
        self.levels.iter().filter(|l| **l > 0).count()
    }

    pub fn peak(&self) -> u8 {
        self.levels.iter().copied().max().unwrap_or(0)
    }

    pub fn is_clear(&self) -> bool {
        self.levels.iter().all(|l| *l == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::droplets::{CLEAR_AFTER_VENTILATIONS, CONCENTRATION};

    #[test]
    fn test_contaminate_is_idempotent() {
        let mut field = Miasma::new(4, 4);
        let cell = Cell::new(1, 2);
        field.contaminate(cell, CONCENTRATION);
        let once = field.level(cell);
        field.contaminate(cell, CONCENTRATION);
        assert_eq!(field.level(cell), once);
        assert_eq!(once, 0x7F);
    }

    #[test]
    fn test_contaminate_accumulates_by_or() {
        let mut field = Miasma::new(2, 2);
        let cell = Cell::new(0, 0);
        field.contaminate(cell, 0x0F);
        field.contaminate(cell, 0xF0);
        assert_eq!(field.level(cell), 0xFF);
        field.contaminate(cell, 0x7F);
        assert_eq!(field.level(cell), 0xFF);
    }

    #[test]
    fn test_ventilate_matches_floor_division() {
        for start in 0..=u8::MAX {
            let mut field = Miasma::new(1, 1);
            field.contaminate(Cell::new(0, 0), start);
            for n in 1..=CLEAR_AFTER_VENTILATIONS {
                field.ventilate();
                let expected = (u32::from(start) / 4u32.pow(n)) as u8;
                assert_eq!(field.level(Cell::new(0, 0)), expected, "L0={start} n={n}");
            }
            assert!(field.is_clear());
        }
    }

    #[test]
    fn test_out_of_bounds_is_inert() {
        let mut field = Miasma::new(2, 2);
        field.contaminate(Cell::new(-1, 0), CONCENTRATION);
        field.contaminate(Cell::new(2, 0), CONCENTRATION);
        assert!(field.is_clear());
        assert_eq!(field.level(Cell::new(5, 5)), 0);
    }

    #[test]
    fn test_stats() {
        let mut field = Miasma::new(3, 3);
        field.contaminate(Cell::new(0, 0), 0x10);
        field.contaminate(Cell::new(2, 2), 0x7F);
        assert_eq!(field.contaminated_cells(), 2);
        assert_eq!(field.peak(), 0x7F);
    }
}
