//! Terrain classes and the sources that produce terrain masks.
//!
//! A terrain source is any of:
//! - five explicit boolean masks of one shape ([`TerrainMasks::new`])
//! - decoded palette pixels, one class per colour ([`TerrainMasks::from_rgb`],
//!   [`TerrainMasks::from_rgba`])
//! - ASCII rows ([`TerrainMasks::from_ascii`])
//! - a [`TerrainBuilder`] painting zones and wall segments

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::palette::CHANNEL_ON;
use crate::grid::{Cell, Mask};

/// Terrain class of one cell in a palette or ASCII source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainClass {
    Open,
    Wall,
    Start,
    Target,
    Quarantine,
}

impl TerrainClass {
    pub const ALL: [TerrainClass; 5] = [
        TerrainClass::Open,
        TerrainClass::Wall,
        TerrainClass::Start,
        TerrainClass::Target,
        TerrainClass::Quarantine,
    ];

    /// Palette lookup: white open, black wall, blue start, green target,
    /// red quarantine.
    pub fn from_rgb(rgb: [u8; 3]) -> Option<Self> {
        let on = rgb.map(|c| c >= CHANNEL_ON);
        match on {
            [true, true, true] => Some(TerrainClass::Open),
            [false, false, false] => Some(TerrainClass::Wall),
            [false, false, true] => Some(TerrainClass::Start),
            [false, true, false] => Some(TerrainClass::Target),
            [true, false, false] => Some(TerrainClass::Quarantine),
            _ => None,
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            TerrainClass::Open => [255, 255, 255],
            TerrainClass::Wall => [0, 0, 0],
            TerrainClass::Start => [0, 0, 255],
            TerrainClass::Target => [0, 255, 0],
            TerrainClass::Quarantine => [255, 0, 0],
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(TerrainClass::Open),
            '#' => Some(TerrainClass::Wall),
            'S' => Some(TerrainClass::Start),
            'T' => Some(TerrainClass::Target),
            'Q' => Some(TerrainClass::Quarantine),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            TerrainClass::Open => '.',
            TerrainClass::Wall => '#',
            TerrainClass::Start => 'S',
            TerrainClass::Target => 'T',
            TerrainClass::Quarantine => 'Q',
        }
    }
}

impl std::fmt::Display for TerrainClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TerrainClass::Open => "open",
            TerrainClass::Wall => "wall",
            TerrainClass::Start => "start",
            TerrainClass::Target => "target",
            TerrainClass::Quarantine => "quarantine",
        };
        f.write_str(name)
    }
}

/// Errors raised while loading or validating a terrain source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TerrainError {
    #[error("terrain must have a non-zero width and height")]
    ZeroSized,
    #[error("{class} mask is {found:?} but the terrain is {expected:?}")]
    ShapeMismatch {
        class: TerrainClass,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("terrain has no enterable {class} cells")]
    EmptyZone { class: TerrainClass },
    #[error("pixel ({x}, {y}) has colour {rgb:?} outside the terrain palette")]
    UnknownColor { x: usize, y: usize, rgb: [u8; 3] },
    #[error("glyph {glyph:?} at ({x}, {y}) is not a terrain class")]
    UnknownGlyph { x: usize, y: usize, glyph: char },
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("cell ({x}, {y}) lies outside the terrain")]
    OutOfBounds { x: i32, y: i32 },
}

/// A straight wall run kept as line geometry for overlays.
/// End coordinates are exclusive, as painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallSegment {
    pub from: Cell,
    pub to: Cell,
}

/// The five terrain masks. All share one shape; masks may overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerrainMasks {
    pub open: Mask,
    pub walls: Mask,
    pub start: Mask,
    pub target: Mask,
    pub quarantine: Mask,
}

impl TerrainMasks {
    /// Validate that all five masks share the shape of `open`.
    pub fn new(
        open: Mask,
        walls: Mask,
        start: Mask,
        target: Mask,
        quarantine: Mask,
    ) -> Result<Self, TerrainError> {
        let masks = Self {
            open,
            walls,
            start,
            target,
            quarantine,
        };
        masks.check_shape()?;
        Ok(masks)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.open.shape()
    }

    pub fn mask(&self, class: TerrainClass) -> &Mask {
        match class {
            TerrainClass::Open => &self.open,
            TerrainClass::Wall => &self.walls,
            TerrainClass::Start => &self.start,
            TerrainClass::Target => &self.target,
            TerrainClass::Quarantine => &self.quarantine,
        }
    }

    fn check_shape(&self) -> Result<(), TerrainError> {
        let expected = self.open.shape();
        if expected.0 == 0 || expected.1 == 0 {
            return Err(TerrainError::ZeroSized);
        }
        for class in TerrainClass::ALL {
            let found = self.mask(class).shape();
            if found != expected {
                return Err(TerrainError::ShapeMismatch {
                    class,
                    expected,
                    found,
                });
            }
        }
        Ok(())
    }

    /// Build masks from one class per cell, row-major.
    pub fn from_classes(
        width: usize,
        height: usize,
        classes: &[TerrainClass],
    ) -> Result<Self, TerrainError> {
        if width == 0 || height == 0 {
            return Err(TerrainError::ZeroSized);
        }
        if classes.len() != width * height {
            return Err(TerrainError::ShapeMismatch {
                class: TerrainClass::Open,
                expected: (width, height),
                found: (classes.len() / height.max(1), height),
            });
        }
        let of = |class: TerrainClass| {
            Mask::from_fn(width, height, |c| {
                classes[c.y as usize * width + c.x as usize] == class
            })
        };
        Ok(Self {
            open: of(TerrainClass::Open),
            walls: of(TerrainClass::Wall),
            start: of(TerrainClass::Start),
            target: of(TerrainClass::Target),
            quarantine: of(TerrainClass::Quarantine),
        })
    }

    /// Classify decoded RGB pixels (row-major) against the terrain palette.
    pub fn from_rgb(width: usize, height: usize, pixels: &[[u8; 3]]) -> Result<Self, TerrainError> {
        if pixels.len() != width * height {
            return Err(TerrainError::ShapeMismatch {
                class: TerrainClass::Open,
                expected: (width, height),
                found: (pixels.len() / height.max(1), height),
            });
        }
        let classes = pixels
            .iter()
            .enumerate()
            .map(|(i, rgb)| {
                TerrainClass::from_rgb(*rgb).ok_or(TerrainError::UnknownColor {
                    x: i % width.max(1),
                    y: i / width.max(1),
                    rgb: *rgb,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_classes(width, height, &classes)
    }

    /// As [`TerrainMasks::from_rgb`]; the alpha channel is discarded.
    pub fn from_rgba(width: usize, height: usize, pixels: &[[u8; 4]]) -> Result<Self, TerrainError> {
        let rgb: Vec<[u8; 3]> = pixels.iter().map(|p| [p[0], p[1], p[2]]).collect();
        Self::from_rgb(width, height, &rgb)
    }

    /// Parse ASCII rows: `.` open, `#` wall, `S` start, `T` target,
    /// `Q` quarantine. Blank lines and surrounding whitespace are ignored.
    pub fn from_ascii(text: &str) -> Result<Self, TerrainError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(TerrainError::ZeroSized);
        }

        let mut classes = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(TerrainError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let class = TerrainClass::from_glyph(glyph)
                    .ok_or(TerrainError::UnknownGlyph { x, y, glyph })?;
                classes.push(class);
            }
        }
        Self::from_classes(width, height, &classes)
    }
}

/// Paints a terrain layout cell by cell. Everything starts open.
#[derive(Debug, Clone)]
pub struct TerrainBuilder {
    width: usize,
    height: usize,
    classes: Vec<TerrainClass>,
    segments: Vec<WallSegment>,
}

impl TerrainBuilder {
    pub fn new(width: usize, height: usize) -> Result<Self, TerrainError> {
        if width == 0 || height == 0 {
            return Err(TerrainError::ZeroSized);
        }
        Ok(Self {
            width,
            height,
            classes: vec![TerrainClass::Open; width * height],
            segments: Vec::new(),
        })
    }

    fn check(&self, x: i32, y: i32) -> Result<usize, TerrainError> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(TerrainError::OutOfBounds { x, y });
        }
        Ok(y as usize * self.width + x as usize)
    }

    pub fn paint(mut self, cell: Cell, class: TerrainClass) -> Result<Self, TerrainError> {
        let i = self.check(cell.x, cell.y)?;
        self.classes[i] = class;
        Ok(self)
    }

    /// Paint the half-open rectangle `[x0, x1) x [y0, y1)`.
    pub fn zone(
        mut self,
        class: TerrainClass,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    ) -> Result<Self, TerrainError> {
        for y in y0..y1 {
            for x in x0..x1 {
                let i = self.check(x, y)?;
                self.classes[i] = class;
            }
        }
        Ok(self)
    }

    /// Horizontal wall on row `y` covering `[x0, x1)`.
    pub fn h_wall(mut self, x0: i32, y: i32, x1: i32) -> Result<Self, TerrainError> {
        self = self.zone(TerrainClass::Wall, x0, y, x1, y + 1)?;
        self.segments.push(WallSegment {
            from: Cell::new(x0, y),
            to: Cell::new(x1, y),
        });
        Ok(self)
    }

    /// Vertical wall on column `x` covering `[y0, y1)`.
    pub fn v_wall(mut self, x: i32, y0: i32, y1: i32) -> Result<Self, TerrainError> {
        self = self.zone(TerrainClass::Wall, x, y0, x + 1, y1)?;
        self.segments.push(WallSegment {
            from: Cell::new(x, y0),
            to: Cell::new(x, y1),
        });
        Ok(self)
    }

    pub fn segments(&self) -> &[WallSegment] {
        &self.segments
    }

    /// Finish into masks plus the recorded wall geometry.
    pub fn build(self) -> Result<(TerrainMasks, Vec<WallSegment>), TerrainError> {
        let masks = TerrainMasks::from_classes(self.width, self.height, &self.classes)?;
        Ok((masks, self.segments))
    }
}
