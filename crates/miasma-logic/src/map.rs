//! The terrain map agents live on.
//!
//! Static part: the five terrain masks, the derived `valid` mask
//! (`NOT (walls OR quarantine)`), the sampling zones and the navigation
//! graph, all fixed at load. Dynamic part: the contamination field, mutated
//! every tick.

use serde::{Deserialize, Serialize};

use crate::constants::droplets::CONCENTRATION;
use crate::grid::{Cell, Mask};
use crate::miasma::Miasma;
use crate::navigation::NavGraph;
use crate::terrain::{TerrainClass, TerrainError, TerrainMasks, WallSegment};

/// Cell sets agents pick destinations from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Start cells that are enterable.
    Start,
    /// Target cells that are enterable.
    Target,
    /// Open cells that are enterable (all enterable cells if none are open).
    Open,
    /// Quarantine cells.
    Quarantine,
}

#[derive(Debug, Clone)]
pub struct TerrainMap {
    masks: TerrainMasks,
    valid: Mask,
    miasma: Miasma,
    graph: NavGraph,
    start_cells: Vec<Cell>,
    target_cells: Vec<Cell>,
    open_cells: Vec<Cell>,
    quarantine_cells: Vec<Cell>,
    wall_segments: Vec<WallSegment>,
}

impl TerrainMap {
    /// Load a map from validated masks and build its navigation graph.
    ///
    /// Fails if the start or target zone has no enterable cell.
    pub fn new(masks: TerrainMasks) -> Result<Self, TerrainError> {
        let (width, height) = masks.shape();
        let valid = masks.walls.or(&masks.quarantine).not();

        let start_cells: Vec<Cell> = masks.start.and(&valid).cells().collect();
        if start_cells.is_empty() {
            return Err(TerrainError::EmptyZone {
                class: TerrainClass::Start,
            });
        }
        let target_cells: Vec<Cell> = masks.target.and(&valid).cells().collect();
        if target_cells.is_empty() {
            return Err(TerrainError::EmptyZone {
                class: TerrainClass::Target,
            });
        }
        let mut open_cells: Vec<Cell> = masks.open.and(&valid).cells().collect();
        if open_cells.is_empty() {
            log::warn!("terrain has no open cells; wandering over every enterable cell");
            open_cells = valid.cells().collect();
        }
        let quarantine_cells: Vec<Cell> = masks.quarantine.cells().collect();
        if quarantine_cells.is_empty() {
            log::warn!("terrain has no quarantine zone; infected agents will not isolate");
        }

        let graph = NavGraph::from_walls(&masks.walls);
        log::info!(
            "terrain loaded: {}x{}, {} walls, {} start, {} target, {} quarantine, {} graph edges",
            width,
            height,
            masks.walls.count(),
            start_cells.len(),
            target_cells.len(),
            quarantine_cells.len(),
            graph.edge_count()
        );

        Ok(Self {
            masks,
            valid,
            miasma: Miasma::new(width, height),
            graph,
            start_cells,
            target_cells,
            open_cells,
            quarantine_cells,
            wall_segments: Vec::new(),
        })
    }

    /// Load a map from a [`crate::TerrainBuilder`] result, keeping its wall
    /// geometry.
    pub fn from_parts(
        (masks, wall_segments): (TerrainMasks, Vec<WallSegment>),
    ) -> Result<Self, TerrainError> {
        let mut map = Self::new(masks)?;
        map.wall_segments = wall_segments;
        Ok(map)
    }

    pub fn from_ascii(text: &str) -> Result<Self, TerrainError> {
        Self::new(TerrainMasks::from_ascii(text)?)
    }

    pub fn width(&self) -> usize {
        self.valid.width()
    }

    pub fn height(&self) -> usize {
        self.valid.height()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.valid.shape()
    }

    /// Whether an agent may stand on `(x, y)`. Fails closed outside the grid.
    pub fn can_enter(&self, x: i32, y: i32) -> bool {
        self.valid.get(Cell::new(x, y))
    }

    pub fn can_enter_cell(&self, cell: Cell) -> bool {
        self.valid.get(cell)
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.masks.walls.get(cell)
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.valid.in_bounds(cell)
    }

    pub fn virus_level(&self, x: i32, y: i32) -> u8 {
        self.miasma.level(Cell::new(x, y))
    }

    /// OR the standard droplet concentration into `(x, y)`.
    pub fn contaminate(&mut self, x: i32, y: i32) {
        self.contaminate_with(x, y, CONCENTRATION);
    }

    pub fn contaminate_with(&mut self, x: i32, y: i32, concentration: u8) {
        self.miasma.contaminate(Cell::new(x, y), concentration);
    }

    /// Decay the whole contamination field by one pass.
    pub fn ventilate(&mut self) {
        self.miasma.ventilate();
    }

    pub fn miasma(&self) -> &Miasma {
        &self.miasma
    }

    pub fn masks(&self) -> &TerrainMasks {
        &self.masks
    }

    pub fn valid(&self) -> &Mask {
        &self.valid
    }

    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    /// Remove a cell from the navigation graph. Routes that needed it
    /// report `PathError::NoRoute` afterwards.
    pub fn prune_cell(&mut self, cell: Cell) -> usize {
        self.graph.prune(cell)
    }

    pub fn zone(&self, zone: Zone) -> &[Cell] {
        match zone {
            Zone::Start => &self.start_cells,
            Zone::Target => &self.target_cells,
            Zone::Open => &self.open_cells,
            Zone::Quarantine => &self.quarantine_cells,
        }
    }

    pub fn wall_segments(&self) -> &[WallSegment] {
        &self.wall_segments
    }

    pub fn wall_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.masks.walls.cells()
    }
}
