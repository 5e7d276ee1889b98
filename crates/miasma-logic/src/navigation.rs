//! Weighted 4-connected navigation graph over the terrain grid.
//!
//! `NavGraph` holds a pre-built adjacency list. Every pair of orthogonally
//! adjacent cells is joined by an undirected edge of cost 1, except edges
//! touching a wall cell, which cost `width * height`. Walls are expensive,
//! not absent: any route through them is strictly dominated by a wall-free
//! route, but remains findable.

use crate::grid::{Cell, Mask};

#[derive(Debug, Clone)]
pub struct NavGraph {
    width: usize,
    height: usize,
    wall_cost: u64,
    /// node index (row-major) -> list of (neighbour index, edge cost)
    adj: Vec<Vec<(usize, u64)>>,
}

impl NavGraph {
    /// Build the grid graph for a wall mask.
    pub fn from_walls(walls: &Mask) -> Self {
        let (width, height) = walls.shape();
        let wall_cost = (width * height) as u64;
        let mut adj: Vec<Vec<(usize, u64)>> = vec![Vec::with_capacity(4); width * height];

        for y in 0..height {
            for x in 0..width {
                let a = y * width + x;
                let here = Cell::new(x as i32, y as i32);
                let a_wall = walls.get(here);

                let mut link = |b: usize, b_wall: bool| {
                    let cost = if a_wall || b_wall { wall_cost } else { 1 };
                    adj[a].push((b, cost));
                    adj[b].push((a, cost));
                };
                if x + 1 < width {
                    link(a + 1, walls.get(here.offset(1, 0)));
                }
                if y + 1 < height {
                    link(a + width, walls.get(here.offset(0, 1)));
                }
            }
        }

        Self {
            width,
            height,
            wall_cost,
            adj,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Cost carried by any edge incident to a wall cell.
    pub fn wall_cost(&self) -> u64 {
        self.wall_cost
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    /// Undirected edge count.
    pub fn edge_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.index_of(cell).is_some()
    }

    pub(crate) fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    pub(crate) fn cell_of(&self, index: usize) -> Cell {
        Cell::new((index % self.width) as i32, (index / self.width) as i32)
    }

    pub(crate) fn edges_from(&self, index: usize) -> &[(usize, u64)] {
        &self.adj[index]
    }

    /// Neighbours of a cell with the cost of the joining edge.
    pub fn neighbors(&self, cell: Cell) -> Vec<(Cell, u64)> {
        self.index_of(cell)
            .map(|i| {
                self.adj[i]
                    .iter()
                    .map(|&(j, cost)| (self.cell_of(j), cost))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn edge_cost(&self, a: Cell, b: Cell) -> Option<u64> {
        let (ia, ib) = (self.index_of(a)?, self.index_of(b)?);
        self.adj[ia]
            .iter()
            .find(|(j, _)| *j == ib)
            .map(|(_, cost)| *cost)
    }

    /// Total cost of walking `path` from `start`, or `None` if any hop is
    /// not an edge of the graph.
    pub fn path_cost(&self, start: Cell, path: &[Cell]) -> Option<u64> {
        let mut total = 0u64;
        let mut at = start;
        for &next in path {
            total += self.edge_cost(at, next)?;
            at = next;
        }
        Some(total)
    }

    /// Remove every edge incident to `cell`, isolating it. Returns the
    /// number of undirected edges removed.
    pub fn prune(&mut self, cell: Cell) -> usize {
        let Some(i) = self.index_of(cell) else {
            return 0;
        };
        let removed = std::mem::take(&mut self.adj[i]);
        for &(j, _) in &removed {
            self.adj[j].retain(|(k, _)| *k != i);
        }
        removed.len()
    }
}
