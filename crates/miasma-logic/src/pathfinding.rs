//! A* search over the navigation graph.
//!
//! The heuristic is pluggable. [`Euclidean`] is the default; [`Zero`]
//! turns the search into plain Dijkstra. On a 4-connected grid whose edges
//! all cost at least 1 the straight-line distance never exceeds the true
//! remaining cost, so both return minimum-cost routes; they may differ in
//! which of several equal-cost routes they pick.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::Cell;
use crate::navigation::NavGraph;

/// Estimate of the remaining cost from `from` to `to`.
pub trait Heuristic {
    fn estimate(&self, from: Cell, to: Cell) -> f64;
}

/// Straight-line distance to the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Heuristic for Euclidean {
    fn estimate(&self, from: Cell, to: Cell) -> f64 {
        from.distance(to)
    }
}

/// No estimate; uniform-cost search.
#[derive(Debug, Clone, Copy, Default)]
pub struct Zero;

impl Heuristic for Zero {
    fn estimate(&self, _from: Cell, _to: Cell) -> f64 {
        0.0
    }
}

/// Configurable heuristic selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    #[default]
    Euclidean,
    Zero,
}

impl Heuristic for HeuristicKind {
    fn estimate(&self, from: Cell, to: Cell) -> f64 {
        match self {
            HeuristicKind::Euclidean => Euclidean.estimate(from, to),
            HeuristicKind::Zero => Zero.estimate(from, to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("no route from {from} to {to}")]
    NoRoute { from: Cell, to: Cell },
    #[error("cell {cell} is not on the navigation graph")]
    OutOfBounds { cell: Cell },
}

/// Shortest-weighted-path search with a fixed heuristic.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathPlanner<H = HeuristicKind> {
    heuristic: H,
}

impl<H: Heuristic> PathPlanner<H> {
    pub fn new(heuristic: H) -> Self {
        Self { heuristic }
    }

    /// Find a route from `start` to `target`.
    ///
    /// Returns the cells to step through, excluding `start` and including
    /// `target`. Returns an empty route when `start == target`, and
    /// `PathError::NoRoute` when the graph has no connection between them.
    pub fn find_path(
        &self,
        graph: &NavGraph,
        start: Cell,
        target: Cell,
    ) -> Result<Vec<Cell>, PathError> {
        let from = graph
            .index_of(start)
            .ok_or(PathError::OutOfBounds { cell: start })?;
        let goal = graph
            .index_of(target)
            .ok_or(PathError::OutOfBounds { cell: target })?;
        if from == goal {
            return Ok(Vec::new());
        }

        let nodes = graph.node_count();
        let mut cost_so_far = vec![u64::MAX; nodes];
        let mut came_from = vec![usize::MAX; nodes];
        let mut closed = vec![false; nodes];
        // (priority, insertion counter, node); the counter keeps ties FIFO
        let mut frontier = BinaryHeap::new();
        let mut pushed = 0u64;

        cost_so_far[from] = 0;
        frontier.push(Reverse((OrderedFloat(0.0), pushed, from)));

        while let Some(Reverse((_, _, current))) = frontier.pop() {
            if current == goal {
                return Ok(Self::reconstruct(graph, &came_from, from, goal));
            }
            if closed[current] {
                continue;
            }
            closed[current] = true;

            let base = cost_so_far[current];
            for &(next, edge) in graph.edges_from(current) {
                if closed[next] {
                    continue;
                }
                let new_cost = base.saturating_add(edge);
                if new_cost < cost_so_far[next] {
                    cost_so_far[next] = new_cost;
                    came_from[next] = current;
                    let priority =
                        new_cost as f64 + self.heuristic.estimate(graph.cell_of(next), target);
                    pushed += 1;
                    frontier.push(Reverse((OrderedFloat(priority), pushed, next)));
                }
            }
        }

        Err(PathError::NoRoute {
            from: start,
            to: target,
        })
    }

    fn reconstruct(graph: &NavGraph, came_from: &[usize], from: usize, goal: usize) -> Vec<Cell> {
        let mut path = Vec::new();
        let mut node = goal;
        while node != from {
            path.push(graph.cell_of(node));
            node = came_from[node];
        }
        path.reverse();
        path
    }
}
