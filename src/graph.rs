/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Bipartite graph of the still-fractional cells.
//!
//! Row `i` of the augmented table is node `i`; column `j` is node
//! `rows + j`, so row and column labels never collide. Each fractional cell
//! `(i, j)` contributes one edge `i → rows + j`.
//!
//! Edges are inserted in the order the caller supplies. The rounder shuffles
//! the cells first so that neither the search start nor the neighbour order
//! favours any particular cycle.
//!
//! # Invariants
//! - A cell is fractional iff `tol < frac(v) < 1 − tol` (strict both sides).
//! - Rebuilt from scratch every iteration; never mutated after construction.

use hashbrown::HashMap;

use crate::augment::AugmentedTable;
use crate::table::{frac, Cell};

/// Node label: rows first, then columns offset by the row count.
pub type NodeId = usize;

/// Edge index, in insertion order.
pub type EdgeId = usize;

/// `true` when `value` is not within `tol` of an integer.
#[inline]
pub fn is_fractional(value: f64, tol: f64) -> bool {
    let f = frac(value);
    f > tol && f < 1.0 - tol
}

/// All fractional cells of the augmented table, row-major.
pub fn fractional_cells(table: &AugmentedTable, tol: f64) -> Vec<Cell> {
    table
        .matrix()
        .cells()
        .filter(|&(_, v)| is_fractional(v, tol))
        .map(|(cell, _)| cell)
        .collect()
}

/// Directed bipartite graph, one row→column edge per fractional cell.
#[derive(Clone, Debug)]
pub struct FractionalGraph {
    /// Row-node count; column `j` is node `row_nodes + j`.
    row_nodes: usize,
    /// Cell behind each edge, in insertion order.
    edges: Vec<Cell>,
    /// Undirected incidence: node → `(neighbour, edge)` in insertion order.
    adjacency: HashMap<NodeId, Vec<(NodeId, EdgeId)>>,
    /// Nodes in order of first appearance.
    nodes: Vec<NodeId>,
}

impl FractionalGraph {
    /// Build from cells of a table with `row_nodes` rows.
    pub fn from_cells(row_nodes: usize, cells: &[Cell]) -> Self {
        let mut graph = Self {
            row_nodes,
            edges: Vec::with_capacity(cells.len()),
            adjacency: HashMap::with_capacity(cells.len()),
            nodes: Vec::new(),
        };
        for &cell in cells {
            graph.add_edge(cell);
        }
        graph
    }

    fn add_edge(&mut self, (i, j): Cell) {
        let edge = self.edges.len();
        let (r, c) = (self.row_node(i), self.col_node(j));
        self.edges.push((i, j));
        for (from, to) in [(r, c), (c, r)] {
            self.adjacency
                .entry(from)
                .or_insert_with(|| {
                    self.nodes.push(from);
                    Vec::new()
                })
                .push((to, edge));
        }
    }

    /// Node label of row `i`.
    #[inline]
    pub fn row_node(&self, i: usize) -> NodeId {
        i
    }

    /// Node label of column `j`.
    #[inline]
    pub fn col_node(&self, j: usize) -> NodeId {
        self.row_nodes + j
    }

    /// `true` if `node` labels a row.
    #[inline]
    pub fn is_row_node(&self, node: NodeId) -> bool {
        node < self.row_nodes
    }

    /// Nodes touched by at least one edge, in order of first appearance.
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Incident `(neighbour, edge)` pairs of `node`, ignoring direction.
    pub fn neighbours(&self, node: NodeId) -> &[(NodeId, EdgeId)] {
        self.adjacency.get(&node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of edges incident to `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbours(node).len()
    }

    /// Cell behind `edge`.
    #[inline]
    pub fn cell(&self, edge: EdgeId) -> Cell {
        self.edges[edge]
    }

    /// Number of edges (fractional cells).
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// `true` when there are no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
