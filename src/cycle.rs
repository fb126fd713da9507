/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Cycle selection in the fractional graph.
//!
//! Iterative depth-first search that ignores edge direction. The first back
//! edge closes a cycle; the cells along it are returned in traversal order,
//! so consecutive cells share a row or a column, alternately.
//!
//! # Existence
//!
//! Integral margins mean every row or column touching a fractional cell
//! touches at least two, so every node of the graph has degree ≥ 2 and a
//! cycle exists whenever the graph is non-empty. `None` from [`find_cycle`]
//! on a non-empty graph means that invariant is broken upstream.

use hashbrown::HashMap;

use crate::graph::{EdgeId, FractionalGraph, NodeId};
use crate::table::Cell;

/// Closed alternating walk through fractional cells.
///
/// Cell `k` shares a row or column with cell `k + 1` (and the last with the
/// first). Even-indexed cells move one way, odd-indexed cells the other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cycle {
    cells: Vec<Cell>,
}

impl Cycle {
    /// Wrap an already-alternating cell list. Length must be even and ≥ 2.
    pub fn new(cells: Vec<Cell>) -> Option<Self> {
        (cells.len() >= 2 && cells.len() % 2 == 0).then_some(Self { cells })
    }

    /// Cells in traversal order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; a cycle has at least two cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// `(cell, is_even)` pairs; `is_even` picks the cell's role.
    pub fn roles(&self) -> impl Iterator<Item = (Cell, bool)> + '_ {
        self.cells.iter().enumerate().map(|(k, &c)| (c, k % 2 == 0))
    }
}

/// One DFS stack frame.
struct Frame {
    node: NodeId,
    /// Edge used to enter `node`; `None` at the root.
    via: Option<EdgeId>,
    /// Next neighbour to try.
    cursor: usize,
}

/// Find any cycle, treating edges as undirected.
///
/// Roots are tried in the graph's node order and neighbours in insertion
/// order, so the result is a deterministic function of the edge order.
pub fn find_cycle(graph: &FractionalGraph) -> Option<Cycle> {
    // node → depth on the current path; `usize::MAX` once finished.
    let mut depth: HashMap<NodeId, usize> = HashMap::with_capacity(graph.nodes().len());
    let mut path: Vec<Frame> = Vec::new();

    for &root in graph.nodes() {
        if depth.contains_key(&root) {
            continue;
        }
        depth.insert(root, 0);
        path.push(Frame { node: root, via: None, cursor: 0 });

        while let Some(frame) = path.last_mut() {
            let Some(&(next, edge)) = graph.neighbours(frame.node).get(frame.cursor) else {
                depth.insert(frame.node, usize::MAX);
                path.pop();
                continue;
            };
            frame.cursor += 1;
            if frame.via == Some(edge) {
                continue;
            }
            match depth.get(&next) {
                Some(&d) if d != usize::MAX => {
                    // Back edge: path[d..] plus `edge` closes the loop.
                    let mut edges: Vec<EdgeId> = path[d + 1..].iter().filter_map(|f| f.via).collect();
                    edges.push(edge);
                    return Cycle::new(edges.into_iter().map(|e| graph.cell(e)).collect());
                }
                Some(_) => {}
                None => {
                    depth.insert(next, path.len());
                    path.push(Frame { node: next, via: Some(edge), cursor: 0 });
                }
            }
        }
    }
    None
}
