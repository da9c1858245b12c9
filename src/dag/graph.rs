//! Generic DAG container used for the actions under each control point.
//!
//! Nodes are stored in a petgraph [`DiGraph`] in registration order, and the
//! topological sort breaks ties by that order, so repeated sorts of the same
//! graph return the same sequence. Cycles are a programming error in the
//! embedding application and surface as [`TillerError::Cycle`] naming the
//! participating nodes, never as a truncated order.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use tracing::{debug, trace};

use crate::core::errors::{Result, TillerError};

/// Minimal view the DAG needs of its nodes: a display label for
/// diagnostics and graph export.
pub trait GraphNode {
    fn label(&self) -> &str;
}

/// A labeled DAG whose node set grows by `push_back` and whose edges point
/// from a dependency to its dependent.
pub struct Dag<N> {
    label: String,
    graph: DiGraph<N, ()>,
}

impl<N: GraphNode> Dag<N> {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            graph: DiGraph::new(),
        }
    }

    /// Label of the control point this DAG belongs to.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Append a node in registration order. The returned index is the
    /// node's permanent identity within this DAG.
    pub fn push_back(&mut self, node: N) -> NodeIndex {
        let index = self.graph.add_node(node);
        trace!(dag = %self.label, node = index.index(), "node appended");
        index
    }

    /// Record that `to` depends on `from`. Duplicate edges collapse.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex) {
        self.graph.update_edge(from, to, ());
    }

    pub fn node(&self, index: NodeIndex) -> &N {
        &self.graph[index]
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut N {
        &mut self.graph[index]
    }

    /// Node indices in registration order.
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Direct dependencies of a node, in registration order.
    pub fn predecessors(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut preds: Vec<_> = self
            .graph
            .neighbors_directed(index, Direction::Incoming)
            .collect();
        preds.sort();
        preds
    }

    /// Topologically sort the node set.
    ///
    /// Kahn's algorithm with a min-heap of ready nodes keyed by insertion
    /// index, so independent nodes come out in registration order and the
    /// result is stable across repeated calls. O(V + E).
    pub fn sort(&self) -> Result<Vec<NodeIndex>> {
        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|ix| {
                self.graph
                    .neighbors_directed(ix, Direction::Incoming)
                    .count()
            })
            .collect();

        let mut ready: BinaryHeap<Reverse<NodeIndex>> = self
            .graph
            .node_indices()
            .filter(|ix| in_degree[ix.index()] == 0)
            .map(Reverse)
            .collect();

        let mut sorted = Vec::with_capacity(self.graph.node_count());
        while let Some(Reverse(ix)) = ready.pop() {
            sorted.push(ix);
            for succ in self.graph.neighbors_directed(ix, Direction::Outgoing) {
                let d = &mut in_degree[succ.index()];
                *d -= 1;
                if *d == 0 {
                    ready.push(Reverse(succ));
                }
            }
        }

        if sorted.len() != self.graph.node_count() {
            let participants: Vec<String> = self
                .graph
                .node_indices()
                .filter(|ix| in_degree[ix.index()] > 0)
                .map(|ix| self.graph[ix].label().to_string())
                .collect();
            return Err(TillerError::cycle(self.label.clone(), participants));
        }

        debug!(dag = %self.label, nodes = sorted.len(), "topological sort complete");
        Ok(sorted)
    }
}
