//! Directed-acyclic-graph primitive with a deterministic topological sort.

pub mod graph;

pub use graph::{Dag, GraphNode};
