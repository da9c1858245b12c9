//! Registry mapping each control point to its DAG of actions.

use std::collections::BTreeMap;

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::control::action::{ActionHandle, ActionNode, Dependency};
use crate::control::point::ControlPoint;
use crate::core::errors::{Result, TillerError};
use crate::dag::{Dag, GraphNode};

/// One control point's DAG plus its cached sort.
///
/// The cache is invalidated by registration and filled on first sort, so a
/// cycle that revisits the point does not pay for re-sorting an immutable
/// node set.
pub(crate) struct PointDag<S> {
    pub(crate) dag: Dag<ActionNode<S>>,
    sorted: Option<Vec<NodeIndex>>,
}

impl<S> PointDag<S> {
    fn new(label: &str) -> Self {
        Self {
            dag: Dag::new(label),
            sorted: None,
        }
    }

    /// Topological order of this point's actions, computed once per node
    /// set.
    pub(crate) fn sorted(&mut self) -> Result<&[NodeIndex]> {
        if self.sorted.is_none() {
            self.sorted = Some(self.dag.sort()?);
        }
        Ok(self.sorted.as_deref().unwrap_or_default())
    }

    fn invalidate(&mut self) {
        self.sorted = None;
    }
}

/// Mapping from control point to DAG. Lookup order is irrelevant for
/// execution (the declared flow is authoritative); the `BTreeMap` just
/// keeps iteration deterministic for export.
pub struct Registry<P, S> {
    dags: BTreeMap<P, PointDag<S>>,
}

impl<P: ControlPoint, S> Registry<P, S> {
    pub fn new() -> Self {
        Self {
            dags: BTreeMap::new(),
        }
    }

    /// Lazily create the DAG for a control point. Idempotent; this is what
    /// the init walk calls for every declared point so that empty points
    /// still exist.
    pub fn ensure(&mut self, point: P) {
        self.dags
            .entry(point)
            .or_insert_with(|| PointDag::new(point.label()));
    }

    pub fn contains(&self, point: P) -> bool {
        self.dags.contains_key(&point)
    }

    /// Number of actions registered under a point, if the point exists.
    pub fn action_count(&self, point: P) -> Option<usize> {
        self.dags.get(&point).map(|pd| pd.dag.len())
    }

    /// Register an action under a control point, creating the point's DAG
    /// on first use. Duplicate labels under one point are rejected.
    pub fn register(
        &mut self,
        point: P,
        node: ActionNode<S>,
    ) -> Result<ActionHandle<P>> {
        self.ensure(point);
        let pd = self
            .dags
            .get_mut(&point)
            .ok_or_else(|| TillerError::unknown_point(point.label()))?;

        let label = node.label().to_string();
        if pd.dag.indices().any(|ix| pd.dag.node(ix).label() == label) {
            return Err(TillerError::duplicate_action(label, point.label().into()));
        }

        let index = pd.dag.push_back(node);
        pd.invalidate();
        debug!(point = point.label(), action = %label, "action registered");
        Ok(ActionHandle::new(point, index))
    }

    /// Record that `action` depends on `on`.
    ///
    /// Both handles must belong to the same control point; a cross-point
    /// edge is rejected before anything is recorded, naming both actions
    /// and both points.
    pub fn add_dependency(
        &mut self,
        action: &ActionHandle<P>,
        on: &ActionHandle<P>,
    ) -> Result<Dependency> {
        if action.point() != on.point() {
            return Err(TillerError::cross_point(
                self.action_label(action)?,
                action.point().label().to_string(),
                self.action_label(on)?,
                on.point().label().to_string(),
            ));
        }

        let pd = self
            .dags
            .get_mut(&action.point())
            .ok_or_else(|| TillerError::unknown_point(action.point().label()))?;
        pd.dag.add_edge(on.index(), action.index());
        pd.invalidate();
        Ok(Dependency)
    }

    /// Display label of a registered action.
    pub fn action_label(&self, handle: &ActionHandle<P>) -> Result<String> {
        let pd = self
            .dags
            .get(&handle.point())
            .ok_or_else(|| TillerError::unknown_point(handle.point().label()))?;
        Ok(pd.dag.node(handle.index()).label().to_string())
    }

    pub(crate) fn point_mut(&mut self, point: P) -> Result<&mut PointDag<S>> {
        self.dags
            .get_mut(&point)
            .ok_or_else(|| TillerError::unknown_point(point.label()))
    }

    pub(crate) fn point(&self, point: P) -> Result<&PointDag<S>> {
        self.dags
            .get(&point)
            .ok_or_else(|| TillerError::unknown_point(point.label()))
    }
}

impl<P: ControlPoint, S> Default for Registry<P, S> {
    fn default() -> Self {
        Self::new()
    }
}
