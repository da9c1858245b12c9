//! The three walks over a declared control flow.
//!
//! * init walk: make every declared point's DAG exist, even when no action
//!   was ever registered for it.
//! * run walk: execute each point's sorted actions, unrolling cycles while
//!   their predicates hold.
//! * write walk: collect the same traversal into a [`GraphDescription`] for
//!   export instead of executing.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use tracing::{debug, info, warn};

use crate::control::point::{Context, ControlPoint, FlowEntry};
use crate::control::registry::Registry;
use crate::core::errors::Result;
use crate::core::status::{self, Status};
use crate::dag::GraphNode;
use crate::export::{ActionDescription, GraphDescription, PointDescription};

/// Ensure a DAG exists for every point reachable from these entries.
pub(crate) fn init_walk<P: ControlPoint, S>(
    entries: &[FlowEntry<P, S>],
    registry: &mut Registry<P, S>,
) {
    for entry in entries {
        match entry {
            FlowEntry::Point(point) => registry.ensure(*point),
            FlowEntry::Cycle(cycle) => init_walk(&cycle.entries, registry),
        }
    }
}

/// Execute the entries in declared order, folding statuses.
///
/// A nonzero status from any point overwrites the running aggregate (last
/// observed wins); it does not stop the walk. Structural errors (a cycle
/// surfacing at first sort of a point) abort the walk with `Err`.
pub(crate) fn run_walk<P: ControlPoint, S>(
    entries: &mut [FlowEntry<P, S>],
    registry: &mut Registry<P, S>,
    ctx: &mut Context<S>,
) -> Result<Status> {
    let mut aggregate = status::SUCCESS;
    for entry in entries.iter_mut() {
        match entry {
            FlowEntry::Point(point) => {
                let s = run_point(*point, registry, ctx)?;
                if !status::is_success(s) {
                    aggregate = s;
                }
            }
            FlowEntry::Cycle(cycle) => {
                let mut iterations = 0usize;
                while (cycle.predicate)(ctx) {
                    iterations += 1;
                    let s = run_walk(&mut cycle.entries, registry, ctx)?;
                    if !status::is_success(s) {
                        aggregate = s;
                    }
                }
                debug!(iterations, "cycle complete");
            }
        }
    }
    Ok(aggregate)
}

/// Execute one control point's actions in topological order.
///
/// When an action returns nonzero, its transitive dependents are skipped
/// (their precondition is unmet) while independent actions still run. The
/// last observed nonzero return becomes the point's status.
fn run_point<P: ControlPoint, S>(
    point: P,
    registry: &mut Registry<P, S>,
    ctx: &mut Context<S>,
) -> Result<Status> {
    let pd = registry.point_mut(point)?;
    let order = pd.sorted()?.to_vec();
    debug!(point = point.label(), actions = order.len(), "entering control point");

    let mut failed: HashSet<NodeIndex> = HashSet::new();
    let mut point_status = status::SUCCESS;

    for index in order {
        let blocked = pd
            .dag
            .predecessors(index)
            .iter()
            .any(|p| failed.contains(p));
        if blocked {
            warn!(
                point = point.label(),
                action = pd.dag.node(index).label(),
                "skipping action: failed predecessor"
            );
            failed.insert(index);
            continue;
        }

        let s = pd.dag.node_mut(index).execute(ctx);
        if !status::is_success(s) {
            warn!(
                point = point.label(),
                action = pd.dag.node(index).label(),
                status = s,
                "action returned nonzero status"
            );
            failed.insert(index);
            point_status = s;
        }
    }

    info!(point = point.label(), status = point_status, "control point complete");
    Ok(point_status)
}

/// Collect the flow's points into a graph description, each point once, in
/// first-visit order. Cycle predicates are not evaluated.
pub(crate) fn write_walk<P: ControlPoint, S>(
    entries: &[FlowEntry<P, S>],
    registry: &mut Registry<P, S>,
    sorted: bool,
    description: &mut GraphDescription,
    seen: &mut HashSet<P>,
) -> Result<()> {
    for entry in entries {
        match entry {
            FlowEntry::Point(point) => {
                if !seen.insert(*point) {
                    continue;
                }
                description.points.push(describe_point(*point, registry, sorted)?);
            }
            FlowEntry::Cycle(cycle) => {
                write_walk(&cycle.entries, registry, sorted, description, seen)?;
            }
        }
    }
    Ok(())
}

fn describe_point<P: ControlPoint, S>(
    point: P,
    registry: &mut Registry<P, S>,
    sorted: bool,
) -> Result<PointDescription> {
    let order: Vec<NodeIndex> = if sorted {
        registry.point_mut(point)?.sorted()?.to_vec()
    } else {
        registry.point(point)?.dag.indices().collect()
    };

    let pd = registry.point(point)?;
    let actions = order
        .into_iter()
        .map(|index| ActionDescription {
            label: pd.dag.node(index).label().to_string(),
            depends_on: pd
                .dag
                .predecessors(index)
                .into_iter()
                .map(|p| pd.dag.node(p).label().to_string())
                .collect(),
        })
        .collect();

    Ok(PointDescription {
        label: point.label().to_string(),
        meta: point.meta(),
        actions,
    })
}
