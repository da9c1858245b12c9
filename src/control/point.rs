//! Control points, the declared control flow, and the context threaded
//! through a run.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::core::status::Status;

/// Identifier for one phase of the top-level control flow.
///
/// Applications implement this on a small fieldless enum (usually via
/// `#[derive(ControlPoint)]` from `tiller-macros`). The `Ord` bound gives
/// the registry a stable key order; execution order is taken from the
/// declared [`ControlFlow`], never from the key order.
pub trait ControlPoint: Copy + Eq + Ord + Hash + fmt::Debug + 'static {
    /// Display label, used in diagnostics and graph export.
    fn label(&self) -> &'static str;

    /// True for meta (cyclic-control/internal) points. Exports style these
    /// differently; execution treats them like any other point.
    fn meta(&self) -> bool {
        false
    }
}

/// Rank/color identity of this process within a distributed run.
///
/// The control model never inspects these values itself; they are carried
/// so cycle predicates and action bodies can ask "which process am I"
/// without reaching for a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    rank: usize,
    size: usize,
}

impl Identity {
    pub fn new(rank: usize, size: usize) -> Self {
        debug_assert!(rank < size.max(1));
        Self { rank, size }
    }

    /// Identity of a standalone, single-process run.
    pub fn single() -> Self {
        Self { rank: 0, size: 1 }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Alias for [`rank`](Self::rank), matching the color/colors naming
    /// used by distributed runtimes.
    pub fn color(&self) -> usize {
        self.rank
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::single()
    }
}

/// The single mutable control-state object threaded through a run.
///
/// Owns the application's control state `S` and the process [`Identity`].
/// Action targets and cycle predicates receive `&mut Context<S>`, so all
/// mutation happens on the one control thread.
pub struct Context<S> {
    state: S,
    identity: Identity,
}

impl<S> Context<S> {
    pub fn new(state: S) -> Self {
        Self {
            state,
            identity: Identity::single(),
        }
    }

    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.identity = identity;
        self
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Consume the context, returning the application state.
    pub fn into_state(self) -> S {
        self.state
    }
}

/// Boxed predicate guarding one cycle entry.
pub type CyclePredicate<S> = Box<dyn FnMut(&mut Context<S>) -> bool>;

/// Boxed target invoked for one action.
pub type ActionTarget<S> = Box<dyn FnMut(&mut Context<S>) -> Status>;

/// One entry of the declared flow: a plain control point or a
/// predicate-guarded cycle over a nested sub-flow.
pub enum FlowEntry<P, S> {
    Point(P),
    Cycle(Cycle<P, S>),
}

/// A repeat-while construct: the nested entries are re-run, in order, while
/// the predicate returns true. The predicate is evaluated before every
/// repetition, so zero iterations is a valid outcome.
pub struct Cycle<P, S> {
    pub(crate) predicate: CyclePredicate<S>,
    pub(crate) entries: Vec<FlowEntry<P, S>>,
}

impl<P, S> Cycle<P, S> {
    pub fn new(
        predicate: impl FnMut(&mut Context<S>) -> bool + 'static,
        inner: ControlFlow<P, S>,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            entries: inner.entries,
        }
    }
}

/// The statically declared, ordered sequence of control points and cycles.
///
/// Fixed before the driver is built; the walker never mutates the node set,
/// only the predicates' captured state.
pub struct ControlFlow<P, S> {
    pub(crate) entries: Vec<FlowEntry<P, S>>,
}

impl<P: ControlPoint, S> ControlFlow<P, S> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a plain control point.
    pub fn point(mut self, point: P) -> Self {
        self.entries.push(FlowEntry::Point(point));
        self
    }

    /// Append a predicate-guarded cycle.
    ///
    /// The cycle's entries repeat while `predicate` returns true; the
    /// predicate is checked before every pass, so a false first check skips
    /// the cycle entirely. When the flow is built before the state type is
    /// otherwise pinned (the usual case), the closure parameter needs an
    /// explicit annotation: `|ctx: &mut Context<MyState>| ...`.
    pub fn cycle(
        mut self,
        predicate: impl FnMut(&mut Context<S>) -> bool + 'static,
        inner: ControlFlow<P, S>,
    ) -> Self {
        self.entries.push(FlowEntry::Cycle(Cycle::new(predicate, inner)));
        self
    }

    /// All points reachable in this flow, cycles included, in first-visit
    /// order without duplicates.
    pub fn points(&self) -> Vec<P> {
        let mut seen = Vec::new();
        collect_points(&self.entries, &mut seen);
        seen
    }

    pub(crate) fn entries(&self) -> &[FlowEntry<P, S>] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [FlowEntry<P, S>] {
        &mut self.entries
    }
}

impl<P: ControlPoint, S> Default for ControlFlow<P, S> {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_points<P: ControlPoint, S>(entries: &[FlowEntry<P, S>], seen: &mut Vec<P>) {
    for entry in entries {
        match entry {
            FlowEntry::Point(p) => {
                if !seen.contains(p) {
                    seen.push(*p);
                }
            }
            FlowEntry::Cycle(cycle) => collect_points(&cycle.entries, seen),
        }
    }
}
