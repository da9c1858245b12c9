//! Action nodes and the handles returned by registration.

use std::any::Any;
use std::fmt;

use petgraph::graph::NodeIndex;
use tracing::trace;

use crate::control::point::{ActionTarget, Context, ControlPoint};
use crate::core::status::Status;
use crate::dag::GraphNode;

/// One registered unit of work: a label, the executable target, and an
/// optional application-supplied payload the core never inspects.
pub struct ActionNode<S> {
    label: String,
    target: ActionTarget<S>,
    data: Option<Box<dyn Any>>,
}

impl<S> ActionNode<S> {
    pub(crate) fn new(
        label: impl Into<String>,
        target: impl FnMut(&mut Context<S>) -> Status + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            target: Box::new(target),
            data: None,
        }
    }

    pub(crate) fn with_data(mut self, data: impl Any) -> Self {
        self.data = Some(Box::new(data));
        self
    }

    /// Invoke the target with the run context.
    pub(crate) fn execute(&mut self, ctx: &mut Context<S>) -> Status {
        trace!(action = %self.label, "executing action target");
        (self.target)(ctx)
    }

    /// Downcast access to the application payload attached at registration.
    pub fn data<T: 'static>(&self) -> Option<&T> {
        self.data.as_deref().and_then(|d| d.downcast_ref())
    }
}

impl<S> GraphNode for ActionNode<S> {
    fn label(&self) -> &str {
        &self.label
    }
}

impl<S> fmt::Debug for ActionNode<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionNode")
            .field("label", &self.label)
            .field("has_data", &self.data.is_some())
            .finish()
    }
}

/// Opaque handle to a registered action: the input to dependency edges.
///
/// The control point is part of the handle, which is how cross-point
/// dependency attempts are caught before any edge is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionHandle<P> {
    point: P,
    index: NodeIndex,
}

impl<P: ControlPoint> ActionHandle<P> {
    pub(crate) fn new(point: P, index: NodeIndex) -> Self {
        Self { point, index }
    }

    /// The control point this action was registered under.
    pub fn point(&self) -> P {
        self.point
    }

    pub(crate) fn index(&self) -> NodeIndex {
        self.index
    }
}

/// Opaque token returned by a successful dependency registration.
///
/// Carries no runtime state; it exists so declaration-style embeddings can
/// bind the result of the dependency expression.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Dependency;
