//! The control driver: owns the registry, the declared flow, and the run
//! context, and exposes the `execute()` / `check_status()` entry points.

use std::any::Any;
use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::control::action::{ActionHandle, ActionNode, Dependency};
use crate::control::point::{Context, ControlFlow, ControlPoint, Identity};
use crate::control::registry::Registry;
use crate::control::walker;
use crate::core::errors::{Result, TillerError};
use crate::core::status::{self, Status};
use crate::export::{graphviz, GraphDescription};

/// Driver life cycle. All transitions happen inside [`Control::execute`];
/// the only externally observable rule is that `execute` runs once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Initialized,
    Running,
    Completed,
}

/// The two optional dump flags from the embedding application's CLI
/// surface. Requesting either produces a diagnostic status for
/// [`Control::check_status`] instead of a normal run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlOptions {
    pub dump_control_model: bool,
    pub dump_control_model_sorted: bool,
}

type InitializeHook<S> = Box<dyn FnMut(&mut Context<S>) -> Status>;
type FinalizeHook<S> = Box<dyn FnMut(&mut Context<S>, Status) -> Status>;

/// The top-level control model driver.
///
/// One driver per run: it is built from a declared [`ControlFlow`] and the
/// application's control state, actions are registered against it during a
/// setup phase, and `execute()` walks the flow exactly once. There are no
/// hidden globals; tests build a fresh driver per case.
pub struct Control<P: ControlPoint, S> {
    program: String,
    flow: ControlFlow<P, S>,
    registry: Registry<P, S>,
    ctx: Context<S>,
    initialize: Option<InitializeHook<S>>,
    finalize: Option<FinalizeHook<S>>,
    finalize_on_error: bool,
    phase: Phase,
}

impl<P: ControlPoint, S> Control<P, S> {
    /// Build a driver from a declared flow and initial control state.
    ///
    /// Performs the init walk: every control point the flow declares gets a
    /// DAG in the registry, so points with zero registered actions still
    /// exist, still terminate their cycles, and still appear in exports.
    pub fn new(program: impl Into<String>, flow: ControlFlow<P, S>, state: S) -> Self {
        let program = program.into();
        let mut registry = Registry::new();
        walker::init_walk(flow.entries(), &mut registry);
        info!(
            program = %program,
            points = flow.points().len(),
            "control model initialized"
        );
        Self {
            program,
            flow,
            registry,
            ctx: Context::new(state),
            initialize: None,
            finalize: None,
            finalize_on_error: false,
            phase: Phase::Initialized,
        }
    }

    /// Set the process identity visible to actions and predicates.
    pub fn with_identity(mut self, identity: Identity) -> Self {
        self.ctx = self.ctx.with_identity(identity);
        self
    }

    /// Hook called before the run walk. A non-success return short-circuits
    /// the run; see [`finalize_on_error`](Self::finalize_on_error).
    pub fn on_initialize(
        mut self,
        hook: impl FnMut(&mut Context<S>) -> Status + 'static,
    ) -> Self {
        self.initialize = Some(Box::new(hook));
        self
    }

    /// Hook called after the run walk with the aggregate status; its return
    /// value becomes the overall result of `execute()`.
    pub fn on_finalize(
        mut self,
        hook: impl FnMut(&mut Context<S>, Status) -> Status + 'static,
    ) -> Self {
        self.finalize = Some(Box::new(hook));
        self
    }

    /// When true, a failed initialize hook still runs the finalize hook
    /// (the run walk itself stays skipped).
    pub fn finalize_on_error(mut self, enabled: bool) -> Self {
        self.finalize_on_error = enabled;
        self
    }

    /// Register an action under a declared control point.
    ///
    /// Returns a handle used to declare dependency edges. Registering under
    /// a point the flow never declares, reusing a label under one point, or
    /// registering after `execute()` are all rejected.
    pub fn action(
        &mut self,
        point: P,
        label: impl Into<String>,
        target: impl FnMut(&mut Context<S>) -> Status + 'static,
    ) -> Result<ActionHandle<P>> {
        self.register(point, ActionNode::new(label, target))
    }

    /// Like [`action`](Self::action), with an opaque payload attached to
    /// the node (the application's node-policy data).
    pub fn action_with_data(
        &mut self,
        point: P,
        label: impl Into<String>,
        target: impl FnMut(&mut Context<S>) -> Status + 'static,
        data: impl Any,
    ) -> Result<ActionHandle<P>> {
        self.register(point, ActionNode::new(label, target).with_data(data))
    }

    fn register(&mut self, point: P, node: ActionNode<S>) -> Result<ActionHandle<P>> {
        if self.phase != Phase::Initialized {
            return Err(TillerError::configuration(
                "actions must be registered before execute()",
            ));
        }
        if !self.registry.contains(point) {
            return Err(TillerError::unknown_point(point.label()));
        }
        self.registry.register(point, node)
    }

    /// Record that `action` depends on `on`. Both actions must live under
    /// the same control point.
    pub fn add_dependency(
        &mut self,
        action: &ActionHandle<P>,
        on: &ActionHandle<P>,
    ) -> Result<Dependency> {
        if self.phase != Phase::Initialized {
            return Err(TillerError::configuration(
                "dependencies must be declared before execute()",
            ));
        }
        self.registry.add_dependency(action, on)
    }

    pub fn state(&self) -> &S {
        self.ctx.state()
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.ctx.state_mut()
    }

    pub fn context(&self) -> &Context<S> {
        &self.ctx
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Execute the control model.
    ///
    /// Topologically sorts the actions under each control point (cached per
    /// point) and executes them in a valid dependency order, unrolling
    /// cycles while their predicates hold. Exactly one invocation per
    /// driver; a second call is a configuration error.
    pub fn execute(&mut self) -> Result<Status> {
        if self.phase != Phase::Initialized {
            return Err(TillerError::configuration(
                "execute() may only be invoked once per control instance",
            ));
        }
        self.phase = Phase::Running;
        debug!(program = %self.program, "control model run starting");

        let mut aggregate = status::SUCCESS;
        if let Some(hook) = self.initialize.as_mut() {
            aggregate = hook(&mut self.ctx);
            if !status::is_success(aggregate) {
                warn!(status = aggregate, "initialize hook failed; skipping run");
            }
        }

        if status::is_success(aggregate) {
            let Control {
                flow,
                registry,
                ctx,
                ..
            } = self;
            aggregate = walker::run_walk(flow.entries_mut(), registry, ctx)?;
        } else if !(self.finalize_on_error && self.finalize.is_some()) {
            self.phase = Phase::Completed;
            return Ok(aggregate);
        }

        let result = match self.finalize.as_mut() {
            Some(hook) => hook(&mut self.ctx, aggregate),
            None => aggregate,
        };

        self.phase = Phase::Completed;
        info!(program = %self.program, status = result, "control model run complete");
        Ok(result)
    }

    /// Map the two dump options to their diagnostic status codes.
    /// Returns [`status::SUCCESS`] when neither dump is requested.
    pub fn check_options(&self, options: &ControlOptions) -> Status {
        if options.dump_control_model {
            status::CONTROL_MODEL
        } else if options.dump_control_model_sorted {
            status::CONTROL_MODEL_SORTED
        } else {
            status::SUCCESS
        }
    }

    /// Post-process a status: the graph-dump request codes trigger the
    /// corresponding export and map to success; anything else passes
    /// through unchanged.
    pub fn check_status(&mut self, s: Status) -> Result<Status> {
        match s {
            status::CONTROL_MODEL => {
                self.write_graph(false)?;
                Ok(status::SUCCESS)
            }
            status::CONTROL_MODEL_SORTED => {
                self.write_graph(true)?;
                Ok(status::SUCCESS)
            }
            other => Ok(other),
        }
    }

    /// Snapshot the control model for export, in registration order or
    /// topological order.
    pub fn describe(&mut self, sorted: bool) -> Result<GraphDescription> {
        let mut description = GraphDescription::new(self.program.clone(), sorted);
        let mut seen = HashSet::new();
        let Control { flow, registry, .. } = self;
        walker::write_walk(flow.entries(), registry, sorted, &mut description, &mut seen)?;
        Ok(description)
    }

    /// Write the control model to `<program>-control-model[-sorted].dot`
    /// in the working directory, returning the file name.
    pub fn write_graph(&mut self, sorted: bool) -> Result<String> {
        let description = self.describe(sorted)?;
        let file = description.dot_file_name();
        graphviz::write_dot(&description, &file)?;
        Ok(file)
    }
}
