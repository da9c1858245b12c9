//! Tiller - a task-based control-flow and dependency-scheduling layer for
//! distributed scientific-computing applications.
//!
//! Applications declare named control points (coarse execution phases,
//! optionally cyclic) and, under each point, a set of actions with explicit
//! dependency edges. At run time the [`Control`] driver topologically sorts
//! the actions under each control point and executes them in a valid
//! dependency-respecting order, threading a single mutable control-state
//! object through the whole run.
//!
//! ```no_run
//! use tiller::{status, Context, Control, ControlFlow, ControlPoint};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
//! enum Cp {
//!     Initialize,
//!     Advance,
//!     Finalize,
//! }
//!
//! impl ControlPoint for Cp {
//!     fn label(&self) -> &'static str {
//!         match self {
//!             Cp::Initialize => "initialize",
//!             Cp::Advance => "advance",
//!             Cp::Finalize => "finalize",
//!         }
//!     }
//! }
//!
//! #[derive(Default)]
//! struct State {
//!     step: usize,
//!     steps: usize,
//! }
//!
//! # fn main() -> tiller::Result<()> {
//! let flow = ControlFlow::new()
//!     .point(Cp::Initialize)
//!     .cycle(
//!         |ctx: &mut Context<State>| {
//!             let s = ctx.state_mut();
//!             let go = s.step < s.steps;
//!             s.step += 1;
//!             go
//!         },
//!         ControlFlow::new().point(Cp::Advance),
//!     )
//!     .point(Cp::Finalize);
//!
//! let mut control = Control::new("demo", flow, State { step: 0, steps: 3 });
//! let init = control.action(Cp::Initialize, "init_mesh", |_| status::SUCCESS)?;
//! let fields = control.action(Cp::Initialize, "init_fields", |_| status::SUCCESS)?;
//! control.add_dependency(&fields, &init)?;
//! control.action(Cp::Advance, "advance_solution", |_| status::SUCCESS)?;
//! control.action(Cp::Finalize, "write_output", |_| status::SUCCESS)?;
//!
//! let status = control.execute()?;
//! let exit = control.check_status(status)?;
//! # let _ = exit;
//! # Ok(())
//! # }
//! ```

// Core infrastructure modules
pub mod core {
    pub mod errors;
    pub mod status;
}

// The control model
pub mod control; // control points, registration, walker, driver
pub mod dag; // generic DAG + deterministic topological sort
pub mod export; // graph description + graphviz rendering

// Re-exports for convenience
pub use control::{
    ActionHandle, Context, Control, ControlFlow, ControlOptions, ControlPoint, Cycle, Dependency,
    FlowEntry, Identity, Registry,
};
pub use core::errors::{Result, TillerError};
pub use core::status::{self, Status};
pub use dag::{Dag, GraphNode};
pub use export::{ActionDescription, GraphDescription, PointDescription};

// Derive macro for control point enums; lives in the macro namespace, so it
// shares the `ControlPoint` name with the trait.
pub use tiller_macros::ControlPoint;
