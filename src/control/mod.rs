//! The control model: control points, action registration, and the walks
//! that execute a declared flow.

pub mod action;
pub mod driver;
pub mod point;
pub mod registry;
pub mod walker;

pub use action::{ActionHandle, ActionNode, Dependency};
pub use driver::{Control, ControlOptions};
pub use point::{Context, ControlFlow, ControlPoint, Cycle, FlowEntry, Identity};
pub use registry::Registry;
