//! Integer status codes threaded through control-point execution.
//!
//! Actions, initialize/finalize hooks, and the driver itself all speak this
//! one integer channel. Zero is success; small positive values are reserved
//! for the diagnostic graph-dump requests recognized by
//! [`Control::check_status`](crate::control::Control::check_status).
//! Applications are free to use any other value as a failure code.

/// Result code returned by action targets and folded through a run.
pub type Status = i32;

/// Normal completion.
pub const SUCCESS: Status = 0;

/// Generic failure.
pub const ERROR: Status = 1;

/// Request to dump the unsorted control-model graph instead of running.
pub const CONTROL_MODEL: Status = 2;

/// Request to dump the topologically sorted control-model graph.
pub const CONTROL_MODEL_SORTED: Status = 3;

/// True for [`SUCCESS`].
pub fn is_success(status: Status) -> bool {
    status == SUCCESS
}

/// True for the graph-dump request codes, which are diagnostic requests
/// rather than failures.
pub fn is_diagnostic(status: Status) -> bool {
    status == CONTROL_MODEL || status == CONTROL_MODEL_SORTED
}
