use std::fmt::Write as _;

use thiserror::Error;

/// Unified error type for the tiller control model.
///
/// Every variant here represents a defect in the embedding application's
/// static structure (its declared control flow, actions, and dependency
/// edges) or a failure while exporting diagnostics. None of them are
/// produced by a running action: action failures travel through the
/// [`Status`](crate::core::status::Status) channel instead.
#[derive(Debug, Error)]
pub enum TillerError {
    /// A dependency cycle among the actions under one control point.
    #[error("cycle detected under control point '{point}' involving [{}]", .participants.join(", "))]
    Cycle {
        point: String,
        participants: Vec<String>,
    },

    /// A dependency edge between actions under different control points.
    #[error(
        "cannot add dependencies between actions under different control points: \
         '{action}' is under '{action_point}' but '{dependency}' is under '{dependency_point}'"
    )]
    CrossPointDependency {
        action: String,
        action_point: String,
        dependency: String,
        dependency_point: String,
    },

    /// A reference to a control point that the flow never declared.
    #[error("unknown control point '{point}': not declared in the control flow")]
    UnknownControlPoint { point: String },

    /// Two actions registered with the same label under one control point.
    #[error("duplicate action '{action}' under control point '{point}'")]
    DuplicateAction { action: String, point: String },

    /// Configuration errors (bad hook setup, re-entrant execute, ...).
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// IO errors from graph export.
    #[error("IO operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization errors from graph export.
    #[error("serialization failed: {format}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generic internal errors.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl TillerError {
    /// Create a cycle error naming the participating actions.
    pub fn cycle<S: Into<String>>(point: S, participants: Vec<String>) -> Self {
        Self::Cycle {
            point: point.into(),
            participants,
        }
    }

    /// Create a cross-control-point dependency error.
    pub fn cross_point<S: Into<String>>(
        action: S,
        action_point: S,
        dependency: S,
        dependency_point: S,
    ) -> Self {
        Self::CrossPointDependency {
            action: action.into(),
            action_point: action_point.into(),
            dependency: dependency.into(),
            dependency_point: dependency_point.into(),
        }
    }

    /// Create an unknown control point error.
    pub fn unknown_point<S: Into<String>>(point: S) -> Self {
        Self::UnknownControlPoint {
            point: point.into(),
        }
    }

    /// Create a duplicate action error.
    pub fn duplicate_action<S: Into<String>>(action: S, point: S) -> Self {
        Self::DuplicateAction {
            action: action.into(),
            point: point.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an IO error.
    pub fn io<S: Into<String>>(operation: S, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serialization<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        format: S,
        source: E,
    ) -> Self {
        Self::Serialization {
            format: format.into(),
            source: Box::new(source),
        }
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Errors that indicate an invalid static structure, as opposed to a
    /// failed side effect. No partial execution can be trusted after one
    /// of these.
    pub fn is_structural(&self) -> bool {
        match self {
            Self::Cycle { .. }
            | Self::CrossPointDependency { .. }
            | Self::UnknownControlPoint { .. }
            | Self::DuplicateAction { .. }
            | Self::Configuration { .. } => true,
            Self::Io { .. } | Self::Serialization { .. } | Self::Internal { .. } => false,
        }
    }

    /// Get error category for logging.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Cycle { .. } => "cycle",
            Self::CrossPointDependency { .. } => "cross_point",
            Self::UnknownControlPoint { .. } => "unknown_point",
            Self::DuplicateAction { .. } => "duplicate_action",
            Self::Configuration { .. } => "configuration",
            Self::Io { .. } => "io",
            Self::Serialization { .. } => "serialization",
            Self::Internal { .. } => "internal",
        }
    }

    /// Render a cycle error as a one-line `a -> b -> c` diagnostic.
    pub fn describe(&self) -> String {
        match self {
            Self::Cycle {
                point,
                participants,
            } => {
                let mut out = format!("cycle under '{point}': ");
                for (i, label) in participants.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" -> ");
                    }
                    let _ = write!(out, "{label}");
                }
                out
            }
            other => other.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, TillerError>;

impl From<std::io::Error> for TillerError {
    fn from(err: std::io::Error) -> Self {
        Self::io("io_operation", err)
    }
}

impl From<serde_json::Error> for TillerError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("json", err)
    }
}
