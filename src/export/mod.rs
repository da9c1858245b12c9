//! Graph export: a serializable description of the control model plus a
//! Graphviz DOT renderer for diagnostics.

pub mod graphviz;

use serde::{Deserialize, Serialize};

use crate::core::errors::Result;

/// Serializable snapshot of the whole control model: the declared points in
/// first-visit flow order, each with its actions and their dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDescription {
    /// Program name, used for dump file naming.
    pub program: String,
    /// Whether actions are listed in topological order (true) or
    /// registration order (false).
    pub sorted: bool,
    pub points: Vec<PointDescription>,
}

/// One control point and its actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointDescription {
    pub label: String,
    /// Meta (cyclic-control) points are styled differently in exports.
    pub meta: bool,
    pub actions: Vec<ActionDescription>,
}

/// One action and the labels of its direct dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescription {
    pub label: String,
    pub depends_on: Vec<String>,
}

impl GraphDescription {
    pub fn new(program: impl Into<String>, sorted: bool) -> Self {
        Self {
            program: program.into(),
            sorted,
            points: Vec::new(),
        }
    }

    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// File name for the DOT dump of this description.
    pub fn dot_file_name(&self) -> String {
        if self.sorted {
            format!("{}-control-model-sorted.dot", self.program)
        } else {
            format!("{}-control-model.dot", self.program)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> GraphDescription {
        GraphDescription {
            program: "demo".into(),
            sorted: false,
            points: vec![PointDescription {
                label: "initialize".into(),
                meta: false,
                actions: vec![
                    ActionDescription {
                        label: "init_mesh".into(),
                        depends_on: vec![],
                    },
                    ActionDescription {
                        label: "init_fields".into(),
                        depends_on: vec!["init_mesh".into()],
                    },
                ],
            }],
        }
    }

    #[test]
    fn json_round_trip() {
        let desc = sample();
        let json = desc.to_json().unwrap();
        let back: GraphDescription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, desc);
    }

    #[test]
    fn dot_file_names_follow_program() {
        assert_eq!(sample().dot_file_name(), "demo-control-model.dot");
        let mut sorted = sample();
        sorted.sorted = true;
        assert_eq!(sorted.dot_file_name(), "demo-control-model-sorted.dot");
    }
}
