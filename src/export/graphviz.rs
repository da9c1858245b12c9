//! Graphviz DOT rendering of a [`GraphDescription`].
//!
//! Each control point becomes a cluster; dependency edges point from the
//! dependency to the dependent. Node ids are qualified by the point label so
//! an action name reused under two points cannot collide.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::core::errors::{Result, TillerError};
use crate::export::GraphDescription;

/// Render a description to DOT source.
pub fn to_dot(description: &GraphDescription) -> String {
    let mut dot = String::from("digraph control_model {\n");
    dot.push_str("  graph [rankdir=TB, nodesep=0.5, ranksep=0.75];\n");
    dot.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\"];\n");
    dot.push_str("  edge [fontsize=10];\n\n");

    for (i, point) in description.points.iter().enumerate() {
        let _ = writeln!(dot, "  subgraph cluster_{i} {{");
        let _ = writeln!(dot, "    label=\"{}\";", point.label);
        if point.meta {
            dot.push_str("    style=dashed;\n");
        }
        if point.actions.is_empty() {
            // Keep empty points visible in the rendering.
            let _ = writeln!(
                dot,
                "    \"{}/(empty)\" [label=\"(no actions)\", style=dotted];",
                point.label
            );
        }
        for action in &point.actions {
            let _ = writeln!(
                dot,
                "    \"{}/{}\" [label=\"{}\"];",
                point.label, action.label, action.label
            );
        }
        dot.push_str("  }\n");
    }

    dot.push_str("\n  // Edges\n");
    for point in &description.points {
        for action in &point.actions {
            for dep in &action.depends_on {
                let _ = writeln!(
                    dot,
                    "  \"{}/{}\" -> \"{}/{}\";",
                    point.label, dep, point.label, action.label
                );
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Render a description and write it to a file.
pub fn write_dot(description: &GraphDescription, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let dot = to_dot(description);
    fs::write(path, dot)
        .map_err(|e| TillerError::io(format!("write dot file '{}'", path.display()), e))?;
    info!(file = %path.display(), "control model graph written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ActionDescription, PointDescription};

    fn sample() -> GraphDescription {
        GraphDescription {
            program: "demo".into(),
            sorted: true,
            points: vec![
                PointDescription {
                    label: "initialize".into(),
                    meta: false,
                    actions: vec![ActionDescription {
                        label: "init_mesh".into(),
                        depends_on: vec![],
                    }],
                },
                PointDescription {
                    label: "advance".into(),
                    meta: false,
                    actions: vec![
                        ActionDescription {
                            label: "update".into(),
                            depends_on: vec![],
                        },
                        ActionDescription {
                            label: "accumulate".into(),
                            depends_on: vec!["update".into()],
                        },
                    ],
                },
                PointDescription {
                    label: "cycle_control".into(),
                    meta: true,
                    actions: vec![],
                },
            ],
        }
    }

    #[test]
    fn dot_contains_clusters_and_edges() {
        let dot = to_dot(&sample());
        assert!(dot.starts_with("digraph control_model {"));
        assert!(dot.contains("label=\"initialize\";"));
        assert!(dot.contains("\"advance/update\" -> \"advance/accumulate\";"));
        // Qualified ids keep same-named actions under different points apart.
        assert!(dot.contains("\"initialize/init_mesh\""));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn meta_points_are_dashed_and_empty_points_visible() {
        let dot = to_dot(&sample());
        assert!(dot.contains("style=dashed;"));
        assert!(dot.contains("(no actions)"));
    }

    #[test]
    fn write_dot_creates_file() {
        let dir = std::env::temp_dir().join("tiller-graphviz-test");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("demo-control-model-sorted.dot");
        let _ = std::fs::remove_file(&path);

        write_dot(&sample(), &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("digraph control_model"));

        let _ = std::fs::remove_file(&path);
    }
}
