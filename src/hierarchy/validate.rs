//! Vocabulary tree validation.
//!
//! Trees built from small sample pools are legitimately irregular: a subtree
//! may stop above the leaf level or carry fewer than K children. Those are
//! reported as warnings. Issues that break lookup (wrong dimensions, too many
//! children, nodes below the leaf level, broken parent links) are errors.
//!
//! # Example
//!
//! ```rust
//! use codeword::hierarchy::{validate_tree, VocabularyTree};
//! use ndarray::array;
//!
//! let mut tree = VocabularyTree::new(2, 2, 1).unwrap();
//! let a = tree.add_child(0, array![0.0]).unwrap();
//! tree.add_child(a, array![1.0]).unwrap();
//!
//! let report = validate_tree(&tree);
//! assert!(report.is_healthy());
//! assert!(!report.is_clean());
//! ```

use std::collections::HashMap;

use super::tree::VocabularyTree;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Irregular but usable.
    Warning,
    /// Lookup through this part of the tree is unreliable.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single validation issue.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity of the issue.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Node involved, if any.
    pub node_id: Option<usize>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            node_id: None,
        }
    }

    /// Attach the node this issue is about.
    pub fn with_node(mut self, id: usize) -> Self {
        self.node_id = Some(id);
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.severity, self.message)?;
        if let Some(id) = self.node_id {
            write!(f, " (node {})", id)?;
        }
        Ok(())
    }
}

/// Result of [`validate_tree`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// All issues found.
    pub issues: Vec<ValidationIssue>,
    /// Childless non-root nodes.
    pub leaves: usize,
    /// Leaves above the leaf level.
    pub short_leaves: usize,
}

impl ValidationReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// No errors (warnings allowed).
    pub fn is_healthy(&self) -> bool {
        !self.issues.iter().any(|i| i.severity >= Severity::Error)
    }

    /// No issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Issues of a given severity or higher.
    pub fn issues_at_level(&self, min_severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity >= min_severity)
            .collect()
    }

    /// Count issues by severity.
    pub fn counts(&self) -> HashMap<Severity, usize> {
        let mut counts = HashMap::new();
        for issue in &self.issues {
            *counts.entry(issue.severity).or_default() += 1;
        }
        counts
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_clean() {
            return write!(f, "Validation passed: {} leaves, no issues", self.leaves);
        }

        let counts = self.counts();
        let parts: Vec<String> = [
            (Severity::Error, "errors"),
            (Severity::Warning, "warnings"),
        ]
        .iter()
        .filter_map(|(sev, name)| counts.get(sev).map(|c| format!("{} {}", c, name)))
        .collect();

        writeln!(f, "Validation report: {}", parts.join(", "))?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

/// Check a vocabulary tree's structure.
pub fn validate_tree(tree: &VocabularyTree) -> ValidationReport {
    let mut report = ValidationReport::new();
    let k = tree.branching();
    let depth = tree.depth();

    if tree.is_empty() {
        report.add(ValidationIssue::new(
            Severity::Error,
            "root has no children; every lookup lands in bin 0",
        ));
    }

    let mut parent_of: Vec<Option<usize>> = vec![None; tree.len()];
    for node in tree.nodes() {
        for &child in &node.children {
            match parent_of.get_mut(child) {
                None => report.add(
                    ValidationIssue::new(Severity::Error, format!("dangling child id {child}"))
                        .with_node(node.id),
                ),
                Some(Some(_)) => report.add(
                    ValidationIssue::new(Severity::Error, "node has more than one parent")
                        .with_node(child),
                ),
                Some(slot) => *slot = Some(node.id),
            }
            if let Some(c) = tree.node(child) {
                if c.depth != node.depth + 1 {
                    report.add(
                        ValidationIssue::new(
                            Severity::Error,
                            format!("child at depth {} under depth {}", c.depth, node.depth),
                        )
                        .with_node(child),
                    );
                }
            }
        }
    }

    for node in tree.nodes() {
        if node.is_root() {
            continue;
        }
        if parent_of[node.id].is_none() {
            report.add(ValidationIssue::new(Severity::Error, "unreachable node").with_node(node.id));
        }
        if node.centroid.len() != tree.dim() {
            report.add(
                ValidationIssue::new(
                    Severity::Error,
                    format!("centroid has {} values, expected {}", node.centroid.len(), tree.dim()),
                )
                .with_node(node.id),
            );
        }
        if node.depth > depth {
            report.add(
                ValidationIssue::new(Severity::Error, format!("node below leaf level {depth}"))
                    .with_node(node.id),
            );
        }
        if node.children.len() > k {
            report.add(
                ValidationIssue::new(
                    Severity::Error,
                    format!("{} children, branching factor is {k}", node.children.len()),
                )
                .with_node(node.id),
            );
        }

        if node.is_leaf() {
            report.leaves += 1;
            if node.depth < depth {
                report.short_leaves += 1;
                report.add(
                    ValidationIssue::new(
                        Severity::Warning,
                        format!("subtree ends at depth {} of {depth}", node.depth),
                    )
                    .with_node(node.id),
                );
            }
        } else if node.children.len() < k {
            report.add(
                ValidationIssue::new(
                    Severity::Warning,
                    format!("{} of {k} children", node.children.len()),
                )
                .with_node(node.id),
            );
        }
    }

    if tree.root().children.len() < k && !tree.is_empty() {
        report.add(
            ValidationIssue::new(
                Severity::Warning,
                format!("root has {} of {k} children", tree.root().children.len()),
            )
            .with_node(0),
        );
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn full_tree() -> VocabularyTree {
        let mut tree = VocabularyTree::new(2, 2, 1).unwrap();
        for base in [0.0, 10.0] {
            let mid = tree.add_child(0, array![base + 0.5]).unwrap();
            tree.add_child(mid, array![base]).unwrap();
            tree.add_child(mid, array![base + 1.0]).unwrap();
        }
        tree
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_full_tree_is_clean() {
        let report = validate_tree(&full_tree());
        assert!(report.is_clean(), "{report}");
        assert_eq!(report.leaves, 4);
        assert_eq!(report.short_leaves, 0);
    }

    #[test]
    fn test_short_subtrees_are_warnings() {
        let mut tree = VocabularyTree::new(3, 2, 1).unwrap();
        let a = tree.add_child(0, array![0.0]).unwrap();
        tree.add_child(0, array![5.0]).unwrap();
        tree.add_child(a, array![1.0]).unwrap();

        let report = validate_tree(&tree);
        assert!(report.is_healthy());
        assert_eq!(report.leaves, 2);
        assert_eq!(report.short_leaves, 1);
        // root 2/3, node a 1/3, second child ends early
        assert_eq!(report.issues_at_level(Severity::Warning).len(), 3);
        assert!(report.to_string().contains("3 warnings"));
    }

    #[test]
    fn test_empty_tree_is_unhealthy() {
        let tree = VocabularyTree::new(2, 2, 3).unwrap();
        let report = validate_tree(&tree);
        assert!(!report.is_healthy());
        assert_eq!(report.counts().get(&Severity::Error), Some(&1));
    }
}
