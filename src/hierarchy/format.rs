//! Vocabulary tree text format.
//!
//! ```text
//! K L
//! <level> c₁ … c_D
//! …
//! ```
//!
//! After the `K L` header every line is one node in pre-order. `level` counts
//! down from L for the children of the root to 1 for the leaf level.
//!
//! A node's children are the (at most K) lines that follow it tagged one
//! level lower. A line with any other level ends the child list without being
//! consumed, which is how shortened subtrees are encoded.

use super::tree::VocabularyTree;
use super::validate::{validate_tree, Severity};
use crate::error::{Error, Result};
use crate::text::{join_values, parse_token, parse_values, LineReader};
use ndarray::Array1;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::warn;

impl VocabularyTree {
    /// Write in the vocabulary tree text format.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{} {}", self.branching(), self.depth())?;

        for node in self.pre_order() {
            let level = self.depth() + 1 - node.depth;
            writeln!(writer, "{level} {}", join_values(node.centroid.iter()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read the vocabulary tree text format.
    ///
    /// Short child lists are accepted (and logged); unparsable lines and
    /// centroids of the wrong dimension are errors.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = LineReader::new(reader);

        let header = lines.expect_line("'K L' header")?;
        let fields: Vec<&str> = header.tokens().collect();
        let [k, l] = fields.as_slice() else {
            return Err(Error::parse(header.number, "expected 'K L' header"));
        };
        let branching: usize = parse_token(header.number, k, "branching factor")?;
        let depth: usize = parse_token(header.number, l, "depth")?;
        if branching == 0 {
            return Err(Error::parse(header.number, "branching factor must be at least 1"));
        }

        // The dimension is taken from the first node.
        let dim = match lines.peek()? {
            Some(first) => first.tokens().count().saturating_sub(1),
            None => return Err(Error::parse(header.number + 1, "vocabulary tree has no nodes")),
        };
        if dim == 0 {
            return Err(Error::parse(header.number + 1, "node without a centroid"));
        }

        let mut tree = VocabularyTree::new(branching, depth, dim)
            .map_err(|e| Error::parse(header.number, e.to_string()))?;
        read_children(&mut lines, &mut tree, 0, depth)?;
        if tree.is_empty() {
            return Err(Error::parse(header.number + 1, format!("expected nodes at level {depth}")));
        }

        if let Some(extra) = lines.peek()? {
            warn!(
                line = extra.number,
                "vocabulary tree has unread trailing lines; ignoring them"
            );
        }

        let report = validate_tree(&tree);
        if !report.is_clean() {
            warn!(
                errors = report.issues_at_level(Severity::Error).len(),
                short_leaves = report.short_leaves,
                %report,
                "loaded a degenerate vocabulary tree"
            );
        }
        Ok(tree)
    }

    /// Save to `path` in the text format.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.write_to(BufWriter::new(File::create(path)?))
    }

    /// Load from `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::read_from(BufReader::new(File::open(path)?))
    }
}

/// Read up to K children of `parent`, each tagged `level`, recursing into each.
fn read_children<R: BufRead>(
    lines: &mut LineReader<R>,
    tree: &mut VocabularyTree,
    parent: usize,
    level: usize,
) -> Result<()> {
    if level == 0 {
        return Ok(());
    }

    for _ in 0..tree.branching() {
        let Some(next) = lines.peek()? else {
            return Ok(());
        };
        let number = next.number;
        let found: usize = match next.tokens().next() {
            Some(tok) => parse_token(number, tok, "level")?,
            None => return Err(Error::parse(number, "missing level")),
        };
        if found != level {
            warn!(
                line = number,
                expected = level,
                found,
                "level mismatch, ending child list early"
            );
            return Ok(());
        }

        let Some(line) = lines.next_line()? else {
            return Ok(());
        };
        let values = parse_values(line.number, line.tokens().skip(1))?;
        if values.len() != tree.dim() {
            return Err(Error::parse(
                line.number,
                format!("expected {} values, found {}", tree.dim(), values.len()),
            ));
        }

        let child = tree
            .add_child(parent, Array1::from(values))
            .map_err(|e| Error::parse(line.number, e.to_string()))?;
        read_children(lines, tree, child, level - 1)?;
    }
    Ok(())
}
