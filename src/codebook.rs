//! Flat vocabularies.
//!
//! A [`Codebook`] is an ordered list of codewords. The row index of a
//! codeword is its permanent id: histograms built against the codebook use it
//! as the bin index, so a codebook is never reordered once created.
//!
//! # Text Format
//!
//! ```text
//! N
//! c₀₁ c₀₂ … c₀D
//! …
//! c₍N₋₁₎₁ … c₍N₋₁₎D
//! ```
//!
//! The first line is the codeword count. Each following line holds one
//! codeword as whitespace-separated numbers; the dimension is inferred from
//! the first one. Blank lines are ignored.

use crate::cluster::Kmeans;
use crate::error::{Error, Result};
use crate::text::{join_values, parse_token, parse_values, LineReader};
use crate::vector::{check_dim, nearest, stack_rows};
use ndarray::{Array2, ArrayView1};
use rand::Rng;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Ordered set of codewords of a common dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct Codebook {
    centroids: Array2<f64>,
}

impl Codebook {
    /// Wrap a matrix whose rows are codewords.
    pub fn new(centroids: Array2<f64>) -> Result<Self> {
        if centroids.nrows() == 0 {
            return Err(Error::EmptyInput);
        }
        if centroids.ncols() == 0 {
            return Err(Error::InvalidParameter {
                name: "dimension",
                message: "codewords must have at least one component",
            });
        }
        Ok(Self { centroids })
    }

    /// Build from owned codeword vectors.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        Self::new(stack_rows(rows)?)
    }

    /// Learn a codebook of `kmeans.k()` codewords from a training pool.
    pub fn train<R: Rng + ?Sized>(corpus: &[Vec<f64>], kmeans: &Kmeans, rng: &mut R) -> Result<Self> {
        let fit = kmeans.fit_with_rng(corpus, rng)?;
        info!(
            codewords = fit.k(),
            samples = corpus.len(),
            compactness = fit.compactness,
            "trained codebook"
        );
        Self::new(fit.centroids)
    }

    /// Number of codewords.
    pub fn len(&self) -> usize {
        self.centroids.nrows()
    }

    /// Always false; a codebook holds at least one codeword.
    pub fn is_empty(&self) -> bool {
        self.centroids.nrows() == 0
    }

    /// Dimension of every codeword.
    pub fn dim(&self) -> usize {
        self.centroids.ncols()
    }

    /// Codeword with id `index`.
    pub fn codeword(&self, index: usize) -> ArrayView1<'_, f64> {
        self.centroids.row(index)
    }

    /// Codewords in id order.
    pub fn codewords(&self) -> ndarray::iter::Lanes<'_, f64, ndarray::Ix1> {
        self.centroids.rows()
    }

    /// Codewords as a matrix, one per row.
    pub fn as_array(&self) -> &Array2<f64> {
        &self.centroids
    }

    /// Id of the codeword nearest to `query` (lowest id on ties).
    pub fn nearest(&self, query: ArrayView1<'_, f64>) -> Result<usize> {
        check_dim(self.dim(), query.len())?;
        nearest(query, self.codewords())
            .map(|(i, _)| i)
            .ok_or(Error::EmptyInput)
    }

    /// Write in the codebook text format.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writeln!(writer, "{}", self.len())?;
        for row in self.codewords() {
            writeln!(writer, "{}", join_values(row.iter()))?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Read the codebook text format.
    pub fn read_from<R: BufRead>(reader: R) -> Result<Self> {
        let mut lines = LineReader::new(reader);

        let header = lines.expect_line("codeword count")?;
        let mut tokens = header.tokens();
        let count: usize = match (tokens.next(), tokens.next()) {
            (Some(tok), None) => parse_token(header.number, tok, "codeword count")?,
            _ => return Err(Error::parse(header.number, "expected a single codeword count")),
        };
        if count == 0 {
            return Err(Error::parse(header.number, "codebook declares no codewords"));
        }

        let mut flat: Vec<f64> = Vec::new();
        let mut dim = 0;
        for i in 0..count {
            let line = lines.expect_line("codeword")?;
            let values = parse_values(line.number, line.tokens())?;
            if i == 0 {
                if values.is_empty() {
                    return Err(Error::parse(line.number, "empty codeword"));
                }
                dim = values.len();
                flat.reserve(count * dim);
            } else if values.len() != dim {
                return Err(Error::parse(
                    line.number,
                    format!("expected {dim} values, found {}", values.len()),
                ));
            }
            flat.extend(values);
        }

        let centroids = Array2::from_shape_vec((count, dim), flat)
            .map_err(|e| Error::parse(lines.line_no(), e.to_string()))?;
        Self::new(centroids)
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
