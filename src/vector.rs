//! Vector arithmetic shared by clustering and quantization.
//!
//! Every routine here assumes its operands have the same length. Public entry
//! points of the crate check dimensions once (see [`stack_rows`] and
//! [`check_dim`]) so the inner loops only carry a `debug_assert`.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1, ArrayViewMut1};

/// Squared Euclidean distance.
#[inline]
pub fn squared_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

/// Euclidean distance.
#[inline]
pub fn euclidean_distance(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    squared_distance(a, b).sqrt()
}

/// `acc += v`, elementwise.
#[inline]
pub fn add_assign(mut acc: ArrayViewMut1<'_, f64>, v: ArrayView1<'_, f64>) {
    debug_assert_eq!(acc.len(), v.len());
    acc += &v;
}

/// `acc -= v`, elementwise.
#[inline]
pub fn sub_assign(mut acc: ArrayViewMut1<'_, f64>, v: ArrayView1<'_, f64>) {
    debug_assert_eq!(acc.len(), v.len());
    acc -= &v;
}

/// Index and squared distance of the candidate nearest to `query`.
///
/// Uses a strict less-than comparison, so among equidistant candidates the
/// lowest index wins. Returns `None` when there are no candidates.
pub fn nearest<'a, I>(query: ArrayView1<'_, f64>, candidates: I) -> Option<(usize, f64)>
where
    I: IntoIterator<Item = ArrayView1<'a, f64>>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, candidate) in candidates.into_iter().enumerate() {
        let dist = squared_distance(query, candidate);
        if best.map_or(true, |(_, best_dist)| dist < best_dist) {
            best = Some((i, dist));
        }
    }
    best
}

/// Fail with [`Error::DimensionMismatch`] unless `found == expected`.
#[inline]
pub fn check_dim(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { expected, found })
    }
}

/// Validate that `rows` is a non-empty set of equal-length, non-empty vectors
/// and return their common dimension.
pub fn common_dim(rows: &[Vec<f64>]) -> Result<usize> {
    let first = rows.first().ok_or(Error::EmptyInput)?;
    let dim = first.len();
    if dim == 0 {
        return Err(Error::InvalidParameter {
            name: "dimension",
            message: "feature vectors must have at least one component",
        });
    }
    for row in rows {
        check_dim(dim, row.len())?;
    }
    Ok(dim)
}

/// Copy `rows` into a row-major matrix, validating dimensions on the way.
pub fn stack_rows(rows: &[Vec<f64>]) -> Result<Array2<f64>> {
    let dim = common_dim(rows)?;
    let mut flat: Vec<f64> = Vec::with_capacity(rows.len() * dim);
    for row in rows {
        flat.extend_from_slice(row);
    }
    let expected = rows.len() * dim;
    Array2::from_shape_vec((rows.len(), dim), flat).map_err(|_| Error::DimensionMismatch {
        expected,
        found: rows.iter().map(Vec::len).sum(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_distances() {
        let a = array![0.0, 0.0];
        let b = array![3.0, 4.0];
        assert_eq!(squared_distance(a.view(), b.view()), 25.0);
        assert_eq!(euclidean_distance(a.view(), b.view()), 5.0);
    }

    #[test]
    fn test_add_then_sub_restores() {
        let mut acc = array![1.0, 2.0, 3.0];
        let v = array![0.5, -1.0, 4.0];
        add_assign(acc.view_mut(), v.view());
        assert_eq!(acc, array![1.5, 1.0, 7.0]);
        sub_assign(acc.view_mut(), v.view());
        assert_eq!(acc, array![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_nearest_prefers_lowest_index_on_tie() {
        let candidates = array![[0.0, 0.0], [2.0, 2.0], [0.0, 0.0]];
        let query = array![1.0, 1.0];
        for _ in 0..3 {
            let (idx, dist) = nearest(query.view(), candidates.rows()).unwrap();
            assert_eq!(idx, 0);
            assert_eq!(dist, 2.0);
        }
    }

    #[test]
    fn test_nearest_empty() {
        let query = array![1.0];
        let none: Vec<Array1<f64>> = Vec::new();
        assert!(nearest(query.view(), none.iter().map(|c| c.view())).is_none());
    }

    #[test]
    fn test_common_dim_errors() {
        assert!(matches!(common_dim(&[]), Err(Error::EmptyInput)));
        assert!(matches!(
            common_dim(&[vec![]]),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            common_dim(&[vec![1.0, 2.0], vec![1.0]]),
            Err(Error::DimensionMismatch {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_stack_rows() {
        let m = stack_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m, array![[1.0, 2.0], [3.0, 4.0]]);
    }
}
