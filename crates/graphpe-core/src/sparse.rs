//! Compressed sparse row matrices.
//!
//! Just enough sparse linear algebra for Laplacians: construction from
//! coordinate triplets (duplicates sum), scaling, addition, and the
//! sparse × sparse product used by p-step random-walk kernels.

use nalgebra::DMatrix;
use ndarray::Array2;

/// Square or rectangular `f64` matrix in CSR form.
///
/// Column indices within a row are strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    n_rows: usize,
    n_cols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    /// Build from `(row, col, value)` triplets, summing duplicates.
    pub fn from_triplets(n_rows: usize, n_cols: usize, triplets: &[(usize, usize, f64)]) -> Self {
        let mut sorted = triplets.to_vec();
        sorted.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut row_ptr = vec![0; n_rows + 1];
        let mut col_idx = Vec::with_capacity(sorted.len());
        let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
        let mut last: Option<(usize, usize)> = None;

        for (r, c, v) in sorted {
            debug_assert!(r < n_rows && c < n_cols, "triplet ({r}, {c}) out of bounds");
            if last == Some((r, c)) {
                if let Some(acc) = values.last_mut() {
                    *acc += v;
                }
                continue;
            }
            row_ptr[r + 1] += 1;
            col_idx.push(c);
            values.push(v);
            last = Some((r, c));
        }

        for i in 0..n_rows {
            row_ptr[i + 1] += row_ptr[i];
        }

        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![1.0; n],
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Number of stored entries (explicit zeros included).
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Stored entries of row `i` as `(col, value)`.
    pub fn row(&self, i: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Entry `(i, j)`, zero if not stored.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        match self.col_idx[range.clone()].binary_search(&j) {
            Ok(pos) => self.values[range.start + pos],
            Err(_) => 0.0,
        }
    }

    fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.n_rows).flat_map(move |i| self.row(i).map(move |(j, v)| (i, j, v)))
    }

    /// Multiply every entry by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f64) -> Self {
        let mut out = self.clone();
        for v in &mut out.values {
            *v *= factor;
        }
        out
    }

    /// Entry-wise sum. Panics on shape mismatch.
    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        assert_eq!(self.shape(), other.shape(), "shape mismatch in sparse add");
        let triplets: Vec<_> = self.triplets().chain(other.triplets()).collect();
        Self::from_triplets(self.n_rows, self.n_cols, &triplets)
    }

    /// Sparse × sparse product (row-wise accumulation).
    ///
    /// Panics if the inner dimensions differ.
    #[must_use]
    pub fn matmul(&self, other: &Self) -> Self {
        assert_eq!(self.n_cols, other.n_rows, "inner dimension mismatch in sparse matmul");

        let mut row_ptr = Vec::with_capacity(self.n_rows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);

        // Dense accumulator for one output row; `touched` records which
        // columns are live so we only sort/reset those.
        let mut acc = vec![0.0; other.n_cols];
        let mut live = vec![false; other.n_cols];
        let mut touched = Vec::new();

        for i in 0..self.n_rows {
            for (k, a) in self.row(i) {
                for (j, b) in other.row(k) {
                    if !live[j] {
                        live[j] = true;
                        touched.push(j);
                    }
                    acc[j] += a * b;
                }
            }
            touched.sort_unstable();
            for &j in &touched {
                col_idx.push(j);
                values.push(acc[j]);
                acc[j] = 0.0;
                live[j] = false;
            }
            touched.clear();
            row_ptr.push(col_idx.len());
        }

        Self {
            n_rows: self.n_rows,
            n_cols: other.n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// `(self + selfᵀ) / 2` as a dense matrix.
    pub fn symmetrized_dense(&self) -> DMatrix<f64> {
        let m = self.to_dmatrix();
        (&m + m.transpose()) * 0.5
    }

    pub fn row_sums(&self) -> Vec<f64> {
        (0..self.n_rows).map(|i| self.row(i).map(|(_, v)| v).sum()).collect()
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut out = Array2::zeros((self.n_rows, self.n_cols));
        for (i, j, v) in self.triplets() {
            out[[i, j]] += v;
        }
        out
    }

    pub fn to_dmatrix(&self) -> DMatrix<f64> {
        let mut out = DMatrix::zeros(self.n_rows, self.n_cols);
        for (i, j, v) in self.triplets() {
            out[(i, j)] += v;
        }
        out
    }
}

/// Copy a dense `nalgebra` matrix into an `ndarray` one.
pub fn dmatrix_to_array(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}
