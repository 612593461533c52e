//! Absolute positional encoding from Laplacian eigenvectors.
//!
//! Each node gets the coordinates of the `dim` eigenvectors that follow the
//! smallest eigenvalue. The first eigenvector is skipped: for a connected
//! graph it is constant (or `D^{1/2} 1` for the symmetric normalization) and
//! says nothing about where a node sits.
//!
//! Eigenvector signs are arbitrary; models usually randomize them during
//! training.
//!
//! Only undirected graphs are accepted: every edge `u → v` must be matched by
//! `v → u` with the same total weight. Directed input is an
//! [`Error::InvalidGraph`].
//!
//! # References
//!
//! - Dwivedi & Bresson (2021). "A Generalization of Transformer Networks to
//!   Graphs"

use crate::laplacian::{degrees, laplacian, Normalization};
use crate::{Error, Graph, GraphDataset, Result};
use nalgebra::{DMatrix, DVector};
use ndarray::Array2;
use tracing::info;

/// Laplacian eigenvector encoding, `[N, dim]` per graph.
///
/// Not cached: [`LapEncoding::apply_to`] recomputes on every call.
#[derive(Debug, Clone)]
pub struct LapEncoding {
    dim: usize,
    normalization: Normalization,
    use_edge_attr: bool,
}

impl LapEncoding {
    pub fn new(dim: usize, normalization: Normalization) -> Result<Self> {
        if dim == 0 {
            return Err(Error::InvalidConfig("eigenvector dimension must be at least 1".into()));
        }
        Ok(Self {
            dim,
            normalization,
            use_edge_attr: false,
        })
    }

    /// Weight edges by a single-column `edge_attr`.
    pub fn with_edge_attr(mut self, use_edge_attr: bool) -> Self {
        self.use_edge_attr = use_edge_attr;
        self
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Eigenvectors `2..=dim+1` (ascending eigenvalue) as columns.
    pub fn compute_pe(&self, graph: &Graph) -> Result<Array2<f64>> {
        let n = graph.num_nodes;
        if self.dim + 1 > n {
            return Err(Error::InsufficientEigenvectors {
                requested: self.dim + 1,
                available: n,
            });
        }

        let weights = if self.use_edge_attr {
            Some(edge_weights(graph)?)
        } else {
            None
        };
        ensure_undirected(graph, weights.as_deref())?;
        let (values, vectors) = self.spectrum(graph, weights.as_deref())?;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

        Ok(Array2::from_shape_fn((n, self.dim), |(i, c)| {
            vectors[(i, order[c + 1])]
        }))
    }

    /// Eigenvalues and unit-norm eigenvectors (columns) of the Laplacian.
    fn spectrum(&self, graph: &Graph, weights: Option<&[f64]>) -> Result<(DVector<f64>, DMatrix<f64>)> {
        let n = graph.num_nodes;
        match self.normalization {
            Normalization::None | Normalization::Sym => {
                let l = laplacian(&graph.edge_index, weights, n, self.normalization)?;
                let eig = l.symmetrized_dense().symmetric_eigen();
                Ok((eig.eigenvalues, eig.eigenvectors))
            }
            Normalization::Rw => {
                // L_rw = S L_sym S^{-1} with S = D^{-1/2}, so S v is an
                // eigenvector of L_rw for every eigenvector v of L_sym.
                // Isolated nodes have identity rows in both, S_ii = 1 there.
                let l = laplacian(&graph.edge_index, weights, n, Normalization::Sym)?;
                let eig = l.symmetrized_dense().symmetric_eigen();
                let scale: Vec<f64> = degrees(&graph.edge_index, weights, n)
                    .into_iter()
                    .map(|d| if d > 0.0 { d.sqrt().recip() } else { 1.0 })
                    .collect();

                let mut vectors = eig.eigenvectors;
                for mut col in vectors.column_iter_mut() {
                    for (x, s) in col.iter_mut().zip(&scale) {
                        *x *= s;
                    }
                    let norm = col.norm();
                    if norm > 0.0 {
                        col /= norm;
                    }
                }
                Ok((eig.eigenvalues, vectors))
            }
        }
    }

    /// Attach encodings as `dataset.lap_pe_list` and set `lap_pe_dim`.
    pub fn apply_to(&self, dataset: &mut GraphDataset) -> Result<()> {
        info!(graphs = dataset.len(), dim = self.dim, "computing Laplacian eigenvector encodings");
        let list = dataset
            .iter()
            .map(|g| self.compute_pe(g))
            .collect::<Result<Vec<_>>>()?;
        dataset.lap_pe_list = Some(list);
        dataset.lap_pe_dim = Some(self.dim);
        Ok(())
    }
}

/// Reject graphs whose weighted adjacency is not symmetric.
fn ensure_undirected(graph: &Graph, weights: Option<&[f64]>) -> Result<()> {
    // Off-diagonal entries of `D - A` are `-A`, self-loops already dropped.
    let l = laplacian(&graph.edge_index, weights, graph.num_nodes, Normalization::None)?;
    for i in 0..graph.num_nodes {
        for (j, a) in l.row(i).filter(|&(j, _)| j != i) {
            let b = l.get(j, i);
            if (a - b).abs() > 1e-12 * (1.0 + a.abs().max(b.abs())) {
                return Err(Error::InvalidGraph(format!(
                    "eigenvector encoding needs an undirected graph: weight {i}->{j} is {}, {j}->{i} is {}",
                    -a, -b
                )));
            }
        }
    }
    Ok(())
}

/// Edge weights from a single-column `edge_attr`.
fn edge_weights(graph: &Graph) -> Result<Vec<f64>> {
    let attr = graph
        .edge_attr
        .as_deref()
        .ok_or_else(|| Error::InvalidEdgeAttr("graph has no edge_attr".into()))?;
    attr.iter()
        .enumerate()
        .map(|(e, row)| match row.as_slice() {
            [w] => Ok(*w as f64),
            _ => Err(Error::InvalidEdgeAttr(format!(
                "edge {e}: eigenvector encoding needs exactly one attribute column, got {}",
                row.len()
            ))),
        })
        .collect()
}
