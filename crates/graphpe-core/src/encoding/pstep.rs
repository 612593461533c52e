//! P-step random-walk encoding.
//!
//! ```text
//! K = (I - β L)^p
//! ```
//!
//! A truncated, polynomial stand-in for the diffusion kernel: `K_ij` is
//! non-zero only for nodes at most `p` hops apart. With the random-walk
//! Laplacian and β = 1 this is exactly the p-step transition matrix
//! `(D^{-1} A)^p`.

use super::{per_edge_channel, Encoding, PositionalEncoder};
use crate::cache::PeCache;
use crate::edge_attr::EdgeFeatureDims;
use crate::laplacian::{laplacian, Normalization};
use crate::sparse::SparseMatrix;
use crate::{Error, Graph, Result};
use ndarray::Array2;

/// P-step random-walk kernel `(I - βL)^p` per graph.
#[derive(Debug, Clone)]
pub struct PStepEncoding {
    cache: Option<PeCache>,
    p: usize,
    beta: f64,
    normalization: Normalization,
    zero_diag: bool,
    use_edge_attr: bool,
    num_edge_features: EdgeFeatureDims,
}

impl PStepEncoding {
    /// Fails with [`Error::InvalidConfig`] for `p = 0` or a non-finite β.
    pub fn new(p: usize, beta: f64, normalization: Normalization) -> Result<Self> {
        if p == 0 {
            return Err(Error::InvalidConfig("p-step walk order must be at least 1".into()));
        }
        if !beta.is_finite() {
            return Err(Error::InvalidConfig(format!("beta must be finite, got {beta}")));
        }
        Ok(Self {
            cache: None,
            p,
            beta,
            normalization,
            zero_diag: false,
            use_edge_attr: false,
            num_edge_features: EdgeFeatureDims::default(),
        })
    }

    pub fn with_cache(mut self, cache: PeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_zero_diag(mut self, zero_diag: bool) -> Self {
        self.zero_diag = zero_diag;
        self
    }

    /// Compute one channel per one-hot edge feature.
    pub fn with_edge_attr(mut self, num_edge_features: EdgeFeatureDims) -> Result<Self> {
        num_edge_features.validate()?;
        self.use_edge_attr = true;
        self.num_edge_features = num_edge_features;
        Ok(self)
    }

    pub fn p(&self) -> usize {
        self.p
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// The one-step operator `I - βL`.
    pub fn base_matrix(&self, graph: &Graph, edge_weight: Option<&[f64]>) -> Result<SparseMatrix> {
        let l = laplacian(&graph.edge_index, edge_weight, graph.num_nodes, self.normalization)?;
        Ok(SparseMatrix::identity(graph.num_nodes).add(&l.scaled(-self.beta)))
    }

    fn kernel(&self, graph: &Graph, edge_weight: Option<&[f64]>) -> Result<Array2<f64>> {
        let step = self.base_matrix(graph, edge_weight)?;
        let mut acc = step.clone();
        for _ in 1..self.p {
            acc = acc.matmul(&step);
        }
        Ok(acc.to_dense())
    }
}

impl PositionalEncoder for PStepEncoding {
    fn compute_pe(&self, graph: &Graph) -> Result<Encoding> {
        if self.use_edge_attr {
            per_edge_channel(graph, &self.num_edge_features, |w| self.kernel(graph, Some(w)))
        } else {
            self.kernel(graph, None).map(Encoding::Single)
        }
    }

    fn cache(&self) -> Option<&PeCache> {
        self.cache.as_ref()
    }

    fn zero_diag(&self) -> bool {
        self.zero_diag
    }
}
