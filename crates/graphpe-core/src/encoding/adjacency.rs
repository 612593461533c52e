//! Structure-only baselines: raw adjacency and the constant encoding.

use super::{Encoding, PositionalEncoder};
use crate::cache::PeCache;
use crate::laplacian::Normalization;
use crate::{Graph, Result};
use ndarray::Array2;

/// Dense adjacency matrix `A` of each graph.
///
/// Duplicate edges accumulate and self-loops are kept. The normalization is
/// recorded for configuration symmetry with the Laplacian-based encoders but
/// never applied.
#[derive(Debug, Clone)]
pub struct AdjEncoding {
    cache: Option<PeCache>,
    normalization: Normalization,
    zero_diag: bool,
}

impl AdjEncoding {
    pub fn new(normalization: Normalization) -> Self {
        Self {
            cache: None,
            normalization,
            zero_diag: false,
        }
    }

    pub fn with_cache(mut self, cache: PeCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_zero_diag(mut self, zero_diag: bool) -> Self {
        self.zero_diag = zero_diag;
        self
    }

    pub fn normalization(&self) -> Normalization {
        self.normalization
    }
}

impl PositionalEncoder for AdjEncoding {
    fn compute_pe(&self, graph: &Graph) -> Result<Encoding> {
        let mut adj = Array2::zeros((graph.num_nodes, graph.num_nodes));
        for (u, v) in graph.edges() {
            adj[[u, v]] += 1.0;
        }
        Ok(Encoding::Single(adj))
    }

    fn cache(&self) -> Option<&PeCache> {
        self.cache.as_ref()
    }

    fn zero_diag(&self) -> bool {
        self.zero_diag
    }
}

/// All-ones `N × N` matrix.
///
/// Carries no structure by itself; combined with zero-diagonal masking it
/// lets attention see every node except itself.
#[derive(Debug, Clone, Default)]
pub struct FullEncoding {
    cache: Option<PeCache>,
    zero_diag: bool,
}

impl FullEncoding {
    pub fn new(zero_diag: bool) -> Self {
        Self {
            cache: None,
            zero_diag,
        }
    }

    pub fn with_cache(mut self, cache: PeCache) -> Self {
        self.cache = Some(cache);
        self
    }
}

impl PositionalEncoder for FullEncoding {
    fn compute_pe(&self, graph: &Graph) -> Result<Encoding> {
        Ok(Encoding::Single(Array2::ones((
            graph.num_nodes,
            graph.num_nodes,
        ))))
    }

    fn cache(&self) -> Option<&PeCache> {
        self.cache.as_ref()
    }

    fn zero_diag(&self) -> bool {
        self.zero_diag
    }
}
