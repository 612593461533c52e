//! Relative positional encodings.
//!
//! Every encoder maps a [`Graph`] to an `N × N` matrix (or a stack of them,
//! one per edge-feature channel) that an attention layer can use as a bias
//! or kernel between node pairs.
//!
//! | Encoder | Kernel | Edge channels |
//! |---------|--------|---------------|
//! | [`DiffusionEncoding`] | `exp(-βL)` | yes |
//! | [`PStepEncoding`] | `(I - βL)^p` | yes |
//! | [`AdjEncoding`] | `A` | no |
//! | [`FullEncoding`] | `1 1ᵀ` | no |
//!
//! [`LapEncoding`] is the odd one out: it yields absolute, per-node
//! eigenvector features and never touches the cache.
//!
//! # Caching
//!
//! All four relative encoders share [`PositionalEncoder::apply_to`]: load
//! `{savepath}.{split}` if it exists, otherwise compute and persist. The
//! stored values are always taken before zero-diagonal masking, which is
//! re-applied on every call.

mod adjacency;
mod diffusion;
mod laplacian_pe;
mod pstep;

pub use adjacency::{AdjEncoding, FullEncoding};
pub use diffusion::DiffusionEncoding;
pub use laplacian_pe::LapEncoding;
pub use pstep::PStepEncoding;

use crate::cache::PeCache;
use crate::edge_attr::{edge_attr_one_hot, EdgeFeatureDims};
use crate::{Error, Graph, GraphDataset, Result};
use ndarray::{Array2, Array3, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// A per-graph relative positional encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Encoding {
    /// `[N, N]`
    Single(Array2<f64>),
    /// `[C, N, N]`, one channel per one-hot edge feature.
    Multi(Array3<f64>),
}

impl Encoding {
    pub fn num_nodes(&self) -> usize {
        match self {
            Self::Single(m) => m.nrows(),
            Self::Multi(t) => t.len_of(Axis(1)),
        }
    }

    /// 1 for single-channel encodings.
    pub fn num_channels(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(t) => t.len_of(Axis(0)),
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            Self::Single(m) => m.shape(),
            Self::Multi(t) => t.shape(),
        }
    }

    pub fn as_single(&self) -> Option<&Array2<f64>> {
        match self {
            Self::Single(m) => Some(m),
            Self::Multi(_) => None,
        }
    }

    pub fn as_multi(&self) -> Option<&Array3<f64>> {
        match self {
            Self::Multi(t) => Some(t),
            Self::Single(_) => None,
        }
    }

    /// Copy with the diagonal set to zero (per channel for stacked encodings).
    #[must_use]
    pub fn with_zero_diagonal(&self) -> Self {
        match self {
            Self::Single(m) => {
                let mut m = m.clone();
                m.diag_mut().fill(0.0);
                Self::Single(m)
            }
            Self::Multi(t) => {
                let mut t = t.clone();
                for mut channel in t.outer_iter_mut() {
                    channel.diag_mut().fill(0.0);
                }
                Self::Multi(t)
            }
        }
    }
}

/// Shared capability of the cached relative encoders.
pub trait PositionalEncoder {
    /// Encode a single graph.
    fn compute_pe(&self, graph: &Graph) -> Result<Encoding>;

    /// Where computed encodings are persisted, if anywhere.
    fn cache(&self) -> Option<&PeCache>;

    fn zero_diag(&self) -> bool;

    /// Attach encodings for every graph of `dataset` as `dataset.pe_list`.
    ///
    /// A cached list for `split` is reused when present and non-empty;
    /// otherwise encodings are computed in dataset order and written to the
    /// cache unless a file already exists there. Existing cache files are
    /// never overwritten, even if they were produced by a different
    /// configuration.
    fn apply_to(&self, dataset: &mut GraphDataset, split: &str) -> Result<()> {
        let cached = match self.cache() {
            Some(cache) => cache.load(split)?.filter(|pes| !pes.is_empty()),
            None => None,
        };

        let (raw, computed) = match cached {
            Some(pes) => {
                if pes.len() != dataset.len() {
                    return Err(Error::CacheLengthMismatch {
                        path: self.cache().map(|c| c.path_for(split)).unwrap_or_default(),
                        cached: pes.len(),
                        expected: dataset.len(),
                    });
                }
                debug!(split, graphs = pes.len(), "loaded positional encodings from cache");
                (pes, false)
            }
            None => {
                info!(split, graphs = dataset.len(), "computing positional encodings");
                let pes = dataset
                    .iter()
                    .map(|g| self.compute_pe(g))
                    .collect::<Result<Vec<_>>>()?;
                (pes, true)
            }
        };

        let pe_list = if self.zero_diag() {
            raw.iter().map(Encoding::with_zero_diagonal).collect()
        } else {
            raw.clone()
        };
        dataset.pe_list = Some(pe_list);

        if computed {
            if let Some(cache) = self.cache() {
                if !cache.save(split, &raw)? {
                    let path = cache.path_for(split);
                    warn!(
                        path = %path.display(),
                        "cache file already exists, freshly computed encodings not saved"
                    );
                }
            }
        }

        Ok(())
    }
}

/// Name of a relative encoder, as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PosEncodingKind {
    #[default]
    Diffusion,
    #[serde(rename = "pstep")]
    PStep,
    Adj,
    Full,
}

impl PosEncodingKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Diffusion => "diffusion",
            Self::PStep => "pstep",
            Self::Adj => "adj",
            Self::Full => "full",
        }
    }
}

impl fmt::Display for PosEncodingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PosEncodingKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "diffusion" => Ok(Self::Diffusion),
            "pstep" => Ok(Self::PStep),
            "adj" => Ok(Self::Adj),
            "full" => Ok(Self::Full),
            _ => Err(Error::UnknownEncoding(s.to_string())),
        }
    }
}

/// A configured relative encoder, dispatching on its kind.
#[derive(Debug, Clone)]
pub enum PosEncoding {
    Diffusion(DiffusionEncoding),
    PStep(PStepEncoding),
    Adj(AdjEncoding),
    Full(FullEncoding),
}

impl PosEncoding {
    pub fn kind(&self) -> PosEncodingKind {
        match self {
            Self::Diffusion(_) => PosEncodingKind::Diffusion,
            Self::PStep(_) => PosEncodingKind::PStep,
            Self::Adj(_) => PosEncodingKind::Adj,
            Self::Full(_) => PosEncodingKind::Full,
        }
    }

    fn inner(&self) -> &dyn PositionalEncoder {
        match self {
            Self::Diffusion(e) => e,
            Self::PStep(e) => e,
            Self::Adj(e) => e,
            Self::Full(e) => e,
        }
    }
}

impl PositionalEncoder for PosEncoding {
    fn compute_pe(&self, graph: &Graph) -> Result<Encoding> {
        self.inner().compute_pe(graph)
    }

    fn cache(&self) -> Option<&PeCache> {
        self.inner().cache()
    }

    fn zero_diag(&self) -> bool {
        self.inner().zero_diag()
    }
}

/// Run `kernel` once per one-hot edge-feature slot and stack the results.
///
/// `kernel` receives the slot's column as edge weights.
pub(crate) fn per_edge_channel<F>(graph: &Graph, dims: &EdgeFeatureDims, kernel: F) -> Result<Encoding>
where
    F: Fn(&[f64]) -> Result<Array2<f64>>,
{
    let edge_attr = graph
        .edge_attr
        .as_deref()
        .ok_or_else(|| Error::InvalidEdgeAttr("graph has no edge_attr".into()))?;
    let one_hot = edge_attr_one_hot(edge_attr, dims)?;

    let n = graph.num_nodes;
    let mut stacked = Array3::zeros((dims.total(), n, n));
    for (i, mut channel) in stacked.outer_iter_mut().enumerate() {
        let weights = one_hot.column(i).to_vec();
        channel.assign(&kernel(&weights)?);
    }
    Ok(Encoding::Multi(stacked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    #[test]
    fn test_zero_diagonal_single() {
        let e = Encoding::Single(arr2(&[[1.0, 2.0], [3.0, 4.0]]));
        let z = e.with_zero_diagonal();
        assert_eq!(z, Encoding::Single(arr2(&[[0.0, 2.0], [3.0, 0.0]])));
        // input untouched
        assert_eq!(e.as_single().unwrap()[[0, 0]], 1.0);
    }

    #[test]
    fn test_zero_diagonal_per_channel() {
        let t = Array3::from_elem((3, 2, 2), 1.0);
        let z = Encoding::Multi(t).with_zero_diagonal();
        let z = z.as_multi().unwrap();
        for c in 0..3 {
            assert_eq!(z[[c, 0, 0]], 0.0);
            assert_eq!(z[[c, 1, 1]], 0.0);
            assert_eq!(z[[c, 0, 1]], 1.0);
        }
    }

    #[test]
    fn test_kind_parsing() {
        for kind in [
            PosEncodingKind::Diffusion,
            PosEncodingKind::PStep,
            PosEncodingKind::Adj,
            PosEncodingKind::Full,
        ] {
            assert_eq!(kind.as_str().parse::<PosEncodingKind>().unwrap(), kind);
        }
        assert!(matches!(
            "gckn".parse::<PosEncodingKind>(),
            Err(Error::UnknownEncoding(_))
        ));
    }

    #[test]
    fn test_shapes() {
        let e = Encoding::Multi(Array3::zeros((10, 4, 4)));
        assert_eq!(e.num_channels(), 10);
        assert_eq!(e.num_nodes(), 4);
        assert_eq!(e.shape(), &[10, 4, 4]);
    }
}
