//! Encoder configuration and the name → encoder factory.

use crate::cache::PeCache;
use crate::edge_attr::EdgeFeatureDims;
use crate::encoding::{
    AdjEncoding, DiffusionEncoding, FullEncoding, PStepEncoding, PosEncoding, PosEncodingKind,
};
use crate::laplacian::Normalization;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Configuration for a relative positional encoder.
///
/// With no `kind`, `zero_diag` alone selects [`FullEncoding`] so masking
/// still has a matrix to act on; with neither there is nothing to build.
///
/// ```rust
/// use graphpe_core::{EncoderConfig, PosEncodingKind};
///
/// let config = EncoderConfig {
///     kind: Some(PosEncodingKind::PStep),
///     p: 3,
///     beta: 0.5,
///     ..Default::default()
/// };
/// assert_eq!(config.cache_stem("molhiv").unwrap(), "molhiv_pstep_sym_3_0.5_false");
/// let encoder = config.build().unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    pub kind: Option<PosEncodingKind>,
    /// Cache prefix; entries go to `{savepath}.{split}`.
    pub savepath: Option<PathBuf>,
    pub normalization: Normalization,
    pub zero_diag: bool,
    /// Diffusion bandwidth / random-walk step size.
    pub beta: f64,
    /// Random-walk order (p-step only).
    pub p: usize,
    pub use_edge_attr: bool,
    pub num_edge_features: EdgeFeatureDims,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            kind: None,
            savepath: None,
            normalization: Normalization::Sym,
            zero_diag: false,
            beta: 1.0,
            p: 1,
            use_edge_attr: false,
            num_edge_features: EdgeFeatureDims::default(),
        }
    }
}

impl EncoderConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_json_value(serde_json::from_reader(BufReader::new(file))?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_json_value(serde_json::from_str(json)?)
    }

    fn from_json_value(value: Value) -> Result<Self> {
        // Bad names surface as their own error kinds, not as generic JSON errors.
        if let Some(name) = value.get("normalization").and_then(Value::as_str) {
            name.parse::<Normalization>()?;
        }
        if let Some(name) = value.get("kind").and_then(Value::as_str) {
            name.parse::<PosEncodingKind>()?;
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The encoder `build` will construct.
    pub fn resolved_kind(&self) -> Result<PosEncodingKind> {
        match (self.kind, self.zero_diag) {
            (Some(kind), _) => Ok(kind),
            (None, true) => Ok(PosEncodingKind::Full),
            (None, false) => Err(Error::InvalidConfig(
                "no positional encoding configured: set a kind or enable zero_diag".into(),
            )),
        }
    }

    /// Cache file stem that fingerprints every parameter affecting the output.
    ///
    /// `{dataset}_{kind}_{normalization}` followed by `_{β}_{use_edge_attr}`
    /// for diffusion and `_{p}_{β}_{use_edge_attr}` for p-step. With edge
    /// attributes enabled the cardinalities follow: `_s{n}` for a single
    /// 1-based column, `_5-6-2` for per-column dims.
    pub fn cache_stem(&self, dataset: &str) -> Result<String> {
        let kind = self.resolved_kind()?;
        let params = match kind {
            PosEncodingKind::Diffusion => format!("_{}_{}", self.beta, self.use_edge_attr),
            PosEncodingKind::PStep => format!("_{}_{}_{}", self.p, self.beta, self.use_edge_attr),
            PosEncodingKind::Adj | PosEncodingKind::Full => String::new(),
        };
        let mut stem = format!("{dataset}_{kind}_{}{params}", self.normalization);
        if self.use_edge_attr {
            match &self.num_edge_features {
                EdgeFeatureDims::Single(n) => stem.push_str(&format!("_s{n}")),
                EdgeFeatureDims::PerColumn(dims) => {
                    let dims: Vec<String> = dims.iter().map(ToString::to_string).collect();
                    stem.push('_');
                    stem.push_str(&dims.join("-"));
                }
            }
        }
        Ok(stem)
    }

    /// Validate and construct the configured encoder.
    pub fn build(&self) -> Result<PosEncoding> {
        let cache = self.savepath.clone().map(PeCache::new);

        let encoding = match self.resolved_kind()? {
            PosEncodingKind::Diffusion => {
                let mut enc = DiffusionEncoding::new(self.beta, self.normalization)?
                    .with_zero_diag(self.zero_diag);
                if self.use_edge_attr {
                    enc = enc.with_edge_attr(self.num_edge_features.clone())?;
                }
                if let Some(cache) = cache {
                    enc = enc.with_cache(cache);
                }
                PosEncoding::Diffusion(enc)
            }
            PosEncodingKind::PStep => {
                let mut enc = PStepEncoding::new(self.p, self.beta, self.normalization)?
                    .with_zero_diag(self.zero_diag);
                if self.use_edge_attr {
                    enc = enc.with_edge_attr(self.num_edge_features.clone())?;
                }
                if let Some(cache) = cache {
                    enc = enc.with_cache(cache);
                }
                PosEncoding::PStep(enc)
            }
            PosEncodingKind::Adj => {
                let mut enc = AdjEncoding::new(self.normalization).with_zero_diag(self.zero_diag);
                if let Some(cache) = cache {
                    enc = enc.with_cache(cache);
                }
                PosEncoding::Adj(enc)
            }
            PosEncodingKind::Full => {
                let mut enc = FullEncoding::new(self.zero_diag);
                if let Some(cache) = cache {
                    enc = enc.with_cache(cache);
                }
                PosEncoding::Full(enc)
            }
        };
        Ok(encoding)
    }
}
