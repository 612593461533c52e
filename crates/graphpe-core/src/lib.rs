#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]

//! Structural positional encodings for graph transformers.
//!
//! Turns a graph's connectivity into dense matrices an attention layer can
//! consume:
//!
//! - [`DiffusionEncoding`] - heat kernel `exp(-βL)`
//! - [`PStepEncoding`] - p-step random walk `(I - βL)^p`
//! - [`AdjEncoding`] - raw adjacency
//! - [`FullEncoding`] - all-ones baseline
//! - [`LapEncoding`] - Laplacian eigenvectors (absolute, per node)
//!
//! The first four can condition on categorical edge attributes (one channel
//! per one-hot feature) and share a per-split on-disk cache through
//! [`PositionalEncoder::apply_to`].
//!
//! # Example
//!
//! ```rust
//! use graphpe_core::{DiffusionEncoding, Graph, GraphDataset, Normalization, PositionalEncoder};
//!
//! let mut train = GraphDataset::new(vec![
//!     Graph::undirected(3, &[(0, 1), (1, 2)]).unwrap(),
//!     Graph::undirected(4, &[(0, 1), (0, 2), (0, 3)]).unwrap(),
//! ]);
//!
//! let encoder = DiffusionEncoding::new(1.0, Normalization::Sym)
//!     .unwrap()
//!     .with_zero_diag(true);
//! encoder.apply_to(&mut train, "train").unwrap();
//!
//! let pe = train.pe_list.as_ref().unwrap();
//! assert_eq!(pe[1].shape(), &[4, 4]);
//! assert_eq!(pe[1].as_single().unwrap()[[2, 2]], 0.0);
//! ```

pub mod cache;
mod config;
pub mod edge_attr;
pub mod encoding;
mod error;
mod graph;
pub mod laplacian;
pub mod sparse;

pub use cache::PeCache;
pub use config::EncoderConfig;
pub use edge_attr::{edge_attr_one_hot, EdgeFeatureDims, MOLHIV_BOND_FEATURE_DIMS};
pub use encoding::{
    AdjEncoding, DiffusionEncoding, Encoding, FullEncoding, LapEncoding, PStepEncoding,
    PosEncoding, PosEncodingKind, PositionalEncoder,
};
pub use error::{Error, Result};
pub use graph::{Graph, GraphDataset};
pub use laplacian::{laplacian, Normalization};
