//! Error types for graphpe-core.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for positional-encoding operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Laplacian normalization string was not `none`, `sym` or `rw`.
    #[error("invalid normalization kind: {0:?} (expected none, sym or rw)")]
    InvalidNormalizationKind(String),

    /// Encoder name not recognized.
    #[error("unknown positional encoding: {0:?} (expected diffusion, pstep, adj or full)")]
    UnknownEncoding(String),

    /// Invalid encoder configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Graph structure is inconsistent.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Edge attributes missing or outside the declared cardinalities.
    #[error("invalid edge attributes: {0}")]
    InvalidEdgeAttr(String),

    /// More eigenvectors requested than the graph has nodes.
    #[error("insufficient eigenvectors: need {requested}, graph has {available} nodes")]
    InsufficientEigenvectors { requested: usize, available: usize },

    /// Cache file exists but could not be decoded.
    #[error("corrupt cache file {}: {source}", .path.display())]
    CorruptCache {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    /// Cached list is not aligned with the dataset.
    #[error("cache file {} holds {cached} encodings, dataset has {expected} graphs", .path.display())]
    CacheLengthMismatch {
        path: PathBuf,
        cached: usize,
        expected: usize,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary serialization error outside of cache loading.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),
}

/// Result type for positional-encoding operations.
pub type Result<T> = std::result::Result<T, Error>;
