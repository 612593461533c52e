//! One-hot expansion of categorical edge attributes.

use crate::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Bond feature cardinalities of ogbg-mol* datasets
/// (bond type, bond stereo, is-conjugated).
pub const MOLHIV_BOND_FEATURE_DIMS: [usize; 3] = [5, 6, 2];

/// Cardinalities of the categorical edge-attribute columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeFeatureDims {
    /// One column with 1-based codes in `1..=n`.
    Single(usize),
    /// One column per entry with 0-based codes in `0..n_k`.
    PerColumn(Vec<usize>),
}

impl Default for EdgeFeatureDims {
    fn default() -> Self {
        Self::Single(4)
    }
}

impl EdgeFeatureDims {
    /// Total one-hot width, i.e. the number of encoding channels.
    pub fn total(&self) -> usize {
        match self {
            Self::Single(n) => *n,
            Self::PerColumn(dims) => dims.iter().sum(),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let ok = match self {
            Self::Single(n) => *n > 0,
            Self::PerColumn(dims) => !dims.is_empty() && dims.iter().all(|&n| n > 0),
        };
        if ok {
            Ok(())
        } else {
            Err(Error::InvalidConfig(format!(
                "edge feature cardinalities must be non-empty and positive, got {self:?}"
            )))
        }
    }
}

/// Expand `edge_attr` (`E` rows) into an `[E, C]` one-hot matrix.
///
/// Columns of the result are laid out feature column by feature column, so
/// with dims `[4, 6]` slots `0..4` belong to column 0 and `4..10` to column 1.
pub fn edge_attr_one_hot(edge_attr: &[Vec<usize>], dims: &EdgeFeatureDims) -> Result<Array2<f64>> {
    let mut out = Array2::zeros((edge_attr.len(), dims.total()));

    for (e, row) in edge_attr.iter().enumerate() {
        match dims {
            EdgeFeatureDims::Single(n) => {
                let code = *row.first().ok_or_else(|| missing_column(e, 0))?;
                if code == 0 || code > *n {
                    return Err(Error::InvalidEdgeAttr(format!(
                        "edge {e}: code {code} outside 1..={n}"
                    )));
                }
                out[[e, code - 1]] = 1.0;
            }
            EdgeFeatureDims::PerColumn(col_dims) => {
                let mut offset = 0;
                for (col, &n) in col_dims.iter().enumerate() {
                    let code = *row.get(col).ok_or_else(|| missing_column(e, col))?;
                    if code >= n {
                        return Err(Error::InvalidEdgeAttr(format!(
                            "edge {e}, column {col}: code {code} outside 0..{n}"
                        )));
                    }
                    out[[e, offset + code]] = 1.0;
                    offset += n;
                }
            }
        }
    }

    Ok(out)
}

fn missing_column(edge: usize, col: usize) -> Error {
    Error::InvalidEdgeAttr(format!("edge {edge} has no column {col}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_column_is_one_based() {
        let oh = edge_attr_one_hot(&[vec![1], vec![4]], &EdgeFeatureDims::Single(4)).unwrap();
        assert_eq!(oh.shape(), &[2, 4]);
        assert_eq!(oh.row(0).to_vec(), vec![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(oh.row(1).to_vec(), vec![0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_single_column_rejects_zero() {
        assert!(edge_attr_one_hot(&[vec![0]], &EdgeFeatureDims::Single(4)).is_err());
    }

    #[test]
    fn test_per_column_concatenates() {
        let dims = EdgeFeatureDims::PerColumn(vec![4, 6]);
        assert_eq!(dims.total(), 10);
        let oh = edge_attr_one_hot(&[vec![3, 0], vec![0, 5]], &dims).unwrap();
        assert_eq!(oh.shape(), &[2, 10]);
        assert_eq!(oh[[0, 3]], 1.0);
        assert_eq!(oh[[0, 4]], 1.0);
        assert_eq!(oh[[1, 0]], 1.0);
        assert_eq!(oh[[1, 9]], 1.0);
        assert_eq!(oh.sum(), 4.0);
    }

    #[test]
    fn test_per_column_bounds() {
        let dims = EdgeFeatureDims::PerColumn(vec![2, 2]);
        assert!(edge_attr_one_hot(&[vec![0, 2]], &dims).is_err());
        assert!(edge_attr_one_hot(&[vec![0]], &dims).is_err());
    }

    #[test]
    fn test_untagged_serde() {
        let single: EdgeFeatureDims = serde_json::from_str("4").unwrap();
        assert_eq!(single, EdgeFeatureDims::Single(4));
        let multi: EdgeFeatureDims = serde_json::from_str("[5, 6, 2]").unwrap();
        assert_eq!(multi.total(), 13);
    }
}
