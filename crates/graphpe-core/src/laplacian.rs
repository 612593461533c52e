//! Graph Laplacians.
//!
//! ```text
//! none:  L = D - A
//! sym:   L = I - D^{-1/2} A D^{-1/2}
//! rw:    L = I - D^{-1} A
//! ```
//!
//! Self-loops are dropped before the degree is taken, duplicate edges sum,
//! and `D_ii = Σ_j A_ij` (out-degree). For the normalized variants a node
//! with zero degree gets `D^{-1/2}_ii = D^{-1}_ii = 0`, so its row is the
//! identity row rather than a division by zero.

use crate::sparse::SparseMatrix;
use crate::{Error, Graph, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Laplacian normalization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Normalization {
    /// Combinatorial Laplacian `D - A`.
    None,
    /// Symmetric normalization.
    #[default]
    Sym,
    /// Random-walk normalization.
    Rw,
}

impl Normalization {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sym => "sym",
            Self::Rw => "rw",
        }
    }
}

impl fmt::Display for Normalization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Normalization {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "sym" => Ok(Self::Sym),
            "rw" => Ok(Self::Rw),
            _ => Err(Error::InvalidNormalizationKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for Normalization {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Build the Laplacian of a directed, weighted edge list.
///
/// `edge_weight = None` means every edge has weight 1.
pub fn laplacian(
    edge_index: &(Vec<usize>, Vec<usize>),
    edge_weight: Option<&[f64]>,
    num_nodes: usize,
    normalization: Normalization,
) -> Result<SparseMatrix> {
    let (src, dst) = edge_index;
    if let Some(w) = edge_weight {
        if w.len() != src.len() {
            return Err(Error::InvalidGraph(format!(
                "{} edge weights for {} edges",
                w.len(),
                src.len()
            )));
        }
    }
    let weight = |k: usize| edge_weight.map_or(1.0, |w| w[k]);

    let edges: Vec<(usize, usize, f64)> = src
        .iter()
        .zip(dst)
        .enumerate()
        .filter(|(_, (u, v))| u != v)
        .map(|(k, (&u, &v))| (u, v, weight(k)))
        .collect();

    let degree = degrees(edge_index, edge_weight, num_nodes);

    let mut triplets = Vec::with_capacity(edges.len() + num_nodes);
    match normalization {
        Normalization::None => {
            triplets.extend(edges.iter().map(|&(u, v, w)| (u, v, -w)));
            triplets.extend(degree.iter().enumerate().map(|(i, &d)| (i, i, d)));
        }
        Normalization::Sym => {
            let inv_sqrt: Vec<f64> = degree.iter().map(|&d| safe_inverse(d.sqrt())).collect();
            triplets.extend(
                edges
                    .iter()
                    .map(|&(u, v, w)| (u, v, -(inv_sqrt[u] * w * inv_sqrt[v]))),
            );
            triplets.extend((0..num_nodes).map(|i| (i, i, 1.0)));
        }
        Normalization::Rw => {
            let inv: Vec<f64> = degree.iter().map(|&d| safe_inverse(d)).collect();
            triplets.extend(edges.iter().map(|&(u, v, w)| (u, v, -(inv[u] * w))));
            triplets.extend((0..num_nodes).map(|i| (i, i, 1.0)));
        }
    }

    Ok(SparseMatrix::from_triplets(num_nodes, num_nodes, &triplets))
}

/// Weighted out-degree of every node, self-loops excluded.
///
/// Panics if `edge_weight` is shorter than the edge list.
pub fn degrees(
    edge_index: &(Vec<usize>, Vec<usize>),
    edge_weight: Option<&[f64]>,
    num_nodes: usize,
) -> Vec<f64> {
    let mut degree = vec![0.0; num_nodes];
    for (k, (&u, &v)) in edge_index.0.iter().zip(&edge_index.1).enumerate() {
        if u != v {
            degree[u] += edge_weight.map_or(1.0, |w| w[k]);
        }
    }
    degree
}

/// Unweighted Laplacian of a graph.
pub fn graph_laplacian(graph: &Graph, normalization: Normalization) -> Result<SparseMatrix> {
    laplacian(&graph.edge_index, None, graph.num_nodes, normalization)
}

fn safe_inverse(x: f64) -> f64 {
    let inv = x.recip();
    if inv.is_finite() {
        inv
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path3() -> Graph {
        Graph::undirected(3, &[(0, 1), (1, 2)]).unwrap()
    }

    #[test]
    fn test_path_combinatorial() {
        let l = graph_laplacian(&path3(), Normalization::None).unwrap().to_dense();
        let expected = ndarray::arr2(&[[1.0, -1.0, 0.0], [-1.0, 2.0, -1.0], [0.0, -1.0, 1.0]]);
        assert_eq!(l, expected);
    }

    #[test]
    fn test_path_sym() {
        let l = graph_laplacian(&path3(), Normalization::Sym).unwrap();
        let off = -1.0 / 2.0_f64.sqrt();
        assert!((l.get(0, 1) - off).abs() < 1e-12);
        assert!((l.get(1, 2) - off).abs() < 1e-12);
        assert_eq!(l.get(1, 1), 1.0);
        assert_eq!(l.get(0, 2), 0.0);
    }

    #[test]
    fn test_path_rw() {
        let l = graph_laplacian(&path3(), Normalization::Rw).unwrap();
        assert_eq!(l.get(0, 1), -1.0);
        assert_eq!(l.get(1, 0), -0.5);
        assert_eq!(l.get(1, 2), -0.5);
        for s in l.row_sums() {
            assert!(s.abs() < 1e-12);
        }
    }

    #[test]
    fn test_self_loops_ignored() {
        let g = Graph::new(2, vec![0, 0, 1], vec![0, 1, 0]).unwrap();
        let l = graph_laplacian(&g, Normalization::None).unwrap();
        assert_eq!(l.get(0, 0), 1.0);
        assert_eq!(l.get(0, 1), -1.0);
    }

    #[test]
    fn test_duplicate_edges_sum() {
        let g = Graph::new(2, vec![0, 0, 1, 1], vec![1, 1, 0, 0]).unwrap();
        let l = graph_laplacian(&g, Normalization::None).unwrap();
        assert_eq!(l.get(0, 0), 2.0);
        assert_eq!(l.get(0, 1), -2.0);
    }

    #[test]
    fn test_single_node() {
        let g = Graph::new(1, vec![0], vec![0]).unwrap();
        assert_eq!(graph_laplacian(&g, Normalization::None).unwrap().get(0, 0), 0.0);
        assert_eq!(graph_laplacian(&g, Normalization::Sym).unwrap().get(0, 0), 1.0);
        assert_eq!(graph_laplacian(&g, Normalization::Rw).unwrap().get(0, 0), 1.0);
    }

    #[test]
    fn test_weighted() {
        let g = path3();
        let w = [2.0, 2.0, 0.0, 0.0];
        let l = laplacian(&g.edge_index, Some(&w[..]), 3, Normalization::None).unwrap();
        assert_eq!(l.get(0, 0), 2.0);
        assert_eq!(l.get(1, 1), 2.0);
        assert_eq!(l.get(2, 2), 0.0);
        assert!(laplacian(&g.edge_index, Some(&w[..2]), 3, Normalization::None).is_err());
    }

    #[test]
    fn test_parse_normalization() {
        assert_eq!("sym".parse::<Normalization>().unwrap(), Normalization::Sym);
        assert_eq!("RW".parse::<Normalization>().unwrap(), Normalization::Rw);
        assert_eq!("none".parse::<Normalization>().unwrap(), Normalization::None);
        let err = "laplace".parse::<Normalization>().unwrap_err();
        assert!(matches!(err, Error::InvalidNormalizationKind(ref s) if s == "laplace"));
    }

    #[test]
    fn test_deserialize_like_parse() {
        let n: Normalization = serde_json::from_str(r#""Sym""#).unwrap();
        assert_eq!(n, Normalization::Sym);
        assert_eq!(serde_json::to_string(&Normalization::Rw).unwrap(), r#""rw""#);

        let err = serde_json::from_str::<Normalization>(r#""laplace""#).unwrap_err();
        assert!(err.to_string().contains("invalid normalization kind"), "{err}");
    }
}
