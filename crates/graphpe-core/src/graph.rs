use crate::{Encoding, Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// A graph in edge-list form.
///
/// `edge_index` holds `(sources, targets)`; edges are directed, so an
/// undirected bond appears twice. Duplicates and self-loops are allowed.
///
/// # Example
///
/// ```rust
/// use graphpe_core::Graph;
///
/// // Path 0 - 1 - 2
/// let g = Graph::undirected(3, &[(0, 1), (1, 2)]).unwrap();
/// assert_eq!(g.num_nodes, 3);
/// assert_eq!(g.num_edges(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    pub num_nodes: usize,
    pub edge_index: (Vec<usize>, Vec<usize>),
    /// One row per edge, one categorical code per column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_attr: Option<Vec<Vec<usize>>>,
}

impl Graph {
    /// Create a graph from directed edge endpoints.
    pub fn new(num_nodes: usize, sources: Vec<usize>, targets: Vec<usize>) -> Result<Self> {
        let g = Self {
            num_nodes,
            edge_index: (sources, targets),
            edge_attr: None,
        };
        g.validate()?;
        Ok(g)
    }

    /// Create a graph from undirected edges, inserting both directions.
    ///
    /// Edge `k` of the input becomes edges `2k` and `2k + 1`.
    pub fn undirected(num_nodes: usize, edges: &[(usize, usize)]) -> Result<Self> {
        let mut sources = Vec::with_capacity(edges.len() * 2);
        let mut targets = Vec::with_capacity(edges.len() * 2);
        for &(u, v) in edges {
            sources.extend([u, v]);
            targets.extend([v, u]);
        }
        Self::new(num_nodes, sources, targets)
    }

    /// Attach per-edge categorical attributes.
    pub fn with_edge_attr(mut self, edge_attr: Vec<Vec<usize>>) -> Result<Self> {
        self.edge_attr = Some(edge_attr);
        self.validate()?;
        Ok(self)
    }

    pub fn num_edges(&self) -> usize {
        self.edge_index.0.len()
    }

    /// Iterate over `(source, target)` pairs.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.edge_index
            .0
            .iter()
            .copied()
            .zip(self.edge_index.1.iter().copied())
    }

    /// Check structural consistency.
    pub fn validate(&self) -> Result<()> {
        if self.num_nodes == 0 {
            return Err(Error::InvalidGraph("graph has no nodes".into()));
        }
        let (src, dst) = &self.edge_index;
        if src.len() != dst.len() {
            return Err(Error::InvalidGraph(format!(
                "edge_index rows differ in length: {} vs {}",
                src.len(),
                dst.len()
            )));
        }
        if let Some(&bad) = src.iter().chain(dst).find(|&&v| v >= self.num_nodes) {
            return Err(Error::InvalidGraph(format!(
                "node id {bad} out of range for {} nodes",
                self.num_nodes
            )));
        }
        if let Some(attr) = &self.edge_attr {
            if attr.len() != src.len() {
                return Err(Error::InvalidGraph(format!(
                    "edge_attr has {} rows for {} edges",
                    attr.len(),
                    src.len()
                )));
            }
        }
        Ok(())
    }
}

/// Mutable container of graphs for one dataset split.
///
/// Encoders attach their output here: [`PositionalEncoder::apply_to`] fills
/// `pe_list`, [`LapEncoding::apply_to`] fills `lap_pe_list` and `lap_pe_dim`.
///
/// [`PositionalEncoder::apply_to`]: crate::PositionalEncoder::apply_to
/// [`LapEncoding::apply_to`]: crate::LapEncoding::apply_to
#[derive(Debug, Clone, Default)]
pub struct GraphDataset {
    graphs: Vec<Graph>,
    pub pe_list: Option<Vec<Encoding>>,
    pub lap_pe_list: Option<Vec<Array2<f64>>>,
    pub lap_pe_dim: Option<usize>,
}

impl GraphDataset {
    pub fn new(graphs: Vec<Graph>) -> Self {
        Self {
            graphs,
            ..Default::default()
        }
    }

    /// Load a JSON array of graphs.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let graphs: Vec<Graph> = serde_json::from_reader(BufReader::new(file))?;
        for (i, g) in graphs.iter().enumerate() {
            g.validate()
                .map_err(|e| Error::InvalidGraph(format!("graph {i}: {e}")))?;
        }
        Ok(Self::new(graphs))
    }

    /// Select graphs by index, e.g. a train/valid/test split.
    ///
    /// Encodings are not carried over.
    pub fn subset(&self, indices: &[usize]) -> Result<Self> {
        let graphs = indices
            .iter()
            .map(|&i| {
                self.graphs.get(i).cloned().ok_or_else(|| {
                    Error::InvalidConfig(format!(
                        "split index {i} out of range for {} graphs",
                        self.graphs.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(graphs))
    }

    pub fn graphs(&self) -> &[Graph] {
        &self.graphs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Graph> {
        self.graphs.iter()
    }

    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

impl<'a> IntoIterator for &'a GraphDataset {
    type Item = &'a Graph;
    type IntoIter = std::slice::Iter<'a, Graph>;

    fn into_iter(self) -> Self::IntoIter {
        self.graphs.iter()
    }
}
