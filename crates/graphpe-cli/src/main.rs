//! graphpe - compute graph positional encodings from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Summarize a dataset split (JSON array of graphs)
//! graphpe stats train.json
//!
//! # Heat-kernel encodings, cached per split under cache/pe
//! graphpe encode train.json --split train --pos-enc diffusion --beta 1.0 \
//!     --cache-dir cache/pe --dataset-name molhiv -o train_pe.bin
//!
//! # One channel per bond feature
//! graphpe encode train.json --pos-enc pstep --p 3 --beta 0.5 \
//!     --use-edge-attr --num-edge-features 5,6,2 -o train_pe.bin
//!
//! # Laplacian eigenvector encodings
//! graphpe lap train.json --dim 8 -o train_lap.bin
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use graphpe_core::cache::write_encodings;
use graphpe_core::{
    EdgeFeatureDims, EncoderConfig, Encoding, GraphDataset, LapEncoding, Normalization,
    PosEncodingKind, PositionalEncoder,
};
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "graphpe")]
#[command(about = "Graph positional encoding CLI", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show statistics about a dataset split
    Stats {
        /// Input file (JSON array of graphs)
        input: PathBuf,
    },

    /// Compute relative (pairwise) positional encodings
    Encode {
        /// Input file (JSON array of graphs)
        input: PathBuf,

        /// Output file (bincode list of encodings)
        #[arg(short, long)]
        output: PathBuf,

        /// Split name, used as the cache file suffix
        #[arg(long, default_value = "train")]
        split: String,

        /// Encoder: diffusion, pstep, adj, full (full when only --zero-diag is given)
        #[arg(long)]
        pos_enc: Option<PosEncodingKind>,

        /// Laplacian normalization: none, sym, rw
        #[arg(long)]
        normalization: Option<Normalization>,

        /// Diffusion bandwidth / walk step size
        #[arg(long)]
        beta: Option<f64>,

        /// Random-walk order
        #[arg(long)]
        p: Option<usize>,

        /// Zero the diagonal of every encoding
        #[arg(long)]
        zero_diag: bool,

        /// One channel per one-hot edge feature
        #[arg(long)]
        use_edge_attr: bool,

        /// Edge feature cardinalities: `4` (one 1-based column) or `5,6,2`
        #[arg(long, value_parser = parse_edge_dims)]
        num_edge_features: Option<EdgeFeatureDims>,

        /// Cache directory; entries are named after the encoder parameters
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Dataset name used in cache file names
        #[arg(long, default_value = "dataset")]
        dataset_name: String,

        /// Base configuration (JSON); flags override its fields
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compute Laplacian eigenvector encodings
    Lap {
        /// Input file (JSON array of graphs)
        input: PathBuf,

        /// Output file (bincode list of [N, dim] matrices)
        #[arg(short, long)]
        output: PathBuf,

        /// Number of eigenvectors per node
        #[arg(long, default_value = "8")]
        dim: usize,

        /// Laplacian normalization: none, sym, rw
        #[arg(long, default_value = "sym")]
        normalization: Normalization,

        /// Weight edges by a single-column edge attribute
        #[arg(long)]
        use_edge_attr: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install log subscriber")?;

    match cli.command {
        Commands::Stats { input } => cmd_stats(&input),
        Commands::Encode {
            input,
            output,
            split,
            pos_enc,
            normalization,
            beta,
            p,
            zero_diag,
            use_edge_attr,
            num_edge_features,
            cache_dir,
            dataset_name,
            config,
        } => {
            let mut cfg = match config {
                Some(path) => EncoderConfig::from_json_file(&path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?,
                None => EncoderConfig::default(),
            };
            if pos_enc.is_some() {
                cfg.kind = pos_enc;
            }
            if let Some(normalization) = normalization {
                cfg.normalization = normalization;
            }
            if let Some(beta) = beta {
                cfg.beta = beta;
            }
            if let Some(p) = p {
                cfg.p = p;
            }
            if let Some(dims) = num_edge_features {
                cfg.num_edge_features = dims;
            }
            cfg.zero_diag |= zero_diag;
            cfg.use_edge_attr |= use_edge_attr;
            if let Some(dir) = cache_dir {
                let stem = cfg.cache_stem(&dataset_name)?;
                cfg.savepath = Some(dir.join(format!("{stem}.bin")));
            }
            cmd_encode(&input, &output, &split, &cfg)
        }
        Commands::Lap {
            input,
            output,
            dim,
            normalization,
            use_edge_attr,
        } => cmd_lap(&input, &output, dim, normalization, use_edge_attr),
    }
}

/// `4` is a single 1-based column, `5,6,2` one cardinality per column.
fn parse_edge_dims(s: &str) -> Result<EdgeFeatureDims, String> {
    let dims = s
        .split(',')
        .map(|d| {
            d.trim()
                .parse::<usize>()
                .map_err(|e| format!("invalid cardinality '{d}': {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    match dims.as_slice() {
        [n] if !s.contains(',') => Ok(EdgeFeatureDims::Single(*n)),
        _ => Ok(EdgeFeatureDims::PerColumn(dims)),
    }
}

fn load_dataset(path: &Path) -> Result<GraphDataset> {
    let start = Instant::now();
    let pb = ProgressBar::new_spinner();
    pb.set_message(format!("Loading {}...", path.display()));

    let dataset = GraphDataset::from_json_file(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    pb.finish_with_message(format!("Loaded {} graphs in {:.2?}", dataset.len(), start.elapsed()));
    Ok(dataset)
}

fn cmd_stats(input: &Path) -> Result<()> {
    let dataset = load_dataset(input)?;

    let nodes: Vec<usize> = dataset.iter().map(|g| g.num_nodes).collect();
    let edges: usize = dataset.iter().map(|g| g.num_edges()).sum();
    let with_attr = dataset.iter().filter(|g| g.edge_attr.is_some()).count();
    let total_nodes: usize = nodes.iter().sum();
    let avg_nodes = if nodes.is_empty() {
        0.0
    } else {
        total_nodes as f64 / nodes.len() as f64
    };

    println!("Dataset Statistics");
    println!("==================");
    println!("Graphs:         {}", dataset.len());
    println!("Nodes:          {}", total_nodes);
    println!("Edges:          {}", edges);
    println!("Avg nodes:      {:.2}", avg_nodes);
    println!("Max nodes:      {}", nodes.iter().max().copied().unwrap_or(0));
    println!("With edge_attr: {}", with_attr);

    Ok(())
}

fn cmd_encode(input: &Path, output: &Path, split: &str, config: &EncoderConfig) -> Result<()> {
    let mut dataset = load_dataset(input)?;
    let encoder = config.build().context("Invalid encoder configuration")?;
    if let Some(cache) = encoder.cache() {
        let path = cache.path_for(split);
        info!(path = %path.display(), "using cache");
    }

    let start = Instant::now();
    encoder
        .apply_to(&mut dataset, split)
        .with_context(|| format!("Failed to encode split '{split}'"))?;
    let Some(pes) = dataset.pe_list.as_deref() else {
        bail!("encoder produced no encodings");
    };

    write_encodings(output, pes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Encoded {} graphs ({}) in {:.2?} -> {}",
        pes.len(),
        encoder.kind(),
        start.elapsed(),
        output.display()
    );
    Ok(())
}

fn cmd_lap(
    input: &Path,
    output: &Path,
    dim: usize,
    normalization: Normalization,
    use_edge_attr: bool,
) -> Result<()> {
    let mut dataset = load_dataset(input)?;
    let encoder = LapEncoding::new(dim, normalization)?.with_edge_attr(use_edge_attr);

    let start = Instant::now();
    encoder.apply_to(&mut dataset)?;
    let pes: Vec<Encoding> = dataset
        .lap_pe_list
        .take()
        .unwrap_or_default()
        .into_iter()
        .map(Encoding::Single)
        .collect();

    write_encodings(output, &pes)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Computed {} eigenvector encodings (dim={}) in {:.2?} -> {}",
        pes.len(),
        dim,
        start.elapsed(),
        output.display()
    );
    Ok(())
}
