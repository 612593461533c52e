use assert_cmd::Command;
use graphpe_core::cache::read_encodings;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Two graphs: a 3-node path and a 4-node star, with two-column bond codes.
fn write_dataset(dir: &Path) -> PathBuf {
    let path = dir.join("train.json");
    let graphs = serde_json::json!([
        {
            "num_nodes": 3,
            "edge_index": [[0, 1, 1, 2], [1, 0, 2, 1]],
            "edge_attr": [[0, 1], [0, 1], [2, 0], [2, 0]]
        },
        {
            "num_nodes": 4,
            "edge_index": [[0, 1, 0, 2, 0, 3], [1, 0, 2, 0, 3, 0]],
            "edge_attr": [[1, 1], [1, 1], [0, 0], [0, 0], [1, 0], [1, 0]]
        }
    ]);
    fs::write(&path, graphs.to_string()).unwrap();
    path
}

#[test]
fn test_cli_stats() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("stats").arg(&input);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Graphs:         2"))
        .stdout(predicate::str::contains("Nodes:          7"))
        .stdout(predicate::str::contains("Edges:          10"))
        .stdout(predicate::str::contains("With edge_attr: 2"));
    Ok(())
}

#[test]
fn test_cli_encode_diffusion() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());
    let output = dir.path().join("pe.bin");

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("encode")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--pos-enc")
        .arg("diffusion")
        .arg("--beta")
        .arg("0.5")
        .arg("--zero-diag");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Encoded 2 graphs (diffusion)"));

    let pes = read_encodings(&output)?;
    assert_eq!(pes.len(), 2);
    assert_eq!(pes[0].shape(), &[3, 3]);
    assert_eq!(pes[1].shape(), &[4, 4]);
    let k = pes[1].as_single().unwrap();
    assert_eq!(k[[0, 0]], 0.0);
    assert!(k[[0, 1]] > 0.0);
    Ok(())
}

#[test]
fn test_cli_encode_edge_channels() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());
    let output = dir.path().join("pe.bin");

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("encode")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--pos-enc")
        .arg("pstep")
        .arg("--p")
        .arg("2")
        .arg("--use-edge-attr")
        .arg("--num-edge-features")
        .arg("3,2");
    cmd.assert().success();

    let pes = read_encodings(&output)?;
    assert_eq!(pes[0].shape(), &[5, 3, 3]);
    assert_eq!(pes[1].shape(), &[5, 4, 4]);
    Ok(())
}

#[test]
fn test_cli_cache_reused_across_runs() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());
    let cache_dir = dir.path().join("cache");
    let first = dir.path().join("first.bin");
    let second = dir.path().join("second.bin");

    for output in [&first, &second] {
        let mut cmd = Command::cargo_bin("graphpe")?;
        cmd.arg("-v")
            .arg("encode")
            .arg(&input)
            .arg("-o")
            .arg(output)
            .arg("--split")
            .arg("val")
            .arg("--pos-enc")
            .arg("diffusion")
            .arg("--cache-dir")
            .arg(&cache_dir)
            .arg("--dataset-name")
            .arg("toy");
        cmd.assert().success();
    }

    let entry = cache_dir.join("toy_diffusion_sym_1_false.bin.val");
    assert!(entry.exists());
    assert_eq!(read_encodings(&entry)?, read_encodings(&first)?);
    assert_eq!(fs::read(&first)?, fs::read(&second)?);

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("-v")
        .arg("encode")
        .arg(&input)
        .arg("-o")
        .arg(&second)
        .arg("--split")
        .arg("val")
        .arg("--pos-enc")
        .arg("diffusion")
        .arg("--cache-dir")
        .arg(&cache_dir)
        .arg("--dataset-name")
        .arg("toy");
    cmd.assert()
        .success()
        .stderr(predicate::str::contains("loaded positional encodings from cache"));
    Ok(())
}

#[test]
fn test_cli_zero_diag_without_encoding_uses_full() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());
    let output = dir.path().join("pe.bin");

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("encode").arg(&input).arg("-o").arg(&output).arg("--zero-diag");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Encoded 2 graphs (full)"));

    let pes = read_encodings(&output)?;
    let k = pes[1].as_single().unwrap();
    for ((i, j), &v) in k.indexed_iter() {
        assert_eq!(v, if i == j { 0.0 } else { 1.0 });
    }
    Ok(())
}

#[test]
fn test_cli_encode_needs_an_encoding() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());
    let output = dir.path().join("pe.bin");

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("encode").arg(&input).arg("-o").arg(&output);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no positional encoding configured"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_cli_config_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());
    let config = dir.path().join("adj.json");
    let output = dir.path().join("pe.bin");
    fs::write(&config, r#"{"kind": "adj", "normalization": "none"}"#)?;

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("encode")
        .arg(&input)
        .arg("-o")
        .arg(&output)
        .arg("--config")
        .arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("(adj)"));

    let pes = read_encodings(&output)?;
    let a = pes[0].as_single().unwrap();
    assert_eq!(a[[0, 1]], 1.0);
    assert_eq!(a[[0, 2]], 0.0);
    Ok(())
}

#[test]
fn test_cli_lap() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());
    let output = dir.path().join("lap.bin");

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("lap").arg(&input).arg("-o").arg(&output).arg("--dim").arg("2");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Computed 2 eigenvector encodings (dim=2)"));

    let pes = read_encodings(&output)?;
    assert_eq!(pes[0].shape(), &[3, 2]);
    assert_eq!(pes[1].shape(), &[4, 2]);
    Ok(())
}

#[test]
fn test_cli_lap_too_many_eigenvectors() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("lap")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("lap.bin"))
        .arg("--dim")
        .arg("3");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("insufficient eigenvectors"));
    Ok(())
}

#[test]
fn test_cli_rejects_unknown_encoding() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let input = write_dataset(dir.path());

    let mut cmd = Command::cargo_bin("graphpe")?;
    cmd.arg("encode")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("pe.bin"))
        .arg("--pos-enc")
        .arg("gckn");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unknown positional encoding"));
    Ok(())
}
