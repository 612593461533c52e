//! On-disk cache of per-split encoding lists.
//!
//! A cache entry lives at `{savepath}.{split}` and holds the bincode encoding
//! of `Vec<Encoding>`, one element per graph in dataset order. There is no
//! header: readers must pair an entry with the dataset it was built from.
//!
//! Entries are write-once. [`PeCache::save`] writes to a temporary file in the
//! same directory and links it into place only if nothing is there yet, so an
//! existing file (whatever configuration produced it) is never truncated or
//! overwritten, and an interrupted write never leaves a partial entry.

use crate::{Encoding, Error, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Cache rooted at a path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeCache {
    savepath: PathBuf,
}

impl PeCache {
    pub fn new(savepath: impl Into<PathBuf>) -> Self {
        Self {
            savepath: savepath.into(),
        }
    }

    pub fn savepath(&self) -> &Path {
        &self.savepath
    }

    /// `{savepath}.{split}`
    pub fn path_for(&self, split: &str) -> PathBuf {
        let mut name = OsString::from(self.savepath.as_os_str());
        name.push(".");
        name.push(split);
        PathBuf::from(name)
    }

    /// Read the entry for `split`.
    ///
    /// Returns `Ok(None)` if no file exists. A file that exists but does not
    /// decode is an [`Error::CorruptCache`], never treated as absent.
    pub fn load(&self, split: &str) -> Result<Option<Vec<Encoding>>> {
        let path = self.path_for(split);
        let file = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no cache entry");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        let pes = read_encodings_from(BufReader::new(file))
            .map_err(|source| Error::CorruptCache { path, source })?;
        Ok(Some(pes))
    }

    /// Write the entry for `split` unless one already exists.
    ///
    /// Returns `false` if the file was already present and left untouched.
    pub fn save(&self, split: &str, encodings: &[Encoding]) -> Result<bool> {
        let path = self.path_for(split);
        let written = write_new(&path, |w| Ok(bincode::serialize_into(w, encodings)?))?;
        if written {
            debug!(path = %path.display(), graphs = encodings.len(), "wrote cache entry");
        } else {
            debug!(path = %path.display(), "cache entry exists, not overwriting");
        }
        Ok(written)
    }
}

/// Create `path` from the bytes `write` produces, without ever exposing a
/// partially written file. `Ok(false)` if `path` already exists.
fn write_new<F>(path: &Path, write: F) -> Result<bool>
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    if path.exists() {
        return Ok(false);
    }

    // Dropped (and removed) on any early return.
    let mut tmp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error.into()),
    }
}

fn read_encodings_from<R: io::Read>(reader: R) -> bincode::Result<Vec<Encoding>> {
    bincode::deserialize_from(reader)
}

/// Write an encoding list to `path`, replacing any existing file.
pub fn write_encodings(path: impl AsRef<Path>, encodings: &[Encoding]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, encodings)?;
    writer.flush()?;
    Ok(())
}

/// Read an encoding list written by [`write_encodings`] or [`PeCache::save`].
pub fn read_encodings(path: impl AsRef<Path>) -> Result<Vec<Encoding>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    read_encodings_from(BufReader::new(file)).map_err(|source| Error::CorruptCache {
        path: path.to_path_buf(),
        source,
    })
}
