//! Tile sources: where candidate tile files and their bytes come from.
//!
//! A [`TileSource`] enumerates candidate files and hands out their raw
//! contents. It does not decide what is a tile; every candidate is offered to
//! the decoder and non-tiles are skipped there.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use memmap2::Mmap;

use crate::error::{Result, TerrainError};

/// Enumerates candidate tile files and reads their contents.
pub trait TileSource {
    /// Raw file contents.
    type Bytes: AsRef<[u8]>;

    /// List candidate files (regular files only, no recursion).
    ///
    /// # Errors
    ///
    /// Returns an error if the source as a whole is unreadable, e.g. a missing
    /// directory. This is distinct from a readable source with no tiles.
    fn list(&self) -> Result<Vec<PathBuf>>;

    /// Read the full contents of one candidate.
    fn read(&self, path: &Path) -> Result<Self::Bytes>;
}

/// Memory-map a whole file.
///
/// Empty files are rejected up front: they can never hold a payload and some
/// platforms refuse zero-length mappings.
pub(crate) fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;

    if file.metadata()?.len() == 0 {
        return Err(TerrainError::InvalidPayloadSize { size: 0 });
    }

    // SAFETY: Memory mapping is safe as long as the file is not modified
    // while mapped. We open the file read-only and only hold the mapping
    // long enough to copy the samples out.
    let mmap = unsafe { Mmap::map(&file)? };

    Ok(mmap)
}

/// Tile files in a single directory on disk.
///
/// # Example
///
/// ```ignore
/// use apterrain::{DirectorySource, TerrainRegistry};
///
/// let mut registry = TerrainRegistry::new();
/// let loaded = registry.load_all(&DirectorySource::new("/data/terrain"))?;
/// println!("Loaded {} tiles", loaded);
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Create a source over the files directly inside `dir`.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Get the directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl TileSource for DirectorySource {
    type Bytes = Mmap;

    /// Paths are returned sorted so repeated loads see files in the same order.
    fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir).map_err(|source| TerrainError::DirectoryUnavailable {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        Ok(paths)
    }

    fn read(&self, path: &Path) -> Result<Mmap> {
        map_file(path)
    }
}

/// Tile files held in memory, listed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file and return the source, for chaining.
    pub fn with_file<P: Into<PathBuf>, B: Into<Vec<u8>>>(mut self, name: P, bytes: B) -> Self {
        self.push(name, bytes);
        self
    }

    /// Add a file.
    pub fn push<P: Into<PathBuf>, B: Into<Vec<u8>>>(&mut self, name: P, bytes: B) {
        self.files.push((name.into(), bytes.into()));
    }
}

impl TileSource for MemorySource {
    type Bytes = Vec<u8>;

    fn list(&self) -> Result<Vec<PathBuf>> {
        Ok(self.files.iter().map(|(name, _)| name.clone()).collect())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        self.files
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| {
                TerrainError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} not in source", path.display()),
                ))
            })
    }
}
