//! Cache file location and file-backed persistence
//!
//! Provides a `CacheFile` that resolves where the persistent cache lives and
//! moves a `TtlCache` to and from that file.

use directories::ProjectDirs;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::ttl::{CacheError, TtlCache};

/// File name used inside the XDG cache directory
const CACHE_FILE_NAME: &str = "cache.bin";

/// Location of the persisted cache on disk
///
/// The default location is `~/.cache/skyprompt/cache.bin` on Linux, or the
/// equivalent XDG path on other platforms. Writes truncate the file in place;
/// two processes saving at the same time can interleave their output.
#[derive(Debug, Clone)]
pub struct CacheFile {
    path: PathBuf,
}

impl CacheFile {
    /// Creates a CacheFile in the XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "skyprompt")?;
        let path = project_dirs.cache_dir().join(CACHE_FILE_NAME);
        Some(Self { path })
    }

    /// Creates a CacheFile at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the cache file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensures the directory holding the cache file exists
    fn ensure_parent(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
            _ => Ok(()),
        }
    }

    /// Merges the file's entries into `cache`
    ///
    /// # Returns
    /// * `Ok(n)` with the number of entries taken from the file
    /// * `Err(CacheError::Io)` if the file is missing or unreadable
    /// * `Err(CacheError::Decode)` if the file is not a valid cache
    pub fn load_into(&self, cache: &TtlCache) -> Result<usize, CacheError> {
        let file = File::open(&self.path)?;
        cache.load(BufReader::new(file))
    }

    /// Writes all of `cache` to the file, replacing its previous contents
    ///
    /// Parent directories are created as needed.
    pub fn save_from(&self, cache: &TtlCache) -> Result<(), CacheError> {
        self.ensure_parent()?;

        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        cache.save(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
