//! Thread-safe TTL cache that can be persisted between process runs
//!
//! Entries carry an absolute expiry in nanoseconds since the Unix epoch. Expiry is
//! checked lazily on read; nothing sweeps the map in the background, and `save`
//! writes expired entries too so that `load` can decide what to keep.

use std::collections::HashMap;
use std::io::{self, Read, Write};
use std::time::Duration;

use bincode::Options;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Expiry value for entries that never expire
pub const NEVER_EXPIRES: i64 = 0;

/// Errors returned by [`TtlCache::load`] and [`TtlCache::save`]
#[derive(Debug, Error)]
pub enum CacheError {
    /// Reading or writing the underlying stream failed
    #[error("cache I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The persisted bytes are not a valid cache mapping
    #[error("malformed cache data: {0}")]
    Decode(#[source] bincode::Error),

    /// The live entries could not be encoded
    #[error("failed to encode cache data: {0}")]
    Encode(#[source] bincode::Error),
}

/// How long a value written with [`TtlCache::put`] stays fresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ttl {
    /// Use the cache's default TTL as configured at the time of the put
    #[default]
    Default,
    /// Keep the entry until it is overwritten
    Never,
    /// Expire after the given duration. A zero duration means [`Ttl::Default`].
    After(Duration),
}

/// A cached value together with its absolute expiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload
    pub value: String,
    /// Expiry in nanoseconds since the Unix epoch, or [`NEVER_EXPIRES`]
    pub expires_at: i64,
}

impl CacheEntry {
    /// Returns true once the current time is past the entry's expiry
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_nanos())
    }

    fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at != NEVER_EXPIRES && now > self.expires_at
    }
}

/// In-memory string cache with per-entry expiry and stream persistence
///
/// One instance is meant to be built per process run and handed by reference to
/// whatever needs it. `get` takes a shared lock, while `put` and the merge step of
/// `load` take the exclusive lock.
#[derive(Debug)]
pub struct TtlCache {
    /// `None` means entries written with [`Ttl::Default`] never expire
    default_ttl: RwLock<Option<Duration>>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl TtlCache {
    /// Creates an empty cache. A zero `default_ttl` means "never expires".
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            default_ttl: RwLock::new(normalize_default(default_ttl)),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Changes the TTL applied by later `Ttl::Default` puts
    ///
    /// Entries already in the cache keep the expiry they were written with.
    pub fn set_default_ttl(&self, default_ttl: Duration) {
        *self.default_ttl.write() = normalize_default(default_ttl);
    }

    /// Returns a copy of the value for `key`, or `None` if it is absent or expired
    ///
    /// Expired entries stay in the map so the read path never needs the write lock.
    pub fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.is_expired() {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Inserts or overwrites the value for `key`
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>, ttl: Ttl) {
        let expires_at = self.resolve_expiry(ttl);
        let entry = CacheEntry {
            value: value.into(),
            expires_at,
        };
        self.entries.write().insert(key.into(), entry);
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no entries are stored
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Merges a previously saved mapping into the cache
    ///
    /// The whole stream is decoded before the write lock is taken. A decoded entry
    /// replaces the live one only if the key is missing or the live entry has
    /// expired. On any error nothing is merged.
    ///
    /// # Returns
    /// * `Ok(n)` with the number of decoded entries written into the live map
    /// * `Err(CacheError::Io)` if reading the stream fails
    /// * `Err(CacheError::Decode)` if the bytes are not a valid mapping
    pub fn load<R: Read>(&self, mut source: R) -> Result<usize, CacheError> {
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes)?;

        let decoded: HashMap<String, CacheEntry> =
            codec().deserialize(&bytes).map_err(CacheError::Decode)?;
        let decoded_count = decoded.len();

        let mut entries = self.entries.write();
        let now = now_nanos();
        let mut merged = 0;
        for (key, entry) in decoded {
            let live_is_fresh = entries
                .get(&key)
                .is_some_and(|live| !live.is_expired_at(now));
            if !live_is_fresh {
                entries.insert(key, entry);
                merged += 1;
            }
        }

        debug!(decoded = decoded_count, merged, "Merged persisted cache entries");
        Ok(merged)
    }

    /// Writes every stored entry, expired ones included, to `destination`
    ///
    /// Holds the shared lock while encoding. The destination is written in place,
    /// so its contents are undefined if this returns an error.
    ///
    /// # Returns
    /// * `Err(CacheError::Io)` if the destination rejects a write
    /// * `Err(CacheError::Encode)` if the entries cannot be encoded
    pub fn save<W: Write>(&self, destination: W) -> Result<(), CacheError> {
        let entries = self.entries.read();
        codec()
            .serialize_into(destination, &*entries)
            .map_err(|err| match *err {
                bincode::ErrorKind::Io(io_err) => CacheError::Io(io_err),
                other => CacheError::Encode(Box::new(other)),
            })?;

        debug!(count = entries.len(), "Saved cache entries");
        Ok(())
    }

    fn resolve_expiry(&self, ttl: Ttl) -> i64 {
        let ttl = match ttl {
            Ttl::Never => None,
            Ttl::After(duration) if !duration.is_zero() => Some(duration),
            Ttl::Default | Ttl::After(_) => *self.default_ttl.read(),
        };

        match ttl {
            None => NEVER_EXPIRES,
            Some(duration) => {
                let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
                now_nanos().saturating_add(nanos)
            }
        }
    }
}

fn normalize_default(default_ttl: Duration) -> Option<Duration> {
    (!default_ttl.is_zero()).then_some(default_ttl)
}

/// Current time in nanoseconds since the Unix epoch
fn now_nanos() -> i64 {
    Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Fixed-width little-endian encoding that rejects trailing garbage
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}
