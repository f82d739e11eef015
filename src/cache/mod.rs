//! Persistent TTL cache for memoizing expensive lookups across prompt draws
//!
//! The prompt renderer is re-executed for every prompt, so anything worth keeping
//! between runs has to go through a file. `TtlCache` is the in-memory store with
//! per-entry expiry; `CacheFile` loads it at startup and saves it before exit.

mod file;
mod ttl;

pub use file::CacheFile;
pub use ttl::{CacheEntry, CacheError, Ttl, TtlCache, NEVER_EXPIRES};
