//! skyprompt library
//!
//! Prompt segment rendering with a TTL cache that persists between prompt draws.

pub mod cache;
pub mod cli;
pub mod logging;
pub mod segment;
