//! Response caching for YouTube API data
//!
//! Two-level cache: an in-memory map fronted by JSON files on disk, with
//! per-resource TTLs enforced at read time.

mod manager;

pub use manager::{CacheManager, CachedData};
