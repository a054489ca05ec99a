//! Page cache statistics tracking.

use std::fmt;

/// Counters maintained by the [`Pager`](crate::storage::Pager).
///
/// The pager is single-threaded and mutated through `&mut self`, so these
/// are plain integers. [`Pager::stats`](crate::storage::Pager::stats)
/// returns a copy.
///
/// # Example
/// ```
/// use leafdb::PagerStats;
///
/// let stats = PagerStats {
///     cache_hits: 3,
///     cache_misses: 1,
///     ..PagerStats::default()
/// };
/// assert_eq!(stats.hit_rate(), 0.75);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PagerStats {
    /// Number of times a page was already resident.
    pub cache_hits: u64,

    /// Number of times a page had to be materialized (read or zero-filled).
    pub cache_misses: u64,

    /// Number of pages read from disk.
    pub pages_read: u64,

    /// Number of pages written to disk.
    pub pages_written: u64,
}

impl PagerStats {
    /// Calculate cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for PagerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, read: {}, written: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.pages_read,
            self.pages_written,
            self.hit_rate() * 100.0
        )
    }
}
