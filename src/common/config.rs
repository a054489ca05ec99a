//! Configuration for leafdb.
//!
//! Compile-time constants describe the on-disk geometry. [`PagerConfig`]
//! carries the knobs that may differ between two opens of the same file.

/// Size of a page in bytes (4KB).
///
/// Every node occupies exactly one page, and the database file is always a
/// whole multiple of this size.
pub const PAGE_SIZE: usize = 4096;

/// Default ceiling on the number of pages a table may use.
///
/// The page cache never evicts, so this also bounds resident memory:
/// 100 pages × 4KB = 400KB.
pub const DEFAULT_MAX_PAGES: usize = 100;

/// Runtime configuration for the [`Pager`](crate::storage::Pager).
///
/// # Example
/// ```
/// use leafdb::PagerConfig;
///
/// let config = PagerConfig {
///     fsync_enabled: false,
///     ..PagerConfig::default()
/// };
/// assert_eq!(config.max_pages, 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerConfig {
    /// Hard ceiling on page numbers. `get_page` rejects `page_id >= max_pages`.
    pub max_pages: usize,

    /// Call `sync_data()` after each explicit page flush.
    pub fsync_enabled: bool,

    /// Verify the CRC32 stamped in each page header when loading from disk.
    pub verify_checksums: bool,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            fsync_enabled: true,
            verify_checksums: true,
        }
    }
}
