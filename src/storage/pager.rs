//! Pager - the page store between the table file and memory.
//!
//! The [`Pager`] handles all direct file operations and owns every
//! resident page:
//! - Lazily loading pages on first access
//! - Zero-filling pages that lie past the end of the file
//! - Writing pages back on flush and close

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, error, trace, warn};

use crate::common::config::{PagerConfig, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PagerStats;

/// Owns the table file and a cache of its pages.
///
/// # File Layout
/// The table is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (root)  │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// # Caching
/// Pages stay resident from first access until the pager is closed. There
/// is no eviction and no dirty tracking: the working set is bounded by
/// [`PagerConfig::max_pages`], and every resident page is written on close.
///
/// # Thread Safety
/// `Pager` is **single-threaded**. Every access goes through `&mut self`.
pub struct Pager {
    file: File,
    config: PagerConfig,

    /// Bytes currently on disk. Pages at or past this offset are zero-filled.
    file_length: u64,

    /// Highest page number seen so far, plus one.
    num_pages: u32,

    /// Resident pages. At most one buffer per page id.
    pages: HashMap<PageId, Box<Page>>,

    stats: PagerStats,

    /// Set by `close` or `discard`; `Drop` then leaves the file alone.
    closed: bool,
}

impl Pager {
    /// Open a table file, creating it if it doesn't exist.
    ///
    /// # Errors
    /// - `Error::Io` if the file cannot be opened or stat'ed
    /// - `Error::CorruptFile` if the length is not a whole number of pages
    pub fn open<P: AsRef<Path>>(path: P, config: PagerConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let file_length = file.metadata()?.len();
        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(Error::CorruptFile { len: file_length });
        }

        let num_pages = (file_length / PAGE_SIZE as u64) as u32;
        debug!(path = %path.display(), file_length, num_pages, "opened table file");

        Ok(Self {
            file,
            config,
            file_length,
            num_pages,
            pages: HashMap::new(),
            stats: PagerStats::default(),
            closed: false,
        })
    }

    /// Get the resident buffer for `page_id`, loading it on first access.
    ///
    /// Pages inside the file are read in full; pages past the end of the
    /// file start zeroed and are written on the next flush.
    ///
    /// # Errors
    /// - `Error::PageOutOfBounds` if `page_id >= config.max_pages`
    /// - `Error::Io` if the read fails
    /// - `Error::ChecksumMismatch` if verification is on and the page is torn
    pub fn get_page(&mut self, page_id: PageId) -> Result<&mut Page> {
        if page_id.0 as usize >= self.config.max_pages {
            return Err(Error::PageOutOfBounds {
                page_id: page_id.0,
                max_pages: self.config.max_pages,
            });
        }

        match self.pages.entry(page_id) {
            Entry::Occupied(entry) => {
                self.stats.cache_hits += 1;
                trace!(%page_id, "page cache hit");
                Ok(entry.into_mut())
            }
            Entry::Vacant(entry) => {
                self.stats.cache_misses += 1;

                let mut page = Box::new(Page::new());
                let offset = page_id.file_offset();

                if offset < self.file_length {
                    self.file.seek(SeekFrom::Start(offset))?;
                    self.file.read_exact(page.as_mut_slice())?;
                    self.stats.pages_read += 1;

                    if self.config.verify_checksums {
                        let (expected, actual) = page.checksums();
                        if expected != actual {
                            return Err(Error::ChecksumMismatch {
                                page_id: page_id.0,
                                expected,
                                actual,
                            });
                        }
                    }
                    debug!(%page_id, "loaded page from disk");
                } else {
                    debug!(%page_id, "allocated zeroed page past end of file");
                }

                if page_id.0 >= self.num_pages {
                    self.num_pages = page_id.0 + 1;
                }

                Ok(entry.insert(page))
            }
        }
    }

    /// Write a resident page to disk.
    ///
    /// # Durability
    /// Syncs file data afterwards when `config.fsync_enabled` is set. The
    /// write itself is not atomic; a torn page is caught by its checksum on
    /// the next load.
    ///
    /// # Errors
    /// - `Error::PageNotResident` if the page was never loaded
    /// - `Error::Io` if the seek or write fails
    pub fn flush(&mut self, page_id: PageId) -> Result<()> {
        self.write_page(page_id)?;
        if self.config.fsync_enabled {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Write every resident page to disk in page order, then sync once.
    pub fn flush_all(&mut self) -> Result<()> {
        let mut page_ids: Vec<PageId> = self.pages.keys().copied().collect();
        page_ids.sort_unstable();

        for page_id in &page_ids {
            self.write_page(*page_id)?;
        }
        self.file.sync_all()?;

        debug!(pages = page_ids.len(), "flushed all resident pages");
        Ok(())
    }

    /// Flush every resident page and release the file.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.flush_all()
    }

    /// Release the file without writing any resident page.
    ///
    /// For callers that loaded a page and then rejected it: the file is left
    /// byte for byte as it was found.
    pub fn discard(mut self) {
        self.closed = true;
        debug!(resident = self.pages.len(), "discarded pager without flushing");
    }

    /// Page number the next new node should use.
    ///
    /// Does not load or initialize the page; the caller must fetch it with
    /// [`get_page`](Self::get_page) and write a node header before use.
    #[inline]
    pub fn allocate_page(&self) -> PageId {
        PageId::new(self.num_pages)
    }

    /// Number of pages known to the pager, on disk or resident.
    #[inline]
    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Current length of the file on disk in bytes.
    #[inline]
    pub fn file_length(&self) -> u64 {
        self.file_length
    }

    /// Whether `page_id` currently has a buffer in memory.
    #[inline]
    pub fn is_resident(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id)
    }

    /// Number of resident pages.
    #[inline]
    pub fn resident_pages(&self) -> usize {
        self.pages.len()
    }

    /// Cache statistics since open.
    #[inline]
    pub fn stats(&self) -> PagerStats {
        self.stats
    }

    /// Configuration this pager was opened with.
    #[inline]
    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    /// Stamp the checksum and write one page without syncing.
    fn write_page(&mut self, page_id: PageId) -> Result<()> {
        let page = self
            .pages
            .get_mut(&page_id)
            .ok_or(Error::PageNotResident(page_id.0))?;

        page.update_checksum();

        let offset = page_id.file_offset();
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_slice())?;

        self.file_length = self.file_length.max(offset + PAGE_SIZE as u64);
        self.stats.pages_written += 1;
        trace!(%page_id, "wrote page");

        Ok(())
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        warn!(
            resident = self.pages.len(),
            "pager dropped without close, flushing resident pages"
        );
        if let Err(err) = self.flush_all() {
            error!(%err, "failed to flush pages on drop");
        }
    }
}
