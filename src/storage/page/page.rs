//! Page - the fundamental 4KB unit of storage.
//!
//! A [`Page`] is a raw 4KB byte array that serves as the unit of I/O
//! between disk and memory. Pages are owned by the
//! [`Pager`](crate::storage::Pager) for as long as the table is open.

use crate::common::config::PAGE_SIZE;

use super::node_header::NodeHeader;

/// A page of data (4KB, 4KB-aligned).
///
/// `Page` does NOT implement `Clone` in production code: the pager hands
/// out `&mut Page` views of the one resident buffer, never copies.
/// A `#[cfg(test)]` Clone is provided for tests.
///
/// # Example
/// ```
/// use leafdb::storage::page::Page;
///
/// let mut page = Page::new();
/// page.as_mut_slice()[0] = 0xFF;
/// assert_eq!(page.as_slice()[0], 0xFF);
/// ```
#[repr(align(4096))]
pub struct Page {
    data: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zeroed page.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: [0u8; PAGE_SIZE],
        }
    }

    /// Get immutable slice of page data.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Get mutable slice of page data.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Read the node header.
    pub fn header(&self) -> NodeHeader {
        NodeHeader::from_bytes(&self.data)
    }

    /// Write a node header.
    pub fn set_header(&mut self, header: &NodeHeader) {
        header.write_to(&mut self.data);
    }

    /// Compute and store checksum in the header.
    ///
    /// Called by the pager immediately before the page is written.
    pub fn update_checksum(&mut self) {
        let checksum = NodeHeader::compute_checksum(&self.data);
        self.data[NodeHeader::OFFSET_CHECKSUM..NodeHeader::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&checksum.to_le_bytes());
    }

    /// Returns `(stored, computed)` checksums.
    pub fn checksums(&self) -> (u32, u32) {
        (
            self.header().checksum,
            NodeHeader::compute_checksum(&self.data),
        )
    }

    /// Verify the page checksum is valid.
    pub fn verify_checksum(&self) -> bool {
        let (stored, computed) = self.checksums();
        stored == computed
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for Page {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl AsMut<[u8]> for Page {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

// Clone only available in tests - forces explicit copying in production
#[cfg(test)]
impl Clone for Page {
    fn clone(&self) -> Self {
        let mut new_page = Page::new();
        new_page.data.copy_from_slice(&self.data);
        new_page
    }
}
