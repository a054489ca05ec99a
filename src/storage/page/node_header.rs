//! Node header and type definitions.
//!
//! Every page holds one tree node, and every node starts with a
//! [`NodeHeader`]:
//! - [`NodeType`] discriminator
//! - root flag and parent pointer
//! - CRC32 checksum for integrity

use crate::common::PageId;

/// Kind of node stored in a page.
///
/// Uses `#[repr(u8)]` to guarantee a 1-byte representation for serialization.
/// A zeroed page decodes as `Invalid`, so a never-initialized page can never
/// be mistaken for a leaf.
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Uninitialized or corrupted page.
    #[default]
    Invalid = 0,
    /// B-tree internal (non-leaf) node. Reserved in the format, never created.
    Internal = 1,
    /// B-tree leaf node.
    Leaf = 2,
}

impl NodeType {
    /// Convert from u8, returning Invalid for unknown values.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => NodeType::Internal,
            2 => NodeType::Leaf,
            _ => NodeType::Invalid,
        }
    }
}

/// Metadata stored at the beginning of every node.
///
/// # Layout (10 bytes)
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       1     node_type (NodeType as u8)
/// 1       1     is_root (0 or 1)
/// 2       4     parent (PageId, little-endian, u32::MAX = none)
/// 6       4     checksum (CRC32, little-endian)
/// ```
///
/// # Checksum
/// The checksum is computed over the entire page with the checksum field
/// itself set to zero, and is stamped by the pager just before a page is
/// written. It is never maintained while the page is resident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHeader {
    /// Kind of this node.
    pub node_type: NodeType,
    /// Whether this node is the tree root.
    pub is_root: bool,
    /// Parent node, or `PageId::INVALID` for the root.
    pub parent: PageId,
    /// CRC32 checksum of the page contents as last written.
    pub checksum: u32,
}

impl Default for NodeHeader {
    fn default() -> Self {
        Self::new(NodeType::Invalid)
    }
}

impl NodeHeader {
    /// Size of the header in bytes.
    pub const SIZE: usize = 10;

    /// Offset of each field within the header.
    pub const OFFSET_NODE_TYPE: usize = 0;
    pub const OFFSET_IS_ROOT: usize = 1;
    pub const OFFSET_PARENT: usize = 2;
    pub const OFFSET_CHECKSUM: usize = 6;

    /// Create a new non-root header with the given node type and no parent.
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            is_root: false,
            parent: PageId::INVALID,
            checksum: 0,
        }
    }

    /// Read a header from the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < NodeHeader::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for NodeHeader");

        let node_type = NodeType::from_u8(data[Self::OFFSET_NODE_TYPE]);
        let is_root = data[Self::OFFSET_IS_ROOT] != 0;
        let parent = PageId::new(read_u32(data, Self::OFFSET_PARENT));
        let checksum = read_u32(data, Self::OFFSET_CHECKSUM);

        Self {
            node_type,
            is_root,
            parent,
            checksum,
        }
    }

    /// Write this header to the beginning of a byte slice.
    ///
    /// # Panics
    /// Panics if `data.len() < NodeHeader::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for NodeHeader");

        data[Self::OFFSET_NODE_TYPE] = self.node_type as u8;
        data[Self::OFFSET_IS_ROOT] = u8::from(self.is_root);
        data[Self::OFFSET_PARENT..Self::OFFSET_PARENT + 4]
            .copy_from_slice(&self.parent.0.to_le_bytes());
        data[Self::OFFSET_CHECKSUM..Self::OFFSET_CHECKSUM + 4]
            .copy_from_slice(&self.checksum.to_le_bytes());
    }

    /// Compute the CRC32 checksum of a page.
    ///
    /// The checksum field (bytes 6-9) is hashed as zeros so the checksum
    /// doesn't include itself.
    pub fn compute_checksum(page_data: &[u8]) -> u32 {
        let mut hasher = crc32fast::Hasher::new();

        hasher.update(&page_data[..Self::OFFSET_CHECKSUM]);
        hasher.update(&[0u8; 4]);
        hasher.update(&page_data[Self::OFFSET_CHECKSUM + 4..]);

        hasher.finalize()
    }
}

/// Read a little-endian u32 at `offset`.
#[inline]
pub(crate) fn read_u32(data: &[u8], offset: usize) -> u32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    u32::from_le_bytes(bytes)
}

/// Write a little-endian u32 at `offset`.
#[inline]
pub(crate) fn write_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}
