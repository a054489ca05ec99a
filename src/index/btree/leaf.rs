//! Leaf node view over a page buffer.
//!
//! A [`LeafNode`] owns no data. It wraps a `&Page` (read-only) or a
//! `&mut Page` (read-write) and turns cell indexes into byte ranges using
//! the geometry in [`layout`](super::layout).

use std::fmt;

use crate::common::PageId;
use crate::storage::page::{read_u32, write_u32, NodeHeader, NodeType, Page};
use crate::table::Row;

use super::layout::*;

/// Typed accessor for a leaf node stored in a page.
///
/// Cells are kept contiguous and sorted by key. Every index is checked
/// against `LEAF_NODE_MAX_CELLS`; respecting `num_cells` is the caller's
/// job.
///
/// # Example
/// ```
/// use leafdb::index::btree::LeafNode;
/// use leafdb::storage::page::Page;
/// use leafdb::Row;
///
/// let mut page = Page::new();
/// let mut leaf = LeafNode::new(&mut page);
/// leaf.initialize();
/// leaf.insert(0, 5, &Row::new(5, "eve", "eve@example.com").unwrap());
///
/// assert_eq!(leaf.num_cells(), 1);
/// assert_eq!(leaf.find(5), Ok(0));
/// assert_eq!(leaf.find(9), Err(1));
/// ```
pub struct LeafNode<B> {
    page: B,
}

impl<B> LeafNode<B> {
    /// Wrap a page buffer. The bytes are not validated.
    pub fn new(page: B) -> Self {
        Self { page }
    }
}

impl<B: AsRef<[u8]>> LeafNode<B> {
    #[inline]
    fn data(&self) -> &[u8] {
        self.page.as_ref()
    }

    /// Decode the common node header.
    pub fn header(&self) -> NodeHeader {
        NodeHeader::from_bytes(self.data())
    }

    /// Node kind stored in the header.
    pub fn node_type(&self) -> NodeType {
        self.header().node_type
    }

    /// Whether this node is the tree root.
    pub fn is_root(&self) -> bool {
        self.header().is_root
    }

    /// Parent page, or `PageId::INVALID` for a root.
    pub fn parent(&self) -> PageId {
        self.header().parent
    }

    /// Number of occupied cells, as stored in the leaf header.
    pub fn num_cells(&self) -> usize {
        read_u32(self.data(), LEAF_NODE_NUM_CELLS_OFFSET) as usize
    }

    /// Whether no free cell remains.
    pub fn is_full(&self) -> bool {
        self.num_cells() >= LEAF_NODE_MAX_CELLS
    }

    /// Raw bytes of cell `cell_num`: key followed by the encoded row.
    pub fn cell(&self, cell_num: usize) -> &[u8] {
        let offset = cell_offset(cell_num);
        &self.data()[offset..offset + LEAF_NODE_CELL_SIZE]
    }

    /// Key of cell `cell_num`.
    pub fn key(&self, cell_num: usize) -> u32 {
        read_u32(self.data(), cell_offset(cell_num) + LEAF_NODE_KEY_OFFSET)
    }

    /// Encoded row bytes of cell `cell_num`.
    pub fn value(&self, cell_num: usize) -> &[u8] {
        let offset = cell_offset(cell_num) + LEAF_NODE_VALUE_OFFSET;
        &self.data()[offset..offset + LEAF_NODE_VALUE_SIZE]
    }

    /// Decoded row of cell `cell_num`.
    pub fn row(&self, cell_num: usize) -> Row {
        Row::deserialize(self.value(cell_num))
    }

    /// Binary search for `key` among the occupied cells.
    ///
    /// Returns `Ok(index)` on an exact match, or `Err(index)` with the first
    /// cell whose key is greater than `key` (the insertion point).
    pub fn find(&self, key: u32) -> std::result::Result<usize, usize> {
        let mut min_index = 0;
        let mut one_past_max_index = self.num_cells();

        while min_index != one_past_max_index {
            let index = (min_index + one_past_max_index) / 2;
            let key_at_index = self.key(index);

            if key == key_at_index {
                return Ok(index);
            }
            if key < key_at_index {
                one_past_max_index = index;
            } else {
                min_index = index + 1;
            }
        }

        Err(min_index)
    }

    /// List `(cell index, key)` pairs for debug output.
    pub fn dump(&self, page_id: PageId) -> LeafDump {
        LeafDump {
            page_id,
            keys: (0..self.num_cells()).map(|i| self.key(i)).collect(),
        }
    }
}

impl<'a> LeafNode<&'a Page> {
    /// Like [`value`](Self::value), but borrows for the page's lifetime
    /// instead of the view's.
    pub fn into_value(self, cell_num: usize) -> &'a [u8] {
        let offset = cell_offset(cell_num) + LEAF_NODE_VALUE_OFFSET;
        &self.page.as_slice()[offset..offset + LEAF_NODE_VALUE_SIZE]
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> LeafNode<B> {
    #[inline]
    fn data_mut(&mut self) -> &mut [u8] {
        self.page.as_mut()
    }

    /// Format the page as an empty, non-root leaf with no parent.
    pub fn initialize(&mut self) {
        self.set_header(&NodeHeader::new(NodeType::Leaf));
        self.set_num_cells(0);
    }

    /// Overwrite the common node header.
    pub fn set_header(&mut self, header: &NodeHeader) {
        header.write_to(self.data_mut());
    }

    /// Set the root flag, keeping the rest of the header.
    pub fn set_root(&mut self, is_root: bool) {
        let mut header = self.header();
        header.is_root = is_root;
        self.set_header(&header);
    }

    /// Set the parent page, keeping the rest of the header.
    pub fn set_parent(&mut self, parent: PageId) {
        let mut header = self.header();
        header.parent = parent;
        self.set_header(&header);
    }

    /// Store the occupied cell count.
    ///
    /// # Panics
    /// Panics if `num_cells > LEAF_NODE_MAX_CELLS`.
    pub fn set_num_cells(&mut self, num_cells: usize) {
        assert!(
            num_cells <= LEAF_NODE_MAX_CELLS,
            "cell count {num_cells} exceeds leaf capacity"
        );
        write_u32(self.data_mut(), LEAF_NODE_NUM_CELLS_OFFSET, num_cells as u32);
    }

    /// Mutable raw bytes of cell `cell_num`.
    pub fn cell_mut(&mut self, cell_num: usize) -> &mut [u8] {
        let offset = cell_offset(cell_num);
        &mut self.data_mut()[offset..offset + LEAF_NODE_CELL_SIZE]
    }

    /// Write the key of cell `cell_num` without touching its row.
    pub fn set_key(&mut self, cell_num: usize, key: u32) {
        let offset = cell_offset(cell_num) + LEAF_NODE_KEY_OFFSET;
        write_u32(self.data_mut(), offset, key);
    }

    /// Mutable encoded row bytes of cell `cell_num`.
    pub fn value_mut(&mut self, cell_num: usize) -> &mut [u8] {
        let offset = cell_offset(cell_num) + LEAF_NODE_VALUE_OFFSET;
        &mut self.data_mut()[offset..offset + LEAF_NODE_VALUE_SIZE]
    }

    /// Insert a cell at `cell_num`, shifting later cells one slot right.
    ///
    /// The caller must pass the insertion point from [`find`](Self::find)
    /// so that keys stay sorted and unique.
    ///
    /// # Panics
    /// Panics if the leaf is full or `cell_num > num_cells`.
    pub fn insert(&mut self, cell_num: usize, key: u32, row: &Row) {
        let num_cells = self.num_cells();
        assert!(num_cells < LEAF_NODE_MAX_CELLS, "leaf node full");
        assert!(cell_num <= num_cells, "insertion point past end of leaf");

        if cell_num < num_cells {
            let start = cell_offset(cell_num);
            let end = cell_offset(num_cells);
            self.data_mut()
                .copy_within(start..end, start + LEAF_NODE_CELL_SIZE);
        }

        self.write_cell(cell_num, key, row);
        self.set_num_cells(num_cells + 1);
    }

    /// Split a full leaf, inserting the new cell during redistribution.
    ///
    /// The `LEAF_NODE_MAX_CELLS` existing cells plus the new one are spread
    /// in key order: the lowest `LEAF_NODE_LEFT_SPLIT_COUNT` stay in `self`,
    /// the remaining `LEAF_NODE_RIGHT_SPLIT_COUNT` move to `right`, which is
    /// initialized as a fresh leaf. Linking `right` into the tree is left to
    /// the caller.
    ///
    /// # Panics
    /// Panics if `self` is not full or `cell_num > LEAF_NODE_MAX_CELLS`.
    pub fn split_and_insert<R>(
        &mut self,
        right: &mut LeafNode<R>,
        cell_num: usize,
        key: u32,
        row: &Row,
    ) where
        R: AsRef<[u8]> + AsMut<[u8]>,
    {
        assert_eq!(self.num_cells(), LEAF_NODE_MAX_CELLS, "only a full leaf splits");
        assert!(cell_num <= LEAF_NODE_MAX_CELLS, "insertion point past end of leaf");

        right.initialize();

        // Walk from the top so each left-side slot is read before it is overwritten.
        for i in (0..=LEAF_NODE_MAX_CELLS).rev() {
            let to_right = i >= LEAF_NODE_LEFT_SPLIT_COUNT;
            let index_within_node = if to_right {
                i - LEAF_NODE_LEFT_SPLIT_COUNT
            } else {
                i
            };

            if i == cell_num {
                if to_right {
                    right.write_cell(index_within_node, key, row);
                } else {
                    self.write_cell(index_within_node, key, row);
                }
                continue;
            }

            let source = if i > cell_num { i - 1 } else { i };
            if to_right {
                right
                    .cell_mut(index_within_node)
                    .copy_from_slice(self.cell(source));
            } else if source != index_within_node {
                let start = cell_offset(source);
                let dest = cell_offset(index_within_node);
                self.data_mut()
                    .copy_within(start..start + LEAF_NODE_CELL_SIZE, dest);
            }
        }

        self.set_num_cells(LEAF_NODE_LEFT_SPLIT_COUNT);
        right.set_num_cells(LEAF_NODE_RIGHT_SPLIT_COUNT);
    }

    fn write_cell(&mut self, cell_num: usize, key: u32, row: &Row) {
        self.set_key(cell_num, key);
        row.serialize(self.value_mut(cell_num));
    }
}

/// Byte offset of cell `cell_num` within the page.
///
/// # Panics
/// Panics if `cell_num >= LEAF_NODE_MAX_CELLS`.
#[inline]
fn cell_offset(cell_num: usize) -> usize {
    assert!(
        cell_num < LEAF_NODE_MAX_CELLS,
        "cell {cell_num} out of bounds for leaf node"
    );
    LEAF_NODE_HEADER_SIZE + cell_num * LEAF_NODE_CELL_SIZE
}

/// Snapshot of a leaf's keys, printed as the `.btree` listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafDump {
    pub page_id: PageId,
    pub keys: Vec<u32>,
}

impl fmt::Display for LeafDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "leaf (size {})", self.keys.len())?;
        for (i, key) in self.keys.iter().enumerate() {
            writeln!(f, " - {} : {}", i, key)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: u32) -> Row {
        Row::new(id, format!("user{id}"), format!("person{id}@example.com")).unwrap()
    }

    fn leaf_with_keys(page: &mut Page, keys: &[u32]) {
        let mut leaf = LeafNode::new(page);
        leaf.initialize();
        for &key in keys {
            let cell_num = leaf.find(key).unwrap_err();
            leaf.insert(cell_num, key, &row(key));
        }
    }

    fn keys_of(page: &Page) -> Vec<u32> {
        let leaf = LeafNode::new(page);
        (0..leaf.num_cells()).map(|i| leaf.key(i)).collect()
    }

    #[test]
    fn test_initialize() {
        let mut page = Page::new();
        page.as_mut_slice().fill(0xAA);

        let mut leaf = LeafNode::new(&mut page);
        leaf.initialize();

        assert_eq!(leaf.node_type(), NodeType::Leaf);
        assert!(!leaf.is_root());
        assert_eq!(leaf.parent(), PageId::INVALID);
        assert_eq!(leaf.num_cells(), 0);

        leaf.set_root(true);
        assert!(leaf.is_root());
        assert_eq!(leaf.num_cells(), 0);

        leaf.set_parent(PageId::new(4));
        assert_eq!(leaf.parent(), PageId::new(4));
        assert!(leaf.is_root());
        assert_eq!(leaf.node_type(), NodeType::Leaf);
    }

    #[test]
    fn test_cell_byte_layout() {
        let mut page = Page::new();
        leaf_with_keys(&mut page, &[0x0A0B0C0D]);

        let bytes = page.as_slice();
        assert_eq!(&bytes[10..14], &1u32.to_le_bytes()); // num_cells
        assert_eq!(&bytes[14..18], &[0x0D, 0x0C, 0x0B, 0x0A]); // key
        assert_eq!(&bytes[18..22], &0x0A0B0C0Du32.to_le_bytes()); // row id
    }

    #[test]
    fn test_insert_keeps_keys_sorted() {
        let mut page = Page::new();
        leaf_with_keys(&mut page, &[50, 10, 30, 20, 40]);

        assert_eq!(keys_of(&page), vec![10, 20, 30, 40, 50]);

        let leaf = LeafNode::new(&page);
        for i in 0..leaf.num_cells() {
            assert_eq!(leaf.row(i), row(leaf.key(i)));
        }
    }

    #[test]
    fn test_find() {
        let mut page = Page::new();
        leaf_with_keys(&mut page, &[10, 20, 30]);
        let leaf = LeafNode::new(&page);

        assert_eq!(leaf.find(10), Ok(0));
        assert_eq!(leaf.find(30), Ok(2));
        assert_eq!(leaf.find(5), Err(0));
        assert_eq!(leaf.find(25), Err(2));
        assert_eq!(leaf.find(99), Err(3));
    }

    #[test]
    fn test_find_empty_leaf() {
        let mut page = Page::new();
        leaf_with_keys(&mut page, &[]);
        assert_eq!(LeafNode::new(&page).find(7), Err(0));
    }

    #[test]
    fn test_into_value_matches_value() {
        let mut page = Page::new();
        leaf_with_keys(&mut page, &[3, 1]);

        let expected = LeafNode::new(&page).value(1).to_vec();
        let value = LeafNode::new(&page).into_value(1);
        assert_eq!(value, expected.as_slice());
        assert_eq!(Row::deserialize(value), row(3));
    }

    #[test]
    #[should_panic(expected = "leaf node full")]
    fn test_insert_into_full_leaf_panics() {
        let mut page = Page::new();
        let keys: Vec<u32> = (0..LEAF_NODE_MAX_CELLS as u32).collect();
        leaf_with_keys(&mut page, &keys);

        LeafNode::new(&mut page).insert(0, 1000, &row(1000));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_cell_index_is_bounds_checked() {
        let page = Page::new();
        LeafNode::new(&page).key(LEAF_NODE_MAX_CELLS);
    }

    #[test]
    fn test_split_and_insert_in_middle() {
        // Existing keys 0, 2, 4, ..., 24; new key 11 lands at index 6.
        let mut left_page = Page::new();
        let keys: Vec<u32> = (0..LEAF_NODE_MAX_CELLS as u32).map(|k| k * 2).collect();
        leaf_with_keys(&mut left_page, &keys);

        let mut right_page = Page::new();
        {
            let mut left = LeafNode::new(&mut left_page);
            let mut right = LeafNode::new(&mut right_page);
            let cell_num = left.find(11).unwrap_err();
            assert_eq!(cell_num, 6);
            left.split_and_insert(&mut right, cell_num, 11, &row(11));
        }

        assert_eq!(keys_of(&left_page), vec![0, 2, 4, 6, 8, 10, 11]);
        assert_eq!(keys_of(&right_page), vec![12, 14, 16, 18, 20, 22, 24]);

        let left = LeafNode::new(&left_page);
        let right = LeafNode::new(&right_page);
        assert_eq!(left.row(6), row(11));
        assert_eq!(left.row(5), row(10));
        assert_eq!(right.row(0), row(12));
        assert_eq!(right.node_type(), NodeType::Leaf);
        assert!(!right.is_root());
    }

    #[test]
    fn test_split_and_insert_at_ends() {
        let keys: Vec<u32> = (1..=LEAF_NODE_MAX_CELLS as u32).collect();

        // New smallest key
        let mut left_page = Page::new();
        let mut right_page = Page::new();
        leaf_with_keys(&mut left_page, &keys);
        LeafNode::new(&mut left_page).split_and_insert(
            &mut LeafNode::new(&mut right_page),
            0,
            0,
            &row(0),
        );
        assert_eq!(keys_of(&left_page), (0..7).collect::<Vec<_>>());
        assert_eq!(keys_of(&right_page), (7..14).collect::<Vec<_>>());

        // New largest key
        let mut left_page = Page::new();
        let mut right_page = Page::new();
        leaf_with_keys(&mut left_page, &keys);
        LeafNode::new(&mut left_page).split_and_insert(
            &mut LeafNode::new(&mut right_page),
            LEAF_NODE_MAX_CELLS,
            100,
            &row(100),
        );
        assert_eq!(keys_of(&left_page), (1..8).collect::<Vec<_>>());
        assert_eq!(keys_of(&right_page), vec![8, 9, 10, 11, 12, 13, 100]);
        assert_eq!(LeafNode::new(&right_page).row(6), row(100));
    }

    #[test]
    fn test_dump_display() {
        let mut page = Page::new();
        leaf_with_keys(&mut page, &[3, 1, 2]);

        let dump = LeafNode::new(&page).dump(PageId::new(0));
        assert_eq!(dump.keys, vec![1, 2, 3]);
        assert_eq!(
            dump.to_string(),
            "leaf (size 3)\n - 0 : 1\n - 1 : 2\n - 2 : 3\n"
        );
    }
}
