//! Table - the single keyed table stored in one file.

use std::path::Path;

use tracing::{debug, warn};

use crate::common::config::PagerConfig;
use crate::common::{Error, PageId, Result};
use crate::index::btree::{Cursor, LayoutConstants, LeafDump, LeafNode, Scan, LEAF_NODE_MAX_CELLS};
use crate::storage::page::{NodeType, Page};
use crate::storage::{Pager, PagerStats};
use crate::table::Row;

/// A table of [`Row`]s keyed by `Row::id`, stored as a B-tree in one file.
///
/// The tree is a single root leaf on page 0, so a table holds at most
/// `LEAF_NODE_MAX_CELLS` rows. Inserting into a full leaf is rejected with
/// [`Error::TableFull`] rather than splitting, because a split sibling
/// would have no parent to be reachable from.
///
/// # Lifecycle
/// ```no_run
/// use leafdb::{Row, Table};
///
/// let mut table = Table::open("users.db")?;
/// table.insert(&Row::new(1, "alice", "alice@example.com")?)?;
/// for row in table.scan()? {
///     println!("{}", row?);
/// }
/// table.close()?;
/// # Ok::<(), leafdb::Error>(())
/// ```
pub struct Table {
    pager: Pager,
    root_page_id: PageId,

    /// Rows inserted through this handle plus rows present at open.
    /// Leaf cell counts remain the source of truth.
    num_rows: u32,
}

impl Table {
    /// Open a table with the default [`PagerConfig`].
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_config(path, PagerConfig::default())
    }

    /// Open or create a table file.
    ///
    /// An empty file gets page 0 formatted as an empty root leaf.
    ///
    /// # Errors
    /// - `Error::CorruptFile` if the file is not a whole number of pages
    /// - `Error::UnsupportedNodeType` if page 0 is not a leaf
    /// - `Error::CorruptPage` if page 0 claims more cells than fit
    ///
    /// A file that fails validation is left unmodified.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: PagerConfig) -> Result<Self> {
        let mut pager = Pager::open(path, config)?;
        let root_page_id = PageId::ROOT;

        if pager.num_pages() == 0 {
            let mut root = LeafNode::new(pager.get_page(root_page_id)?);
            root.initialize();
            root.set_root(true);
            debug!(%root_page_id, "initialized new root leaf");
        }

        let mut table = Self {
            pager,
            root_page_id,
            num_rows: 0,
        };

        // A rejected root must not be rewritten by the pager on drop
        match table.leaf(root_page_id).map(|root| root.num_cells()) {
            Ok(num_cells) => table.num_rows = num_cells as u32,
            Err(err) => {
                table.pager.discard();
                return Err(err);
            }
        }

        Ok(table)
    }

    /// Flush every resident page and release the file.
    pub fn close(self) -> Result<()> {
        debug!(num_rows = self.num_rows, "closing table");
        self.pager.close()
    }

    /// Insert `row` keyed by its id.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if a row with this id exists
    /// - `Error::TableFull` if the leaf has no free cell
    ///
    /// The table is unchanged in both cases.
    pub fn insert(&mut self, row: &Row) -> Result<()> {
        let key = row.id;
        let root_page_id = self.root_page_id;
        let mut leaf = self.leaf(root_page_id)?;

        let cell_num = match leaf.find(key) {
            Ok(_) => return Err(Error::DuplicateKey(key)),
            Err(cell_num) => cell_num,
        };

        if leaf.is_full() {
            warn!(key, num_cells = leaf.num_cells(), "leaf full, rejecting insert");
            return Err(Error::TableFull);
        }

        leaf.insert(cell_num, key, row);
        self.num_rows += 1;
        Ok(())
    }

    /// Cursor at `key`, or at the position `key` would be inserted.
    pub fn find(&mut self, key: u32) -> Result<Cursor<'_>> {
        let page_id = self.root_page_id;
        let leaf = self.leaf(page_id)?;

        let cell_num = match leaf.find(key) {
            Ok(cell_num) | Err(cell_num) => cell_num,
        };
        let end_of_table = cell_num >= leaf.num_cells();

        Ok(Cursor::new(self, page_id, cell_num, end_of_table))
    }

    /// Row with id `key`, if present.
    pub fn get(&mut self, key: u32) -> Result<Option<Row>> {
        let root_page_id = self.root_page_id;
        let leaf = self.leaf(root_page_id)?;

        Ok(leaf.find(key).ok().map(|cell_num| leaf.row(cell_num)))
    }

    /// Every row in ascending key order.
    pub fn scan(&mut self) -> Result<Scan<'_>> {
        Ok(Scan::new(Cursor::start(self)?))
    }

    /// Keys stored in the leaf on `page_id`.
    ///
    /// # Errors
    /// - `Error::PageOutOfBounds` if `page_id` is not an existing page
    pub fn dump_leaf(&mut self, page_id: PageId) -> Result<LeafDump> {
        Ok(self.leaf(page_id)?.dump(page_id))
    }

    /// Sizes of the on-disk layout.
    pub fn layout_constants() -> LayoutConstants {
        LayoutConstants::current()
    }

    #[inline]
    pub fn root_page_id(&self) -> PageId {
        self.root_page_id
    }

    #[inline]
    pub fn num_rows(&self) -> u32 {
        self.num_rows
    }

    #[inline]
    pub fn stats(&self) -> PagerStats {
        self.pager.stats()
    }

    #[inline]
    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Page `page_id`, checked to be an existing page holding a sane leaf.
    ///
    /// Never extends the table: reaching past the last page is an error, not
    /// an allocation.
    pub(crate) fn leaf_page(&mut self, page_id: PageId) -> Result<&mut Page> {
        let num_pages = self.pager.num_pages();
        if page_id.0 >= num_pages {
            return Err(Error::PageOutOfBounds {
                page_id: page_id.0,
                max_pages: num_pages as usize,
            });
        }

        let page = self.pager.get_page(page_id)?;

        let node_type = page.header().node_type;
        if node_type != NodeType::Leaf {
            return Err(Error::UnsupportedNodeType { page_id, node_type });
        }

        let num_cells = LeafNode::new(&*page).num_cells();
        if num_cells > LEAF_NODE_MAX_CELLS {
            return Err(Error::CorruptPage { page_id, num_cells });
        }
        Ok(page)
    }

    pub(crate) fn leaf(&mut self, page_id: PageId) -> Result<LeafNode<&mut Page>> {
        Ok(LeafNode::new(self.leaf_page(page_id)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::PAGE_SIZE;
    use crate::index::btree::layout::LEAF_NODE_NUM_CELLS_OFFSET;
    use crate::storage::page::{write_u32, NodeHeader};
    use tempfile::tempdir;

    fn config() -> PagerConfig {
        PagerConfig {
            fsync_enabled: false,
            ..PagerConfig::default()
        }
    }

    fn row(id: u32) -> Row {
        Row::new(id, format!("user{id}"), format!("person{id}@example.com")).unwrap()
    }

    fn scan_ids(table: &mut Table) -> Vec<u32> {
        table
            .scan()
            .unwrap()
            .map(|row| row.unwrap().id)
            .collect()
    }

    #[test]
    fn test_open_initializes_root_leaf() {
        let dir = tempdir().unwrap();
        let mut table = Table::open_with_config(dir.path().join("t.db"), config()).unwrap();

        let root = table.leaf(PageId::ROOT).unwrap();
        assert_eq!(root.node_type(), NodeType::Leaf);
        assert!(root.is_root());
        assert_eq!(root.num_cells(), 0);
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.pager().num_pages(), 1);
    }

    #[test]
    fn test_insert_and_get() {
        let dir = tempdir().unwrap();
        let mut table = Table::open_with_config(dir.path().join("t.db"), config()).unwrap();

        table.insert(&row(7)).unwrap();
        assert_eq!(table.get(7).unwrap(), Some(row(7)));
        assert_eq!(table.get(8).unwrap(), None);
        assert_eq!(table.num_rows(), 1);
    }

    #[test]
    fn test_duplicate_key_leaves_table_unchanged() {
        let dir = tempdir().unwrap();
        let mut table = Table::open_with_config(dir.path().join("t.db"), config()).unwrap();

        table.insert(&row(1)).unwrap();
        let imposter = Row::new(1, "other", "other@example.com").unwrap();

        assert!(matches!(table.insert(&imposter), Err(Error::DuplicateKey(1))));
        assert_eq!(table.get(1).unwrap(), Some(row(1)));
        assert_eq!(table.dump_leaf(PageId::ROOT).unwrap().keys, vec![1]);
        assert_eq!(table.num_rows(), 1);
    }

    #[test]
    fn test_full_leaf_rejects_insert() {
        let dir = tempdir().unwrap();
        let mut table = Table::open_with_config(dir.path().join("t.db"), config()).unwrap();

        for id in (0..LEAF_NODE_MAX_CELLS as u32).rev() {
            table.insert(&row(id * 10)).unwrap();
        }

        assert!(matches!(table.insert(&row(5)), Err(Error::TableFull)));
        // Duplicate detection still wins on a full leaf
        assert!(matches!(table.insert(&row(0)), Err(Error::DuplicateKey(0))));

        let expected: Vec<u32> = (0..LEAF_NODE_MAX_CELLS as u32).map(|id| id * 10).collect();
        assert_eq!(scan_ids(&mut table), expected);
        assert_eq!(table.pager().num_pages(), 1);
    }

    #[test]
    fn test_find_positions_cursor() {
        let dir = tempdir().unwrap();
        let mut table = Table::open_with_config(dir.path().join("t.db"), config()).unwrap();
        for id in [10, 30] {
            table.insert(&row(id)).unwrap();
        }

        let mut cursor = table.find(30).unwrap();
        assert_eq!(cursor.cell_num(), 1);
        assert_eq!(cursor.row().unwrap(), row(30));

        let cursor = table.find(20).unwrap();
        assert_eq!(cursor.cell_num(), 1);
        assert!(!cursor.is_end());

        let cursor = table.find(99).unwrap();
        assert_eq!(cursor.cell_num(), 2);
        assert!(cursor.is_end());
    }

    #[test]
    fn test_non_leaf_root_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");
        {
            let mut pager = Pager::open(&path, config()).unwrap();
            let page = pager.get_page(PageId::ROOT).unwrap();
            let mut header = NodeHeader::new(NodeType::Internal);
            header.is_root = true;
            page.set_header(&header);
            pager.close().unwrap();
        }

        // Damage the page too, so a rewrite on drop would re-stamp a valid checksum
        let mut bytes = std::fs::read(&path).unwrap();
        bytes[2000] ^= 0xFF;
        std::fs::write(&path, &bytes).unwrap();

        let lenient = PagerConfig {
            verify_checksums: false,
            ..config()
        };
        match Table::open_with_config(&path, lenient) {
            Err(Error::UnsupportedNodeType { page_id, node_type }) => {
                assert_eq!(page_id, PageId::ROOT);
                assert_eq!(node_type, NodeType::Internal);
            }
            _ => panic!("Expected UnsupportedNodeType"),
        }

        // The rejected file is left exactly as found
        assert_eq!(std::fs::read(&path).unwrap(), bytes);
    }

    #[test]
    fn test_oversized_cell_count_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");
        {
            let mut pager = Pager::open(&path, config()).unwrap();
            let page = pager.get_page(PageId::ROOT).unwrap();
            let mut root = LeafNode::new(&mut *page);
            root.initialize();
            root.set_root(true);
            write_u32(page.as_mut_slice(), LEAF_NODE_NUM_CELLS_OFFSET, 1000);
            pager.close().unwrap();
        }
        let before = std::fs::read(&path).unwrap();

        match Table::open_with_config(&path, config()) {
            Err(Error::CorruptPage { page_id, num_cells }) => {
                assert_eq!(page_id, PageId::ROOT);
                assert_eq!(num_cells, 1000);
            }
            Err(other) => panic!("Expected CorruptPage, got {other}"),
            Ok(_) => panic!("Expected CorruptPage, got a table"),
        }
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_dump_leaf_past_last_page_does_not_grow_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");
        let mut table = Table::open_with_config(&path, config()).unwrap();
        table.insert(&row(1)).unwrap();

        match table.dump_leaf(PageId::new(50)) {
            Err(Error::PageOutOfBounds { page_id, max_pages }) => {
                assert_eq!(page_id, 50);
                assert_eq!(max_pages, 1);
            }
            Err(other) => panic!("Expected PageOutOfBounds, got {other}"),
            Ok(_) => panic!("Expected PageOutOfBounds, got a dump"),
        }
        assert_eq!(table.pager().num_pages(), 1);
        assert!(!table.pager().is_resident(PageId::new(50)));
        assert_eq!(table.pager().allocate_page(), PageId::new(1));

        table.close().unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), PAGE_SIZE as u64);
    }

    #[test]
    fn test_num_rows_seeded_on_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("t.db");
        {
            let mut table = Table::open_with_config(&path, config()).unwrap();
            for id in 1..=4 {
                table.insert(&row(id)).unwrap();
            }
            table.close().unwrap();
        }

        let table = Table::open_with_config(&path, config()).unwrap();
        assert_eq!(table.num_rows(), 4);
    }
}
