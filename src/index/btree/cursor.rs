//! Cursor - a position within the tree.

use tracing::trace;

use crate::common::{Error, PageId, Result};
use crate::index::btree::LeafNode;
use crate::table::{Row, Table};

/// A `(page, cell)` position used for lookups and scans.
///
/// Cursors are transient: they borrow the table mutably (pages are loaded on
/// demand) and are discarded after use.
///
/// Advancing never leaves the current leaf. The table is a single root leaf,
/// so reaching its last cell is the end of the table.
pub struct Cursor<'t> {
    table: &'t mut Table,
    page_id: PageId,
    cell_num: usize,
    end_of_table: bool,
}

impl<'t> Cursor<'t> {
    /// Cursor at the first cell of the root leaf.
    pub fn start(table: &'t mut Table) -> Result<Self> {
        let page_id = table.root_page_id();
        let num_cells = table.leaf(page_id)?.num_cells();

        Ok(Self::new(table, page_id, 0, num_cells == 0))
    }

    pub(crate) fn new(
        table: &'t mut Table,
        page_id: PageId,
        cell_num: usize,
        end_of_table: bool,
    ) -> Self {
        Self {
            table,
            page_id,
            cell_num,
            end_of_table,
        }
    }

    /// Move to the next cell, flagging end of table past the last one.
    pub fn advance(&mut self) -> Result<()> {
        let num_cells = self.table.leaf(self.page_id)?.num_cells();

        self.cell_num += 1;
        if self.cell_num >= num_cells {
            self.end_of_table = true;
        }
        trace!(page_id = %self.page_id, cell_num = self.cell_num, "cursor advanced");
        Ok(())
    }

    /// Encoded row bytes at the current position.
    ///
    /// # Errors
    /// - `Error::CursorAtEnd` if the cursor is past the last cell
    pub fn value(&mut self) -> Result<&[u8]> {
        let page = self.table.leaf_page(self.page_id)?;
        let leaf = LeafNode::new(&*page);
        if self.end_of_table || self.cell_num >= leaf.num_cells() {
            return Err(Error::CursorAtEnd {
                page_id: self.page_id,
                cell_num: self.cell_num,
            });
        }
        Ok(leaf.into_value(self.cell_num))
    }

    /// Key at the current position.
    ///
    /// # Errors
    /// - `Error::CursorAtEnd` if the cursor is past the last cell
    pub fn key(&mut self) -> Result<u32> {
        let leaf = self.table.leaf(self.page_id)?;
        if self.end_of_table || self.cell_num >= leaf.num_cells() {
            return Err(Error::CursorAtEnd {
                page_id: self.page_id,
                cell_num: self.cell_num,
            });
        }
        Ok(leaf.key(self.cell_num))
    }

    /// Decoded row at the current position.
    pub fn row(&mut self) -> Result<Row> {
        Ok(Row::deserialize(self.value()?))
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn cell_num(&self) -> usize {
        self.cell_num
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.end_of_table
    }
}

/// Iterator over every row in ascending key order.
///
/// Yields `Err` at most once; iteration stops after an error.
pub struct Scan<'t> {
    cursor: Cursor<'t>,
    failed: bool,
}

impl<'t> Scan<'t> {
    pub(crate) fn new(cursor: Cursor<'t>) -> Self {
        Self {
            cursor,
            failed: false,
        }
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_end() {
            return None;
        }

        let item = self.cursor.row().and_then(|row| {
            self.cursor.advance()?;
            Ok(row)
        });
        self.failed = item.is_err();

        Some(item)
    }
}
