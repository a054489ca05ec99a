//! Error types for leafdb.

use thiserror::Error;

use crate::common::PageId;
use crate::storage::page::NodeType;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in leafdb.
///
/// Errors fall into two tiers, see [`Error::is_fatal`]:
/// - **Recoverable**: the request was rejected but the table is intact
///   (duplicate key, full leaf, oversized field).
/// - **Fatal**: on-disk corruption or a violated internal precondition. The
///   caller should close the table rather than keep operating on it.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from opening, seeking, reading or writing the file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File length is not a whole number of pages.
    #[error("DB file is not a whole number of pages ({len} bytes). Corrupt file")]
    CorruptFile { len: u64 },

    /// Requested page lies beyond the configured table size.
    #[error("Tried to fetch page number out of bounds: {page_id} >= {max_pages}")]
    PageOutOfBounds { page_id: u32, max_pages: usize },

    /// Attempted to flush a page that was never loaded.
    ///
    /// This indicates a bug - only resident pages can be dirty.
    #[error("Tried to flush non-resident page {0}")]
    PageNotResident(u32),

    /// Page contents do not match the checksum stamped at flush time.
    #[error("Checksum mismatch on page {page_id}: stored {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        page_id: u32,
        expected: u32,
        actual: u32,
    },

    /// The operation reached a node kind it cannot handle.
    ///
    /// Only leaf roots are searchable; internal nodes are never created.
    #[error("Unsupported node type {node_type:?} on {page_id}")]
    UnsupportedNodeType {
        page_id: PageId,
        node_type: NodeType,
    },

    /// A leaf header claims more cells than a page can hold.
    #[error("Corrupt leaf on {page_id}: {num_cells} cells exceeds capacity")]
    CorruptPage { page_id: PageId, num_cells: usize },

    /// The cursor is past the last cell and has no row to read.
    #[error("Cursor at end of table ({page_id}, cell {cell_num})")]
    CursorAtEnd { page_id: PageId, cell_num: usize },

    /// A row with this key already exists.
    #[error("Duplicate key: {0}")]
    DuplicateKey(u32),

    /// The root leaf has no room for another cell.
    #[error("Table full")]
    TableFull,

    /// A string field does not fit its fixed-width column.
    #[error("String too long for {field}: {len} bytes (max {max})")]
    StringTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },
}

impl Error {
    /// Whether the error leaves the table in an unknown state.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Error::DuplicateKey(_)
                | Error::TableFull
                | Error::StringTooLong { .. }
                | Error::CursorAtEnd { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::DuplicateKey(42);
        assert_eq!(format!("{}", err), "Duplicate key: 42");

        let err = Error::CorruptFile { len: 4097 };
        assert_eq!(
            format!("{}", err),
            "DB file is not a whole number of pages (4097 bytes). Corrupt file"
        );

        let err = Error::PageOutOfBounds {
            page_id: 100,
            max_pages: 100,
        };
        assert_eq!(
            format!("{}", err),
            "Tried to fetch page number out of bounds: 100 >= 100"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();

        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_fatal_classification() {
        assert!(!Error::DuplicateKey(1).is_fatal());
        assert!(!Error::TableFull.is_fatal());
        assert!(!Error::StringTooLong {
            field: "username",
            len: 33,
            max: 32
        }
        .is_fatal());
        assert!(!Error::CursorAtEnd {
            page_id: PageId::new(0),
            cell_num: 3
        }
        .is_fatal());

        assert!(Error::CorruptFile { len: 1 }.is_fatal());
        assert!(Error::PageNotResident(3).is_fatal());
        assert!(Error::CorruptPage {
            page_id: PageId::new(0),
            num_cells: 1000
        }
        .is_fatal());
        assert!(Error::UnsupportedNodeType {
            page_id: PageId::new(0),
            node_type: NodeType::Internal,
        }
        .is_fatal());
    }
}
