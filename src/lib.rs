//! leafdb - an embedded single-table storage engine.
//!
//! Fixed-size rows keyed by a `u32` id are stored in a B-tree leaf on 4KB
//! pages in a single file, with an in-memory page cache in front of it.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             leafdb                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Table Layer (table/)                     │   │
//! │  │        Table: open | insert | find | scan | close        │   │
//! │  │        Row: fixed-width record codec                     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Index Layer (index/)                     │   │
//! │  │     LeafNode layout + binary search + insert/split       │   │
//! │  │     Cursor + Scan                                        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                Storage Layer (storage/)                  │   │
//! │  │     Pager (file + page cache) + Page + NodeHeader        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`storage`] - Pager, pages and node headers
//! - [`index`] - B-tree leaf layout and cursors
//! - [`table`] - Rows and the table API
//!
//! # Quick Start
//! ```no_run
//! use leafdb::{Row, Table};
//!
//! let mut table = Table::open("my_table.db").unwrap();
//! table.insert(&Row::new(1, "user1", "person1@example.com").unwrap()).unwrap();
//!
//! let rows: Vec<Row> = table.scan().unwrap().collect::<Result<_, _>>().unwrap();
//! assert_eq!(rows[0].id, 1);
//!
//! table.close().unwrap();
//! ```

pub mod common;
pub mod index;
pub mod storage;
pub mod table;

// Re-export commonly used items at crate root for convenience
pub use common::config::{PagerConfig, PAGE_SIZE};
pub use common::{Error, PageId, Result};

pub use index::btree::{Cursor, LayoutConstants, LeafDump, Scan};
pub use storage::{Pager, PagerStats};
pub use table::{Row, Table, ROW_SIZE};
