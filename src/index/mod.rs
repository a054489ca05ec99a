//! Index structures.
//!
//! - [`btree`] - Leaf node layout, cursors and scans
pub mod btree;
