//! Table layer - rows and the keyed table built on the B-tree.
//!
//! - [`Row`] - The fixed-width record and its codec
//! - [`Table`] - Open/insert/find/scan/close over one file

pub mod row;
#[allow(clippy::module_inception)]
mod table;

pub use row::{Row, ROW_SIZE};
pub use table::Table;
