//! B-tree index implementation.
//!
//! The tree is a single root leaf. Nodes are views over pager-owned pages:
//! - [`layout`] - Header and cell geometry
//! - [`LeafNode`] - Typed accessor for a leaf page (search, insert, split)
//! - [`Cursor`] / [`Scan`] - Positions and ordered traversal

mod cursor;
pub mod layout;
mod leaf;

pub use cursor::{Cursor, Scan};
pub use layout::{LayoutConstants, LEAF_NODE_MAX_CELLS};
pub use leaf::{LeafDump, LeafNode};
