//! Page types and layout.
//!
//! This module contains:
//! - [`Page`] - The raw 4KB data container
//! - [`NodeHeader`] - Metadata at the start of every page
//! - [`NodeType`] - Discriminator for node formats

mod node_header;
#[allow(clippy::module_inception)]
mod page;

pub(crate) use node_header::{read_u32, write_u32};
pub use node_header::{NodeHeader, NodeType};
pub use page::Page;
