//! Storage layer - file I/O, page cache and page formats.
//!
//! This module handles persistent storage:
//! - [`Pager`] - File I/O plus the resident page cache
//! - [`PagerStats`] - Cache counters
//! - [`page`] - Page types and the common node header

pub mod page;
mod pager;
mod stats;

pub use pager::Pager;
pub use stats::PagerStats;
