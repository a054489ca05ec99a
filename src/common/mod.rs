//! Common types and utilities shared across leafdb.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`PagerConfig`](config::PagerConfig)
//! - Error types
//! - [`PageId`]

pub mod config;
pub mod error;
mod page_id;

pub use error::{Error, Result};
pub use page_id::PageId;
