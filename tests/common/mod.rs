//! Shared helpers for integration tests.

use std::path::Path;
use std::sync::Once;

use leafdb::{PagerConfig, Row, Table};
use tempfile::TempDir;

static INIT: Once = Once::new();

/// Install a tracing subscriber once per test binary. Honors `RUST_LOG`.
pub fn init_tracing() {
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

pub fn test_config() -> PagerConfig {
    PagerConfig {
        fsync_enabled: false,
        ..PagerConfig::default()
    }
}

pub fn open_table(path: &Path) -> Table {
    init_tracing();
    Table::open_with_config(path, test_config()).unwrap()
}

/// A fresh table in its own temporary directory.
pub fn create_table() -> (Table, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let table = open_table(&dir.path().join("test.db"));
    (table, dir)
}

pub fn row(id: u32) -> Row {
    Row::new(id, format!("user{id}"), format!("person{id}@example.com")).unwrap()
}

pub fn scan_all(table: &mut Table) -> Vec<Row> {
    table
        .scan()
        .unwrap()
        .collect::<leafdb::Result<Vec<_>>>()
        .unwrap()
}
