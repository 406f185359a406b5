//! Shared test fixtures for the sales dashboard integration tests.
//!
//! Provides `setup_dashboard()` which builds an offline [`SalesDashboard`]
//! rooted in a temporary directory and loads a small sales CSV into it.

#![allow(dead_code)]

use sales_dashboard_sdk::{ColumnMap, SalesDashboard};
use std::fs;
use std::path::{Path, PathBuf};

/// Two branches, three products. Widget in BranchA reproduces the
/// documented two-month example; Gadget's units grow linearly; Gizmo has a
/// single zero-sale month.
pub const SAMPLE_CSV: &str = "\
branch,product,year,month,units_sold,revenue_total,cost_total
BranchA,Widget,2023,1,10,100,60
BranchA,Widget,2023,2,20,220,110
BranchB,Widget,2023,1,5,50,30
BranchB,Gadget,2023,3,8,160,100
BranchB,Gadget,2023,1,4,80,50
BranchA,Gizmo,2023,2,0,0,0
BranchB,Gadget,2023,2,6,120,75
";

/// Write `contents` to `dir/name` and return the path.
pub fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Build an offline dashboard whose cache and data dirs live in a temp dir.
///
/// Returns `(SalesDashboard, tempfile::TempDir)`. Keep the `TempDir` alive
/// for the duration of the test.
pub fn empty_dashboard(columns: ColumnMap) -> (SalesDashboard, tempfile::TempDir) {
    let tmp_dir = tempfile::tempdir().unwrap();
    let dashboard = SalesDashboard::builder()
        .cache_dir(tmp_dir.path().join("cache"))
        .data_dir(tmp_dir.path().join("data"))
        .offline(true)
        .columns(columns)
        .build()
        .unwrap();
    (dashboard, tmp_dir)
}

/// Build a dashboard and load `csv` into it with the default column names.
pub fn setup_dashboard_with(csv: &str) -> (SalesDashboard, tempfile::TempDir) {
    let (dashboard, tmp_dir) = empty_dashboard(ColumnMap::default());
    let path = write_csv(tmp_dir.path(), "sales.csv", csv);
    dashboard.load(path.to_str().unwrap()).unwrap();
    (dashboard, tmp_dir)
}

/// Build a dashboard loaded with [`SAMPLE_CSV`].
pub fn setup_dashboard() -> (SalesDashboard, tempfile::TempDir) {
    setup_dashboard_with(SAMPLE_CSV)
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
