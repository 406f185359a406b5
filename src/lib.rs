//! Sales dashboard SDK for Rust.
//!
//! Loads a sales CSV (branch, product, year, month, units, revenue, cost)
//! into an in-process DuckDB database and computes, per product and branch
//! selection, the average price, margin ratio and units sold, a monthly
//! series with a least-squares trend, and month-over-month deltas. A small
//! CSV-backed inventory ledger (stock, suppliers, purchases, sales) lives
//! alongside it.
//!
//! # Quick start
//!
//! ```no_run
//! use sales_dashboard_sdk::{BranchFilter, SalesDashboard};
//!
//! let dashboard = SalesDashboard::builder().build().unwrap();
//! dashboard.load("ventas.csv").unwrap();
//!
//! let view = dashboard.dashboard().view(&BranchFilter::All).unwrap();
//! for report in &view.products {
//!     println!("{:?}", report.headline());
//! }
//! ```

pub mod analytics;
#[cfg(feature = "async")]
pub mod async_client;
pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod ledger;
pub mod loader;
pub mod models;
pub mod queries;
pub mod sql_builder;

#[cfg(feature = "async")]
pub use async_client::AsyncSalesDashboard;
pub use cache::SourceCache;
pub use config::{BranchFilter, ColumnMap};
pub use connection::Connection;
pub use error::{DashboardError, Result};
pub use ledger::{Ledger, Repository};
pub use sql_builder::SqlBuilder;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use models::LoadReport;

// ---------------------------------------------------------------------------
// SalesDashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing a [`SalesDashboard`].
///
/// Use [`SalesDashboard::builder()`] to obtain a builder, chain configuration
/// methods, and call [`build()`](SalesDashboardBuilder::build).
pub struct SalesDashboardBuilder {
    cache_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    offline: bool,
    timeout: Duration,
    columns: ColumnMap,
}

impl Default for SalesDashboardBuilder {
    fn default() -> Self {
        Self {
            cache_dir: None,
            data_dir: None,
            offline: false,
            timeout: Duration::from_secs(120),
            columns: ColumnMap::default(),
        }
    }
}

impl SalesDashboardBuilder {
    /// Directory for downloaded remote sources.
    ///
    /// Defaults to the platform cache directory (e.g.
    /// `~/.cache/sales-dashboard-sdk` on Linux).
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Directory holding the ledger CSV files.
    ///
    /// Defaults to the platform data directory (e.g.
    /// `~/.local/share/sales-dashboard-sdk` on Linux).
    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// When offline, remote sources are only served from the cache.
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// HTTP timeout for remote source downloads. Defaults to 120 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Header names of the required sales columns.
    pub fn columns(mut self, columns: ColumnMap) -> Self {
        self.columns = columns;
        self
    }

    /// Build the dashboard, creating the cache directory and DuckDB connection.
    ///
    /// No sales data is loaded; call [`SalesDashboard::load`] next.
    pub fn build(self) -> Result<SalesDashboard> {
        let cache = SourceCache::new(self.cache_dir, self.offline, self.timeout)?;
        let conn = Connection::new(cache)?;
        Ok(SalesDashboard {
            conn,
            data_dir: self.data_dir.unwrap_or_else(config::default_data_dir),
            columns: self.columns,
            source: RefCell::new(None),
        })
    }
}

// ---------------------------------------------------------------------------
// SalesDashboard
// ---------------------------------------------------------------------------

/// The main entry point: one loaded sales file plus the inventory ledger.
///
/// Query interfaces are lightweight borrowing wrappers around the
/// underlying [`Connection`].
pub struct SalesDashboard {
    conn: Connection,
    data_dir: PathBuf,
    columns: ColumnMap,
    source: RefCell<Option<String>>,
}

impl SalesDashboard {
    /// Create a new builder for configuring the dashboard.
    pub fn builder() -> SalesDashboardBuilder {
        SalesDashboardBuilder::default()
    }

    // -- Loading -------------------------------------------------------------

    /// Load a sales file from a local path or `http(s)://` URL.
    ///
    /// Replaces any previously loaded data. On a schema error nothing stays
    /// loaded and the error lists the missing columns.
    pub fn load(&self, source: &str) -> Result<LoadReport> {
        self.load_inner(source, false)
    }

    /// Re-read the current source, downloading remote files again.
    pub fn reload(&self) -> Result<LoadReport> {
        let source = self.source.borrow().clone().ok_or_else(|| {
            DashboardError::NotFound("No sales source has been loaded".to_string())
        })?;
        self.load_inner(&source, true)
    }

    fn load_inner(&self, source: &str, refresh: bool) -> Result<LoadReport> {
        let result = self
            .conn
            .cache
            .borrow_mut()
            .resolve(source, refresh)
            .and_then(|path| {
                loader::load_sales(&self.conn, &path.to_string_lossy(), &self.columns, source)
            });

        match &result {
            Ok(_) => *self.source.borrow_mut() = Some(source.to_string()),
            Err(_) => {
                // A failed load never leaves the previous file queryable
                self.conn.drop_table(config::SALES_TABLE)?;
                self.conn.drop_table(config::RAW_SALES_TABLE)?;
                *self.source.borrow_mut() = None;
            }
        }
        result
    }

    /// Whether a sales file is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.conn.has_table(config::SALES_TABLE)
    }

    /// The source of the currently loaded sales data.
    pub fn source(&self) -> Option<String> {
        self.source.borrow().clone()
    }

    /// Header names this dashboard expects.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    // -- Query accessors -----------------------------------------------------

    /// Access the raw sales aggregation interface.
    pub fn sales(&self) -> queries::SalesQuery<'_> {
        queries::SalesQuery::new(&self.conn)
    }

    /// Access the per-product dashboard interface.
    pub fn dashboard(&self) -> queries::DashboardQuery<'_> {
        queries::DashboardQuery::new(&self.conn)
    }

    /// Access the inventory ledger stored under the data directory.
    pub fn ledger(&self) -> Ledger<'_> {
        Ledger::new(&self.conn, &self.data_dir)
    }

    /// Directory holding the ledger CSV files.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    // -- Utility -------------------------------------------------------------

    /// Return the names of the DuckDB tables currently registered.
    pub fn tables(&self) -> Vec<String> {
        self.conn.tables()
    }

    /// Execute a raw SQL query against the DuckDB database.
    ///
    /// Escape hatch for questions the query interfaces do not cover.
    pub fn sql(&self, query: &str, params: &[String]) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        self.conn.execute(query, params)
    }

    /// Remove every downloaded source from the cache.
    pub fn clear_cache(&self) -> Result<()> {
        self.conn.cache.borrow().clear()
    }

    /// Consume the dashboard, releasing the HTTP client and DuckDB connection.
    pub fn close(self) {
        self.conn.cache.borrow_mut().close();
    }

    /// Return a reference to the underlying [`Connection`] for advanced usage.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

impl fmt::Display for SalesDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.conn.cache.borrow();
        write!(
            f,
            "SalesDashboard(source={}, data_dir={}, cache_dir={}, offline={})",
            self.source.borrow().as_deref().unwrap_or("<none>"),
            self.data_dir.display(),
            cache.cache_dir.display(),
            cache.offline
        )
    }
}
