//! Async wrapper around [`SalesDashboard`] for use in async runtimes (Tokio, etc.).
//!
//! Runs all dashboard operations on a blocking thread pool via
//! [`tokio::task::spawn_blocking`], keeping the async event loop free.
//!
//! # Example
//!
//! ```no_run
//! use sales_dashboard_sdk::{AsyncSalesDashboard, BranchFilter};
//!
//! #[tokio::main]
//! async fn main() {
//!     let dashboard = AsyncSalesDashboard::builder().build().await.unwrap();
//!     dashboard.load("ventas.csv").await.unwrap();
//!
//!     let view = dashboard.view(BranchFilter::All).await.unwrap();
//!     println!("{} products", view.products.len());
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::{BranchFilter, ColumnMap};
use crate::error::{DashboardError, Result};
use crate::models::{DashboardView, LoadReport};
use crate::SalesDashboard;

// ---------------------------------------------------------------------------
// AsyncSalesDashboardBuilder
// ---------------------------------------------------------------------------

/// Builder for configuring and constructing an [`AsyncSalesDashboard`].
#[derive(Default)]
pub struct AsyncSalesDashboardBuilder {
    cache_dir: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    offline: bool,
    timeout: Option<Duration>,
    columns: Option<ColumnMap>,
}

impl AsyncSalesDashboardBuilder {
    pub fn cache_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.cache_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.data_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn columns(mut self, columns: ColumnMap) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Build the async dashboard on the blocking thread pool.
    pub async fn build(self) -> Result<AsyncSalesDashboard> {
        tokio::task::spawn_blocking(move || {
            let mut builder = SalesDashboard::builder().offline(self.offline);
            if let Some(dir) = self.cache_dir {
                builder = builder.cache_dir(dir);
            }
            if let Some(dir) = self.data_dir {
                builder = builder.data_dir(dir);
            }
            if let Some(timeout) = self.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(columns) = self.columns {
                builder = builder.columns(columns);
            }
            Ok(AsyncSalesDashboard {
                inner: Arc::new(Mutex::new(builder.build()?)),
            })
        })
        .await
        .map_err(|e| DashboardError::InvalidArgument(format!("Task join error: {e}")))?
    }
}

// ---------------------------------------------------------------------------
// AsyncSalesDashboard
// ---------------------------------------------------------------------------

/// Async wrapper around [`SalesDashboard`].
///
/// The dashboard uses `RefCell` internally, so it is kept behind a
/// [`Mutex`]; at most one recomputation runs at a time.
pub struct AsyncSalesDashboard {
    inner: Arc<Mutex<SalesDashboard>>,
}

impl AsyncSalesDashboard {
    pub fn builder() -> AsyncSalesDashboardBuilder {
        AsyncSalesDashboardBuilder::default()
    }

    /// Run a sync dashboard operation on the blocking thread pool.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&SalesDashboard) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let dashboard = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = dashboard
                .lock()
                .map_err(|_| DashboardError::InvalidArgument("Dashboard lock poisoned".into()))?;
            f(&guard)
        })
        .await
        .map_err(|e| DashboardError::InvalidArgument(format!("Task join error: {e}")))?
    }

    /// Load a sales file asynchronously.
    pub async fn load(&self, source: &str) -> Result<LoadReport> {
        let source = source.to_string();
        self.run(move |d| d.load(&source)).await
    }

    /// Recompute the dashboard for a branch selection.
    pub async fn view(&self, filter: BranchFilter) -> Result<DashboardView> {
        self.run(move |d| d.dashboard().view(&filter)).await
    }

    /// Distinct branches of the loaded file.
    pub async fn branches(&self) -> Result<Vec<String>> {
        self.run(|d| d.sales().branches()).await
    }

    /// Execute a raw SQL query asynchronously.
    pub async fn sql(
        &self,
        query: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let query = query.to_string();
        let params = params.to_vec();
        self.run(move |d| d.sql(&query, &params)).await
    }
}
