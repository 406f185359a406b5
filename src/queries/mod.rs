//! Query modules for the sales dashboard.
//!
//! Each module provides a query struct that borrows from a
//! [`Connection`](crate::connection::Connection) and recomputes its results
//! from the loaded `sales` table on every call.

pub mod dashboard;
pub mod sales;

pub use dashboard::DashboardQuery;
pub use sales::SalesQuery;
