use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::analytics::{average_price, margin_ratio};

// ---------------------------------------------------------------------------
// SalesRecord: One coerced input row
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub branch: String,
    pub product: String,
    pub year: i32,
    pub month: u32,
    pub units_sold: f64,
    pub revenue: f64,
    pub cost: f64,
}

// ---------------------------------------------------------------------------
// MonthlyAggregate: Per-product totals for one calendar month
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    /// First day of the month.
    pub month: NaiveDate,
    pub units_total: f64,
    pub revenue_total: f64,
    pub cost_total: f64,
}

impl MonthlyAggregate {
    pub fn avg_price(&self) -> f64 {
        average_price(self.revenue_total, self.units_total)
    }

    pub fn margin_ratio(&self) -> f64 {
        margin_ratio(self.revenue_total, self.cost_total)
    }
}

// ---------------------------------------------------------------------------
// ProductSummary: Totals and ratios for one product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product: String,
    pub units_total: f64,
    pub revenue_total: f64,
    pub cost_total: f64,
    pub avg_price: f64,
    pub avg_margin_ratio: f64,
}

impl ProductSummary {
    /// Derive the ratios from summed totals.
    pub fn from_totals(product: String, units_total: f64, revenue_total: f64, cost_total: f64) -> Self {
        Self {
            avg_price: average_price(revenue_total, units_total),
            avg_margin_ratio: margin_ratio(revenue_total, cost_total),
            product,
            units_total,
            revenue_total,
            cost_total,
        }
    }
}

// ---------------------------------------------------------------------------
// LoadReport: Outcome of loading a sales file
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// The source as given by the caller (path or URL).
    pub source: String,
    pub rows_read: u64,
    pub rows_kept: u64,
    /// Rows excluded because year, month or product could not be used.
    pub rows_dropped: u64,
}
