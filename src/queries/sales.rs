//! Branch-filtered aggregation queries over the loaded `sales` table.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::{BranchFilter, SALES_TABLE};
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{MonthlyAggregate, ProductSummary, SalesRecord};
use crate::sql_builder::SqlBuilder;

const MEASURE_TOTALS: [&str; 3] = [
    "SUM(units_sold) AS units_total",
    "SUM(revenue) AS revenue_total",
    "SUM(cost) AS cost_total",
];

#[derive(Deserialize)]
struct TotalsRow {
    product: String,
    units_total: f64,
    revenue_total: f64,
    cost_total: f64,
}

#[derive(Deserialize)]
struct MonthRow {
    product: String,
    year: i32,
    month: u32,
    units_total: f64,
    revenue_total: f64,
    cost_total: f64,
}

impl MonthRow {
    fn into_aggregate(self) -> Option<MonthlyAggregate> {
        let month = NaiveDate::from_ymd_opt(self.year, self.month, 1)?;
        Some(MonthlyAggregate {
            month,
            units_total: self.units_total,
            revenue_total: self.revenue_total,
            cost_total: self.cost_total,
        })
    }
}

// ---------------------------------------------------------------------------
// SalesQuery
// ---------------------------------------------------------------------------

/// Query interface for the loaded sales rows.
///
/// Every method recomputes from the table; nothing is cached between calls.
pub struct SalesQuery<'a> {
    conn: &'a Connection,
}

impl<'a> SalesQuery<'a> {
    /// Create a new `SalesQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Distinct non-empty branch names, in order of first appearance.
    pub fn branches(&self) -> Result<Vec<String>> {
        self.conn.ensure_tables(&[SALES_TABLE])?;

        let (sql, params) = SqlBuilder::new(SALES_TABLE)
            .select(&["branch", "MIN(row_idx) AS first_seen"])
            .where_clause("branch <> ''", &[])
            .group_by(&["branch"])
            .order_by(&["first_seen ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(string_column(rows, "branch"))
    }

    /// Distinct products after branch filtering, in order of first appearance.
    pub fn products(&self, filter: &BranchFilter) -> Result<Vec<String>> {
        self.conn.ensure_tables(&[SALES_TABLE])?;

        let (sql, params) = SqlBuilder::new(SALES_TABLE)
            .select(&["product", "MIN(row_idx) AS first_seen"])
            .where_branch(filter)
            .group_by(&["product"])
            .order_by(&["first_seen ASC"])
            .build();

        let rows = self.conn.execute(&sql, &params)?;
        Ok(string_column(rows, "product"))
    }

    /// The filtered rows themselves, in file order.
    pub fn records(&self, filter: &BranchFilter) -> Result<Vec<SalesRecord>> {
        self.conn.ensure_tables(&[SALES_TABLE])?;

        let (sql, params) = SqlBuilder::new(SALES_TABLE)
            .select(&[
                "branch", "product", "year", "month", "units_sold", "revenue", "cost",
            ])
            .where_branch(filter)
            .order_by(&["row_idx ASC"])
            .build();

        self.conn.execute_into(&sql, &params)
    }

    /// Number of rows surviving the branch filter.
    pub fn row_count(&self, filter: &BranchFilter) -> Result<u64> {
        self.conn.ensure_tables(&[SALES_TABLE])?;

        let (sql, params) = SqlBuilder::new(SALES_TABLE)
            .select(&["COUNT(*)"])
            .where_branch(filter)
            .build();

        Ok(self
            .conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    /// Grand total of units sold across all filtered rows.
    pub fn total_units(&self, filter: &BranchFilter) -> Result<f64> {
        self.conn.ensure_tables(&[SALES_TABLE])?;

        let (sql, params) = SqlBuilder::new(SALES_TABLE)
            .select(&["COALESCE(SUM(units_sold), 0.0)"])
            .where_branch(filter)
            .build();

        Ok(self
            .conn
            .execute_scalar(&sql, &params)?
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0))
    }

    /// One summary per product, in order of first appearance.
    pub fn summaries(&self, filter: &BranchFilter) -> Result<Vec<ProductSummary>> {
        self.conn.ensure_tables(&[SALES_TABLE])?;

        let mut select = vec!["product", "MIN(row_idx) AS first_seen"];
        select.extend(MEASURE_TOTALS);

        let (sql, params) = SqlBuilder::new(SALES_TABLE)
            .select(&select)
            .where_branch(filter)
            .group_by(&["product"])
            .order_by(&["first_seen ASC"])
            .build();

        let rows: Vec<TotalsRow> = self.conn.execute_into(&sql, &params)?;
        Ok(rows
            .into_iter()
            .map(|r| {
                ProductSummary::from_totals(r.product, r.units_total, r.revenue_total, r.cost_total)
            })
            .collect())
    }

    /// Summary for a single product, `None` if it has no filtered rows.
    pub fn summary(&self, product: &str, filter: &BranchFilter) -> Result<Option<ProductSummary>> {
        Ok(self
            .summaries(filter)?
            .into_iter()
            .find(|s| s.product == product))
    }

    /// Monthly totals for one product, ascending by month.
    ///
    /// Empty when the product has no rows after filtering.
    pub fn monthly_series(&self, product: &str, filter: &BranchFilter) -> Result<Vec<MonthlyAggregate>> {
        self.conn.ensure_tables(&[SALES_TABLE])?;

        let mut qb = self.monthly_builder(filter);
        qb.where_eq("product", product);
        let (sql, params) = qb.build();

        let rows: Vec<MonthRow> = self.conn.execute_into(&sql, &params)?;
        Ok(rows.into_iter().filter_map(MonthRow::into_aggregate).collect())
    }

    /// Monthly totals for every filtered product in a single query.
    pub fn monthly_series_by_product(
        &self,
        filter: &BranchFilter,
    ) -> Result<HashMap<String, Vec<MonthlyAggregate>>> {
        self.conn.ensure_tables(&[SALES_TABLE])?;

        let (sql, params) = self.monthly_builder(filter).build();
        let rows: Vec<MonthRow> = self.conn.execute_into(&sql, &params)?;

        let mut out: HashMap<String, Vec<MonthlyAggregate>> = HashMap::new();
        for row in rows {
            let product = row.product.clone();
            if let Some(agg) = row.into_aggregate() {
                out.entry(product).or_default().push(agg);
            }
        }
        Ok(out)
    }

    fn monthly_builder(&self, filter: &BranchFilter) -> SqlBuilder {
        let mut select = vec!["product", "year", "month"];
        select.extend(MEASURE_TOTALS);

        let mut qb = SqlBuilder::new(SALES_TABLE);
        qb.select(&select)
            .where_branch(filter)
            .group_by(&["product", "year", "month"])
            .order_by(&["product ASC", "year ASC", "month ASC"]);
        qb
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn string_column(rows: Vec<HashMap<String, serde_json::Value>>, column: &str) -> Vec<String> {
    rows.into_iter()
        .filter_map(|r| r.get(column).and_then(|v| v.as_str()).map(|s| s.to_string()))
        .collect()
}
