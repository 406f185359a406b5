//! Per-product dashboard reports: summary, monthly series, trend and deltas.

use crate::analytics::{fit_trend, last_variation};
use crate::config::BranchFilter;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{DashboardView, MetricDeltas, MonthlyAggregate, ProductReport, ProductSummary};
use crate::queries::sales::SalesQuery;

// ---------------------------------------------------------------------------
// DashboardQuery
// ---------------------------------------------------------------------------

/// Builds the complete dashboard for a branch selection.
pub struct DashboardQuery<'a> {
    conn: &'a Connection,
}

impl<'a> DashboardQuery<'a> {
    /// Create a new `DashboardQuery` bound to the given connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Recompute every product report for `filter`.
    ///
    /// A branch absent from the data yields a view with no products.
    pub fn view(&self, filter: &BranchFilter) -> Result<DashboardView> {
        let sales = SalesQuery::new(self.conn);
        let summaries = sales.summaries(filter)?;
        let mut series = sales.monthly_series_by_product(filter)?;

        let products: Vec<ProductReport> = summaries
            .into_iter()
            .map(|summary| {
                let months = series.remove(&summary.product).unwrap_or_default();
                build_report(summary, months)
            })
            .collect();

        tracing::info!(branch = %filter, products = products.len(), "dashboard recomputed");

        Ok(DashboardView {
            branch: filter.to_string(),
            products,
        })
    }

    /// Report for a single product, `None` if it has no filtered rows.
    pub fn product_report(&self, product: &str, filter: &BranchFilter) -> Result<Option<ProductReport>> {
        let sales = SalesQuery::new(self.conn);
        let Some(summary) = sales.summary(product, filter)? else {
            return Ok(None);
        };
        let months = sales.monthly_series(product, filter)?;
        Ok(Some(build_report(summary, months)))
    }
}

/// Attach the trend and headline deltas to a product's summary and series.
pub fn build_report(summary: ProductSummary, series: Vec<MonthlyAggregate>) -> ProductReport {
    let units: Vec<f64> = series.iter().map(|m| m.units_total).collect();
    let prices: Vec<f64> = series.iter().map(|m| m.avg_price()).collect();
    let margins: Vec<f64> = series.iter().map(|m| m.margin_ratio()).collect();

    let trend = fit_trend(&units).map(|line| line.fitted(units.len()));
    if trend.is_none() {
        tracing::debug!(
            product = %summary.product,
            months = units.len(),
            "trend omitted: fewer than two months"
        );
    }

    let deltas = MetricDeltas {
        price_pct: last_variation(&prices),
        margin_pct: last_variation(&margins),
        units_pct: last_variation(&units),
    };

    ProductReport {
        summary,
        series,
        trend,
        deltas,
    }
}
