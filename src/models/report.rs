use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::sales::{MonthlyAggregate, ProductSummary};

// ---------------------------------------------------------------------------
// MetricDeltas: Headline period-over-period variations
// ---------------------------------------------------------------------------

/// Final-period variation (percent) of each monthly metric.
///
/// `None` when the series has fewer than two months or the previous month's
/// value is zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricDeltas {
    pub price_pct: Option<f64>,
    pub margin_pct: Option<f64>,
    pub units_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// ProductHeadline: The per-product record shown above each chart
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductHeadline {
    pub product: String,
    pub avg_price: f64,
    pub avg_margin_ratio: f64,
    pub units_total: f64,
    pub variation_price_pct: Option<f64>,
    pub variation_margin_pct: Option<f64>,
    pub variation_units_pct: Option<f64>,
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub month_date: NaiveDate,
    pub units_total: f64,
    /// Fitted trend value, absent when the series is too short to fit.
    pub trend: Option<f64>,
}

/// Line-chart input for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "points", rename_all = "snake_case")]
pub enum ChartData {
    /// No months survived filtering; nothing to draw.
    Empty,
    Series(Vec<ChartPoint>),
}

impl ChartData {
    pub fn is_empty(&self) -> bool {
        matches!(self, ChartData::Empty)
    }
}

// ---------------------------------------------------------------------------
// ProductReport: Everything the dashboard renders for one product
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReport {
    pub summary: ProductSummary,
    /// Ascending by month, one entry per calendar month.
    pub series: Vec<MonthlyAggregate>,
    /// Fitted units trend aligned with `series`; `None` below two months.
    pub trend: Option<Vec<f64>>,
    pub deltas: MetricDeltas,
}

impl ProductReport {
    pub fn headline(&self) -> ProductHeadline {
        ProductHeadline {
            product: self.summary.product.clone(),
            avg_price: self.summary.avg_price,
            avg_margin_ratio: self.summary.avg_margin_ratio,
            units_total: self.summary.units_total,
            variation_price_pct: self.deltas.price_pct,
            variation_margin_pct: self.deltas.margin_pct,
            variation_units_pct: self.deltas.units_pct,
        }
    }

    pub fn chart(&self) -> ChartData {
        if self.series.is_empty() {
            return ChartData::Empty;
        }
        let points = self
            .series
            .iter()
            .enumerate()
            .map(|(i, m)| ChartPoint {
                month_date: m.month,
                units_total: m.units_total,
                trend: self.trend.as_ref().and_then(|t| t.get(i).copied()),
            })
            .collect();
        ChartData::Series(points)
    }
}

// ---------------------------------------------------------------------------
// DashboardView: One full recomputation for a branch selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// Selected branch label (`"All"` for every branch).
    pub branch: String,
    pub products: Vec<ProductReport>,
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn product(&self, name: &str) -> Option<&ProductReport> {
        self.products.iter().find(|p| p.summary.product == name)
    }
}
