//! Pure metric math shared by the query interfaces.
//!
//! Nothing here touches DuckDB: the functions take already-aggregated totals
//! or ordered monthly values and return derived figures. Zero denominators
//! yield `0.0` (ratios) or `None` (variations), never a non-finite value.

pub mod trend;
pub mod variation;

pub use trend::{fit_trend, TrendLine};
pub use variation::{last_variation, period_variation, variations};

/// Revenue per unit sold, or `0.0` when nothing was sold.
pub fn average_price(revenue_total: f64, units_total: f64) -> f64 {
    if units_total > 0.0 {
        revenue_total / units_total
    } else {
        0.0
    }
}

/// `(revenue - cost) / revenue`, or `0.0` when there is no positive revenue.
///
/// The result is at most `1.0` for non-negative costs and unbounded below.
pub fn margin_ratio(revenue_total: f64, cost_total: f64) -> f64 {
    if revenue_total > 0.0 {
        (revenue_total - cost_total) / revenue_total
    } else {
        0.0
    }
}
