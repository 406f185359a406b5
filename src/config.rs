use std::fmt;
use std::path::PathBuf;

/// Name of the DuckDB table holding the file exactly as read (all VARCHAR).
pub const RAW_SALES_TABLE: &str = "sales_raw";
/// Name of the DuckDB table holding coerced, aggregation-ready rows.
pub const SALES_TABLE: &str = "sales";

/// Label the presentation layer shows for [`BranchFilter::All`].
pub const ALL_BRANCHES_LABEL: &str = "All";

pub fn default_cache_dir() -> PathBuf {
    if let Some(cache) = dirs::cache_dir() {
        cache.join("sales-dashboard-sdk")
    } else {
        PathBuf::from(".sales-dashboard-cache")
    }
}

pub fn default_data_dir() -> PathBuf {
    if let Some(data) = dirs::data_dir() {
        data.join("sales-dashboard-sdk")
    } else {
        PathBuf::from(".sales-dashboard-data")
    }
}

// ---------------------------------------------------------------------------
// BranchFilter
// ---------------------------------------------------------------------------

/// Branch selection applied before every aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BranchFilter {
    /// Keep rows from every branch.
    #[default]
    All,
    /// Keep only rows whose branch equals this value exactly.
    Branch(String),
}

impl BranchFilter {
    pub fn branch<S: Into<String>>(name: S) -> Self {
        BranchFilter::Branch(name.into())
    }
}

impl fmt::Display for BranchFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchFilter::All => f.write_str(ALL_BRANCHES_LABEL),
            BranchFilter::Branch(name) => f.write_str(name),
        }
    }
}

// ---------------------------------------------------------------------------
// ColumnMap
// ---------------------------------------------------------------------------

/// Physical CSV header names for the seven required sales columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    pub branch: String,
    pub product: String,
    pub year: String,
    pub month: String,
    pub units_sold: String,
    pub revenue: String,
    pub cost: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            branch: "branch".into(),
            product: "product".into(),
            year: "year".into(),
            month: "month".into(),
            units_sold: "units_sold".into(),
            revenue: "revenue_total".into(),
            cost: "cost_total".into(),
        }
    }
}

impl ColumnMap {
    /// Headers used by the Spanish-language sales exports
    /// (`Sucursal`, `Producto`, `Año`, ...).
    pub fn spanish() -> Self {
        Self {
            branch: "Sucursal".into(),
            product: "Producto".into(),
            year: "Año".into(),
            month: "Mes".into(),
            units_sold: "Unidades_vendidas".into(),
            revenue: "Ingreso_total".into(),
            cost: "Costo_total".into(),
        }
    }

    /// All required headers, in canonical order.
    pub fn required(&self) -> [&str; 7] {
        [
            self.branch.as_str(),
            self.product.as_str(),
            self.year.as_str(),
            self.month.as_str(),
            self.units_sold.as_str(),
            self.revenue.as_str(),
            self.cost.as_str(),
        ]
    }

    /// Required headers absent from `present`, in canonical order.
    pub fn missing_from(&self, present: &[String]) -> Vec<String> {
        self.required()
            .iter()
            .filter(|col| !present.iter().any(|p| p == *col))
            .map(|col| col.to_string())
            .collect()
    }
}
