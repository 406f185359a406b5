//! Sales file loading: schema check and numeric coercion.
//!
//! The file is first registered verbatim (every column VARCHAR) as
//! [`RAW_SALES_TABLE`]. After the required headers are confirmed, the rows
//! are coerced into [`SALES_TABLE`] with canonical column names:
//! `row_idx, branch, product, year, month, units_sold, revenue, cost`.

use crate::config::{ColumnMap, RAW_SALES_TABLE, SALES_TABLE};
use crate::connection::{quote_ident, Connection};
use crate::error::{DashboardError, Result};
use crate::models::LoadReport;

/// Load a local CSV file into the sales tables, replacing any previous load.
///
/// Fails with [`DashboardError::Schema`] when a required column is missing;
/// in that case no sales table is left behind. Rows whose year or month is
/// not an integer (or whose month is outside 1-12), and rows without a
/// product, are dropped and counted in the report.
pub fn load_sales(
    conn: &Connection,
    csv_path: &str,
    columns: &ColumnMap,
    source: &str,
) -> Result<LoadReport> {
    conn.drop_table(SALES_TABLE)?;
    conn.register_table_from_csv(RAW_SALES_TABLE, csv_path)?;

    let present = conn.table_columns(RAW_SALES_TABLE)?;
    let missing = columns.missing_from(&present);
    if !missing.is_empty() {
        conn.drop_table(RAW_SALES_TABLE)?;
        tracing::error!(source, missing = ?missing, "sales file rejected");
        return Err(DashboardError::Schema { missing });
    }

    conn.raw().execute_batch(&coerce_sql(columns))?;
    conn.mark_registered(SALES_TABLE);

    let rows_read = count_rows(conn, RAW_SALES_TABLE)?;
    let rows_kept = count_rows(conn, SALES_TABLE)?;
    let rows_dropped = rows_read.saturating_sub(rows_kept);

    if rows_dropped > 0 {
        tracing::warn!(
            source,
            rows_dropped,
            "dropped rows with unusable year, month or product"
        );
    }
    tracing::info!(source, rows_read, rows_kept, "sales data loaded");

    Ok(LoadReport {
        source: source.to_string(),
        rows_read,
        rows_kept,
        rows_dropped,
    })
}

fn count_rows(conn: &Connection, table: &str) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
    Ok(conn
        .execute_scalar(&sql, &[])?
        .and_then(|v| v.as_u64())
        .unwrap_or(0))
}

/// Best-effort numeric parse of a VARCHAR column; NULL when unparseable.
fn parse_number(column: &str) -> String {
    let parsed = format!("TRY_CAST(TRIM({}) AS DOUBLE)", quote_ident(column));
    format!("CASE WHEN isfinite({p}) THEN {p} END", p = parsed)
}

/// Build the statement that materializes [`SALES_TABLE`] from the raw table.
fn coerce_sql(columns: &ColumnMap) -> String {
    format!(
        "CREATE OR REPLACE TABLE {sales} AS
         WITH parsed AS (
             SELECT
                 row_number() OVER () AS row_idx,
                 COALESCE({branch}, '') AS branch,
                 {product} AS product,
                 {year} AS year_num,
                 {month} AS month_num,
                 COALESCE({units}, 0.0) AS units_sold,
                 COALESCE({revenue}, 0.0) AS revenue,
                 COALESCE({cost}, 0.0) AS cost
             FROM {raw}
         )
         SELECT
             row_idx,
             branch,
             product,
             CAST(year_num AS INTEGER) AS year,
             CAST(month_num AS INTEGER) AS month,
             units_sold,
             revenue,
             cost
         FROM parsed
         WHERE product IS NOT NULL
           AND year_num IS NOT NULL
           AND month_num IS NOT NULL
           AND year_num = FLOOR(year_num)
           AND month_num = FLOOR(month_num)
           AND year_num BETWEEN 1 AND 9999
           AND month_num BETWEEN 1 AND 12",
        sales = quote_ident(SALES_TABLE),
        raw = quote_ident(RAW_SALES_TABLE),
        branch = quote_ident(&columns.branch),
        product = quote_ident(&columns.product),
        year = parse_number(&columns.year),
        month = parse_number(&columns.month),
        units = parse_number(&columns.units_sold),
        revenue = parse_number(&columns.revenue),
        cost = parse_number(&columns.cost),
    )
}
