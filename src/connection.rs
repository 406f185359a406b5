//! DuckDB connection wrapper with CSV table registration and query execution.
//!
//! Sales files are registered with every column read as VARCHAR so numeric
//! coercion happens in SQL under our control, never in the CSV sniffer.

use crate::cache::SourceCache;
use crate::error::{DashboardError, Result};
use duckdb::{types::Value as DuckValue, types::ValueRef, Connection as DuckDbConnection};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Wraps an in-memory DuckDB connection and tracks the tables loaded into it.
pub struct Connection {
    conn: DuckDbConnection,
    /// The cache used to resolve sales sources to local files.
    pub cache: RefCell<SourceCache>,
    registered_tables: RefCell<HashSet<String>>,
}

impl Connection {
    /// Create a connection backed by the given cache.
    ///
    /// Opens an in-memory DuckDB database.
    pub fn new(cache: SourceCache) -> Result<Self> {
        let conn = DuckDbConnection::open_in_memory()?;
        Ok(Self {
            conn,
            cache: RefCell::new(cache),
            registered_tables: RefCell::new(HashSet::new()),
        })
    }

    /// Ensure one or more tables have been loaded.
    ///
    /// Sales tables only exist after a successful load, so a query issued
    /// before that fails with [`DashboardError::NotFound`].
    pub fn ensure_tables(&self, tables: &[&str]) -> Result<()> {
        for name in tables {
            if !self.has_table(name) {
                return Err(DashboardError::NotFound(format!(
                    "Table {} is not loaded; load a sales file first",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Execute SQL and return results as a `Vec` of `HashMap`s.
    ///
    /// Each row is represented as a `HashMap<String, serde_json::Value>`.
    /// Automatically converts DuckDB types to `serde_json::Value`.
    pub fn execute(
        &self,
        sql: &str,
        params: &[String],
    ) -> Result<Vec<HashMap<String, serde_json::Value>>> {
        let mut stmt = self.conn.prepare(sql)?;

        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        // Column metadata is only available once the statement has run
        let column_names: Vec<String> = match rows.as_ref() {
            Some(s) => s.column_names().into_iter().map(|s| s.to_string()).collect(),
            None => Vec::new(),
        };

        let mut out: Vec<HashMap<String, serde_json::Value>> = Vec::new();

        while let Some(row) = rows.next()? {
            let mut map = HashMap::with_capacity(column_names.len());
            for (i, col_name) in column_names.iter().enumerate() {
                map.insert(col_name.clone(), convert_value_ref(row.get_ref(i)?));
            }
            out.push(map);
        }

        Ok(out)
    }

    /// Execute SQL and deserialize each row into type `T`.
    pub fn execute_into<T: DeserializeOwned>(&self, sql: &str, params: &[String]) -> Result<Vec<T>> {
        let rows = self.execute(sql, params)?;
        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let value = serde_json::Value::Object(row.into_iter().collect());
            results.push(serde_json::from_value(value)?);
        }
        Ok(results)
    }

    /// Execute SQL and return the first column of the first row.
    ///
    /// Returns `None` if the result set is empty.
    pub fn execute_scalar(&self, sql: &str, params: &[String]) -> Result<Option<serde_json::Value>> {
        let mut stmt = self.conn.prepare(sql)?;
        let param_values: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();

        let mut rows = stmt.query(param_values.as_slice())?;

        if let Some(row) = rows.next()? {
            Ok(Some(convert_value_ref(row.get_ref(0)?)))
        } else {
            Ok(None)
        }
    }

    /// Execute a data-modifying statement with typed parameters.
    ///
    /// Returns the number of affected rows.
    pub fn execute_values(&self, sql: &str, params: &[DuckValue]) -> Result<usize> {
        let affected = self.conn.execute(sql, duckdb::params_from_iter(params.iter()))?;
        Ok(affected)
    }

    /// Create a DuckDB table from a CSV file, reading every column as VARCHAR.
    pub fn register_table_from_csv(&self, table_name: &str, csv_path: &str) -> Result<()> {
        let table = quote_ident(table_name);
        self.conn.execute_batch(&format!(
            "DROP TABLE IF EXISTS {table}; \
             CREATE TABLE {table} AS SELECT * FROM read_csv({path}, header = true, all_varchar = true)",
            table = table,
            path = sql_literal(&forward_slashes(csv_path)),
        ))?;
        self.mark_registered(table_name);
        tracing::debug!(table = table_name, path = csv_path, "registered CSV table");
        Ok(())
    }

    /// Create a DuckDB table with a fixed schema, filled from a CSV file
    /// when it exists and left empty otherwise.
    ///
    /// `columns` pairs each column name with its DuckDB type.
    pub fn register_typed_table(
        &self,
        table_name: &str,
        columns: &[(&str, &str)],
        csv_path: Option<&str>,
    ) -> Result<()> {
        let table = quote_ident(table_name);
        let sql = match csv_path {
            Some(path) => {
                let column_defs = columns
                    .iter()
                    .map(|(name, ty)| format!("{}: {}", sql_literal(name), sql_literal(ty)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv({}, header = true, columns = {{{}}})",
                    table,
                    sql_literal(&forward_slashes(path)),
                    column_defs
                )
            }
            None => {
                let column_defs = columns
                    .iter()
                    .map(|(name, ty)| format!("{} {}", quote_ident(name), ty))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("CREATE OR REPLACE TABLE {} ({})", table, column_defs)
            }
        };
        self.conn.execute_batch(&sql)?;
        self.mark_registered(table_name);
        Ok(())
    }

    /// Write a table to a CSV file with a header row.
    pub fn export_table_to_csv(&self, table_name: &str, csv_path: &str) -> Result<()> {
        self.conn.execute_batch(&format!(
            "COPY {} TO {} (HEADER, DELIMITER ',')",
            quote_ident(table_name),
            sql_literal(&forward_slashes(csv_path))
        ))?;
        Ok(())
    }

    /// Column names of a registered table, in file order.
    pub fn table_columns(&self, table_name: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT column_name FROM (DESCRIBE SELECT * FROM {})",
            quote_ident(table_name)
        ))?;
        let mut rows = stmt.query([])?;
        let mut cols = Vec::new();
        while let Some(row) = rows.next()? {
            cols.push(row.get::<_, String>(0)?);
        }
        Ok(cols)
    }

    /// Drop a table if it exists and forget it.
    pub fn drop_table(&self, table_name: &str) -> Result<()> {
        self.conn
            .execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table_name)))?;
        self.registered_tables.borrow_mut().remove(table_name);
        Ok(())
    }

    /// Record that a table was created outside the `register_*` helpers.
    pub fn mark_registered(&self, table_name: &str) {
        self.registered_tables
            .borrow_mut()
            .insert(table_name.to_string());
    }

    /// Check whether a table has been registered.
    pub fn has_table(&self, name: &str) -> bool {
        self.registered_tables.borrow().contains(name)
    }

    /// Return a list of all registered table names.
    pub fn tables(&self) -> Vec<String> {
        self.registered_tables.borrow().iter().cloned().collect()
    }

    /// Access the underlying DuckDB connection for advanced usage.
    pub fn raw(&self) -> &DuckDbConnection {
        &self.conn
    }
}

/// Quote an identifier for DuckDB (`"name"`, embedded quotes doubled).
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string literal for DuckDB (`'text'`, embedded quotes doubled).
pub fn sql_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

// DuckDB wants forward slashes on every platform
fn forward_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Convert a DuckDB `ValueRef` to a `serde_json::Value`.
fn convert_value_ref(val: ValueRef<'_>) -> serde_json::Value {
    use serde_json::Value;
    match val {
        ValueRef::Null => Value::Null,
        ValueRef::Boolean(b) => Value::Bool(b),
        ValueRef::TinyInt(n) => Value::Number(n.into()),
        ValueRef::SmallInt(n) => Value::Number(n.into()),
        ValueRef::Int(n) => Value::Number(n.into()),
        ValueRef::BigInt(n) => Value::Number(n.into()),
        ValueRef::UTinyInt(n) => Value::Number(n.into()),
        ValueRef::USmallInt(n) => Value::Number(n.into()),
        ValueRef::UInt(n) => Value::Number(n.into()),
        ValueRef::UBigInt(n) => Value::Number(n.into()),
        ValueRef::HugeInt(n) => match i64::try_from(n) {
            Ok(i) => Value::Number(i.into()),
            Err(_) => Value::String(n.to_string()),
        },
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).to_string()),
        // Dates, decimals and nested types are cast to VARCHAR/DOUBLE in SQL
        _ => Value::Null,
    }
}
