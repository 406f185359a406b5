//! Flat-file inventory ledger: stock, suppliers, purchases and sales.
//!
//! Each table lives in its own CSV file. Every repository call re-reads the
//! file into DuckDB, applies the change with SQL and writes the file back.
//! There is no locking: concurrent writers overwrite each other.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use duckdb::types::Value as DuckValue;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::connection::{quote_ident, Connection};
use crate::error::{DashboardError, Result};
use crate::models::{Purchase, Sale, StockItem, Supplier};

/// A row type stored in one ledger CSV file.
pub trait LedgerEntity: Serialize + DeserializeOwned + Clone {
    const TABLE: &'static str;
    /// CSV file name inside the data directory.
    const FILE: &'static str;
    const ID_COLUMN: &'static str;
    /// `(column, DuckDB type)` in file order.
    const COLUMNS: &'static [(&'static str, &'static str)];

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

/// Load-all / append / update-by-id / delete-by-id over one table.
pub trait Repository<T> {
    /// All rows ordered by id.
    fn load_all(&self) -> Result<Vec<T>>;

    fn get(&self, id: i64) -> Result<Option<T>>;

    /// Store a new row under `max(id) + 1` (or 1 for an empty table) and
    /// return it with the assigned id. Any id on the input is ignored.
    fn append(&self, entity: T) -> Result<T>;

    /// Replace the row with `id`. Returns `false` if no such row exists.
    fn update(&self, id: i64, entity: T) -> Result<bool>;

    /// Remove the row with `id`. Returns `false` if no such row exists.
    fn delete(&self, id: i64) -> Result<bool>;
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Entry point to the four ledger tables under a data directory.
pub struct Ledger<'a> {
    conn: &'a Connection,
    data_dir: &'a Path,
}

impl<'a> Ledger<'a> {
    pub fn new(conn: &'a Connection, data_dir: &'a Path) -> Self {
        Self { conn, data_dir }
    }

    pub fn stock(&self) -> CsvRepository<'a, StockItem> {
        self.repository()
    }

    pub fn suppliers(&self) -> CsvRepository<'a, Supplier> {
        self.repository()
    }

    pub fn purchases(&self) -> CsvRepository<'a, Purchase> {
        self.repository()
    }

    pub fn sales(&self) -> CsvRepository<'a, Sale> {
        self.repository()
    }

    /// Repository for any ledger entity, reading `data_dir/T::FILE`.
    pub fn repository<T: LedgerEntity>(&self) -> CsvRepository<'a, T> {
        CsvRepository::new(self.conn, self.data_dir.join(T::FILE))
    }
}

// ---------------------------------------------------------------------------
// CsvRepository
// ---------------------------------------------------------------------------

/// [`Repository`] backed by a CSV file, manipulated through DuckDB.
pub struct CsvRepository<'a, T> {
    conn: &'a Connection,
    path: PathBuf,
    _entity: PhantomData<T>,
}

impl<'a, T: LedgerEntity> CsvRepository<'a, T> {
    pub fn new(conn: &'a Connection, path: PathBuf) -> Self {
        Self {
            conn,
            path,
            _entity: PhantomData,
        }
    }

    /// The CSV file this repository reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the CSV file into the DuckDB table.
    fn load_table(&self) -> Result<()> {
        let path = self.path.to_string_lossy().to_string();
        let source = if file_has_rows(&self.path)? {
            Some(path.as_str())
        } else {
            None
        };
        self.conn.register_typed_table(T::TABLE, T::COLUMNS, source)
    }

    /// Write the DuckDB table back to the CSV file.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        if self.row_count()? == 0 {
            let header = T::COLUMNS
                .iter()
                .map(|(name, _)| *name)
                .collect::<Vec<_>>()
                .join(",");
            fs::write(&self.path, format!("{}\n", header))?;
            return Ok(());
        }
        self.conn
            .export_table_to_csv(T::TABLE, &self.path.to_string_lossy())
    }

    fn row_count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(T::TABLE));
        Ok(self
            .conn
            .execute_scalar(&sql, &[])?
            .and_then(|v| v.as_i64())
            .unwrap_or(0))
    }

    fn next_id(&self) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(MAX({}), 0) + 1 FROM {}",
            quote_ident(T::ID_COLUMN),
            quote_ident(T::TABLE)
        );
        Ok(self
            .conn
            .execute_scalar(&sql, &[])?
            .and_then(|v| v.as_i64())
            .unwrap_or(1))
    }
}

impl<'a, T: LedgerEntity> Repository<T> for CsvRepository<'a, T> {
    fn load_all(&self) -> Result<Vec<T>> {
        self.load_table()?;
        let sql = format!(
            "SELECT * FROM {} ORDER BY {} ASC",
            quote_ident(T::TABLE),
            quote_ident(T::ID_COLUMN)
        );
        self.conn.execute_into(&sql, &[])
    }

    fn get(&self, id: i64) -> Result<Option<T>> {
        Ok(self.load_all()?.into_iter().find(|e| e.id() == id))
    }

    fn append(&self, mut entity: T) -> Result<T> {
        validate_fields(&entity, T::TABLE)?;
        self.load_table()?;
        entity.set_id(self.next_id()?);

        let columns: Vec<String> = T::COLUMNS.iter().map(|(c, _)| quote_ident(c)).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(T::TABLE),
            columns.join(", "),
            placeholders
        );
        self.conn.execute_values(&sql, &entity_values(&entity)?)?;
        self.persist()?;

        tracing::info!(table = T::TABLE, id = entity.id(), "ledger row appended");
        Ok(entity)
    }

    fn update(&self, id: i64, mut entity: T) -> Result<bool> {
        validate_fields(&entity, T::TABLE)?;
        self.load_table()?;
        entity.set_id(id);

        let assignments: Vec<String> = T::COLUMNS
            .iter()
            .filter(|(c, _)| *c != T::ID_COLUMN)
            .map(|(c, _)| format!("{} = ?", quote_ident(c)))
            .collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            quote_ident(T::TABLE),
            assignments.join(", "),
            quote_ident(T::ID_COLUMN)
        );

        let mut params: Vec<DuckValue> = T::COLUMNS
            .iter()
            .zip(entity_values(&entity)?)
            .filter(|((c, _), _)| *c != T::ID_COLUMN)
            .map(|(_, v)| v)
            .collect();
        params.push(DuckValue::BigInt(id));

        if self.conn.execute_values(&sql, &params)? == 0 {
            tracing::info!(table = T::TABLE, id, "update skipped: id not found");
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    fn delete(&self, id: i64) -> Result<bool> {
        self.load_table()?;
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote_ident(T::TABLE),
            quote_ident(T::ID_COLUMN)
        );
        if self.conn.execute_values(&sql, &[DuckValue::BigInt(id)])? == 0 {
            tracing::info!(table = T::TABLE, id, "delete skipped: id not found");
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A file with a header and at least one data line.
fn file_has_rows(path: &Path) -> Result<bool> {
    if !path.is_file() {
        return Ok(false);
    }
    let contents = fs::read_to_string(path)?;
    Ok(contents.lines().filter(|l| !l.trim().is_empty()).count() > 1)
}

/// Reject rows with blank text fields.
fn validate_fields<T: Serialize>(entity: &T, table: &str) -> Result<()> {
    if let serde_json::Value::Object(map) = serde_json::to_value(entity)? {
        for (field, value) in &map {
            if let serde_json::Value::String(s) = value {
                if s.trim().is_empty() {
                    return Err(DashboardError::InvalidArgument(format!(
                        "{}.{} must not be empty",
                        table, field
                    )));
                }
            }
        }
    }
    Ok(())
}

/// Column values of an entity in [`LedgerEntity::COLUMNS`] order.
fn entity_values<T: LedgerEntity>(entity: &T) -> Result<Vec<DuckValue>> {
    let value = serde_json::to_value(entity)?;
    Ok(T::COLUMNS
        .iter()
        .map(|(col, _)| to_duck_value(value.get(*col).unwrap_or(&serde_json::Value::Null)))
        .collect())
}

fn to_duck_value(value: &serde_json::Value) -> DuckValue {
    use serde_json::Value;
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DuckValue::BigInt(i),
            None => DuckValue::Double(n.as_f64().unwrap_or(0.0)),
        },
        Value::String(s) => DuckValue::Text(s.clone()),
        other => DuckValue::Text(other.to_string()),
    }
}
