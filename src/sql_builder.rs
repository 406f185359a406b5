//! SQL builder with parameterized query construction.
//!
//! Branch and product values always go through DuckDB's parameter binding
//! (`?` placeholders), never through string interpolation. Builder methods
//! return `&mut Self` for chaining.
//!
//! # Example
//!
//! ```rust
//! use sales_dashboard_sdk::{BranchFilter, SqlBuilder};
//! let (sql, params) = SqlBuilder::new("sales")
//!     .select(&["product", "SUM(units_sold) AS units_total"])
//!     .where_branch(&BranchFilter::branch("Centro"))
//!     .group_by(&["product"])
//!     .order_by(&["product ASC"])
//!     .build();
//! assert!(sql.contains("WHERE branch = ?"));
//! assert_eq!(params, vec!["Centro"]);
//! ```

use crate::config::BranchFilter;

/// Builds parameterized SELECT statements over the sales tables.
pub struct SqlBuilder {
    select_cols: Vec<String>,
    from_table: String,
    where_clauses: Vec<String>,
    params: Vec<String>,
    group_by_cols: Vec<String>,
    order_by_cols: Vec<String>,
}

impl SqlBuilder {
    /// Create a builder targeting the given table.
    pub fn new(table: &str) -> Self {
        Self {
            select_cols: vec!["*".to_string()],
            from_table: table.to_string(),
            where_clauses: Vec::new(),
            params: Vec::new(),
            group_by_cols: Vec::new(),
            order_by_cols: Vec::new(),
        }
    }

    /// Set the columns to select (replaces the default `*`).
    pub fn select(&mut self, cols: &[&str]) -> &mut Self {
        self.select_cols = cols.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Add a WHERE condition with `?` placeholders for each param.
    pub fn where_clause(&mut self, condition: &str, params: &[&str]) -> &mut Self {
        self.where_clauses.push(condition.to_string());
        self.params.extend(params.iter().map(|p| p.to_string()));
        self
    }

    /// Add an equality condition: `{column} = ?`.
    pub fn where_eq(&mut self, column: &str, value: &str) -> &mut Self {
        self.where_clauses.push(format!("{} = ?", column));
        self.params.push(value.to_string());
        self
    }

    /// Restrict to one branch; [`BranchFilter::All`] adds nothing.
    pub fn where_branch(&mut self, filter: &BranchFilter) -> &mut Self {
        match filter {
            BranchFilter::All => self,
            BranchFilter::Branch(name) => self.where_eq("branch", name),
        }
    }

    /// Add GROUP BY columns.
    pub fn group_by(&mut self, cols: &[&str]) -> &mut Self {
        self.group_by_cols.extend(cols.iter().map(|c| c.to_string()));
        self
    }

    /// Add ORDER BY clauses (e.g. `"year ASC"`, `"first_seen ASC"`).
    pub fn order_by(&mut self, clauses: &[&str]) -> &mut Self {
        self.order_by_cols.extend(clauses.iter().map(|c| c.to_string()));
        self
    }

    /// Build the final SQL string and parameter list.
    pub fn build(&self) -> (String, Vec<String>) {
        let mut parts = vec![
            format!("SELECT {}", self.select_cols.join(", ")),
            format!("FROM {}", self.from_table),
        ];

        if !self.where_clauses.is_empty() {
            parts.push(format!("WHERE {}", self.where_clauses.join(" AND ")));
        }

        if !self.group_by_cols.is_empty() {
            parts.push(format!("GROUP BY {}", self.group_by_cols.join(", ")));
        }

        if !self.order_by_cols.is_empty() {
            parts.push(format!("ORDER BY {}", self.order_by_cols.join(", ")));
        }

        (parts.join("\n"), self.params.clone())
    }
}
