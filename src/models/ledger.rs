//! Inventory ledger rows. Field names on disk follow the ledger CSV headers.

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerEntity;

// ---------------------------------------------------------------------------
// StockItem: stock.csv
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    #[serde(rename = "id_stock")]
    pub id: i64,
    #[serde(rename = "id_producto")]
    pub product_id: i64,
    #[serde(rename = "cantidad")]
    pub quantity: i64,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "precio")]
    pub price: f64,
}

impl LedgerEntity for StockItem {
    const TABLE: &'static str = "stock";
    const FILE: &'static str = "stock.csv";
    const ID_COLUMN: &'static str = "id_stock";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("id_stock", "BIGINT"),
        ("id_producto", "BIGINT"),
        ("cantidad", "BIGINT"),
        ("descripcion", "VARCHAR"),
        ("precio", "DOUBLE"),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

// ---------------------------------------------------------------------------
// Supplier: proveedores.csv
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    #[serde(rename = "id_proveedor")]
    pub id: i64,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    pub email: String,
}

impl LedgerEntity for Supplier {
    const TABLE: &'static str = "proveedores";
    const FILE: &'static str = "proveedores.csv";
    const ID_COLUMN: &'static str = "id_proveedor";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("id_proveedor", "BIGINT"),
        ("nombre", "VARCHAR"),
        ("direccion", "VARCHAR"),
        ("telefono", "VARCHAR"),
        ("email", "VARCHAR"),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

// ---------------------------------------------------------------------------
// Purchase: compras.csv
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    #[serde(rename = "id_compra")]
    pub id: i64,
    #[serde(rename = "id_proveedor")]
    pub supplier_id: i64,
    /// ISO date (`YYYY-MM-DD`).
    #[serde(rename = "fecha")]
    pub date: String,
    pub total: f64,
}

impl LedgerEntity for Purchase {
    const TABLE: &'static str = "compras";
    const FILE: &'static str = "compras.csv";
    const ID_COLUMN: &'static str = "id_compra";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("id_compra", "BIGINT"),
        ("id_proveedor", "BIGINT"),
        ("fecha", "VARCHAR"),
        ("total", "DOUBLE"),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

// ---------------------------------------------------------------------------
// Sale: ventas.csv
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    #[serde(rename = "id_venta")]
    pub id: i64,
    #[serde(rename = "fecha")]
    pub date: String,
    /// Free-text list of the products sold.
    #[serde(rename = "productos")]
    pub products: String,
    pub total: f64,
    #[serde(rename = "metodo_pago")]
    pub payment_method: String,
}

impl LedgerEntity for Sale {
    const TABLE: &'static str = "ventas";
    const FILE: &'static str = "ventas.csv";
    const ID_COLUMN: &'static str = "id_venta";
    const COLUMNS: &'static [(&'static str, &'static str)] = &[
        ("id_venta", "BIGINT"),
        ("fecha", "VARCHAR"),
        ("productos", "VARCHAR"),
        ("total", "DOUBLE"),
        ("metodo_pago", "VARCHAR"),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}
