//! Inventory ledger integration tests: CSV-backed CRUD over the four tables.

mod common;

use sales_dashboard_sdk::models::{Purchase, Sale, StockItem, Supplier};
use sales_dashboard_sdk::{ColumnMap, DashboardError, Repository, SalesDashboard};
use std::fs;

fn stock_item(description: &str, quantity: i64) -> StockItem {
    StockItem {
        id: 0,
        product_id: 7,
        quantity,
        description: description.to_string(),
        price: 12.5,
    }
}

fn sale(products: &str) -> Sale {
    Sale {
        id: 0,
        date: "2024-03-01".to_string(),
        products: products.to_string(),
        total: 99.9,
        payment_method: "efectivo".to_string(),
    }
}

#[test]
fn append_to_missing_file_assigns_sequential_ids() {
    let (dashboard, _tmp) = common::empty_dashboard(ColumnMap::default());
    let stock = dashboard.ledger().stock();

    assert!(stock.load_all().unwrap().is_empty());

    let first = stock.append(stock_item("tornillos", 100)).unwrap();
    let second = stock.append(stock_item("tuercas", 50)).unwrap();
    assert_eq!(first.id, 1);
    assert_eq!(second.id, 2);

    let rows = stock.load_all().unwrap();
    assert_eq!(rows, vec![first, second]);
    assert!(stock.path().ends_with("stock.csv"));
}

#[test]
fn append_uses_max_id_plus_one() {
    let (dashboard, tmp) = common::empty_dashboard(ColumnMap::default());
    let data_dir = tmp.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    common::write_csv(
        &data_dir,
        "proveedores.csv",
        "id_proveedor,nombre,direccion,telefono,email\n\
         5,Acme,Calle 1,555-0100,acme@example.com\n\
         9,Globex,Calle 2,555-0199,globex@example.com\n",
    );

    let suppliers = dashboard.ledger().suppliers();
    let added = suppliers
        .append(Supplier {
            id: 42,
            name: "Initech".to_string(),
            address: "Calle 3".to_string(),
            phone: "555-0123".to_string(),
            email: "initech@example.com".to_string(),
        })
        .unwrap();

    assert_eq!(added.id, 10);
    let ids: Vec<i64> = suppliers.load_all().unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![5, 9, 10]);
}

#[test]
fn update_replaces_fields_of_existing_row() {
    let (dashboard, _tmp) = common::empty_dashboard(ColumnMap::default());
    let stock = dashboard.ledger().stock();
    let item = stock.append(stock_item("tornillos", 100)).unwrap();

    let mut changed = item.clone();
    changed.quantity = 80;
    changed.price = 13.0;
    assert!(stock.update(item.id, changed).unwrap());

    let stored = stock.get(item.id).unwrap().unwrap();
    assert_eq!(stored.quantity, 80);
    assert_eq!(stored.price, 13.0);
    assert_eq!(stored.description, "tornillos");
}

#[test]
fn update_and_delete_of_unknown_id_report_false() {
    let (dashboard, _tmp) = common::empty_dashboard(ColumnMap::default());
    let stock = dashboard.ledger().stock();
    stock.append(stock_item("tornillos", 100)).unwrap();

    assert!(!stock.update(99, stock_item("tuercas", 1)).unwrap());
    assert!(!stock.delete(99).unwrap());
    assert_eq!(stock.load_all().unwrap().len(), 1);
}

#[test]
fn delete_removes_only_the_given_row() {
    let (dashboard, _tmp) = common::empty_dashboard(ColumnMap::default());
    let purchases = dashboard.ledger().purchases();
    for total in [10.0, 20.0, 30.0] {
        purchases
            .append(Purchase {
                id: 0,
                supplier_id: 1,
                date: "2024-01-15".to_string(),
                total,
            })
            .unwrap();
    }

    assert!(purchases.delete(2).unwrap());
    let totals: Vec<f64> = purchases.load_all().unwrap().iter().map(|p| p.total).collect();
    assert_eq!(totals, vec![10.0, 30.0]);

    // Ids are not reused after a delete of a lower id
    let next = purchases
        .append(Purchase {
            id: 0,
            supplier_id: 2,
            date: "2024-01-16".to_string(),
            total: 5.0,
        })
        .unwrap();
    assert_eq!(next.id, 4);
}

#[test]
fn blank_text_field_is_rejected() {
    let (dashboard, _tmp) = common::empty_dashboard(ColumnMap::default());
    let stock = dashboard.ledger().stock();

    let err = stock.append(stock_item("  ", 1)).unwrap_err();
    assert!(matches!(err, DashboardError::InvalidArgument(_)));
    assert!(err.to_string().contains("stock.descripcion"));
    assert!(stock.load_all().unwrap().is_empty());
}

#[test]
fn text_with_commas_round_trips() {
    let (dashboard, _tmp) = common::empty_dashboard(ColumnMap::default());
    let sales = dashboard.ledger().sales();

    let stored = sales.append(sale("tornillos, tuercas, arandelas")).unwrap();
    let loaded = sales.get(stored.id).unwrap().unwrap();
    assert_eq!(loaded.products, "tornillos, tuercas, arandelas");
    assert_eq!(loaded.payment_method, "efectivo");
}

#[test]
fn rows_persist_across_dashboards() {
    let tmp = tempfile::tempdir().unwrap();
    let data_dir = tmp.path().join("data");

    {
        let dashboard = SalesDashboard::builder()
            .cache_dir(tmp.path().join("cache"))
            .data_dir(&data_dir)
            .offline(true)
            .build()
            .unwrap();
        dashboard.ledger().sales().append(sale("clavos")).unwrap();
    }

    assert!(data_dir.join("ventas.csv").is_file());

    let dashboard = SalesDashboard::builder()
        .cache_dir(tmp.path().join("cache"))
        .data_dir(&data_dir)
        .offline(true)
        .build()
        .unwrap();
    let rows = dashboard.ledger().sales().load_all().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].products, "clavos");
}

#[test]
fn deleting_every_row_leaves_header_only_file() {
    let (dashboard, _tmp) = common::empty_dashboard(ColumnMap::default());
    let stock = dashboard.ledger().stock();
    let item = stock.append(stock_item("tornillos", 100)).unwrap();

    assert!(stock.delete(item.id).unwrap());

    let contents = fs::read_to_string(stock.path()).unwrap();
    assert_eq!(contents.trim(), "id_stock,id_producto,cantidad,descripcion,precio");
    assert!(stock.load_all().unwrap().is_empty());
    assert_eq!(stock.append(stock_item("tuercas", 1)).unwrap().id, 1);
}

#[test]
fn ledger_does_not_disturb_loaded_sales() {
    let (dashboard, _tmp) = common::setup_dashboard();
    dashboard.ledger().sales().append(sale("clavos")).unwrap();

    assert!(dashboard.is_loaded());
    assert_eq!(
        dashboard
            .sales()
            .row_count(&sales_dashboard_sdk::BranchFilter::All)
            .unwrap(),
        7
    );
}

#[test]
fn each_table_lives_in_its_own_file() {
    let (dashboard, tmp) = common::empty_dashboard(ColumnMap::default());
    let ledger = dashboard.ledger();
    let data_dir = tmp.path().join("data");

    assert_eq!(ledger.stock().path(), data_dir.join("stock.csv"));
    assert_eq!(ledger.suppliers().path(), data_dir.join("proveedores.csv"));
    assert_eq!(ledger.purchases().path(), data_dir.join("compras.csv"));
    assert_eq!(ledger.sales().path(), data_dir.join("ventas.csv"));

    let purchases = ledger.repository::<Purchase>();
    purchases
        .append(Purchase {
            id: 0,
            supplier_id: 3,
            date: "2024-02-01".to_string(),
            total: 45.0,
        })
        .unwrap();
    assert!(data_dir.join("compras.csv").is_file());
    assert!(!data_dir.join("ventas.csv").exists());
}
