//! Sales query integration tests: branches, summaries, monthly series.

mod common;

use chrono::NaiveDate;
use sales_dashboard_sdk::BranchFilter;

fn month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap()
}

fn filters() -> Vec<BranchFilter> {
    vec![
        BranchFilter::All,
        BranchFilter::branch("BranchA"),
        BranchFilter::branch("BranchB"),
        BranchFilter::branch("Nowhere"),
    ]
}

// ---------------------------------------------------------------------------
// branches / products
// ---------------------------------------------------------------------------

#[test]
fn branches_in_order_of_first_appearance() {
    let (dashboard, _tmp) = common::setup_dashboard();
    assert_eq!(dashboard.sales().branches().unwrap(), vec!["BranchA", "BranchB"]);
}

#[test]
fn products_in_order_of_first_appearance() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let sales = dashboard.sales();

    assert_eq!(
        sales.products(&BranchFilter::All).unwrap(),
        vec!["Widget", "Gadget", "Gizmo"]
    );
    assert_eq!(
        sales.products(&BranchFilter::branch("BranchB")).unwrap(),
        vec!["Widget", "Gadget"]
    );
}

#[test]
fn branch_comparison_is_exact() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let sales = dashboard.sales();

    assert_eq!(sales.row_count(&BranchFilter::branch("brancha")).unwrap(), 0);
    assert_eq!(sales.row_count(&BranchFilter::branch("BranchA ")).unwrap(), 0);
    assert_eq!(sales.row_count(&BranchFilter::branch("BranchA")).unwrap(), 3);
}

#[test]
fn unknown_branch_yields_no_products() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let filter = BranchFilter::branch("Nowhere");

    assert_eq!(dashboard.sales().row_count(&filter).unwrap(), 0);
    assert!(dashboard.sales().summaries(&filter).unwrap().is_empty());
    common::assert_close(dashboard.sales().total_units(&filter).unwrap(), 0.0);
}

// ---------------------------------------------------------------------------
// summaries
// ---------------------------------------------------------------------------

#[test]
fn widget_summary_for_branch_a() {
    let (dashboard, _tmp) = common::setup_dashboard();

    let widget = dashboard
        .sales()
        .summary("Widget", &BranchFilter::branch("BranchA"))
        .unwrap()
        .unwrap();

    common::assert_close(widget.units_total, 30.0);
    common::assert_close(widget.revenue_total, 320.0);
    common::assert_close(widget.cost_total, 170.0);
    common::assert_close(widget.avg_price, 320.0 / 30.0);
    assert_eq!(format!("{:.2}", widget.avg_price), "10.67");
    common::assert_close(widget.avg_margin_ratio, 0.46875);
}

#[test]
fn summaries_merge_branches_when_unfiltered() {
    let (dashboard, _tmp) = common::setup_dashboard();

    let widget = dashboard
        .sales()
        .summary("Widget", &BranchFilter::All)
        .unwrap()
        .unwrap();
    common::assert_close(widget.units_total, 35.0);
    common::assert_close(widget.revenue_total, 370.0);
    common::assert_close(widget.cost_total, 200.0);
}

#[test]
fn zero_sales_product_has_zero_ratios() {
    let (dashboard, _tmp) = common::setup_dashboard();

    let gizmo = dashboard
        .sales()
        .summary("Gizmo", &BranchFilter::All)
        .unwrap()
        .unwrap();
    assert_eq!(gizmo.units_total, 0.0);
    assert_eq!(gizmo.avg_price, 0.0);
    assert_eq!(gizmo.avg_margin_ratio, 0.0);
}

#[test]
fn summary_for_absent_product_is_none() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let summary = dashboard
        .sales()
        .summary("Gadget", &BranchFilter::branch("BranchA"))
        .unwrap();
    assert!(summary.is_none());
}

#[test]
fn per_product_units_add_up_to_grand_total() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let sales = dashboard.sales();

    for filter in filters() {
        let per_product: f64 = sales
            .summaries(&filter)
            .unwrap()
            .iter()
            .map(|s| s.units_total)
            .sum();
        common::assert_close(per_product, sales.total_units(&filter).unwrap());
    }
}

#[test]
fn average_price_times_units_is_revenue() {
    let (dashboard, _tmp) = common::setup_dashboard();

    for filter in filters() {
        for s in dashboard.sales().summaries(&filter).unwrap() {
            if s.units_total > 0.0 {
                common::assert_close(s.avg_price * s.units_total, s.revenue_total);
            }
        }
    }
}

#[test]
fn margin_ratio_is_at_most_one_and_zero_without_revenue() {
    let (dashboard, _tmp) = common::setup_dashboard();

    for filter in filters() {
        for s in dashboard.sales().summaries(&filter).unwrap() {
            assert!(s.avg_margin_ratio <= 1.0);
            if s.revenue_total == 0.0 {
                assert_eq!(s.avg_margin_ratio, 0.0);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// monthly series
// ---------------------------------------------------------------------------

#[test]
fn widget_monthly_series_for_branch_a() {
    let (dashboard, _tmp) = common::setup_dashboard();

    let series = dashboard
        .sales()
        .monthly_series("Widget", &BranchFilter::branch("BranchA"))
        .unwrap();

    assert_eq!(series.len(), 2);
    assert_eq!(series[0].month, month(2023, 1));
    assert_eq!(
        (series[0].units_total, series[0].revenue_total, series[0].cost_total),
        (10.0, 100.0, 60.0)
    );
    assert_eq!(series[1].month, month(2023, 2));
    assert_eq!(
        (series[1].units_total, series[1].revenue_total, series[1].cost_total),
        (20.0, 220.0, 110.0)
    );
}

#[test]
fn rows_sharing_a_month_are_summed_across_branches() {
    let (dashboard, _tmp) = common::setup_dashboard();

    let series = dashboard
        .sales()
        .monthly_series("Widget", &BranchFilter::All)
        .unwrap();
    assert_eq!(series[0].month, month(2023, 1));
    assert_eq!(series[0].units_total, 15.0);
    assert_eq!(series[0].revenue_total, 150.0);
}

#[test]
fn monthly_series_is_strictly_ascending() {
    let (dashboard, _tmp) = common::setup_dashboard();

    // Gadget rows are out of order in the file
    for filter in filters() {
        for (_, series) in dashboard.sales().monthly_series_by_product(&filter).unwrap() {
            assert!(series.windows(2).all(|w| w[0].month < w[1].month));
        }
    }
    let gadget = dashboard
        .sales()
        .monthly_series("Gadget", &BranchFilter::All)
        .unwrap();
    let months: Vec<NaiveDate> = gadget.iter().map(|m| m.month).collect();
    assert_eq!(months, vec![month(2023, 1), month(2023, 2), month(2023, 3)]);
}

#[test]
fn monthly_series_spans_year_boundary() {
    let (dashboard, _tmp) = common::setup_dashboard_with(
        "branch,product,year,month,units_sold,revenue_total,cost_total\n\
         A,Widget,2024,1,3,30,10\n\
         A,Widget,2023,12,2,20,10\n\
         A,Widget,2023,11,1,10,5\n",
    );

    let series = dashboard
        .sales()
        .monthly_series("Widget", &BranchFilter::All)
        .unwrap();
    let months: Vec<NaiveDate> = series.iter().map(|m| m.month).collect();
    assert_eq!(months, vec![month(2023, 11), month(2023, 12), month(2024, 1)]);
}

#[test]
fn monthly_series_for_absent_product_is_empty() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let series = dashboard
        .sales()
        .monthly_series("Gadget", &BranchFilter::branch("BranchA"))
        .unwrap();
    assert!(series.is_empty());
}

#[test]
fn records_follow_file_order() {
    let (dashboard, _tmp) = common::setup_dashboard();
    let records = dashboard.sales().records(&BranchFilter::branch("BranchB")).unwrap();
    let products: Vec<&str> = records.iter().map(|r| r.product.as_str()).collect();
    assert_eq!(products, vec!["Widget", "Gadget", "Gadget", "Gadget"]);
    assert_eq!(records[1].month, 3);
}
