//! Landed-cost allocation.
//!
//! Pure arithmetic over finalized, matched line items: allocate each order's
//! paid EUR by USD value proportion, the container freight by CBM
//! proportion, and apply per-category import duty. Stateless; all division
//! guards are explicit fallbacks, never NaN.

use crate::duty::DutyTable;
use crate::models::{ContainerInfo, CostRow, SupplierOrder};

/// Presentation rounding: 4 decimals for per-unit figures.
fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Presentation rounding: 2 decimals for totals and rates.
fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Container CBM to divide by: the entered total, or the line items' sum
/// when the operator left it at zero, or 1.0 as the final zero-divisor
/// guard.
fn effective_total_cbm(orders: &[SupplierOrder], container: &ContainerInfo) -> f64 {
    if container.total_cbm > 0.0 {
        return container.total_cbm;
    }
    let derived: f64 = orders
        .iter()
        .flat_map(|o| o.line_items.iter())
        .map(|i| i.cbm)
        .sum();
    if derived > 0.0 {
        derived
    } else {
        1.0
    }
}

/// Compute one cost row per quantity-positive line item. Items with zero
/// quantity are excluded from the output entirely, not zero-filled. Must be
/// called after matching; items without a category fall into the zero-duty
/// "Other" bucket.
pub fn allocate(
    orders: &[SupplierOrder],
    container: &ContainerInfo,
    duties: &DutyTable,
) -> Vec<CostRow> {
    let mut rows = Vec::new();
    let total_cbm = effective_total_cbm(orders, container);

    for order in orders {
        let order_total_usd = order.total_value_usd();
        let order_paid_eur = order.total_paid_eur();

        for item in &order.line_items {
            if item.quantity == 0 {
                continue;
            }
            let qty = item.quantity as f64;

            let item_value_usd = qty * item.unit_price_usd;
            let value_proportion = if order_total_usd > 0.0 {
                item_value_usd / order_total_usd
            } else {
                0.0
            };
            let product_cost_per_unit = order_paid_eur * value_proportion / qty;

            let cbm_proportion = item.cbm / total_cbm;
            let shipping_cost_per_unit = container.total_freight_eur * cbm_proportion / qty;

            let category = item.category.as_deref().unwrap_or("Other");
            let duty_rate = duties.rate_percent(category) / 100.0;
            let import_duty_per_unit = product_cost_per_unit * duty_rate;

            let landed_cost_per_unit =
                product_cost_per_unit + shipping_cost_per_unit + import_duty_per_unit;

            rows.push(CostRow {
                ean: item.ean.clone().unwrap_or_default(),
                product: item.description.clone(),
                supplier: order.supplier_name.clone(),
                order_number: order.order_number.clone(),
                category: category.to_string(),
                quantity: item.quantity,
                cbm: item.cbm,
                unit_price_usd: item.unit_price_usd,
                product_cost_per_unit_eur: round4(product_cost_per_unit),
                shipping_cost_per_unit_eur: round4(shipping_cost_per_unit),
                duty_rate_percent: round2(duty_rate * 100.0),
                import_duty_per_unit_eur: round4(import_duty_per_unit),
                landed_cost_per_unit_eur: round4(landed_cost_per_unit),
                total_value_eur: round2(landed_cost_per_unit * qty),
            });
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, Payment};

    fn item(code: &str, qty: u32, price: f64, cbm: f64, category: &str) -> LineItem {
        LineItem {
            product_code: code.into(),
            description: code.into(),
            quantity: qty,
            unit_price_usd: price,
            cbm,
            ean: Some(format!("87208282901{:02}", qty % 100)),
            category: Some(category.into()),
            ..Default::default()
        }
    }

    fn container(freight: f64, cbm: f64) -> ContainerInfo {
        ContainerInfo {
            container_id: "MSKU1234567".into(),
            total_freight_eur: freight,
            total_cbm: cbm,
        }
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-6, "{} != {}", a, b);
    }

    #[test]
    fn test_value_proportion_allocation() {
        // Two items of equal USD value split €900 paid 50/50
        let order = SupplierOrder {
            supplier_name: "Toporek".into(),
            order_number: "PO-1".into(),
            payments: vec![Payment::eur(900.0)],
            line_items: vec![
                item("A", 100, 5.0, 0.0, "Other"),
                item("B", 50, 10.0, 0.0, "Other"),
            ],
        };
        let rows = allocate(&[order], &container(0.0, 10.0), &DutyTable::default());

        assert_eq!(rows.len(), 2);
        assert_close(rows[0].product_cost_per_unit_eur, 4.5); // €450 / 100
        assert_close(rows[1].product_cost_per_unit_eur, 9.0); // €450 / 50
    }

    #[test]
    fn test_shipping_by_cbm_proportion() {
        let order = SupplierOrder {
            supplier_name: "Ouli".into(),
            order_number: "PO-2".into(),
            payments: vec![],
            line_items: vec![item("A", 50, 1.0, 2.0, "Other")],
        };
        let rows = allocate(&[order], &container(1000.0, 10.0), &DutyTable::default());

        // cbm proportion 0.2 -> €200 shipping -> €4.00 per unit
        assert_close(rows[0].shipping_cost_per_unit_eur, 4.0);
    }

    #[test]
    fn test_duty_on_product_cost() {
        let order = SupplierOrder {
            supplier_name: "S".into(),
            order_number: "PO-3".into(),
            payments: vec![Payment::eur(1000.0)],
            line_items: vec![item("A", 100, 5.0, 0.0, "Laptop Stand")],
        };
        let rows = allocate(&[order], &container(0.0, 1.0), &DutyTable::default());

        assert_close(rows[0].product_cost_per_unit_eur, 10.0);
        assert_eq!(rows[0].duty_rate_percent, 6.0);
        assert_close(rows[0].import_duty_per_unit_eur, 0.6);
        assert_close(rows[0].landed_cost_per_unit_eur, 10.6);
        assert_eq!(rows[0].total_value_eur, 1060.0);
    }

    #[test]
    fn test_zero_quantity_excluded() {
        let order = SupplierOrder {
            supplier_name: "S".into(),
            order_number: "PO-4".into(),
            payments: vec![Payment::eur(100.0)],
            line_items: vec![
                item("A", 0, 5.0, 1.0, "Other"),
                item("B", 10, 5.0, 1.0, "Other"),
            ],
        };
        let rows = allocate(&[order], &container(100.0, 2.0), &DutyTable::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product, "B");
    }

    #[test]
    fn test_allocation_conservation() {
        // Product cost summed over items equals the order's paid EUR
        let order = SupplierOrder {
            supplier_name: "S".into(),
            order_number: "PO-5".into(),
            payments: vec![Payment::eur(700.0), Payment::usd(250.0, 0.92)],
            line_items: vec![
                item("A", 120, 7.23, 4.25, "Stekkerdoos"),
                item("B", 960, 2.81, 3.6, "Reisstekker"),
                item("C", 55, 11.4, 1.1, "Kabel"),
            ],
        };
        let paid = order.total_paid_eur();
        let rows = allocate(&[order], &container(0.0, 8.95), &DutyTable::default());

        let recovered: f64 = rows
            .iter()
            .map(|r| r.product_cost_per_unit_eur * r.quantity as f64)
            .sum();
        // Within rounding tolerance of the 4-decimal per-unit figures
        assert!((recovered - paid).abs() < 0.1, "{} vs {}", recovered, paid);
    }

    #[test]
    fn test_shipping_conservation() {
        let order = SupplierOrder {
            supplier_name: "S".into(),
            order_number: "PO-6".into(),
            payments: vec![],
            line_items: vec![
                item("A", 100, 1.0, 4.0, "Other"),
                item("B", 200, 1.0, 6.0, "Other"),
            ],
        };
        // Container CBM equals the items' sum
        let rows = allocate(&[order], &container(1000.0, 10.0), &DutyTable::default());
        let recovered: f64 = rows
            .iter()
            .map(|r| r.shipping_cost_per_unit_eur * r.quantity as f64)
            .sum();
        assert!((recovered - 1000.0).abs() < 0.1);
    }

    #[test]
    fn test_zero_divisor_guards() {
        // No payments, zero prices, zero CBM everywhere: output is all
        // zeros, never NaN
        let order = SupplierOrder {
            supplier_name: "S".into(),
            order_number: "PO-7".into(),
            payments: vec![],
            line_items: vec![item("A", 10, 0.0, 0.0, "Other")],
        };
        let rows = allocate(&[order], &container(500.0, 0.0), &DutyTable::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_cost_per_unit_eur, 0.0);
        assert_eq!(rows[0].shipping_cost_per_unit_eur, 0.0);
        assert_eq!(rows[0].landed_cost_per_unit_eur, 0.0);
        assert!(rows[0].total_value_eur.is_finite());
    }

    #[test]
    fn test_container_cbm_derived_from_items() {
        let order = SupplierOrder {
            supplier_name: "S".into(),
            order_number: "PO-8".into(),
            payments: vec![],
            line_items: vec![
                item("A", 10, 0.0, 3.0, "Other"),
                item("B", 10, 0.0, 7.0, "Other"),
            ],
        };
        // total_cbm left at zero: derived as 10.0 from the items
        let rows = allocate(&[order], &container(1000.0, 0.0), &DutyTable::default());
        assert_close(rows[0].shipping_cost_per_unit_eur, 30.0); // 3/10 * 1000 / 10
        assert_close(rows[1].shipping_cost_per_unit_eur, 70.0);
    }

    #[test]
    fn test_missing_category_falls_back_to_other() {
        let mut li = item("A", 10, 1.0, 0.0, "unused");
        li.category = None;
        let order = SupplierOrder {
            supplier_name: "S".into(),
            order_number: "PO-9".into(),
            payments: vec![Payment::eur(100.0)],
            line_items: vec![li],
        };
        let rows = allocate(&[order], &container(0.0, 1.0), &DutyTable::default());
        assert_eq!(rows[0].category, "Other");
        assert_eq!(rows[0].duty_rate_percent, 0.0);
        assert_eq!(rows[0].import_duty_per_unit_eur, 0.0);
    }
}
