//! CI/PL merge: combine price-bearing invoice items with volume-bearing
//! packing-list items by normalized product code.

use crate::models::LineItem;
use crate::normalize::normalize;
use std::collections::HashMap;

/// Fill each CI item's volume with the CBM sum of all PL rows sharing its
/// normalized product code. Packing lists often split one invoice line over
/// several size/color sub-rows, so many-to-one is expected. CI items with no
/// PL match keep `cbm = 0`.
pub fn merge_ci_pl(mut ci_items: Vec<LineItem>, pl_items: &[LineItem]) -> Vec<LineItem> {
    let mut cbm_by_code: HashMap<String, f64> = HashMap::new();
    for item in pl_items {
        *cbm_by_code.entry(normalize(&item.product_code)).or_insert(0.0) += item.cbm;
    }

    for item in &mut ci_items {
        if let Some(&cbm) = cbm_by_code.get(&normalize(&item.product_code)) {
            item.cbm = cbm;
        }
    }

    ci_items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ci(code: &str, qty: u32, price: f64) -> LineItem {
        LineItem {
            product_code: code.into(),
            description: code.into(),
            quantity: qty,
            unit_price_usd: price,
            ..Default::default()
        }
    }

    fn pl(code: &str, cbm: f64) -> LineItem {
        LineItem {
            product_code: code.into(),
            description: code.into(),
            quantity: 1,
            cbm,
            ..Default::default()
        }
    }

    #[test]
    fn test_sums_cbm_across_color_subrows() {
        let merged = merge_ci_pl(
            vec![ci("TP-MA4U4E", 3000, 7.23)],
            &[pl("tp-ma4u4e", 4.25), pl("TP-MA4U4E", 2.85)],
        );
        assert_eq!(merged.len(), 1);
        assert!((merged[0].cbm - 7.1).abs() < 1e-9);
    }

    #[test]
    fn test_no_pl_match_keeps_zero_cbm() {
        let merged = merge_ci_pl(vec![ci("TP-MA4U4E", 3000, 7.23)], &[]);
        assert_eq!(merged[0].cbm, 0.0);

        let merged = merge_ci_pl(vec![ci("TP-MA4U4E", 3000, 7.23)], &[pl("OL-PS601", 3.6)]);
        assert_eq!(merged[0].cbm, 0.0);
    }
}
