use std::collections::BTreeMap;

use uuid::Uuid;

/// Stock left after selling `quantity` units. Never goes below zero.
pub fn decrement_stock(current: i32, quantity: i32) -> i32 {
    current.saturating_sub(quantity.max(0)).max(0)
}

/// Total quantity per product, merged across lines and sorted by product
/// id. Product rows must be locked in this order.
pub fn demand_by_product<I>(lines: I) -> Vec<(Uuid, i32)>
where
    I: IntoIterator<Item = (Uuid, i32)>,
{
    let mut demand: BTreeMap<Uuid, i32> = BTreeMap::new();
    for (product_id, quantity) in lines {
        let total = demand.entry(product_id).or_insert(0);
        *total = total.saturating_add(quantity.max(0));
    }
    demand.into_iter().collect()
}

/// Per-order result of an inventory reconciliation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub adjusted: Vec<StockAdjustment>,
    /// Lines whose product no longer exists or could not be updated.
    pub skipped: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub previous: i32,
    pub current: i32,
}
