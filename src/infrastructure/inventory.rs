use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;

use crate::domain::inventory::{
    decrement_stock, demand_by_product, ReconcileReport, StockAdjustment,
};
use crate::domain::order::LineItem;
use crate::schema::products;

/// Decrement stock for every product of a paid order.
///
/// Must run inside the settlement transaction. Lines for the same product
/// are merged and rows are locked in product-id order, so two settlements
/// sharing products always lock them in the same sequence. Each product gets
/// its own savepoint: a failing one is rolled back alone and reported as
/// skipped.
pub fn reconcile(
    conn: &mut PgConnection,
    order_reference: &str,
    lines: &[LineItem],
) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    let demand = demand_by_product(lines.iter().map(|l| (l.product_id, l.quantity)));
    for (product_id, quantity) in demand {
        let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let stock = products::table
                .filter(products::id.eq(product_id))
                .select(products::stock)
                .for_update()
                .first::<i32>(conn)
                .optional()?;
            let Some(previous) = stock else {
                return Ok(None);
            };

            let current = decrement_stock(previous, quantity);
            diesel::update(products::table.filter(products::id.eq(product_id)))
                .set((
                    products::stock.eq(current),
                    products::updated_at.eq(Utc::now()),
                ))
                .execute(conn)?;
            Ok(Some(StockAdjustment {
                product_id,
                previous,
                current,
            }))
        });

        match result {
            Ok(Some(adjustment)) => {
                if adjustment.previous < quantity {
                    log::warn!(
                        "Order {}: product {} oversold ({} in stock, {} sold)",
                        order_reference,
                        product_id,
                        adjustment.previous,
                        quantity
                    );
                }
                report.adjusted.push(adjustment);
            }
            Ok(None) => {
                log::warn!(
                    "Order {}: product {} no longer exists, stock not adjusted",
                    order_reference,
                    product_id
                );
                report.skipped.push(product_id);
            }
            Err(e) => {
                log::error!(
                    "Order {}: failed to adjust stock for product {}: {}",
                    order_reference,
                    product_id,
                    e
                );
                report.skipped.push(product_id);
            }
        }
    }

    report
}
