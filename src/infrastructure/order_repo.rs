use chrono::Utc;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::order::{
    DeliveryUpdate, ListResult, NewOrder, OrderFilter, OrderView, Page,
    DELIVERY_STATUS_PENDING, ORDER_STATUS_DELIVERED, ORDER_STATUS_PENDING,
};
use crate::domain::payment::{PaymentOutcome, PaymentStatus, PaymentView, Settlement, Transition};
use crate::domain::ports::OrderRepository;
use crate::schema::{commerce_order_outbox, order_lines, orders, payments};

use super::inventory;
use super::models::{
    DeliveryChangeset, NewOrderLineRow, NewOrderRow, NewOutboxEventRow, NewPaymentRow,
    OrderLineRow, OrderRow, PaymentRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        match e {
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(info.message().to_string())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

const AGGREGATE_TYPE: &str = "Order";

fn write_event(
    conn: &mut PgConnection,
    order_id: Uuid,
    event_type: &str,
    payload: Value,
) -> QueryResult<usize> {
    diesel::insert_into(commerce_order_outbox::table)
        .values(&NewOutboxEventRow {
            id: Uuid::new_v4(),
            aggregate_type: AGGREGATE_TYPE.to_string(),
            aggregate_id: order_id.to_string(),
            event_type: event_type.to_string(),
            payload,
        })
        .execute(conn)
}

/// Attach lines to order rows, preserving the row order.
fn assemble(conn: &mut PgConnection, rows: Vec<OrderRow>) -> Result<Vec<OrderView>, DomainError> {
    let lines = OrderLineRow::belonging_to(&rows)
        .select(OrderLineRow::as_select())
        .order(order_lines::position.asc())
        .load(conn)?;

    lines
        .grouped_by(&rows)
        .into_iter()
        .zip(rows)
        .map(|(lines, row)| row.into_view(lines))
        .collect()
}

fn load_order(conn: &mut PgConnection, id: Uuid) -> Result<Option<OrderView>, DomainError> {
    let row = orders::table
        .filter(orders::id.eq(id))
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(assemble(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

fn filtered(filter: OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let query = orders::table.into_boxed();
    match filter {
        OrderFilter::All => query,
        OrderFilter::ForUser(user_id) => query.filter(orders::user_id.eq(user_id)),
        OrderFilter::AwaitingDelivery => query
            .filter(orders::payment_status.eq(PaymentStatus::Paid.as_str()))
            .filter(orders::order_status.ne(ORDER_STATUS_DELIVERED)),
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // 1. Insert the order
            diesel::insert_into(orders::table)
                .values(&NewOrderRow {
                    id: order.id,
                    reference: &order.reference,
                    delivery_address: &order.delivery.address,
                    delivery_name: &order.delivery.name,
                    delivery_email: &order.delivery.email,
                    delivery_phone: &order.delivery.phone,
                    user_id: order.user_id,
                    user_email: &order.user_email,
                    currency: order.currency.as_str(),
                    subtotal: order.totals.subtotal.clone(),
                    delivery_cost: order.totals.delivery_cost.clone(),
                    total_amount: order.totals.total.clone(),
                    order_status: ORDER_STATUS_PENDING,
                    payment_status: PaymentStatus::Pending.as_str(),
                    delivery_status: DELIVERY_STATUS_PENDING,
                })
                .execute(conn)?;

            // 2. Insert the line snapshots
            let new_lines: Vec<NewOrderLineRow> = order
                .lines
                .iter()
                .enumerate()
                .map(|(position, l)| NewOrderLineRow {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    position: position as i32,
                    product_id: l.product_id,
                    product_name: &l.product_name,
                    min_order_qty: l.min_order_qty,
                    image_ref: &l.image_ref,
                    unit_price: l.unit_price.clone(),
                    quantity: l.quantity,
                    subtotal: l.subtotal.clone(),
                })
                .collect();
            diesel::insert_into(order_lines::table)
                .values(&new_lines)
                .execute(conn)?;

            // 3. Insert the PENDING payment
            diesel::insert_into(payments::table)
                .values(&NewPaymentRow {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    user_id: Some(order.user_id),
                    amount: order.totals.total.clone(),
                    payment_ref: &order.payment_reference,
                    currency: order.currency.as_str(),
                    payment_status: PaymentStatus::Pending.as_str(),
                })
                .execute(conn)?;

            // 4. Outbox event in the same transaction
            let line_payloads: Vec<Value> = order
                .lines
                .iter()
                .map(|l| {
                    json!({
                        "product_id": l.product_id,
                        "quantity": l.quantity,
                        "unit_price": l.unit_price.to_string()
                    })
                })
                .collect();
            write_event(
                conn,
                order.id,
                "OrderCreated",
                json!({
                    "order_id": order.id,
                    "reference": order.reference,
                    "payment_reference": order.payment_reference,
                    "user_id": order.user_id,
                    "currency": order.currency.as_str(),
                    "total": order.totals.total.to_string(),
                    "status": ORDER_STATUS_PENDING,
                    "lines": line_payloads
                }),
            )?;

            load_order(conn, order.id)?
                .ok_or_else(|| DomainError::Internal("order vanished after insert".to_string()))
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;
        load_order(&mut conn, id)
    }

    fn find_by_reference(&self, reference: &str) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = orders::table
            .filter(orders::reference.eq(reference))
            .select(OrderRow::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(assemble(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn find_payment(&self, order_id: Uuid) -> Result<Option<PaymentView>, DomainError> {
        let mut conn = self.pool.get()?;

        payments::table
            .filter(payments::order_id.eq(order_id))
            .select(PaymentRow::as_select())
            .first(&mut conn)
            .optional()?
            .map(PaymentRow::into_view)
            .transpose()
    }

    fn settle(
        &self,
        order_id: Uuid,
        gateway_reference: &str,
        outcome: PaymentOutcome,
    ) -> Result<Settlement, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Row lock serialises concurrent verifications of one order.
            let row = orders::table
                .filter(orders::id.eq(order_id))
                .select(OrderRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Order not found"))?;
            let payment_id = payments::table
                .filter(payments::order_id.eq(order_id))
                .select(payments::id)
                .for_update()
                .first::<Uuid>(conn)
                .optional()?
                .ok_or_else(|| DomainError::not_found("Payment record for order not found"))?;

            let current = PaymentStatus::parse(&row.payment_status)?;
            let transition = Transition::decide(current, outcome);
            let now = Utc::now();
            let mut reconciliation = None;

            let new_status = match transition {
                Transition::MarkPaid => {
                    let updated = diesel::update(
                        orders::table
                            .filter(orders::id.eq(order_id))
                            .filter(orders::payment_status.eq(PaymentStatus::Pending.as_str())),
                    )
                    .set((
                        orders::payment_status.eq(PaymentStatus::Paid.as_str()),
                        orders::updated_at.eq(now),
                    ))
                    .execute(conn)?;
                    if updated != 1 {
                        return Err(DomainError::Conflict(format!(
                            "order {} was settled concurrently",
                            row.reference
                        )));
                    }
                    let lines = load_order(conn, order_id)?
                        .map(|o| o.lines)
                        .unwrap_or_default();
                    let report = inventory::reconcile(conn, &row.reference, &lines);
                    let adjusted: Vec<Value> = report
                        .adjusted
                        .iter()
                        .map(|a| {
                            json!({
                                "product_id": a.product_id,
                                "previous": a.previous,
                                "current": a.current
                            })
                        })
                        .collect();
                    write_event(
                        conn,
                        order_id,
                        "OrderPaid",
                        json!({
                            "order_id": order_id,
                            "reference": row.reference,
                            "payment_reference": gateway_reference,
                            "adjusted": adjusted,
                            "skipped": report.skipped,
                        }),
                    )?;
                    reconciliation = Some(report);
                    Some(PaymentStatus::Paid)
                }
                Transition::MarkFailed => {
                    let updated = diesel::update(
                        orders::table
                            .filter(orders::id.eq(order_id))
                            .filter(orders::payment_status.eq(PaymentStatus::Pending.as_str())),
                    )
                    .set((
                        orders::payment_status.eq(PaymentStatus::Failed.as_str()),
                        orders::updated_at.eq(now),
                    ))
                    .execute(conn)?;
                    if updated != 1 {
                        return Err(DomainError::Conflict(format!(
                            "order {} was settled concurrently",
                            row.reference
                        )));
                    }
                    write_event(
                        conn,
                        order_id,
                        "OrderPaymentFailed",
                        json!({
                            "order_id": order_id,
                            "reference": row.reference,
                            "payment_reference": gateway_reference,
                        }),
                    )?;
                    Some(PaymentStatus::Failed)
                }
                Transition::RecordReference => None,
                Transition::Unchanged => {
                    log::debug!("Order {} already paid; nothing to settle", row.reference);
                    let order = assemble(conn, vec![row])?
                        .pop()
                        .ok_or_else(|| DomainError::Internal("order row lost".to_string()))?;
                    return Ok(Settlement {
                        order,
                        transitioned: false,
                        reconciliation: None,
                    });
                }
            };

            // The payment row mirrors the order's status; the order is
            // authoritative.
            let payment = diesel::update(payments::table.filter(payments::id.eq(payment_id)));
            match new_status {
                Some(status) => payment
                    .set((
                        payments::payment_ref.eq(gateway_reference),
                        payments::payment_status.eq(status.as_str()),
                        payments::updated_at.eq(now),
                    ))
                    .execute(conn)?,
                None => payment
                    .set((
                        payments::payment_ref.eq(gateway_reference),
                        payments::updated_at.eq(now),
                    ))
                    .execute(conn)?,
            };

            let order = load_order(conn, order_id)?
                .ok_or_else(|| DomainError::Internal("order row lost".to_string()))?;
            Ok(Settlement {
                order,
                transitioned: transition.changes_status(),
                reconciliation,
            })
        })
    }

    fn update_delivery(
        &self,
        id: Uuid,
        update: &DeliveryUpdate,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let changes = DeliveryChangeset {
                location: update.location.clone(),
                order_status: update.order_status.clone(),
                expected_date: update.expected_date.clone(),
                rider: update.rider.clone(),
                delivery_status: update.delivery_status.clone(),
                updated_at: Utc::now(),
            };
            let updated = diesel::update(orders::table.filter(orders::id.eq(id)))
                .set(&changes)
                .execute(conn)?;
            if updated == 0 {
                return Ok(None);
            }

            write_event(
                conn,
                id,
                "OrderDeliveryUpdated",
                json!({
                    "order_id": id,
                    "location": update.location,
                    "order_status": update.order_status,
                    "expected_date": update.expected_date,
                    "rider": update.rider,
                    "delivery_status": update.delivery_status,
                }),
            )?;
            load_order(conn, id)
        })
    }

    fn list(&self, filter: OrderFilter, page: Page) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let rows = filtered(filter)
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(page.limit)
                .offset(page.offset())
                .load(conn)?;

            Ok(ListResult {
                items: assemble(conn, rows)?,
                total,
            })
        })
    }
}
