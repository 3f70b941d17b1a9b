use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Currency, DeliveryInfo, LineItem, OrderView};
use crate::domain::payment::{PaymentStatus, PaymentView};
use crate::schema::{commerce_order_outbox, order_lines, orders, payments, products};

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub reference: String,
    pub delivery_address: String,
    pub delivery_name: String,
    pub delivery_email: String,
    pub delivery_phone: String,
    pub user_id: Uuid,
    pub user_email: String,
    pub currency: String,
    pub subtotal: BigDecimal,
    pub delivery_cost: BigDecimal,
    pub total_amount: BigDecimal,
    pub order_status: String,
    pub payment_status: String,
    pub delivery_status: String,
    pub location: Option<String>,
    pub expected_date: Option<String>,
    pub rider: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_view(self, lines: Vec<OrderLineRow>) -> Result<OrderView, DomainError> {
        Ok(OrderView {
            id: self.id,
            delivery: DeliveryInfo {
                address: self.delivery_address,
                name: self.delivery_name,
                email: self.delivery_email,
                phone: self.delivery_phone,
            },
            reference: self.reference,
            user_id: self.user_id,
            user_email: self.user_email,
            currency: Currency::parse(&self.currency)?,
            lines: lines.into_iter().map(OrderLineRow::into_line_item).collect(),
            subtotal: self.subtotal,
            delivery_cost: self.delivery_cost,
            total_amount: self.total_amount,
            order_status: self.order_status,
            payment_status: PaymentStatus::parse(&self.payment_status)?,
            delivery_status: self.delivery_status,
            location: self.location,
            expected_date: self.expected_date,
            rider: self.rider,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    pub id: Uuid,
    pub reference: &'a str,
    pub delivery_address: &'a str,
    pub delivery_name: &'a str,
    pub delivery_email: &'a str,
    pub delivery_phone: &'a str,
    pub user_id: Uuid,
    pub user_email: &'a str,
    pub currency: &'a str,
    pub subtotal: BigDecimal,
    pub delivery_cost: BigDecimal,
    pub total_amount: BigDecimal,
    pub order_status: &'a str,
    pub payment_status: &'a str,
    pub delivery_status: &'a str,
}

/// Delivery fields an admin may change. `None` leaves the column as is.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct DeliveryChangeset {
    pub location: Option<String>,
    pub order_status: Option<String>,
    pub expected_date: Option<String>,
    pub rider: Option<String>,
    pub delivery_status: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_lines)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderLineRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub product_name: String,
    pub min_order_qty: i32,
    pub image_ref: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub subtotal: BigDecimal,
    pub created_at: DateTime<Utc>,
}

impl OrderLineRow {
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            product_id: self.product_id,
            product_name: self.product_name,
            min_order_qty: self.min_order_qty,
            image_ref: self.image_ref,
            unit_price: self.unit_price,
            quantity: self.quantity,
            subtotal: self.subtotal,
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_lines)]
pub struct NewOrderLineRow<'a> {
    pub id: Uuid,
    pub order_id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub product_name: &'a str,
    pub min_order_qty: i32,
    pub image_ref: &'a str,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub subtotal: BigDecimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: BigDecimal,
    pub payment_ref: String,
    pub currency: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentRow {
    pub fn into_view(self) -> Result<PaymentView, DomainError> {
        Ok(PaymentView {
            id: self.id,
            order_id: self.order_id,
            user_id: self.user_id,
            amount: self.amount,
            payment_ref: self.payment_ref,
            currency: Currency::parse(&self.currency)?,
            payment_status: PaymentStatus::parse(&self.payment_status)?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = payments)]
pub struct NewPaymentRow<'a> {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: BigDecimal,
    pub payment_ref: &'a str,
    pub currency: &'a str,
    pub payment_status: &'a str,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub price_ngn: BigDecimal,
    pub price_usd: BigDecimal,
    pub stock: i32,
    pub min_order_qty: i32,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = commerce_order_outbox)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = commerce_order_outbox)]
pub struct NewOutboxEventRow {
    pub id: Uuid,
    pub aggregate_type: String,
    pub aggregate_id: String,
    pub event_type: String,
    pub payload: Value,
}
