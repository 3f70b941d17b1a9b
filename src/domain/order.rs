use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::payment::PaymentStatus;

pub const ORDER_STATUS_PENDING: &str = "PENDING";
pub const ORDER_STATUS_DELIVERED: &str = "DELIVERED";
pub const DELIVERY_STATUS_PENDING: &str = "PENDING";

/// Decimal places stored for every money column.
pub const MONEY_SCALE: i64 = 2;

/// Rejects amounts with more decimal places than the money columns keep.
/// Trailing zeros do not count: `1.500` is accepted as `1.5`.
pub fn check_money_scale(amount: &BigDecimal, what: &str) -> Result<(), DomainError> {
    let (_, scale) = amount.normalized().as_bigint_and_exponent();
    if scale > MONEY_SCALE {
        return Err(DomainError::invalid(format!(
            "{what} {amount} has more than {MONEY_SCALE} decimal places"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Usd,
    Ngn,
}

impl Currency {
    /// Storefront rule: anything other than `USD` is charged in naira.
    pub fn from_payment_type(payment_type: &str) -> Self {
        if payment_type.trim().eq_ignore_ascii_case("USD") {
            Currency::Usd
        } else {
            Currency::Ngn
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Ngn => "NGN",
        }
    }

    pub fn parse(code: &str) -> Result<Self, DomainError> {
        match code {
            "USD" => Ok(Currency::Usd),
            "NGN" => Ok(Currency::Ngn),
            other => Err(DomainError::Internal(format!(
                "unknown currency code '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryInfo {
    pub address: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl DeliveryInfo {
    pub fn validate(&self) -> Result<(), DomainError> {
        let fields = [
            ("address", &self.address),
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(DomainError::invalid(format!(
                "delivery info is missing '{field}'"
            ))),
            None => Ok(()),
        }
    }
}

/// Checkout line as submitted by the storefront.
#[derive(Debug, Clone)]
pub struct LineItemInput {
    pub product_id: Uuid,
    pub product_name: String,
    pub min_order_qty: i32,
    pub image_ref: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
}

/// Price snapshot taken when the order is created. Never recomputed from the
/// live catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub min_order_qty: i32,
    pub image_ref: String,
    pub unit_price: BigDecimal,
    pub quantity: i32,
    pub subtotal: BigDecimal,
}

impl LineItem {
    pub fn snapshot(input: &LineItemInput) -> Result<Self, DomainError> {
        if input.quantity < 1 {
            return Err(DomainError::invalid(format!(
                "quantity for product {} must be at least 1",
                input.product_id
            )));
        }
        if input.unit_price < BigDecimal::from(0) {
            return Err(DomainError::invalid(format!(
                "unit price for product {} must not be negative",
                input.product_id
            )));
        }
        check_money_scale(
            &input.unit_price,
            &format!("unit price for product {}", input.product_id),
        )?;
        Ok(Self {
            product_id: input.product_id,
            product_name: input.product_name.clone(),
            min_order_qty: input.min_order_qty,
            image_ref: input.image_ref.clone(),
            unit_price: input.unit_price.clone(),
            quantity: input.quantity,
            subtotal: &input.unit_price * BigDecimal::from(input.quantity),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub subtotal: BigDecimal,
    pub delivery_cost: BigDecimal,
    pub total: BigDecimal,
}

impl Totals {
    pub fn compute(lines: &[LineItem], delivery_cost: BigDecimal) -> Self {
        let subtotal = lines
            .iter()
            .fold(BigDecimal::from(0), |acc, l| acc + &l.subtotal);
        let total = &subtotal + &delivery_cost;
        Self {
            subtotal,
            delivery_cost,
            total,
        }
    }
}

/// Everything needed to persist a new order together with its payment row.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub reference: String,
    pub payment_reference: String,
    pub delivery: DeliveryInfo,
    pub user_id: Uuid,
    pub user_email: String,
    pub currency: Currency,
    pub lines: Vec<LineItem>,
    pub totals: Totals,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub reference: String,
    pub delivery: DeliveryInfo,
    pub user_id: Uuid,
    pub user_email: String,
    pub currency: Currency,
    pub lines: Vec<LineItem>,
    pub subtotal: BigDecimal,
    pub delivery_cost: BigDecimal,
    pub total_amount: BigDecimal,
    pub order_status: String,
    pub payment_status: PaymentStatus,
    pub delivery_status: String,
    pub location: Option<String>,
    pub expected_date: Option<String>,
    pub rider: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<OrderView>,
    pub total: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFilter {
    All,
    ForUser(Uuid),
    /// Paid orders whose order status is not yet DELIVERED.
    AwaitingDelivery,
}

/// Partial delivery update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct DeliveryUpdate {
    pub location: Option<String>,
    pub order_status: Option<String>,
    pub expected_date: Option<String>,
    pub rider: Option<String>,
    pub delivery_status: Option<String>,
}

impl DeliveryUpdate {
    pub fn is_empty(&self) -> bool {
        self.location.is_none()
            && self.order_status.is_none()
            && self.expected_date.is_none()
            && self.rider.is_none()
            && self.delivery_status.is_none()
    }
}

/// Page/limit normalisation shared by every paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;
    /// Highest page whose offset still fits in an `i64` at any limit.
    pub const MAX_PAGE: i64 = i64::MAX / Self::MAX_LIMIT;

    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, Self::MAX_PAGE),
            limit: limit
                .unwrap_or(Self::DEFAULT_LIMIT)
                .clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}
