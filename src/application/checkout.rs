use std::sync::Arc;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use serde_json::json;
use uuid::Uuid;

use crate::config::CheckoutConfig;
use crate::domain::errors::{DomainError, GatewayError};
use crate::domain::order::{
    check_money_scale, Currency, DeliveryInfo, LineItem, LineItemInput, NewOrder, OrderView,
    Totals,
};
use crate::domain::payment::InitializeRequest;
use crate::domain::ports::{OrderRepository, PaymentGateway};
use crate::domain::reference::draw_reference_pair;

/// Checkout payload after transport decoding. Optional fields are the ones
/// the storefront may omit and that are validated here.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub delivery: Option<DeliveryInfo>,
    pub items: Vec<LineItemInput>,
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    pub payment_type: Option<String>,
    pub delivery_cost: Option<BigDecimal>,
    pub subtotal: Option<BigDecimal>,
    pub total: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSession {
    pub order_id: Uuid,
    pub order_reference: String,
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

pub struct CheckoutService {
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
    config: CheckoutConfig,
}

impl CheckoutService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            orders,
            gateway,
            config,
        }
    }

    /// Persist a PENDING order and payment, then open a hosted payment session.
    ///
    /// The rows are committed before the gateway is called and stay in place
    /// when the call fails; the error then carries the order id so the caller
    /// can retry payment against the same order.
    pub fn initiate(&self, request: CheckoutRequest) -> Result<CheckoutSession, DomainError> {
        let order = self.prepare(request)?;
        let amount_minor = to_minor_units(&order.totals.total)?;
        let order = self.orders.create(order)?;
        log::info!(
            "Created order {} ({}) for {} {}",
            order.reference,
            order.id,
            order.total_amount,
            order.currency
        );

        let gateway_request = self.gateway_request(&order, amount_minor);
        match self.gateway.initialize(&gateway_request) {
            Ok(session) => Ok(CheckoutSession {
                order_id: order.id,
                order_reference: order.reference,
                authorization_url: session.authorization_url,
                access_code: session.access_code,
                reference: session.reference,
            }),
            Err(e) => {
                log::warn!(
                    "Payment initialization failed for order {}: {}",
                    order.reference,
                    e
                );
                Err(DomainError::PaymentInitialization {
                    order_id: order.id,
                    order_reference: order.reference,
                    timed_out: matches!(e, GatewayError::Timeout),
                    reason: e.to_string(),
                })
            }
        }
    }

    fn prepare(&self, request: CheckoutRequest) -> Result<NewOrder, DomainError> {
        let delivery = request
            .delivery
            .ok_or_else(|| DomainError::invalid("delivery info is required"))?;
        delivery.validate()?;
        if request.items.is_empty() {
            return Err(DomainError::invalid("at least one order item is required"));
        }
        let user_email = request
            .user_email
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| DomainError::invalid("user email is required"))?;
        let user_id = request
            .user_id
            .ok_or_else(|| DomainError::invalid("user id is required"))?;
        let claimed_total = request
            .total
            .ok_or_else(|| DomainError::invalid("total amount is required"))?;

        let delivery_cost = request.delivery_cost.unwrap_or_else(|| BigDecimal::from(0));
        if delivery_cost < BigDecimal::from(0) {
            return Err(DomainError::invalid("delivery cost must not be negative"));
        }
        check_money_scale(&delivery_cost, "delivery cost")?;

        let lines = request
            .items
            .iter()
            .map(LineItem::snapshot)
            .collect::<Result<Vec<_>, _>>()?;
        let totals = Totals::compute(&lines, delivery_cost);

        if let Some(claimed) = &request.subtotal {
            if *claimed != totals.subtotal {
                return Err(DomainError::invalid(format!(
                    "subtotal {} does not match items ({})",
                    claimed, totals.subtotal
                )));
            }
        }
        if claimed_total != totals.total {
            return Err(DomainError::invalid(format!(
                "total {} does not match items plus delivery ({})",
                claimed_total, totals.total
            )));
        }
        if totals.total <= BigDecimal::from(0) {
            return Err(DomainError::invalid("total amount must be positive"));
        }

        let (reference, payment_reference) =
            draw_reference_pair(&mut rand::thread_rng(), &self.config.reference_namespace);

        Ok(NewOrder {
            id: Uuid::new_v4(),
            reference,
            payment_reference,
            delivery,
            user_id,
            user_email,
            currency: Currency::from_payment_type(request.payment_type.as_deref().unwrap_or("")),
            lines,
            totals,
        })
    }

    fn gateway_request(&self, order: &OrderView, amount_minor: i64) -> InitializeRequest {
        InitializeRequest {
            email: order.user_email.clone(),
            amount_minor,
            currency: order.currency,
            callback_url: self.callback_url(order),
            metadata: json!({
                "order_id": order.id,
                "order_reference": order.reference,
                "user_id": order.user_id,
            }),
        }
    }

    /// Guests land on the guest tracking page, account holders on their
    /// order history.
    pub fn callback_url(&self, order: &OrderView) -> String {
        let page = if order.user_id == self.config.guest_user_id {
            "guest-order"
        } else {
            "orders"
        };
        format!(
            "{}/{}?order_id={}&order_ref={}",
            self.config.storefront_url.trim_end_matches('/'),
            page,
            order.id,
            order.reference
        )
    }
}

/// Gateway amounts are integers in the smallest currency unit (kobo, cents).
/// Ties round half up, as Postgres does when casting to NUMERIC.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64, DomainError> {
    (amount * BigDecimal::from(100))
        .with_scale_round(0, RoundingMode::HalfUp)
        .to_i64()
        .ok_or_else(|| DomainError::invalid(format!("amount {amount} is out of range")))
}
