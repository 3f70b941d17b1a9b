use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::payment::{PaymentOutcome, PaymentStatus};
use crate::domain::ports::{OrderRepository, PaymentGateway};

#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub order_id: Uuid,
    pub status: PaymentStatus,
    /// `false` when this call found the order already settled.
    pub transitioned: bool,
    pub gateway: Value,
}

pub struct VerificationService {
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl VerificationService {
    pub fn new(orders: Arc<dyn OrderRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { orders, gateway }
    }

    /// Ask the gateway for the authoritative status of `reference` and settle
    /// the order accordingly. Safe to call repeatedly for the same reference.
    pub fn verify(
        &self,
        reference: &str,
        order_id: Uuid,
    ) -> Result<VerificationOutcome, DomainError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DomainError::invalid("payment reference is required"));
        }
        if self.orders.find_by_id(order_id)?.is_none() {
            return Err(DomainError::not_found("Order not found"));
        }
        if self.orders.find_payment(order_id)?.is_none() {
            return Err(DomainError::not_found("Payment record for order not found"));
        }

        let response = self.gateway.verify(reference)?;
        if let Some(owner) = response.order_id.as_deref() {
            if owner != order_id.to_string() {
                log::warn!(
                    "Reference {} belongs to order {}, not {}",
                    reference,
                    owner,
                    order_id
                );
                return Err(DomainError::invalid(
                    "payment reference does not belong to this order",
                ));
            }
        }

        let outcome = response.outcome();
        let settlement = self.orders.settle(order_id, reference, outcome)?;
        if settlement.transitioned {
            log::info!(
                "Order {} payment {} (reference {})",
                settlement.order.reference,
                settlement.order.payment_status,
                reference
            );
        } else if settlement.order.payment_status == PaymentStatus::Failed
            && outcome == PaymentOutcome::Paid
        {
            log::warn!(
                "Order {} is FAILED but gateway reports success for {}; left FAILED",
                settlement.order.reference,
                reference
            );
        } else {
            log::info!(
                "Order {} already settled as {}; verify for {} changed nothing",
                settlement.order.reference,
                settlement.order.payment_status,
                reference
            );
        }
        if let Some(report) = &settlement.reconciliation {
            for product_id in &report.skipped {
                log::warn!(
                    "Order {}: product {} not reconciled",
                    settlement.order.reference,
                    product_id
                );
            }
        }

        Ok(VerificationOutcome {
            order_id,
            status: settlement.order.payment_status,
            transitioned: settlement.transitioned,
            gateway: response.raw,
        })
    }

    /// Handle a gateway webhook event whose signature has already been
    /// checked. Only `charge.success` triggers verification, and the event
    /// body is never trusted for the status itself.
    pub fn handle_event(
        &self,
        event: &Value,
    ) -> Result<Option<VerificationOutcome>, DomainError> {
        let kind = event.get("event").and_then(Value::as_str).unwrap_or_default();
        if kind != "charge.success" {
            log::info!("Ignoring gateway event '{}'", kind);
            return Ok(None);
        }
        let data = event.get("data").unwrap_or(&Value::Null);
        let reference = data
            .get("reference")
            .and_then(Value::as_str)
            .ok_or_else(|| DomainError::invalid("event is missing data.reference"))?;
        let order_id = data
            .pointer("/metadata/order_id")
            .and_then(Value::as_str)
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| DomainError::invalid("event is missing data.metadata.order_id"))?;

        self.verify(reference, order_id).map(Some)
    }
}
