use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{DeliveryUpdate, OrderView};
use crate::domain::ports::OrderRepository;

pub struct DeliveryService {
    orders: Arc<dyn OrderRepository>,
}

impl DeliveryService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Apply the provided delivery fields to an order. Status values are
    /// free-form; no transition rules are enforced.
    pub fn update(
        &self,
        order_id: Uuid,
        update: DeliveryUpdate,
    ) -> Result<OrderView, DomainError> {
        if update.is_empty() {
            return self
                .orders
                .find_by_id(order_id)?
                .ok_or_else(|| DomainError::not_found("Order not found"));
        }

        let order = self
            .orders
            .update_delivery(order_id, &update)?
            .ok_or_else(|| DomainError::not_found("Order not found"))?;

        if let Some(status) = &update.order_status {
            log::info!("Order {} status set to '{}'", order.reference, status);
        }
        Ok(order)
    }
}
