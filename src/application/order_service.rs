use std::sync::Arc;

use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{OrderFilter, OrderView, Page};
use crate::domain::ports::OrderRepository;

#[derive(Debug, Clone)]
pub struct OrderPage {
    pub items: Vec<OrderView>,
    pub page: Page,
    pub total: i64,
}

impl OrderPage {
    pub fn total_pages(&self) -> i64 {
        self.page.total_pages(self.total)
    }
}

/// Read side of the order store.
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    pub fn get_order(&self, id: Uuid) -> Result<OrderView, DomainError> {
        self.orders
            .find_by_id(id)?
            .ok_or_else(|| DomainError::not_found("Order not found"))
    }

    /// Look an order up by its public reference.
    pub fn track_guest(&self, reference: &str) -> Result<OrderView, DomainError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DomainError::invalid("order reference is required"));
        }
        self.orders
            .find_by_reference(reference)?
            .ok_or_else(|| DomainError::not_found("Tracking reference invalid"))
    }

    pub fn list_user_orders(&self, user_id: Uuid, page: Page) -> Result<OrderPage, DomainError> {
        self.list(OrderFilter::ForUser(user_id), page)
    }

    pub fn list_orders(&self, page: Page) -> Result<OrderPage, DomainError> {
        self.list(OrderFilter::All, page)
    }

    pub fn list_pending_delivery(&self, page: Page) -> Result<OrderPage, DomainError> {
        self.list(OrderFilter::AwaitingDelivery, page)
    }

    fn list(&self, filter: OrderFilter, page: Page) -> Result<OrderPage, DomainError> {
        let result = self.orders.list(filter, page)?;
        Ok(OrderPage {
            items: result.items,
            page,
            total: result.total,
        })
    }
}
