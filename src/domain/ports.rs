use uuid::Uuid;

use super::address::GeocodeMatch;
use super::errors::{DomainError, GatewayError};
use super::order::{DeliveryUpdate, ListResult, NewOrder, OrderFilter, OrderView, Page};
use super::payment::{
    InitializeRequest, InitializeResponse, PaymentOutcome, PaymentView, Settlement,
    VerifyResponse,
};

pub trait OrderRepository: Send + Sync + 'static {
    /// Persist the order, its lines and its PENDING payment atomically.
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn find_by_reference(&self, reference: &str) -> Result<Option<OrderView>, DomainError>;
    fn find_payment(&self, order_id: Uuid) -> Result<Option<PaymentView>, DomainError>;
    /// Apply a gateway outcome to the order and its payment under a lock on
    /// the order. Inventory is reconciled only on the edge into PAID, in the
    /// same unit of work as the status write.
    fn settle(
        &self,
        order_id: Uuid,
        gateway_reference: &str,
        outcome: PaymentOutcome,
    ) -> Result<Settlement, DomainError>;
    /// Returns `None` when the order does not exist; nothing is written then.
    fn update_delivery(
        &self,
        id: Uuid,
        update: &DeliveryUpdate,
    ) -> Result<Option<OrderView>, DomainError>;
    fn list(&self, filter: OrderFilter, page: Page) -> Result<ListResult, DomainError>;
}

pub trait PaymentGateway: Send + Sync + 'static {
    fn initialize(&self, request: &InitializeRequest) -> Result<InitializeResponse, GatewayError>;
    fn verify(&self, reference: &str) -> Result<VerifyResponse, GatewayError>;
}

pub trait Geocoder: Send + Sync + 'static {
    fn search(&self, address: &str) -> Result<Vec<GeocodeMatch>, GatewayError>;
}
