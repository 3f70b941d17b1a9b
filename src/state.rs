use std::sync::Arc;

use crate::application::address::AddressService;
use crate::application::checkout::CheckoutService;
use crate::application::delivery::DeliveryService;
use crate::application::order_service::OrderService;
use crate::application::verification::VerificationService;
use crate::config::CheckoutConfig;
use crate::domain::ports::{Geocoder, OrderRepository, PaymentGateway};

/// Services shared by every worker, injected as `web::Data<AppState>`.
pub struct AppState {
    pub checkout: CheckoutService,
    pub verification: VerificationService,
    pub delivery: DeliveryService,
    pub orders: OrderService,
    pub address: AddressService,
    /// Key used to check gateway webhook signatures.
    pub webhook_secret: String,
}

impl AppState {
    pub fn new(
        repo: Arc<dyn OrderRepository>,
        gateway: Arc<dyn PaymentGateway>,
        geocoder: Arc<dyn Geocoder>,
        checkout: CheckoutConfig,
        webhook_secret: String,
    ) -> Self {
        Self {
            checkout: CheckoutService::new(repo.clone(), gateway.clone(), checkout),
            verification: VerificationService::new(repo.clone(), gateway),
            delivery: DeliveryService::new(repo.clone()),
            orders: OrderService::new(repo),
            address: AddressService::new(geocoder),
            webhook_secret,
        }
    }
}
