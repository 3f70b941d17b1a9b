pub mod inventory;
pub mod models;
pub mod nominatim;
pub mod order_repo;
pub mod paystack;
