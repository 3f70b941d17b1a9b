pub mod address;
pub mod checkout;
pub mod delivery;
pub mod order_service;
pub mod verification;

#[cfg(test)]
pub(crate) mod testing;
