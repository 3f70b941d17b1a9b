use std::sync::Arc;

use crate::domain::address::{classify_country, ValidatedAddress};
use crate::domain::errors::DomainError;
use crate::domain::ports::Geocoder;

pub struct AddressService {
    geocoder: Arc<dyn Geocoder>,
}

impl AddressService {
    pub fn new(geocoder: Arc<dyn Geocoder>) -> Self {
        Self { geocoder }
    }

    /// Resolve a free-text address and check it falls in a delivery country.
    pub fn validate(&self, address: &str) -> Result<ValidatedAddress, DomainError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(DomainError::invalid("Address is required"));
        }

        let best = self
            .geocoder
            .search(address)
            .map_err(DomainError::geocoder)?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found("Address not found or invalid"))?;

        let country = classify_country(&best.display_name).ok_or_else(|| {
            log::info!("Rejected delivery address '{}'", best.display_name);
            DomainError::invalid("Address not supported for delivery")
        })?;

        Ok(ValidatedAddress {
            country,
            normalized_address: best.display_name,
            lat: best.lat,
            lon: best.lon,
        })
    }
}
