use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::address::ValidatedAddress;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ValidateAddressParams {
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidatedAddressResponse {
    pub country: String,
    pub normalized_address: String,
    pub lat: String,
    pub lon: String,
}

impl From<ValidatedAddress> for ValidatedAddressResponse {
    fn from(a: ValidatedAddress) -> Self {
        Self {
            country: a.country.to_string(),
            normalized_address: a.normalized_address,
            lat: a.lat,
            lon: a.lon,
        }
    }
}

/// GET /address/validate?address=
///
/// Geocodes a free-text delivery address and checks that it lies in a
/// country we deliver to.
#[utoipa::path(
    get,
    path = "/address/validate",
    params(
        ("address" = String, Query, description = "Free-text delivery address"),
    ),
    responses(
        (status = 200, description = "Address resolved to a supported country", body = ValidatedAddressResponse),
        (status = 400, description = "Blank address or unsupported country"),
        (status = 404, description = "Address not found or invalid"),
        (status = 429, description = "Geocoder rate limit hit"),
        (status = 502, description = "Geocoder unavailable"),
    ),
    tag = "address"
)]
pub async fn validate_address(
    state: web::Data<AppState>,
    query: web::Query<ValidateAddressParams>,
) -> Result<HttpResponse, AppError> {
    let address = query.into_inner().address;

    let validated = web::block(move || state.address.validate(&address))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ValidatedAddressResponse::from(validated)))
}
