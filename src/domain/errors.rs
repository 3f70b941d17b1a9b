use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Payment gateway error: {0}")]
    Gateway(String),
    #[error("Payment gateway timed out: {0}")]
    GatewayTimeout(String),
    /// The order and payment rows exist but the gateway session could not be
    /// opened. Callers must treat the order as created and unpaid.
    #[error("Payment initialization failed for order {order_reference}: {reason}")]
    PaymentInitialization {
        order_id: Uuid,
        order_reference: String,
        reason: String,
        timed_out: bool,
    },
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("Address lookup failed: {reason}")]
    Geocoder { reason: String, timed_out: bool },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DomainError::NotFound(what.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        DomainError::InvalidInput(msg.into())
    }

    /// Geocoder failures get their own wording; only rate limiting is shared
    /// with the payment gateway mapping.
    pub fn geocoder(e: GatewayError) -> Self {
        match e {
            GatewayError::RateLimited => {
                DomainError::RateLimited("address lookup rate limited".to_string())
            }
            GatewayError::Timeout => DomainError::Geocoder {
                reason: e.to_string(),
                timed_out: true,
            },
            other => DomainError::Geocoder {
                reason: other.to_string(),
                timed_out: false,
            },
        }
    }
}

/// Failure reported by an outbound HTTP collaborator (payment gateway,
/// geocoder). Kept apart from [`DomainError`] so callers can decide how a
/// failure maps onto their own outcome.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("request timed out")]
    Timeout,
    #[error("rate limited by upstream")]
    RateLimited,
    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed upstream response: {0}")]
    Malformed(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<GatewayError> for DomainError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Timeout => DomainError::GatewayTimeout(e.to_string()),
            GatewayError::RateLimited => DomainError::RateLimited(e.to_string()),
            other => DomainError::Gateway(other.to_string()),
        }
    }
}
