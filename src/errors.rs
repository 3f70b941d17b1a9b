use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::errors::DomainError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    TooManyRequests(String),

    #[error("{0}")]
    BadGateway(String),

    #[error("{0}")]
    GatewayTimeout(String),

    /// The order was stored but no payment session could be opened.
    #[error("{message}")]
    PaymentInitialization {
        order_id: Uuid,
        order_reference: String,
        message: String,
        timed_out: bool,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::InvalidInput(_) => AppError::BadRequest(e.to_string()),
            DomainError::NotFound(msg) => AppError::NotFound(msg),
            DomainError::Conflict(_) => AppError::Conflict(e.to_string()),
            DomainError::Gateway(_) => AppError::BadGateway(e.to_string()),
            DomainError::GatewayTimeout(_) => AppError::GatewayTimeout(e.to_string()),
            DomainError::RateLimited(_) => AppError::TooManyRequests(e.to_string()),
            DomainError::Geocoder { timed_out: true, .. } => {
                AppError::GatewayTimeout(e.to_string())
            }
            DomainError::Geocoder { .. } => AppError::BadGateway(e.to_string()),
            DomainError::PaymentInitialization {
                order_id,
                ref order_reference,
                timed_out,
                ..
            } => AppError::PaymentInitialization {
                order_id,
                order_reference: order_reference.clone(),
                message: e.to_string(),
                timed_out,
            },
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            AppError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::PaymentInitialization { timed_out, .. } => {
                if *timed_out {
                    StatusCode::GATEWAY_TIMEOUT
                } else {
                    StatusCode::BAD_GATEWAY
                }
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        match self {
            AppError::PaymentInitialization {
                order_id,
                order_reference,
                ..
            } => builder.json(json!({
                "error": self.to_string(),
                "order_id": order_id,
                "order_reference": order_reference
            })),
            AppError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                builder.json(json!({ "error": "Internal server error" }))
            }
            _ => builder.json(json!({ "error": self.to_string() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::ResponseError;

    #[test]
    fn not_found_returns_404() {
        let resp = AppError::NotFound("Order not found".to_string()).error_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_error_returns_500() {
        let err = AppError::Internal("something went wrong".to_string());
        assert_eq!(
            err.error_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_display_is_the_message() {
        assert_eq!(
            AppError::NotFound("Tracking reference invalid".to_string()).to_string(),
            "Tracking reference invalid"
        );
    }

    #[test]
    fn internal_error_display() {
        assert_eq!(
            AppError::Internal("msg".to_string()).to_string(),
            "Internal error: msg"
        );
    }

    #[test]
    fn domain_errors_map_to_http_statuses() {
        let cases = [
            (DomainError::invalid("bad value"), StatusCode::BAD_REQUEST),
            (DomainError::not_found("gone"), StatusCode::NOT_FOUND),
            (DomainError::Conflict("dup".into()), StatusCode::CONFLICT),
            (DomainError::Gateway("down".into()), StatusCode::BAD_GATEWAY),
            (
                DomainError::GatewayTimeout("slow".into()),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                DomainError::RateLimited("busy".into()),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                DomainError::Geocoder {
                    reason: "down".into(),
                    timed_out: false,
                },
                StatusCode::BAD_GATEWAY,
            ),
            (
                DomainError::Geocoder {
                    reason: "request timed out".into(),
                    timed_out: true,
                },
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                DomainError::Internal("oops".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (domain, status) in cases {
            let app: AppError = domain.into();
            assert_eq!(app.status_code(), status, "{app:?}");
        }
    }

    #[actix_web::test]
    async fn payment_initialization_body_names_the_order() {
        let order_id = Uuid::new_v4();
        let app: AppError = DomainError::PaymentInitialization {
            order_id,
            order_reference: "ORD-4MT-123456".to_string(),
            reason: "gateway down".to_string(),
            timed_out: false,
        }
        .into();
        let resp = app.error_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body = to_bytes(resp.into_body()).await.expect("body");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("json");
        assert_eq!(json["order_id"], order_id.to_string());
        assert_eq!(json["order_reference"], "ORD-4MT-123456");
    }

    #[test]
    fn payment_initialization_timeout_is_504() {
        let app: AppError = DomainError::PaymentInitialization {
            order_id: Uuid::new_v4(),
            order_reference: "ORD-4MT-123456".to_string(),
            reason: "timed out".to_string(),
            timed_out: true,
        }
        .into();
        assert_eq!(app.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[actix_web::test]
    async fn internal_details_are_not_echoed() {
        let resp = AppError::Internal("password=hunter2".to_string()).error_response();
        let body = to_bytes(resp.into_body()).await.expect("body");
        assert!(!String::from_utf8_lossy(&body).contains("hunter2"));
    }
}
