use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::handlers::orders::VerifyPaymentResponse;
use crate::infrastructure::paystack::{verify_signature, SIGNATURE_HEADER};
use crate::state::AppState;

/// POST /webhooks/paystack
///
/// Accepts gateway events signed with the shared secret. A `charge.success`
/// event triggers the same verification as `/orders/verify`; the event body
/// is only used to find the order, never for the payment status.
#[utoipa::path(
    post,
    path = "/webhooks/paystack",
    request_body(content = serde_json::Value, description = "Raw gateway event"),
    params(
        ("x-paystack-signature" = String, Header, description = "Hex HMAC-SHA512 of the body"),
    ),
    responses(
        (status = 200, description = "Event processed or ignored"),
        (status = 400, description = "Malformed event"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 502, description = "Gateway error during verification"),
    ),
    tag = "payments"
)]
pub async fn paystack_webhook(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing webhook signature".to_string()))?;
    if !verify_signature(&state.webhook_secret, &body, signature) {
        log::warn!("Rejected webhook with an invalid signature");
        return Err(AppError::Unauthorized(
            "invalid webhook signature".to_string(),
        ));
    }

    let event: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("malformed event: {e}")))?;

    let outcome = web::block(move || state.verification.handle_event(&event))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(match outcome {
        Some(outcome) => HttpResponse::Ok().json(VerifyPaymentResponse::from(outcome)),
        None => HttpResponse::Ok().json(json!({ "status": "ignored" })),
    })
}
