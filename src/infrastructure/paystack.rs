use hmac::{Hmac, Mac};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};
use sha2::Sha512;

use crate::config::PaystackConfig;
use crate::domain::errors::GatewayError;
use crate::domain::payment::{InitializeRequest, InitializeResponse, VerifyResponse};
use crate::domain::ports::PaymentGateway;

/// Header carrying the webhook body signature.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Paystack transaction API over a blocking HTTP client.
///
/// Must be constructed outside of an async runtime; calls are made from
/// `web::block` worker threads.
pub struct PaystackClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl PaystackClient {
    pub fn new(config: &PaystackConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| GatewayError::Transport(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Transport("base url cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

impl PaymentGateway for PaystackClient {
    fn initialize(&self, request: &InitializeRequest) -> Result<InitializeResponse, GatewayError> {
        let url = self.endpoint(&["transaction", "initialize"])?;
        let body = json!({
            "email": request.email,
            "amount": request.amount_minor,
            "currency": request.currency.as_str(),
            "callback_url": request.callback_url,
            "metadata": request.metadata,
        });

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.secret_key)
            .json(&body)
            .send()
            .map_err(map_transport)?;
        parse_initialize(read_json(response)?)
    }

    fn verify(&self, reference: &str) -> Result<VerifyResponse, GatewayError> {
        let url = self.endpoint(&["transaction", "verify", reference])?;

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .map_err(map_transport)?;
        Ok(parse_verify(read_json(response)?))
    }
}

fn map_transport(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Transport(e.to_string())
    }
}

fn read_json(response: Response) -> Result<Value, GatewayError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(GatewayError::RateLimited);
    }

    let text = response.text().map_err(map_transport)?;
    let body: Option<Value> = serde_json::from_str(&text).ok();

    if !status.is_success() {
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or(text);
        return Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let body = body.ok_or_else(|| GatewayError::Malformed("response is not JSON".to_string()))?;
    if body.get("status").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("request rejected")
            .to_string();
        return Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        });
    }
    Ok(body)
}

fn parse_initialize(body: Value) -> Result<InitializeResponse, GatewayError> {
    let data = body
        .get("data")
        .ok_or_else(|| GatewayError::Malformed("missing data".to_string()))?;
    let field = |name: &str| {
        data.get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::Malformed(format!("missing data.{name}")))
    };

    Ok(InitializeResponse {
        authorization_url: field("authorization_url")?,
        access_code: field("access_code")?,
        reference: field("reference")?,
    })
}

fn parse_verify(body: Value) -> VerifyResponse {
    let data = body.get("data");
    let status = data
        .and_then(|d| d.get("status"))
        .and_then(Value::as_str)
        .map(str::to_string);

    // Metadata comes back either as an object or as a JSON-encoded string.
    let metadata = data.and_then(|d| d.get("metadata")).map(|m| match m {
        Value::String(s) => serde_json::from_str(s).unwrap_or(Value::Null),
        other => other.clone(),
    });
    let order_id = metadata
        .as_ref()
        .and_then(|m| m.get("order_id"))
        .and_then(|id| match id {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        });

    VerifyResponse {
        status,
        order_id,
        raw: body,
    }
}

/// Check a webhook body against the hex HMAC-SHA512 signature Paystack sends.
pub fn verify_signature(secret: &str, body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha512>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
