use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::checkout::{CheckoutRequest, CheckoutSession};
use crate::application::order_service::OrderPage;
use crate::application::verification::VerificationOutcome;
use crate::domain::order::{DeliveryInfo, LineItem, LineItemInput, OrderView, Page};
use crate::errors::AppError;
use crate::state::AppState;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeliveryInfoBody {
    pub address: String,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product_id: Uuid,
    pub product_name: String,
    #[serde(default = "default_min_order_qty")]
    pub min_order_qty: i32,
    #[serde(default)]
    pub image_ref: String,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub quantity: i32,
}

fn default_min_order_qty() -> i32 {
    1
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct InitiateOrderRequest {
    pub delivery_info: Option<DeliveryInfoBody>,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    /// Account id, or the guest sentinel for guest checkout.
    pub user_id: Option<Uuid>,
    pub user_email: Option<String>,
    /// "USD" selects USD; anything else settles in NGN.
    pub payment_type: Option<String>,
    pub delivery_cost: Option<String>,
    pub subtotal: Option<String>,
    pub total: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InitiateOrderResponse {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
    pub order_id: Uuid,
    pub order_reference: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub reference: String,
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyPaymentResponse {
    pub status: String,
    pub order_id: Uuid,
    /// False when the order had already been settled with this outcome.
    pub transitioned: bool,
    /// Verification payload as returned by the gateway.
    #[schema(value_type = Object)]
    pub gateway: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub product_id: Uuid,
    pub product_name: String,
    pub min_order_qty: i32,
    pub image_ref: String,
    pub unit_price: String,
    pub quantity: i32,
    pub subtotal: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub reference: String,
    pub delivery_info: DeliveryInfoBody,
    pub user_id: Uuid,
    pub user_email: String,
    pub currency: String,
    pub items: Vec<OrderItemResponse>,
    pub subtotal: String,
    pub delivery_cost: String,
    pub total_amount: String,
    pub order_status: String,
    pub payment_status: String,
    pub delivery_status: String,
    pub location: Option<String>,
    pub expected_date: Option<String>,
    pub rider: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_orders: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TrackOrderResponse {
    pub success: bool,
    pub total_orders: i64,
    pub orders: Vec<OrderResponse>,
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    pub page: Option<i64>,
    /// Number of items per page. Defaults to 10, maximum 100.
    pub limit: Option<i64>,
}

impl ListOrdersParams {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

// ── Conversions ──────────────────────────────────────────────────────────────

fn parse_amount(field: &str, value: &str) -> Result<BigDecimal, AppError> {
    BigDecimal::from_str(value.trim()).map_err(|_| {
        AppError::BadRequest(format!("{field} must be a decimal string, got '{value}'"))
    })
}

fn parse_optional_amount(
    field: &str,
    value: Option<&str>,
) -> Result<Option<BigDecimal>, AppError> {
    value.map(|v| parse_amount(field, v)).transpose()
}

impl InitiateOrderRequest {
    fn into_checkout(self) -> Result<CheckoutRequest, AppError> {
        let items = self
            .items
            .into_iter()
            .map(|item| {
                Ok(LineItemInput {
                    unit_price: parse_amount("unit_price", &item.unit_price)?,
                    product_id: item.product_id,
                    product_name: item.product_name,
                    min_order_qty: item.min_order_qty,
                    image_ref: item.image_ref,
                    quantity: item.quantity,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(CheckoutRequest {
            delivery: self.delivery_info.map(|d| DeliveryInfo {
                address: d.address,
                name: d.name,
                email: d.email,
                phone: d.phone,
            }),
            items,
            user_id: self.user_id,
            user_email: self.user_email,
            payment_type: self.payment_type,
            delivery_cost: parse_optional_amount("delivery_cost", self.delivery_cost.as_deref())?,
            subtotal: parse_optional_amount("subtotal", self.subtotal.as_deref())?,
            total: parse_optional_amount("total", self.total.as_deref())?,
        })
    }
}

impl From<CheckoutSession> for InitiateOrderResponse {
    fn from(s: CheckoutSession) -> Self {
        Self {
            authorization_url: s.authorization_url,
            access_code: s.access_code,
            reference: s.reference,
            order_id: s.order_id,
            order_reference: s.order_reference,
        }
    }
}

impl From<VerificationOutcome> for VerifyPaymentResponse {
    fn from(o: VerificationOutcome) -> Self {
        Self {
            status: o.status.to_string(),
            order_id: o.order_id,
            transitioned: o.transitioned,
            gateway: o.gateway,
        }
    }
}

impl From<LineItem> for OrderItemResponse {
    fn from(l: LineItem) -> Self {
        Self {
            product_id: l.product_id,
            product_name: l.product_name,
            min_order_qty: l.min_order_qty,
            image_ref: l.image_ref,
            unit_price: l.unit_price.to_string(),
            quantity: l.quantity,
            subtotal: l.subtotal.to_string(),
        }
    }
}

impl From<OrderView> for OrderResponse {
    fn from(o: OrderView) -> Self {
        Self {
            id: o.id,
            reference: o.reference,
            delivery_info: DeliveryInfoBody {
                address: o.delivery.address,
                name: o.delivery.name,
                email: o.delivery.email,
                phone: o.delivery.phone,
            },
            user_id: o.user_id,
            user_email: o.user_email,
            currency: o.currency.as_str().to_string(),
            items: o.lines.into_iter().map(OrderItemResponse::from).collect(),
            subtotal: o.subtotal.to_string(),
            delivery_cost: o.delivery_cost.to_string(),
            total_amount: o.total_amount.to_string(),
            order_status: o.order_status,
            payment_status: o.payment_status.to_string(),
            delivery_status: o.delivery_status,
            location: o.location,
            expected_date: o.expected_date,
            rider: o.rider,
            created_at: o.created_at.to_rfc3339(),
            updated_at: o.updated_at.to_rfc3339(),
        }
    }
}

impl From<OrderPage> for OrderListResponse {
    fn from(p: OrderPage) -> Self {
        Self {
            total_pages: p.total_pages(),
            total_orders: p.total,
            page: p.page.page,
            limit: p.page.limit,
            orders: p.items.into_iter().map(OrderResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /orders/initiate
///
/// Stores the order and its PENDING payment in one transaction, then opens a
/// hosted payment session. When the gateway fails the order still exists and
/// the error body carries its id and reference.
#[utoipa::path(
    post,
    path = "/orders/initiate",
    request_body = InitiateOrderRequest,
    responses(
        (status = 201, description = "Order created, payment session opened", body = InitiateOrderResponse),
        (status = 400, description = "Invalid checkout request"),
        (status = 409, description = "Order reference collision"),
        (status = 502, description = "Order stored but the gateway rejected the session"),
        (status = 504, description = "Order stored but the gateway timed out"),
    ),
    tag = "orders"
)]
pub async fn initiate_order(
    state: web::Data<AppState>,
    body: web::Json<InitiateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner().into_checkout()?;

    let session = web::block(move || state.checkout.initiate(request))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(InitiateOrderResponse::from(session)))
}

/// POST /orders/verify
///
/// Confirms a payment with the gateway and settles the order. Repeated calls
/// for the same reference are harmless.
#[utoipa::path(
    post,
    path = "/orders/verify",
    request_body = VerifyPaymentRequest,
    responses(
        (status = 200, description = "Order settled", body = VerifyPaymentResponse),
        (status = 400, description = "Missing reference or reference of another order"),
        (status = 404, description = "Order or payment not found"),
        (status = 502, description = "Gateway error"),
        (status = 504, description = "Gateway timed out"),
    ),
    tag = "orders"
)]
pub async fn verify_payment(
    state: web::Data<AppState>,
    body: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse, AppError> {
    let VerifyPaymentRequest {
        reference,
        order_id,
    } = body.into_inner();

    let outcome = web::block(move || state.verification.verify(&reference, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(VerifyPaymentResponse::from(outcome)))
}

/// GET /orders/customer/{user_id}
///
/// Returns a user's orders, newest first.
#[utoipa::path(
    get,
    path = "/orders/customer/{user_id}",
    params(
        ("user_id" = Uuid, Path, description = "User UUID"),
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of the user's orders", body = OrderListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn list_user_orders(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let page = query.page();

    let result = web::block(move || state.orders.list_user_orders(user_id, page))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderListResponse::from(result)))
}

/// GET /orders/track/{reference}
///
/// Guest lookup by public order reference.
#[utoipa::path(
    get,
    path = "/orders/track/{reference}",
    params(
        ("reference" = String, Path, description = "Order reference, e.g. ORD-4MT-123456"),
    ),
    responses(
        (status = 200, description = "Order found", body = TrackOrderResponse),
        (status = 404, description = "Tracking reference invalid"),
    ),
    tag = "orders"
)]
pub async fn track_guest_order(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let reference = path.into_inner();

    let order = web::block(move || state.orders.track_guest(&reference))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(TrackOrderResponse {
        success: true,
        total_orders: 1,
        orders: vec![OrderResponse::from(order)],
    }))
}

/// GET /orders/{id}
///
/// Returns the order together with its line items.
#[utoipa::path(
    get,
    path = "/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();

    let order = web::block(move || state.orders.get_order(order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::{json, Value};
    use uuid::Uuid;

    use super::*;
    use crate::application::testing::FakeGateway;
    use crate::domain::errors::GatewayError;
    use crate::handlers::test_support::Harness;

    fn checkout_body(product_id: Uuid, user_id: Uuid) -> Value {
        json!({
            "delivery_info": {
                "address": "14 Adeola Odeku St, Victoria Island, Lagos",
                "name": "Ada Obi",
                "email": "ada@example.com",
                "phone": "+2348012345678"
            },
            "items": [{
                "product_id": product_id,
                "product_name": "Yam flour",
                "min_order_qty": 1,
                "image_ref": "yam.png",
                "unit_price": "10",
                "quantity": 3
            }],
            "user_id": user_id,
            "user_email": "ada@example.com",
            "payment_type": "NGN",
            "delivery_cost": "5",
            "subtotal": "30",
            "total": "35"
        })
    }

    #[actix_web::test]
    async fn initiate_then_verify_settles_once() {
        let product = Uuid::new_v4();
        let h = Harness::with_stock(&[(product, 10)]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/orders/initiate")
            .set_json(checkout_body(product, Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let session: InitiateOrderResponse = test::read_body_json(resp).await;
        assert_eq!(session.authorization_url, "https://checkout.test/abc");
        assert!(session.order_reference.starts_with("ORD-4MT-"));

        for expected_transition in [true, false] {
            let req = test::TestRequest::post()
                .uri("/orders/verify")
                .set_json(json!({ "reference": "gw-ref-abc", "order_id": session.order_id }))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let verified: VerifyPaymentResponse = test::read_body_json(resp).await;
            assert_eq!(verified.status, "PAID");
            assert_eq!(verified.transitioned, expected_transition);
            assert_eq!(verified.gateway["data"]["status"], "success");
        }
        assert_eq!(h.repo.stock(product), Some(7));
    }

    #[actix_web::test]
    async fn initiate_rejects_mismatched_total() {
        let h = Harness::with_stock(&[]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;
        let mut body = checkout_body(Uuid::new_v4(), Uuid::new_v4());
        body["total"] = json!("20");

        let req = test::TestRequest::post()
            .uri("/orders/initiate")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(h.repo.order_count(), 0);
    }

    #[actix_web::test]
    async fn initiate_rejects_non_decimal_price() {
        let h = Harness::with_stock(&[]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;
        let mut body = checkout_body(Uuid::new_v4(), Uuid::new_v4());
        body["items"][0]["unit_price"] = json!("ten");

        let req = test::TestRequest::post()
            .uri("/orders/initiate")
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn gateway_failure_still_returns_the_order() {
        let h = Harness::new(
            &[],
            FakeGateway::failing_initialize(GatewayError::Status {
                status: 401,
                message: "Invalid key".to_string(),
            }),
        );
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/orders/initiate")
            .set_json(checkout_body(Uuid::new_v4(), Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: Value = test::read_body_json(resp).await;
        let order_id: Uuid = body["order_id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .expect("order id in body");
        let stored = h.repo.order(order_id).expect("order persisted");
        assert_eq!(stored.payment_status.as_str(), "PENDING");
    }

    #[actix_web::test]
    async fn verify_unknown_order_is_404() {
        let h = Harness::with_stock(&[]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/orders/verify")
            .set_json(json!({ "reference": "gw-ref", "order_id": Uuid::new_v4() }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(h.gateway.verify_calls(), 0);
    }

    #[actix_web::test]
    async fn track_guest_order_by_reference() {
        let h = Harness::with_stock(&[]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/orders/initiate")
            .set_json(checkout_body(Uuid::new_v4(), Uuid::nil()))
            .to_request();
        let session: InitiateOrderResponse =
            test::read_body_json(test::call_service(&app, req).await).await;

        let req = test::TestRequest::get()
            .uri(&format!("/orders/track/{}", session.order_reference))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let tracked: TrackOrderResponse = test::read_body_json(resp).await;
        assert!(tracked.success);
        assert_eq!(tracked.total_orders, 1);
        assert_eq!(tracked.orders[0].id, session.order_id);
        assert_eq!(tracked.orders[0].items.len(), 1);

        let req = test::TestRequest::get()
            .uri("/orders/track/ORD-4MT-000000")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Tracking reference invalid");
    }

    #[actix_web::test]
    async fn list_user_orders_paginates() {
        let h = Harness::with_stock(&[]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;
        let user = Uuid::new_v4();
        for _ in 0..3 {
            let req = test::TestRequest::post()
                .uri("/orders/initiate")
                .set_json(checkout_body(Uuid::new_v4(), user))
                .to_request();
            assert_eq!(
                test::call_service(&app, req).await.status(),
                StatusCode::CREATED
            );
        }

        let req = test::TestRequest::get()
            .uri(&format!("/orders/customer/{user}?page=2&limit=2"))
            .to_request();
        let list: OrderListResponse =
            test::read_body_json(test::call_service(&app, req).await).await;

        assert_eq!(list.total_orders, 3);
        assert_eq!(list.total_pages, 2);
        assert_eq!(list.page, 2);
        assert_eq!(list.orders.len(), 1);
    }

    #[actix_web::test]
    async fn verify_without_order_id_is_a_json_400() {
        let h = Harness::with_stock(&[]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;

        let req = test::TestRequest::post()
            .uri("/orders/verify")
            .set_json(json!({ "reference": "ref-1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().expect("error").contains("order_id"));
        assert_eq!(h.gateway.verify_calls(), 0);
    }

    #[actix_web::test]
    async fn huge_page_number_returns_empty_page() {
        let h = Harness::with_stock(&[]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;
        let user = Uuid::new_v4();

        let req = test::TestRequest::get()
            .uri(&format!("/orders/customer/{user}?page={}", i64::MAX))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let list: OrderListResponse = test::read_body_json(resp).await;
        assert!(list.orders.is_empty());
        assert_eq!(list.page, Page::MAX_PAGE);
    }

    #[actix_web::test]
    async fn get_order_returns_404_for_unknown_id() {
        let h = Harness::with_stock(&[]);
        let app = test::init_service(App::new().configure(|cfg| h.configure(cfg))).await;

        let req = test::TestRequest::get()
            .uri(&format!("/orders/{}", Uuid::new_v4()))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
