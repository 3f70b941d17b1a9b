use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::order::DeliveryUpdate;
use crate::errors::AppError;
use crate::handlers::orders::{ListOrdersParams, OrderListResponse, OrderResponse};
use crate::state::AppState;

/// Fields an operator may change while an order is out for delivery. Omitted
/// fields keep their stored value; status strings are not validated.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateDeliveryRequest {
    pub location: Option<String>,
    /// New order status, e.g. "SHIPPED" or "DELIVERED".
    pub status: Option<String>,
    /// Expected delivery date as shown to the customer.
    pub date: Option<String>,
    pub rider: Option<String>,
    /// Older clients send the rider's name under `name`.
    pub name: Option<String>,
    pub delivery_status: Option<String>,
}

impl From<UpdateDeliveryRequest> for DeliveryUpdate {
    fn from(r: UpdateDeliveryRequest) -> Self {
        Self {
            location: r.location,
            order_status: r.status,
            expected_date: r.date,
            rider: r.rider.or(r.name),
            delivery_status: r.delivery_status,
        }
    }
}

/// GET /admin/orders
///
/// Every order, newest first.
#[utoipa::path(
    get,
    path = "/admin/orders",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Paginated list of orders", body = OrderListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "admin"
)]
pub async fn list_orders(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let page = query.page();

    let result = web::block(move || state.orders.list_orders(page))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderListResponse::from(result)))
}

/// GET /admin/orders/pending-delivery
///
/// Paid orders that have not been marked DELIVERED.
#[utoipa::path(
    get,
    path = "/admin/orders/pending-delivery",
    params(
        ("page" = Option<i64>, Query, description = "Page number (1-based, default 1)"),
        ("limit" = Option<i64>, Query, description = "Items per page (default 10, max 100)"),
    ),
    responses(
        (status = 200, description = "Paid orders awaiting delivery", body = OrderListResponse),
        (status = 500, description = "Internal server error"),
    ),
    tag = "admin"
)]
pub async fn list_pending_delivery(
    state: web::Data<AppState>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let page = query.page();

    let result = web::block(move || state.orders.list_pending_delivery(page))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderListResponse::from(result)))
}

/// PUT /admin/orders/{id}/delivery
#[utoipa::path(
    put,
    path = "/admin/orders/{id}/delivery",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    request_body = UpdateDeliveryRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 404, description = "Order not found"),
        (status = 500, description = "Internal server error"),
    ),
    tag = "admin"
)]
pub async fn update_delivery(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateDeliveryRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let update = DeliveryUpdate::from(body.into_inner());

    let order = web::block(move || state.delivery.update(order_id, update))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
