use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Orders API",
        version = "0.1.0",
        description = "Checkout, payment verification, delivery tracking and address validation for the storefront."
    ),
    tags(
        (name = "orders", description = "Checkout, verification and order lookup"),
        (name = "admin", description = "Order administration and delivery tracking"),
        (name = "payments", description = "Payment gateway webhooks"),
        (name = "address", description = "Delivery address validation")
    ),
    paths(
        crate::handlers::orders::initiate_order,
        crate::handlers::orders::verify_payment,
        crate::handlers::orders::list_user_orders,
        crate::handlers::orders::track_guest_order,
        crate::handlers::orders::get_order,
        crate::handlers::admin::list_orders,
        crate::handlers::admin::list_pending_delivery,
        crate::handlers::admin::update_delivery,
        crate::handlers::address::validate_address,
        crate::handlers::payments::paystack_webhook,
    ),
    components(
        schemas(
            crate::handlers::orders::DeliveryInfoBody,
            crate::handlers::orders::OrderItemRequest,
            crate::handlers::orders::InitiateOrderRequest,
            crate::handlers::orders::InitiateOrderResponse,
            crate::handlers::orders::VerifyPaymentRequest,
            crate::handlers::orders::VerifyPaymentResponse,
            crate::handlers::orders::OrderItemResponse,
            crate::handlers::orders::OrderResponse,
            crate::handlers::orders::OrderListResponse,
            crate::handlers::orders::TrackOrderResponse,
            crate::handlers::admin::UpdateDeliveryRequest,
            crate::handlers::address::ValidatedAddressResponse,
        )
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi())
}
