//! In-memory stand-ins for the repository and outbound ports, used by the
//! service and handler tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::domain::address::GeocodeMatch;
use crate::domain::errors::{DomainError, GatewayError};
use crate::domain::inventory::{
    decrement_stock, demand_by_product, ReconcileReport, StockAdjustment,
};
use crate::domain::order::{
    DeliveryUpdate, LineItem, ListResult, NewOrder, OrderFilter, OrderView, Page,
    DELIVERY_STATUS_PENDING, ORDER_STATUS_DELIVERED, ORDER_STATUS_PENDING,
};
use crate::domain::payment::{
    InitializeRequest, InitializeResponse, PaymentOutcome, PaymentStatus, PaymentView,
    Settlement, Transition, VerifyResponse,
};
use crate::domain::ports::{Geocoder, OrderRepository, PaymentGateway};

#[derive(Default)]
struct State {
    orders: HashMap<Uuid, OrderView>,
    payments: HashMap<Uuid, PaymentView>,
    stock: HashMap<Uuid, i32>,
    events: Vec<(Uuid, &'static str)>,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    state: Mutex<State>,
}

impl InMemoryOrderRepository {
    pub fn with_stock(products: &[(Uuid, i32)]) -> Self {
        let repo = Self::default();
        repo.state.lock().unwrap().stock = products.iter().copied().collect();
        repo
    }

    pub fn stock(&self, product_id: Uuid) -> Option<i32> {
        self.state.lock().unwrap().stock.get(&product_id).copied()
    }

    pub fn order(&self, id: Uuid) -> Option<OrderView> {
        self.state.lock().unwrap().orders.get(&id).cloned()
    }

    pub fn payment_for(&self, order_id: Uuid) -> Option<PaymentView> {
        self.state.lock().unwrap().payments.get(&order_id).cloned()
    }

    pub fn order_count(&self) -> usize {
        self.state.lock().unwrap().orders.len()
    }

    pub fn payment_count(&self) -> usize {
        self.state.lock().unwrap().payments.len()
    }

    pub fn events_for(&self, order_id: Uuid) -> Vec<&'static str> {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .filter(|(id, _)| *id == order_id)
            .map(|(_, event)| *event)
            .collect()
    }
}

fn reconcile(stock: &mut HashMap<Uuid, i32>, lines: &[LineItem]) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let demand = demand_by_product(lines.iter().map(|l| (l.product_id, l.quantity)));
    for (product_id, quantity) in demand {
        match stock.get_mut(&product_id) {
            Some(current) => {
                let previous = *current;
                *current = decrement_stock(previous, quantity);
                report.adjusted.push(StockAdjustment {
                    product_id,
                    previous,
                    current: *current,
                });
            }
            None => report.skipped.push(product_id),
        }
    }
    report
}

impl OrderRepository for InMemoryOrderRepository {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        let mut state = self.state.lock().unwrap();
        if state.orders.values().any(|o| o.reference == order.reference)
            || state
                .payments
                .values()
                .any(|p| p.payment_ref == order.payment_reference)
        {
            return Err(DomainError::Conflict("duplicate reference".to_string()));
        }
        let now = Utc::now();
        let view = OrderView {
            id: order.id,
            reference: order.reference,
            delivery: order.delivery,
            user_id: order.user_id,
            user_email: order.user_email,
            currency: order.currency,
            lines: order.lines,
            subtotal: order.totals.subtotal,
            delivery_cost: order.totals.delivery_cost,
            total_amount: order.totals.total.clone(),
            order_status: ORDER_STATUS_PENDING.to_string(),
            payment_status: PaymentStatus::Pending,
            delivery_status: DELIVERY_STATUS_PENDING.to_string(),
            location: None,
            expected_date: None,
            rider: None,
            created_at: now,
            updated_at: now,
        };
        state.payments.insert(
            order.id,
            PaymentView {
                id: Uuid::new_v4(),
                order_id: order.id,
                user_id: Some(order.user_id),
                amount: order.totals.total,
                payment_ref: order.payment_reference,
                currency: order.currency,
                payment_status: PaymentStatus::Pending,
                created_at: now,
            },
        );
        state.orders.insert(order.id, view.clone());
        state.events.push((order.id, "OrderCreated"));
        Ok(view)
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(self.order(id))
    }

    fn find_by_reference(&self, reference: &str) -> Result<Option<OrderView>, DomainError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .orders
            .values()
            .find(|o| o.reference == reference)
            .cloned())
    }

    fn find_payment(&self, order_id: Uuid) -> Result<Option<PaymentView>, DomainError> {
        Ok(self.payment_for(order_id))
    }

    fn settle(
        &self,
        order_id: Uuid,
        gateway_reference: &str,
        outcome: PaymentOutcome,
    ) -> Result<Settlement, DomainError> {
        let mut guard = self.state.lock().unwrap();
        let state = &mut *guard;
        let order = state
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| DomainError::not_found("Order not found"))?;
        let payment = state
            .payments
            .get_mut(&order_id)
            .ok_or_else(|| DomainError::not_found("Payment not found"))?;

        let transition = Transition::decide(order.payment_status, outcome);
        let mut reconciliation = None;
        match transition {
            Transition::MarkPaid => {
                reconciliation = Some(reconcile(&mut state.stock, &order.lines));
                order.payment_status = PaymentStatus::Paid;
                payment.payment_status = PaymentStatus::Paid;
                payment.payment_ref = gateway_reference.to_string();
                state.events.push((order_id, "OrderPaid"));
            }
            Transition::MarkFailed => {
                order.payment_status = PaymentStatus::Failed;
                payment.payment_status = PaymentStatus::Failed;
                payment.payment_ref = gateway_reference.to_string();
                state.events.push((order_id, "OrderPaymentFailed"));
            }
            Transition::RecordReference => {
                payment.payment_ref = gateway_reference.to_string();
            }
            Transition::Unchanged => {}
        }

        Ok(Settlement {
            order: order.clone(),
            transitioned: transition.changes_status(),
            reconciliation,
        })
    }

    fn update_delivery(
        &self,
        id: Uuid,
        update: &DeliveryUpdate,
    ) -> Result<Option<OrderView>, DomainError> {
        let mut state = self.state.lock().unwrap();
        let Some(order) = state.orders.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = &update.location {
            order.location = Some(v.clone());
        }
        if let Some(v) = &update.order_status {
            order.order_status = v.clone();
        }
        if let Some(v) = &update.expected_date {
            order.expected_date = Some(v.clone());
        }
        if let Some(v) = &update.rider {
            order.rider = Some(v.clone());
        }
        if let Some(v) = &update.delivery_status {
            order.delivery_status = v.clone();
        }
        order.updated_at = Utc::now();
        let updated = order.clone();
        state.events.push((id, "OrderDeliveryUpdated"));
        Ok(Some(updated))
    }

    fn list(&self, filter: OrderFilter, page: Page) -> Result<ListResult, DomainError> {
        let state = self.state.lock().unwrap();
        let mut matching: Vec<OrderView> = state
            .orders
            .values()
            .filter(|o| match filter {
                OrderFilter::All => true,
                OrderFilter::ForUser(user_id) => o.user_id == user_id,
                OrderFilter::AwaitingDelivery => {
                    o.payment_status == PaymentStatus::Paid
                        && o.order_status != ORDER_STATUS_DELIVERED
                }
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .collect();
        Ok(ListResult { items, total })
    }
}

pub struct FakeGateway {
    initialize_error: Option<GatewayError>,
    verify_result: Mutex<Result<Option<String>, GatewayError>>,
    verify_order_id: Mutex<Option<String>>,
    initialized: Mutex<Vec<InitializeRequest>>,
    verify_calls: AtomicUsize,
}

impl FakeGateway {
    pub fn succeeding() -> Self {
        Self {
            initialize_error: None,
            verify_result: Mutex::new(Ok(Some("success".to_string()))),
            verify_order_id: Mutex::new(None),
            initialized: Mutex::new(Vec::new()),
            verify_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing_initialize(error: GatewayError) -> Self {
        Self {
            initialize_error: Some(error),
            ..Self::succeeding()
        }
    }

    pub fn set_verify_status(&self, status: &str) {
        *self.verify_result.lock().unwrap() = Ok(Some(status.to_string()));
    }

    pub fn set_verify_error(&self, error: GatewayError) {
        *self.verify_result.lock().unwrap() = Err(error);
    }

    pub fn set_verify_order_id(&self, order_id: &str) {
        *self.verify_order_id.lock().unwrap() = Some(order_id.to_string());
    }

    pub fn last_initialize(&self) -> Option<InitializeRequest> {
        self.initialized.lock().unwrap().last().cloned()
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

impl PaymentGateway for FakeGateway {
    fn initialize(&self, request: &InitializeRequest) -> Result<InitializeResponse, GatewayError> {
        self.initialized.lock().unwrap().push(request.clone());
        if let Some(e) = &self.initialize_error {
            return Err(e.clone());
        }
        Ok(InitializeResponse {
            authorization_url: "https://checkout.test/abc".to_string(),
            access_code: "abc".to_string(),
            reference: "gw-ref-abc".to_string(),
        })
    }

    fn verify(&self, reference: &str) -> Result<VerifyResponse, GatewayError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        let status = self.verify_result.lock().unwrap().clone()?;
        let order_id = self.verify_order_id.lock().unwrap().clone();
        Ok(VerifyResponse {
            raw: json!({
                "status": true,
                "data": {
                    "reference": reference,
                    "status": status,
                    "metadata": { "order_id": order_id },
                }
            }),
            status,
            order_id,
        })
    }
}

pub struct FakeGeocoder {
    result: Result<Vec<GeocodeMatch>, GatewayError>,
}

impl FakeGeocoder {
    pub fn returning(display_name: &str) -> Self {
        Self {
            result: Ok(vec![GeocodeMatch {
                display_name: display_name.to_string(),
                lat: "6.4281".to_string(),
                lon: "3.4219".to_string(),
            }]),
        }
    }

    pub fn empty() -> Self {
        Self { result: Ok(vec![]) }
    }

    pub fn failing(error: GatewayError) -> Self {
        Self { result: Err(error) }
    }
}

impl Geocoder for FakeGeocoder {
    fn search(&self, _address: &str) -> Result<Vec<GeocodeMatch>, GatewayError> {
        self.result.clone()
    }
}
