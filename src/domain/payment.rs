use std::fmt;

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::errors::DomainError;
use super::inventory::ReconcileReport;
use super::order::{Currency, OrderView};

/// Payment axis of an order. `Paid` and `Failed` are both terminal: only a
/// `Pending` order ever changes status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "PAID" => Ok(PaymentStatus::Paid),
            "FAILED" => Ok(PaymentStatus::Failed),
            other => Err(DomainError::Internal(format!(
                "unknown payment status '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PaymentView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Option<Uuid>,
    pub amount: BigDecimal,
    pub payment_ref: String,
    pub currency: Currency,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// What the gateway said about a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Failed,
}

impl PaymentOutcome {
    pub fn from_gateway_status(status: Option<&str>) -> Self {
        match status {
            Some("success") => PaymentOutcome::Paid,
            _ => PaymentOutcome::Failed,
        }
    }
}

/// Decision taken for an order given its current payment status and a fresh
/// gateway outcome. This is the only place the transition table lives; every
/// repository implementation applies it under its own lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Reconcile inventory, then mark order and payment PAID.
    MarkPaid,
    /// Mark order and payment FAILED.
    MarkFailed,
    /// FAILED stays FAILED. The reference is recorded on the payment only.
    RecordReference,
    /// Already PAID. Nothing is written.
    Unchanged,
}

impl Transition {
    pub fn decide(current: PaymentStatus, outcome: PaymentOutcome) -> Self {
        match (current, outcome) {
            (PaymentStatus::Paid, _) => Transition::Unchanged,
            (PaymentStatus::Failed, _) => Transition::RecordReference,
            (PaymentStatus::Pending, PaymentOutcome::Paid) => Transition::MarkPaid,
            (PaymentStatus::Pending, PaymentOutcome::Failed) => Transition::MarkFailed,
        }
    }

    pub fn changes_status(&self) -> bool {
        matches!(self, Transition::MarkPaid | Transition::MarkFailed)
    }
}

#[derive(Debug, Clone)]
pub struct Settlement {
    pub order: OrderView,
    pub transitioned: bool,
    pub reconciliation: Option<ReconcileReport>,
}

/// Parameters for opening a hosted payment session.
#[derive(Debug, Clone, PartialEq)]
pub struct InitializeRequest {
    pub email: String,
    pub amount_minor: i64,
    pub currency: Currency,
    pub callback_url: String,
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitializeResponse {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyResponse {
    /// `data.status` from the gateway, e.g. `"success"`, `"abandoned"`.
    pub status: Option<String>,
    /// `data.metadata.order_id` when the session was opened by this service.
    pub order_id: Option<String>,
    pub raw: Value,
}

impl VerifyResponse {
    pub fn outcome(&self) -> PaymentOutcome {
        PaymentOutcome::from_gateway_status(self.status.as_deref())
    }
}
