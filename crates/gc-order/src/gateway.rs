//! Payment Gateway boundary.
//!
//! The engine never talks to a payment provider directly. It builds a
//! [`PaymentRequest`] and hands it to whatever [`PaymentGateway`] the caller
//! wired in (simulated in `gc-payment-sim`, scripted doubles in `gc-testkit`).
//!
//! ```text
//! OrderSession::confirm_payment
//!     │
//!     ├── begin_payment   → OrderRepository::save (once per Payment visit)
//!     ├── tokio::time::timeout(policy.timeout, gateway.charge(req))
//!     │        └── elapsed → PaymentError::Timeout
//!     └── settle_payment  → Confirmation | stay on Payment with error
//! ```
//!
//! Retries after a failure reuse the same `order_id`, so a real gateway can
//! de-duplicate charges on it.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Fcfa, OrderDraft, OrderId};

/// Everything a gateway needs to charge the customer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub order_id: OrderId,
    pub draft: OrderDraft,
    pub price: Fcfa,
}

/// Proof of a settled payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Gateway-assigned transaction reference.
    pub transaction_ref: String,
    pub settled_at: DateTime<Utc>,
}

/// Why a payment did not settle. All variants are recoverable: the session
/// stays on the Payment stage and the user may retry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PaymentError {
    /// The provider refused the charge.
    Declined { reason: String },
    /// No answer within [`SettlementPolicy::timeout`].
    Timeout { after: Duration },
    /// Transport or provider outage.
    Unavailable(String),
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::Declined { reason } => write!(f, "payment declined: {reason}"),
            PaymentError::Timeout { after } => {
                write!(f, "payment timed out after {} ms", after.as_millis())
            }
            PaymentError::Unavailable(msg) => write!(f, "payment gateway unavailable: {msg}"),
        }
    }
}

impl std::error::Error for PaymentError {}

/// External payment provider contract.
///
/// Implementations must be `Send + Sync` so a single gateway can be shared
/// by many sessions.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Human-readable gateway name, used in logs.
    fn name(&self) -> &'static str;

    /// Charge `req.price` for `req.order_id`. May take arbitrarily long; the
    /// session bounds the wait with its [`SettlementPolicy`].
    async fn charge(&self, req: &PaymentRequest) -> Result<PaymentReceipt, PaymentError>;
}

/// How long the session waits for a gateway answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementPolicy {
    pub timeout: Duration,
}

impl SettlementPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let e = PaymentError::Timeout {
            after: Duration::from_millis(1500),
        };
        assert_eq!(e.to_string(), "payment timed out after 1500 ms");
        let e = PaymentError::Declined {
            reason: "insufficient funds".to_string(),
        };
        assert!(e.to_string().contains("insufficient funds"));
    }

    #[test]
    fn default_policy_is_ten_seconds() {
        assert_eq!(SettlementPolicy::default().timeout, Duration::from_secs(10));
    }
}
