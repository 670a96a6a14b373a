//! In-process simulated payment gateway.
//!
//! Stands in for the mobile-money aggregator during demos and tests:
//! - waits a fixed `settle_delay`, then approves or declines
//! - `transaction_ref` is derived from the order id: `"sim:tx:{order_id}"`
//! - idempotent per order id: a second charge for an already-approved order
//!   returns the first receipt and does not count as a new charge
//!
//! Only `settled_at` depends on the clock.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gc_order::{OrderId, PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest};
use tracing::debug;

/// Default simulated settle delay.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(2_000);

/// What every charge resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulatedOutcome {
    Approve,
    Decline { reason: String },
}

#[derive(Debug)]
pub struct SimulatedGateway {
    settle_delay: Duration,
    outcome: SimulatedOutcome,
    approved: Mutex<BTreeMap<OrderId, PaymentReceipt>>,
    charges: Mutex<u64>,
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new(DEFAULT_SETTLE_DELAY, SimulatedOutcome::Approve)
    }
}

impl SimulatedGateway {
    pub fn new(settle_delay: Duration, outcome: SimulatedOutcome) -> Self {
        Self {
            settle_delay,
            outcome,
            approved: Mutex::new(BTreeMap::new()),
            charges: Mutex::new(0),
        }
    }

    pub fn approving(settle_delay: Duration) -> Self {
        Self::new(settle_delay, SimulatedOutcome::Approve)
    }

    pub fn declining(settle_delay: Duration, reason: impl Into<String>) -> Self {
        Self::new(
            settle_delay,
            SimulatedOutcome::Decline {
                reason: reason.into(),
            },
        )
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Charges that reached the outcome step (idempotent replays excluded).
    pub fn charge_count(&self) -> u64 {
        self.charges.lock().map(|c| *c).unwrap_or(0)
    }

    fn lock_err<T>(_: T) -> PaymentError {
        PaymentError::Unavailable("simulated gateway state poisoned".to_string())
    }
}

pub fn transaction_ref_for(order_id: &OrderId) -> String {
    format!("sim:tx:{order_id}")
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn charge(&self, req: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        let replay = self
            .approved
            .lock()
            .map_err(Self::lock_err)?
            .get(&req.order_id)
            .cloned();
        if let Some(existing) = replay {
            debug!(order_id = %req.order_id, "replayed charge for approved order");
            return Ok(existing);
        }

        tokio::time::sleep(self.settle_delay).await;
        *self.charges.lock().map_err(Self::lock_err)? += 1;

        match &self.outcome {
            SimulatedOutcome::Approve => {
                let receipt = PaymentReceipt {
                    transaction_ref: transaction_ref_for(&req.order_id),
                    settled_at: Utc::now(),
                };
                self.approved
                    .lock()
                    .map_err(Self::lock_err)?
                    .insert(req.order_id, receipt.clone());
                debug!(order_id = %req.order_id, price = req.price, "simulated approval");
                Ok(receipt)
            }
            SimulatedOutcome::Decline { reason } => {
                debug!(order_id = %req.order_id, %reason, "simulated decline");
                Err(PaymentError::Declined {
                    reason: reason.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_order::OrderDraft;

    fn request() -> PaymentRequest {
        PaymentRequest {
            order_id: OrderId::new_random(),
            draft: OrderDraft::default(),
            price: 500,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn approves_after_delay() {
        let gw = SimulatedGateway::approving(Duration::from_secs(2));
        let req = request();
        let start = tokio::time::Instant::now();
        let receipt = gw.charge(&req).await.unwrap();
        assert!(start.elapsed() >= Duration::from_secs(2));
        assert_eq!(receipt.transaction_ref, transaction_ref_for(&req.order_id));
        assert_eq!(gw.charge_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn approved_order_is_not_charged_twice() {
        let gw = SimulatedGateway::approving(Duration::from_millis(10));
        let req = request();
        let a = gw.charge(&req).await.unwrap();
        let b = gw.charge(&req).await.unwrap();
        assert_eq!(a, b);
        assert_eq!(gw.charge_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn declines_with_reason() {
        let gw = SimulatedGateway::declining(Duration::from_millis(10), "insufficient funds");
        let err = gw.charge(&request()).await.unwrap_err();
        assert_eq!(
            err,
            PaymentError::Declined {
                reason: "insufficient funds".to_string()
            }
        );
        // Declines are retried for real; nothing is cached.
        let _ = gw.charge(&request()).await;
        assert_eq!(gw.charge_count(), 2);
    }
}
