use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gc_order::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest};

/// One scripted gateway answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Approve,
    Decline(String),
    Unavailable(String),
    /// Never answers; only a settlement timeout ends the call.
    Stall,
}

/// Gateway that plays back a fixed list of answers, one per charge.
///
/// Once the script runs out every further charge is approved. All requests
/// are recorded in call order.
pub struct ScriptedGateway {
    delay: Duration,
    script: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<PaymentRequest>>,
}

impl ScriptedGateway {
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self::with_delay(Duration::ZERO, steps)
    }

    pub fn with_delay(delay: Duration, steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            delay,
            script: Mutex::new(steps.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn approving() -> Self {
        Self::new([])
    }

    pub fn calls(&self) -> Vec<PaymentRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn remaining_steps(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

pub fn receipt_for(req: &PaymentRequest) -> PaymentReceipt {
    PaymentReceipt {
        transaction_ref: format!("scripted:tx:{}", req.order_id),
        settled_at: Utc::now(),
    }
}

#[async_trait]
impl PaymentGateway for ScriptedGateway {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn charge(&self, req: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        self.calls.lock().unwrap().push(req.clone());
        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Approve);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match step {
            Step::Approve => Ok(receipt_for(req)),
            Step::Decline(reason) => Err(PaymentError::Declined { reason }),
            Step::Unavailable(msg) => Err(PaymentError::Unavailable(msg)),
            Step::Stall => std::future::pending().await,
        }
    }
}

/// Gateway that never answers.
#[derive(Default)]
pub struct StallingGateway {
    calls: Mutex<usize>,
}

impl StallingGateway {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl PaymentGateway for StallingGateway {
    fn name(&self) -> &'static str {
        "stalling"
    }

    async fn charge(&self, _req: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        *self.calls.lock().unwrap() += 1;
        std::future::pending().await
    }
}
