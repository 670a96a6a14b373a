use std::fmt;

use chrono::Utc;
use tracing::{info, warn};

use crate::gateway::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, SettlementPolicy};
use crate::operator::apply_operator_inference;
use crate::price::{compute_price, PriceError};
use crate::pricing::find_data_pack;
use crate::repository::{OrderRepository, RepositoryError};
use crate::types::{
    ConfirmedOrder, DeliveryStatus, Fcfa, Operator, OrderDraft, OrderId, OrderRecord, ServiceType,
    ValidationErrors, WizardStage, DELIVERY_ETA_MINUTES, PHONE_NUMBER_LEN,
};
use crate::validate::validate;

// ---------------------------------------------------------------------------
// SessionError
// ---------------------------------------------------------------------------

/// Why a session operation was refused. The session state is unchanged
/// unless the variant says otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The action is not allowed from the current stage.
    IllegalTransition {
        from: WizardStage,
        action: &'static str,
    },
    /// Field edits are only accepted on the Order stage.
    DraftFrozen { stage: WizardStage },
    /// `select_data_pack` was given a label outside the pricing table.
    UnknownDataPack(String),
    /// Submission failed validation. The errors are also kept on the session.
    Validation(ValidationErrors),
    /// A payment is already being settled.
    SubmissionInFlight,
    Pricing(PriceError),
    Repository(RepositoryError),
    /// Settlement failed. The session stays on Payment and may retry.
    Payment(PaymentError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::IllegalTransition { from, action } => {
                write!(f, "illegal wizard transition: {action} from {from}")
            }
            SessionError::DraftFrozen { stage } => {
                write!(f, "order draft is read-only on the {stage} stage")
            }
            SessionError::UnknownDataPack(label) => write!(f, "unknown data pack '{label}'"),
            SessionError::Validation(errors) => write!(f, "order is invalid: {errors}"),
            SessionError::SubmissionInFlight => write!(f, "a payment is already in progress"),
            SessionError::Pricing(e) => write!(f, "{e}"),
            SessionError::Repository(e) => write!(f, "{e}"),
            SessionError::Payment(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<PriceError> for SessionError {
    fn from(e: PriceError) -> Self {
        SessionError::Pricing(e)
    }
}

impl From<RepositoryError> for SessionError {
    fn from(e: RepositoryError) -> Self {
        SessionError::Repository(e)
    }
}

// ---------------------------------------------------------------------------
// OrderSession
// ---------------------------------------------------------------------------

/// One customer's pass through the order wizard.
///
/// Owned by whichever layer drives the screens; one instance per user session.
#[derive(Debug, Clone, Default)]
pub struct OrderSession {
    stage: WizardStage,
    draft: OrderDraft,
    errors: ValidationErrors,
    is_submitting: bool,
    /// Order saved during the current Payment visit; reused by retries.
    pending: Option<(OrderId, OrderRecord)>,
    payment_error: Option<PaymentError>,
    confirmation: Option<ConfirmedOrder>,
}

impl OrderSession {
    /// Fresh session on the Home stage with an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    // -- read side ----------------------------------------------------------

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    pub fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Errors from the most recent `submit` attempt.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Last settlement failure on the current Payment visit.
    pub fn payment_error(&self) -> Option<&PaymentError> {
        self.payment_error.as_ref()
    }

    pub fn confirmation(&self) -> Option<&ConfirmedOrder> {
        self.confirmation.as_ref()
    }

    /// Current total, recomputed on every call.
    pub fn price(&self) -> Result<Fcfa, PriceError> {
        compute_price(&self.draft)
    }

    // -- transitions --------------------------------------------------------

    /// Home → Order.
    pub fn start_order(&mut self) -> Result<(), SessionError> {
        self.expect_stage(WizardStage::Home, "start_order")?;
        self.move_to(WizardStage::Order);
        Ok(())
    }

    /// Order → Home, or Payment → Order (edit and return).
    pub fn back(&mut self) -> Result<(), SessionError> {
        match self.stage {
            WizardStage::Order => self.move_to(WizardStage::Home),
            WizardStage::Payment => {
                if self.is_submitting {
                    return Err(SessionError::SubmissionInFlight);
                }
                // The draft may change; a later payment records a new order.
                self.pending = None;
                self.payment_error = None;
                self.move_to(WizardStage::Order);
            }
            from => return Err(SessionError::IllegalTransition { from, action: "back" }),
        }
        Ok(())
    }

    /// Order → Payment when the draft validates.
    ///
    /// Validation is rerun from scratch; on failure the errors are stored on
    /// the session, returned, and the stage stays on Order.
    pub fn submit(&mut self) -> Result<(), SessionError> {
        self.expect_stage(WizardStage::Order, "submit")?;

        let errors = validate(&self.draft);
        if !errors.is_empty() {
            warn!(fields = errors.len(), errors = %errors, "order validation failed");
            self.errors = errors.clone();
            return Err(SessionError::Validation(errors));
        }
        self.errors = errors;

        compute_price(&self.draft)?;
        self.move_to(WizardStage::Payment);
        Ok(())
    }

    /// First half of payment confirmation.
    ///
    /// Records the order (once per Payment visit), raises `is_submitting`
    /// and returns the request to hand to a gateway. Finish with
    /// [`settle_payment`](Self::settle_payment).
    pub fn begin_payment<R>(&mut self, repo: &R) -> Result<PaymentRequest, SessionError>
    where
        R: OrderRepository + ?Sized,
    {
        self.expect_stage(WizardStage::Payment, "confirm_payment")?;
        if self.is_submitting {
            return Err(SessionError::SubmissionInFlight);
        }

        let price = compute_price(&self.draft)?;
        let order_id = match &self.pending {
            Some((id, _)) => *id,
            None => {
                let record = OrderRecord::new(self.draft.clone(), price, Utc::now());
                let id = repo.save(&record)?;
                info!(
                    order_id = %id,
                    operator = %record.draft.operator,
                    service = %record.draft.service_type,
                    price,
                    submitted_at = %record.submitted_at.to_rfc3339(),
                    "order recorded"
                );
                self.pending = Some((id, record));
                id
            }
        };

        self.is_submitting = true;
        self.payment_error = None;

        Ok(PaymentRequest {
            order_id,
            draft: self.draft.clone(),
            price,
        })
    }

    /// Second half of payment confirmation: apply the gateway outcome.
    ///
    /// Success moves to Confirmation. Failure keeps the Payment stage and the
    /// draft, stores the error, clears `is_submitting` and returns
    /// [`SessionError::Payment`].
    pub fn settle_payment(
        &mut self,
        outcome: Result<PaymentReceipt, PaymentError>,
    ) -> Result<&ConfirmedOrder, SessionError> {
        self.expect_stage(WizardStage::Payment, "settle_payment")?;
        if !self.is_submitting {
            return Err(SessionError::IllegalTransition {
                from: self.stage,
                action: "settle_payment without begin_payment",
            });
        }
        self.is_submitting = false;

        match outcome {
            Ok(receipt) => {
                let Some((order_id, record)) = self.pending.take() else {
                    return Err(SessionError::IllegalTransition {
                        from: self.stage,
                        action: "settle_payment without a recorded order",
                    });
                };
                info!(
                    order_id = %order_id,
                    transaction_ref = %receipt.transaction_ref,
                    "payment settled"
                );
                self.move_to(WizardStage::Confirmation);
                Ok(self.confirmation.insert(ConfirmedOrder {
                    order_id,
                    record,
                    receipt,
                    delivery: DeliveryStatus::InDelivery {
                        eta_minutes: DELIVERY_ETA_MINUTES,
                    },
                }))
            }
            Err(e) => {
                warn!(error = %e, "payment failed; order kept for retry");
                self.payment_error = Some(e.clone());
                Err(SessionError::Payment(e))
            }
        }
    }

    /// Payment → Confirmation through `gateway`, bounded by `policy.timeout`.
    ///
    /// There is no cancellation: once started, the call runs until the
    /// gateway answers or the timeout elapses.
    pub async fn confirm_payment<G, R>(
        &mut self,
        gateway: &G,
        repo: &R,
        policy: SettlementPolicy,
    ) -> Result<&ConfirmedOrder, SessionError>
    where
        G: PaymentGateway + ?Sized,
        R: OrderRepository + ?Sized,
    {
        let req = self.begin_payment(repo)?;
        info!(
            gateway = gateway.name(),
            order_id = %req.order_id,
            price = req.price,
            "settling payment"
        );

        // Dropping this future mid-await (outer timeout, select!) must not
        // leave the session stuck in flight; the pending order survives.
        let mut in_flight = InFlight {
            is_submitting: &mut self.is_submitting,
            settled: false,
        };
        let outcome = match tokio::time::timeout(policy.timeout, gateway.charge(&req)).await {
            Ok(res) => res,
            Err(_elapsed) => Err(PaymentError::Timeout {
                after: policy.timeout,
            }),
        };
        in_flight.settled = true;
        drop(in_flight);

        self.settle_payment(outcome)
    }

    /// Give up on an in-flight payment without an outcome.
    ///
    /// Stays on Payment with the draft and the recorded order intact, so the
    /// next confirmation retries the same order.
    pub fn abandon_payment(&mut self) -> Result<(), SessionError> {
        self.expect_stage(WizardStage::Payment, "abandon_payment")?;
        if !self.is_submitting {
            return Err(SessionError::IllegalTransition {
                from: self.stage,
                action: "abandon_payment without begin_payment",
            });
        }
        self.is_submitting = false;
        warn!("payment abandoned before settlement; order kept for retry");
        Ok(())
    }

    /// Confirmation → Home with a fresh draft.
    pub fn start_new_order(&mut self) -> Result<(), SessionError> {
        self.expect_stage(WizardStage::Confirmation, "start_new_order")?;
        self.reset();
        Ok(())
    }

    /// Drop everything and return to Home with an empty draft.
    pub fn reset(&mut self) {
        if self.stage != WizardStage::Home {
            info!(from = %self.stage, "session reset");
        }
        *self = Self::new();
    }

    // -- draft edits (Order stage only) -------------------------------------

    pub fn set_full_name(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        self.editable()?;
        self.draft.full_name = name.into();
        Ok(())
    }

    /// Keep digits only, truncate to ten, then re-run operator inference.
    pub fn set_phone_number(&mut self, raw: &str) -> Result<(), SessionError> {
        self.editable()?;
        self.draft.phone_number = raw
            .chars()
            .filter(char::is_ascii_digit)
            .take(PHONE_NUMBER_LEN)
            .collect();
        apply_operator_inference(&mut self.draft);
        Ok(())
    }

    /// Manual carrier choice. A later phone edit with a known prefix overrides it.
    pub fn select_operator(&mut self, operator: Operator) -> Result<(), SessionError> {
        self.editable()?;
        self.draft.operator = operator;
        Ok(())
    }

    pub fn select_service(&mut self, service: ServiceType) -> Result<(), SessionError> {
        self.editable()?;
        self.draft.service_type = service;
        Ok(())
    }

    pub fn set_amount(&mut self, amount: impl Into<String>) -> Result<(), SessionError> {
        self.editable()?;
        self.draft.amount = amount.into();
        Ok(())
    }

    /// Only labels from the pricing table are accepted.
    pub fn select_data_pack(&mut self, label: &str) -> Result<(), SessionError> {
        self.editable()?;
        let pack = find_data_pack(label)
            .ok_or_else(|| SessionError::UnknownDataPack(label.to_string()))?;
        self.draft.data_pack = pack.label.to_string();
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    fn expect_stage(&self, want: WizardStage, action: &'static str) -> Result<(), SessionError> {
        if self.stage == want {
            Ok(())
        } else {
            Err(SessionError::IllegalTransition {
                from: self.stage,
                action,
            })
        }
    }

    fn editable(&self) -> Result<(), SessionError> {
        if self.stage == WizardStage::Order {
            Ok(())
        } else {
            Err(SessionError::DraftFrozen { stage: self.stage })
        }
    }

    fn move_to(&mut self, to: WizardStage) {
        info!(from = %self.stage, to = %to, "wizard transition");
        self.stage = to;
    }
}

/// Clears `is_submitting` unless the gateway call ran to completion.
struct InFlight<'a> {
    is_submitting: &'a mut bool,
    settled: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.is_submitting = false;
            warn!("payment dropped before settlement; order kept for retry");
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct CountingRepo {
        saved: Mutex<Vec<OrderRecord>>,
    }

    impl OrderRepository for CountingRepo {
        fn save(&self, order: &OrderRecord) -> Result<OrderId, RepositoryError> {
            self.saved.lock().unwrap().push(order.clone());
            Ok(OrderId::new_random())
        }
    }

    struct BrokenRepo;

    impl OrderRepository for BrokenRepo {
        fn save(&self, _order: &OrderRecord) -> Result<OrderId, RepositoryError> {
            Err(RepositoryError::Write("disk full".to_string()))
        }
    }

    fn receipt() -> PaymentReceipt {
        PaymentReceipt {
            transaction_ref: "tx-1".to_string(),
            settled_at: Utc::now(),
        }
    }

    fn session_on_order() -> OrderSession {
        let mut s = OrderSession::new();
        s.start_order().unwrap();
        s
    }

    fn session_on_payment() -> OrderSession {
        let mut s = session_on_order();
        s.set_full_name("Jean").unwrap();
        s.set_phone_number("0712345678").unwrap();
        s.set_amount("1000").unwrap();
        s.submit().unwrap();
        s
    }

    #[test]
    fn new_session_starts_home_with_empty_draft() {
        let s = OrderSession::new();
        assert_eq!(s.stage(), WizardStage::Home);
        assert_eq!(s.draft(), &OrderDraft::default());
        assert!(!s.is_submitting());
        assert!(s.errors().is_empty());
    }

    #[test]
    fn edits_are_refused_outside_order_stage() {
        let mut s = OrderSession::new();
        let err = s.set_full_name("x").unwrap_err();
        assert_eq!(
            err,
            SessionError::DraftFrozen {
                stage: WizardStage::Home
            }
        );

        let mut s = session_on_payment();
        assert!(matches!(
            s.set_amount("5000"),
            Err(SessionError::DraftFrozen {
                stage: WizardStage::Payment
            })
        ));
        assert_eq!(s.draft().amount, "1000");
    }

    #[test]
    fn phone_edit_sanitizes_and_infers_operator() {
        let mut s = session_on_order();
        s.select_operator(Operator::Orange).unwrap();
        s.set_phone_number("01 98-76 54 32 99 99").unwrap();
        assert_eq!(s.draft().phone_number, "0198765432");
        assert_eq!(s.draft().operator, Operator::Moov);
    }

    #[test]
    fn unknown_data_pack_is_rejected() {
        let mut s = session_on_order();
        let err = s.select_data_pack("50 Go").unwrap_err();
        assert_eq!(err, SessionError::UnknownDataPack("50 Go".to_string()));
        assert_eq!(s.draft().data_pack, "220 Mo");
        s.select_data_pack("2 Go").unwrap();
        assert_eq!(s.draft().data_pack, "2 Go");
    }

    #[test]
    fn submit_failure_keeps_order_stage_and_stores_errors() {
        let mut s = session_on_order();
        let err = s.submit().unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert_eq!(s.stage(), WizardStage::Order);
        assert_eq!(s.errors().len(), 3);
    }

    #[test]
    fn successful_submit_clears_previous_errors() {
        let mut s = session_on_order();
        let _ = s.submit();
        assert!(!s.errors().is_empty());
        s.set_full_name("Jean").unwrap();
        s.set_phone_number("0712345678").unwrap();
        s.set_amount("300").unwrap();
        s.submit().unwrap();
        assert!(s.errors().is_empty());
        assert_eq!(s.stage(), WizardStage::Payment);
    }

    #[test]
    fn no_skip_ahead() {
        let mut s = OrderSession::new();
        assert!(matches!(
            s.submit(),
            Err(SessionError::IllegalTransition { from: WizardStage::Home, .. })
        ));
        assert!(s.begin_payment(&CountingRepo::default()).is_err());
        assert!(s.start_new_order().is_err());
        assert!(s.back().is_err());
        assert_eq!(s.stage(), WizardStage::Home);
    }

    #[test]
    fn back_transitions() {
        let mut s = session_on_payment();
        s.back().unwrap();
        assert_eq!(s.stage(), WizardStage::Order);
        // Draft survives the round trip.
        assert_eq!(s.draft().full_name, "Jean");
        s.back().unwrap();
        assert_eq!(s.stage(), WizardStage::Home);
    }

    #[test]
    fn begin_payment_blocks_resubmission() {
        let repo = CountingRepo::default();
        let mut s = session_on_payment();
        let req = s.begin_payment(&repo).unwrap();
        assert_eq!(req.price, 1_000);
        assert!(s.is_submitting());
        assert_eq!(s.begin_payment(&repo), Err(SessionError::SubmissionInFlight));
        assert_eq!(s.back(), Err(SessionError::SubmissionInFlight));
        assert_eq!(repo.saved.lock().unwrap().len(), 1);
    }

    #[test]
    fn failed_settle_allows_retry_with_same_order() {
        let repo = CountingRepo::default();
        let mut s = session_on_payment();
        let first = s.begin_payment(&repo).unwrap();
        let err = s
            .settle_payment(Err(PaymentError::Unavailable("down".to_string())))
            .unwrap_err();
        assert!(matches!(err, SessionError::Payment(_)));
        assert_eq!(s.stage(), WizardStage::Payment);
        assert!(!s.is_submitting());
        assert!(s.payment_error().is_some());

        let second = s.begin_payment(&repo).unwrap();
        assert_eq!(first.order_id, second.order_id);
        assert!(s.payment_error().is_none());
        assert_eq!(repo.saved.lock().unwrap().len(), 1);

        let confirmed = s.settle_payment(Ok(receipt())).unwrap();
        assert_eq!(confirmed.order_id, first.order_id);
        assert_eq!(confirmed.record.price, 1_000);
        assert_eq!(s.stage(), WizardStage::Confirmation);
    }

    #[test]
    fn abandoned_payment_keeps_order_for_retry() {
        let repo = CountingRepo::default();
        let mut s = session_on_payment();
        assert!(matches!(
            s.abandon_payment(),
            Err(SessionError::IllegalTransition { .. })
        ));

        let first = s.begin_payment(&repo).unwrap();
        s.abandon_payment().unwrap();
        assert!(!s.is_submitting());
        assert_eq!(s.stage(), WizardStage::Payment);

        let second = s.begin_payment(&repo).unwrap();
        assert_eq!(first.order_id, second.order_id);
        assert_eq!(repo.saved.lock().unwrap().len(), 1);
    }

    #[test]
    fn settle_without_begin_is_illegal() {
        let mut s = session_on_payment();
        assert!(matches!(
            s.settle_payment(Ok(receipt())),
            Err(SessionError::IllegalTransition { .. })
        ));
        assert_eq!(s.stage(), WizardStage::Payment);
    }

    #[test]
    fn repository_failure_leaves_payment_stage_idle() {
        let mut s = session_on_payment();
        let err = s.begin_payment(&BrokenRepo).unwrap_err();
        assert!(matches!(err, SessionError::Repository(_)));
        assert!(!s.is_submitting());
        assert_eq!(s.stage(), WizardStage::Payment);
    }

    #[test]
    fn start_new_order_resets_draft() {
        let repo = CountingRepo::default();
        let mut s = session_on_payment();
        s.begin_payment(&repo).unwrap();
        s.settle_payment(Ok(receipt())).unwrap();
        s.start_new_order().unwrap();
        assert_eq!(s.stage(), WizardStage::Home);
        assert_eq!(s.draft(), &OrderDraft::default());
        assert!(s.confirmation().is_none());
    }
}
