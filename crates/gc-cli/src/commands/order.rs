use anyhow::{bail, Context, Result};
use gc_audit::AuditOrderRepository;
use gc_config::{OutcomeSetting, StorefrontConfig};
use gc_order::{
    DeliveryStatus, OrderSession, OrderSummary, SessionError, ValidationErrors, WizardStage,
};
use gc_payment_sim::{SimulatedGateway, SimulatedOutcome};
use tracing::info;

use super::{fill_session, print_summary, OrderArgs};

pub fn validate_only(args: &OrderArgs) -> Result<()> {
    let mut session = fill_session(args)?;
    submit_or_report(&mut session)?;
    println!("valid=true");
    Ok(())
}

/// Home → Order → Payment → Confirmation with the simulated gateway and the
/// order log as repository.
pub async fn run_order(args: &OrderArgs, cfg: &StorefrontConfig) -> Result<()> {
    let gateway = gateway_from_config(cfg);
    let repo = AuditOrderRepository::open(&cfg.audit.path, cfg.audit.hash_chain)
        .with_context(|| format!("open order log {:?}", cfg.audit.path))?;

    let mut session = fill_session(args)?;
    submit_or_report(&mut session)?;

    let summary = OrderSummary::from_draft(session.draft())?;
    print_summary(&summary);

    info!(
        settle_delay_ms = cfg.payment.settle_delay_ms,
        timeout_ms = cfg.payment.timeout_ms,
        "confirming payment"
    );
    let confirmed = match session
        .confirm_payment(&gateway, &repo, cfg.settlement_policy())
        .await
    {
        Ok(confirmed) => confirmed,
        Err(SessionError::Payment(e)) => {
            println!("payment=failed reason={:?}", e.to_string());
            bail!("PAYMENT_FAILED: {e}");
        }
        Err(e) => return Err(e.into()),
    };

    println!("payment=approved");
    println!("order_id={}", confirmed.order_id);
    println!("transaction_ref={}", confirmed.receipt.transaction_ref);
    match confirmed.delivery {
        DeliveryStatus::InDelivery { eta_minutes } => {
            println!("delivery=in_delivery eta_minutes={eta_minutes}");
        }
    }
    println!("order_log={}", cfg.audit.path.display());

    debug_assert_eq!(session.stage(), WizardStage::Confirmation);
    session.start_new_order()?;
    Ok(())
}

fn gateway_from_config(cfg: &StorefrontConfig) -> SimulatedGateway {
    let outcome = match cfg.payment.simulated_outcome {
        OutcomeSetting::Approve => SimulatedOutcome::Approve,
        OutcomeSetting::Decline => SimulatedOutcome::Decline {
            reason: cfg.payment.decline_reason.clone(),
        },
    };
    SimulatedGateway::new(cfg.settle_delay(), outcome)
}

/// Submit; on validation failure print one line per field and fail.
fn submit_or_report(session: &mut OrderSession) -> Result<()> {
    match session.submit() {
        Ok(()) => Ok(()),
        Err(SessionError::Validation(errors)) => {
            print_validation_errors(&errors);
            bail!("ORDER_INVALID: {errors}");
        }
        Err(e) => Err(e.into()),
    }
}

fn print_validation_errors(errors: &ValidationErrors) {
    println!("valid=false");
    for (field, message) in errors.iter() {
        println!("error field={} message={:?}", field, message);
    }
}
