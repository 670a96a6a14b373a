use anyhow::Result;
use gc_config::StorefrontConfig;
use gc_order::{data_packs, format_fcfa, OrderSummary, CALL_BUNDLE_PRICE};

use super::{fill_session, print_summary, OrderArgs};

pub fn print_packs() {
    for pack in data_packs() {
        println!(
            "data_pack label={:?} price={} display={:?}",
            pack.label,
            pack.price,
            format_fcfa(pack.price)
        );
    }
    println!(
        "call_bundle price={} display={:?}",
        CALL_BUNDLE_PRICE,
        format_fcfa(CALL_BUNDLE_PRICE)
    );
}

/// Price whatever was entered; validation is not required for a quote.
pub fn quote(args: &OrderArgs) -> Result<()> {
    let session = fill_session(args)?;
    let summary = OrderSummary::from_draft(session.draft())?;
    print_summary(&summary);
    Ok(())
}

pub fn print_support(cfg: &StorefrontConfig) {
    println!("support_phone={}", cfg.support.phone);
    println!("support_whatsapp={}", cfg.support.whatsapp_url);
}
