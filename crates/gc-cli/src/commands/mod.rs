//! Command handler modules for gocredit.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod audit;
pub mod catalog;
pub mod order;

use anyhow::Result;
use clap::Args;
use gc_config::{StorefrontConfig, UnusedKeyPolicy};
use gc_order::{Operator, OrderSession, OrderSummary, ServiceType};
use tracing::info;

pub const ENV_CONFIG_PATHS: &str = "GOCREDIT_CONFIG";

/// Order form fields, as flags.
#[derive(Args, Debug, Clone)]
pub struct OrderArgs {
    /// Recipient full name
    #[arg(long, default_value = "")]
    pub name: String,

    /// Recipient phone number (10 digits starting 01, 05 or 07)
    #[arg(long, default_value = "")]
    pub phone: String,

    /// Operator (MTN | Orange | Moov); overrides the one inferred from the phone prefix
    #[arg(long)]
    pub operator: Option<Operator>,

    /// Service (credit | data | call)
    #[arg(long, default_value = "credit")]
    pub service: ServiceType,

    /// Credit amount in FCFA
    #[arg(long, default_value = "")]
    pub amount: String,

    /// Data pack label, e.g. "2 Go"
    #[arg(long)]
    pub pack: Option<String>,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// `--config` flags win; otherwise the comma-separated env var; otherwise none.
pub fn resolve_config_paths(flags: Vec<String>) -> Vec<String> {
    if !flags.is_empty() {
        return flags;
    }
    std::env::var(ENV_CONFIG_PATHS)
        .map(|raw| split_config_list(&raw))
        .unwrap_or_default()
}

fn split_config_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load the typed config. No paths means built-in defaults.
pub fn load_storefront(paths: &[String]) -> Result<StorefrontConfig> {
    if paths.is_empty() {
        return Ok(StorefrontConfig::default());
    }
    let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
    let loaded = gc_config::load_layered_yaml(&path_refs)?;
    gc_config::report_unused_keys(&loaded.config_json, UnusedKeyPolicy::Warn)?;
    info!(config_hash = %loaded.config_hash, layers = paths.len(), "config loaded");
    loaded.storefront()
}

/// Fill a fresh session's Order stage from flags, in the order a user would.
///
/// The phone is entered before the operator so an explicit `--operator`
/// overrides the inferred one.
pub fn fill_session(args: &OrderArgs) -> Result<OrderSession> {
    let mut s = OrderSession::new();
    s.start_order()?;
    s.set_full_name(args.name.as_str())?;
    s.set_phone_number(&args.phone)?;
    if let Some(op) = args.operator {
        s.select_operator(op)?;
    }
    s.select_service(args.service)?;
    s.set_amount(args.amount.as_str())?;
    if let Some(pack) = &args.pack {
        s.select_data_pack(pack)?;
    }
    Ok(s)
}

pub fn print_summary(summary: &OrderSummary) {
    println!("recipient={:?}", summary.recipient);
    println!("phone_number={}", summary.phone_number);
    println!("operator={}", summary.operator);
    println!("service={:?}", summary.service);
    println!("price={}", summary.price);
    println!("price_display={:?}", summary.price_display);
}
