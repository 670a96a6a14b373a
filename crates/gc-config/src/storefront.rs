use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use gc_order::SettlementPolicy;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Typed view of the merged config. Missing sections and keys take defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    pub payment: PaymentSettings,
    pub audit: AuditSettings,
    pub support: SupportSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentSettings {
    pub settle_delay_ms: u64,
    pub timeout_ms: u64,
    pub simulated_outcome: OutcomeSetting,
    pub decline_reason: String,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            settle_delay_ms: 2_000,
            timeout_ms: 10_000,
            simulated_outcome: OutcomeSetting::Approve,
            decline_reason: "insufficient funds".to_string(),
        }
    }
}

/// What the simulated gateway answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeSetting {
    #[default]
    Approve,
    Decline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    pub path: PathBuf,
    pub hash_chain: bool,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("exports/orders.jsonl"),
            hash_chain: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportSettings {
    pub phone: String,
    pub whatsapp_url: String,
}

impl Default for SupportSettings {
    fn default() -> Self {
        Self {
            phone: "+2250564550796".to_string(),
            whatsapp_url: "https://wa.me/2250564550796".to_string(),
        }
    }
}

impl StorefrontConfig {
    pub fn from_json(config_json: &Value) -> Result<Self> {
        let cfg: StorefrontConfig = serde_json::from_value(config_json.clone())
            .context("CONFIG_INVALID: storefront config shape")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.payment.timeout_ms == 0 {
            bail!("CONFIG_INVALID: payment.timeout_ms must be > 0");
        }
        if self.audit.path.as_os_str().is_empty() {
            bail!("CONFIG_INVALID: audit.path must not be empty");
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.payment.settle_delay_ms)
    }

    pub fn settlement_policy(&self) -> SettlementPolicy {
        SettlementPolicy::new(Duration::from_millis(self.payment.timeout_ms))
    }
}
