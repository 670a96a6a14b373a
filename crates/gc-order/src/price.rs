use std::fmt;

use tracing::error;

use crate::pricing::{find_data_pack, CALL_BUNDLE_PRICE};
use crate::types::{Fcfa, OrderDraft, ServiceType};

/// Raised when the draft breaks the pricing invariant.
///
/// A session never lets an unknown data-pack label into its draft, so this
/// only surfaces for hand-built drafts. Treat it as a bug, not user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    UnknownDataPack { label: String },
}

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceError::UnknownDataPack { label } => {
                write!(f, "PRICE_INVARIANT: data pack '{label}' is not in the pricing table")
            }
        }
    }
}

impl std::error::Error for PriceError {}

/// Total cost of the draft in FCFA.
///
/// - `Data`   → pricing-table price of `data_pack`
/// - `Call`   → [`CALL_BUNDLE_PRICE`]
/// - `Credit` → `amount` as a non-negative integer, `0` when empty or unparseable
///
/// Pure: depends only on `service_type`, `amount` and `data_pack`.
pub fn compute_price(draft: &OrderDraft) -> Result<Fcfa, PriceError> {
    match draft.service_type {
        ServiceType::Data => match find_data_pack(&draft.data_pack) {
            Some(pack) => Ok(pack.price),
            None => {
                error!(label = %draft.data_pack, "data pack missing from pricing table");
                Err(PriceError::UnknownDataPack {
                    label: draft.data_pack.clone(),
                })
            }
        },
        ServiceType::Call => Ok(CALL_BUNDLE_PRICE),
        ServiceType::Credit => Ok(parse_amount(&draft.amount).unwrap_or(0)),
    }
}

/// Parse a credit amount as whole FCFA. `None` for empty, signed, decimal,
/// out-of-range (> `u64::MAX`) or otherwise non-numeric text.
pub(crate) fn parse_amount(raw: &str) -> Option<Fcfa> {
    let t = raw.trim();
    if t.is_empty() || !t.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    t.parse::<Fcfa>().ok()
}
