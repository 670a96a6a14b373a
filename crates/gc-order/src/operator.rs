//! Carrier auto-detection from the phone-number prefix.
//!
//! Best effort only: an unrecognised or partial prefix leaves the current
//! selection alone and never produces an error. Callers invoke
//! [`apply_operator_inference`] explicitly after every phone edit.

use crate::types::{Operator, OrderDraft};

/// Map the first two digits of `phone` to a carrier.
///
/// `"01"` → Moov, `"05"` → MTN, `"07"` → Orange; anything else → `None`.
pub fn infer_operator(phone: &str) -> Option<Operator> {
    match phone.get(..2)? {
        "01" => Some(Operator::Moov),
        "05" => Some(Operator::Mtn),
        "07" => Some(Operator::Orange),
        _ => None,
    }
}

/// Overwrite `draft.operator` when the prefix is recognised.
/// Returns `true` if the operator changed.
pub fn apply_operator_inference(draft: &mut OrderDraft) -> bool {
    match infer_operator(&draft.phone_number) {
        Some(op) if op != draft.operator => {
            draft.operator = op;
            true
        }
        _ => false,
    }
}
