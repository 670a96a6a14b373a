//! Recap shown on the payment and confirmation screens.

use serde::Serialize;

use crate::price::{compute_price, PriceError};
use crate::types::{Fcfa, Operator, OrderDraft, ServiceType};

/// Format a price the way the storefront prints it: `2 000 FCFA`.
pub fn format_fcfa(amount: Fcfa) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 5);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out.push_str(" FCFA");
    out
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub recipient: String,
    pub phone_number: String,
    pub operator: Operator,
    /// `"Credit"`, `"Call"`, or `"Data (<pack label>)"`.
    pub service: String,
    pub price: Fcfa,
    pub price_display: String,
}

impl OrderSummary {
    pub fn from_draft(draft: &OrderDraft) -> Result<Self, PriceError> {
        let price = compute_price(draft)?;
        let service = match draft.service_type {
            ServiceType::Data => format!("{} ({})", draft.service_type, draft.data_pack),
            other => other.to_string(),
        };
        Ok(Self {
            recipient: draft.full_name.trim().to_string(),
            phone_number: draft.phone_number.clone(),
            operator: draft.operator,
            service,
            price,
            price_display: format_fcfa(price),
        })
    }
}
