use crate::price::parse_amount;
use crate::types::{Fcfa, Field, OrderDraft, ServiceType, ValidationErrors, PHONE_NUMBER_LEN};

/// Smallest credit top-up accepted.
pub const MIN_CREDIT_AMOUNT: Fcfa = 300;

pub const FULL_NAME_MESSAGE: &str = "name required";
pub const PHONE_NUMBER_MESSAGE: &str = "invalid number, expected format 0XXXXXXXXX";
pub const AMOUNT_MESSAGE: &str = "minimum 300 FCFA";

/// `^0[157]\d{8}$`
pub fn is_valid_phone_number(phone: &str) -> bool {
    let b = phone.as_bytes();
    b.len() == PHONE_NUMBER_LEN
        && b[0] == b'0'
        && matches!(b[1], b'1' | b'5' | b'7')
        && b[2..].iter().all(u8::is_ascii_digit)
}

/// Check the draft and return every violated rule, keyed by field.
///
/// Stateless: the result depends only on `draft`, so repeated calls agree.
/// An empty result means the order may advance to payment.
pub fn validate(draft: &OrderDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if draft.full_name.trim().is_empty() {
        errors.insert(Field::FullName, FULL_NAME_MESSAGE);
    }

    if !is_valid_phone_number(&draft.phone_number) {
        errors.insert(Field::PhoneNumber, PHONE_NUMBER_MESSAGE);
    }

    // Data and Call prices come from fixed tables; only free amounts are checked.
    if draft.service_type == ServiceType::Credit {
        let ok = parse_amount(&draft.amount).is_some_and(|a| a >= MIN_CREDIT_AMOUNT);
        if !ok {
            errors.insert(Field::Amount, AMOUNT_MESSAGE);
        }
    }

    errors
}
