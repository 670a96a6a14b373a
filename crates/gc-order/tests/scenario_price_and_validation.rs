//! Scenario: price calculation and order validation
//!
//! # Invariants under test
//!
//! 1. `compute_price` is pure: same draft, same price; the name never matters.
//! 2. `validate` is idempotent.
//! 3. A draft that validates has a `^0[157]\d{8}$` phone number and, for
//!    credit orders, a whole-number amount of at least 300.
//! 4. The worked examples: credit 300, invalid credit 100, data "2 Go",
//!    call bundle.

use gc_order::{
    compute_price, is_valid_phone_number, validate, Field, OrderDraft, ServiceType, AMOUNT_MESSAGE,
    CALL_BUNDLE_PRICE, DATA_PACKS, FULL_NAME_MESSAGE, MIN_CREDIT_AMOUNT,
};

fn draft(name: &str, phone: &str, service: ServiceType, amount: &str) -> OrderDraft {
    OrderDraft {
        full_name: name.to_string(),
        phone_number: phone.to_string(),
        service_type: service,
        amount: amount.to_string(),
        ..OrderDraft::default()
    }
}

// ---------------------------------------------------------------------------
// Worked examples
// ---------------------------------------------------------------------------

#[test]
fn credit_300_is_valid_and_costs_300() {
    let d = draft("Jean", "0712345678", ServiceType::Credit, "300");
    assert!(validate(&d).is_empty());
    assert_eq!(compute_price(&d), Ok(300));
}

#[test]
fn empty_name_and_low_amount_are_both_reported() {
    let d = draft("", "0512345678", ServiceType::Credit, "100");
    let errors = validate(&d);

    assert_eq!(errors.get(Field::FullName), Some(FULL_NAME_MESSAGE));
    assert!(errors
        .get(Field::Amount)
        .is_some_and(|m| m.contains("minimum 300")));
    assert_eq!(errors.get(Field::Amount), Some(AMOUNT_MESSAGE));
    assert!(!errors.contains(Field::PhoneNumber));
    assert_eq!(errors.len(), 2);
}

#[test]
fn two_go_pack_costs_2000() {
    let d = OrderDraft {
        service_type: ServiceType::Data,
        data_pack: "2 Go".to_string(),
        ..OrderDraft::default()
    };
    assert_eq!(compute_price(&d), Ok(2_000));
}

#[test]
fn call_bundle_ignores_amount_and_pack() {
    for (amount, pack) in [("", "220 Mo"), ("99999", "10 Go"), ("abc", "not a pack")] {
        let d = OrderDraft {
            service_type: ServiceType::Call,
            amount: amount.to_string(),
            data_pack: pack.to_string(),
            ..OrderDraft::default()
        };
        assert_eq!(compute_price(&d), Ok(CALL_BUNDLE_PRICE));
        assert_eq!(compute_price(&d), Ok(500));
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn sample_drafts() -> Vec<OrderDraft> {
    let mut out = Vec::new();
    let phones = ["", "07", "0712345678", "0299999999", "0512345678", "01234"];
    let amounts = ["", "0", "299", "300", "1500", "12.5", "-300", " 450 "];
    for phone in phones {
        for amount in amounts {
            for service in ServiceType::ALL {
                out.push(draft("Awa", phone, service, amount));
                out.push(draft("  ", phone, service, amount));
            }
        }
    }
    for pack in DATA_PACKS {
        out.push(OrderDraft {
            full_name: "Koffi".to_string(),
            phone_number: "0112345678".to_string(),
            service_type: ServiceType::Data,
            data_pack: pack.label.to_string(),
            ..OrderDraft::default()
        });
    }
    out
}

#[test]
fn price_is_deterministic_and_ignores_name() {
    for d in sample_drafts() {
        let a = compute_price(&d);
        let b = compute_price(&d.clone());
        assert_eq!(a, b);

        let renamed = OrderDraft {
            full_name: "Someone Else".to_string(),
            ..d.clone()
        };
        assert_eq!(compute_price(&renamed), a, "name changed price for {d:?}");
    }
}

#[test]
fn validation_is_idempotent() {
    for d in sample_drafts() {
        assert_eq!(validate(&d), validate(&d));
    }
}

#[test]
fn valid_drafts_satisfy_format_and_minimum() {
    let mut seen_valid = 0;
    for d in sample_drafts() {
        if !validate(&d).is_empty() {
            continue;
        }
        seen_valid += 1;
        assert!(is_valid_phone_number(&d.phone_number));
        assert!(d.phone_number.starts_with('0'));
        assert!(matches!(&d.phone_number[1..2], "1" | "5" | "7"));
        assert!(!d.full_name.trim().is_empty());
        if d.service_type == ServiceType::Credit {
            let amount: u64 = d.amount.trim().parse().expect("valid credit has numeric amount");
            assert!(amount >= MIN_CREDIT_AMOUNT);
        }
    }
    assert!(seen_valid > 0, "sample set should contain valid drafts");
}

#[test]
fn every_pack_prices_from_the_table() {
    for pack in DATA_PACKS {
        let d = OrderDraft {
            service_type: ServiceType::Data,
            data_pack: pack.label.to_string(),
            ..OrderDraft::default()
        };
        assert_eq!(compute_price(&d), Ok(pack.price), "{}", pack.label);
    }
}
