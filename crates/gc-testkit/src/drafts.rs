use gc_order::{Operator, OrderDraft, OrderSession, ServiceType, SessionError};

fn base(service_type: ServiceType) -> OrderDraft {
    OrderDraft {
        full_name: "Awa Kone".to_string(),
        phone_number: "0712345678".to_string(),
        operator: Operator::Orange,
        service_type,
        ..OrderDraft::default()
    }
}

pub fn credit_order(amount: &str) -> OrderDraft {
    OrderDraft {
        amount: amount.to_string(),
        ..base(ServiceType::Credit)
    }
}

pub fn data_order(pack: &str) -> OrderDraft {
    OrderDraft {
        data_pack: pack.to_string(),
        ..base(ServiceType::Data)
    }
}

pub fn call_order() -> OrderDraft {
    base(ServiceType::Call)
}

/// Type `draft` into a session on the Order stage through the public setters.
///
/// The operator is selected after the phone number, so the draft's operator
/// wins over inference.
pub fn fill_draft(session: &mut OrderSession, draft: &OrderDraft) -> Result<(), SessionError> {
    session.set_full_name(draft.full_name.as_str())?;
    session.set_phone_number(&draft.phone_number)?;
    session.select_operator(draft.operator)?;
    session.select_service(draft.service_type)?;
    session.set_amount(draft.amount.as_str())?;
    session.select_data_pack(&draft.data_pack)?;
    Ok(())
}

/// Fresh session walked Home → Order → Payment with `draft`.
pub fn session_on_payment(draft: &OrderDraft) -> Result<OrderSession, SessionError> {
    let mut session = OrderSession::new();
    session.start_order()?;
    fill_draft(&mut session, draft)?;
    session.submit()?;
    Ok(session)
}
