//! Test doubles and fixtures for driving `OrderSession` end to end.
//!
//! No randomness: in-memory order ids are sequential and scripted gateway
//! receipts are derived from the order id.

mod drafts;
mod gateways;
mod repository;

pub use drafts::{call_order, credit_order, data_order, fill_draft, session_on_payment};
pub use gateways::{receipt_for, ScriptedGateway, StallingGateway, Step};
pub use repository::{FailingRepository, InMemoryOrderRepository};
