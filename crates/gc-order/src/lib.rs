//! gc-order
//!
//! Order Configuration Engine for the GoCredit top-up storefront.
//!
//! - Static pricing table (data packs + flat call bundle)
//! - Operator inference from the phone-number prefix
//! - Price calculation from the selected service
//! - Field-keyed order validation
//! - `OrderSession`: the four-stage wizard (Home → Order → Payment → Confirmation)
//!
//! Everything except the payment settle step is pure and synchronous.
//! Payment and persistence are reached only through the [`PaymentGateway`]
//! and [`OrderRepository`] traits; concrete implementations live in other
//! crates (`gc-payment-sim`, `gc-audit`).

mod gateway;
mod operator;
mod price;
mod pricing;
mod repository;
mod summary;
mod types;
mod validate;

pub mod session;

pub use gateway::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, SettlementPolicy};
pub use operator::{apply_operator_inference, infer_operator};
pub use price::{compute_price, PriceError};
pub use pricing::{
    data_packs, default_data_pack, find_data_pack, DataPack, CALL_BUNDLE_PRICE, DATA_PACKS,
};
pub use repository::{OrderRepository, RepositoryError};
pub use session::{OrderSession, SessionError};
pub use summary::{format_fcfa, OrderSummary};
pub use types::{
    ConfirmedOrder, DeliveryStatus, Fcfa, Field, Operator, OrderDraft, OrderId, OrderRecord,
    ParseEnumError, ServiceType, ValidationErrors, WizardStage, DELIVERY_ETA_MINUTES,
    PHONE_NUMBER_LEN,
};
pub use validate::{
    is_valid_phone_number, validate, AMOUNT_MESSAGE, FULL_NAME_MESSAGE, MIN_CREDIT_AMOUNT,
    PHONE_NUMBER_MESSAGE,
};
