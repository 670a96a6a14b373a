use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gateway::PaymentReceipt;
use crate::pricing::default_data_pack;

/// Whole FCFA units. Prices are never fractional.
pub type Fcfa = u64;

/// Target length of a recipient phone number (digits).
pub const PHONE_NUMBER_LEN: usize = 10;

/// Delivery delay announced on the confirmation screen.
pub const DELIVERY_ETA_MINUTES: u32 = 5;

// ---------------------------------------------------------------------------
// Operator / ServiceType
// ---------------------------------------------------------------------------

/// Mobile network carrier.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "MTN")]
    Mtn,
    Orange,
    Moov,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Mtn, Operator::Orange, Operator::Moov];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Mtn => "MTN",
            Operator::Orange => "Orange",
            Operator::Moov => "Moov",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mtn" => Ok(Operator::Mtn),
            "orange" => Ok(Operator::Orange),
            "moov" => Ok(Operator::Moov),
            _ => Err(ParseEnumError {
                kind: "operator",
                value: s.to_string(),
            }),
        }
    }
}

/// What the customer is buying.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    /// Airtime credit for a free amount (min 300 FCFA).
    #[default]
    Credit,
    /// A data pack from the pricing table.
    Data,
    /// The flat 24h unlimited-call bundle.
    Call,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [ServiceType::Credit, ServiceType::Data, ServiceType::Call];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Credit => "Credit",
            ServiceType::Data => "Data",
            ServiceType::Call => "Call",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(ServiceType::Credit),
            "data" => Ok(ServiceType::Data),
            "call" => Ok(ServiceType::Call),
            _ => Err(ParseEnumError {
                kind: "service type",
                value: s.to_string(),
            }),
        }
    }
}

/// Returned when a text value does not name a known [`Operator`] or [`ServiceType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

// ---------------------------------------------------------------------------
// OrderDraft
// ---------------------------------------------------------------------------

/// The order being configured during one session.
///
/// Exactly one of `amount`, `data_pack` or the flat call price determines the
/// final price, selected by `service_type`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub full_name: String,
    /// Digits only, at most [`PHONE_NUMBER_LEN`] long when edited through a session.
    pub phone_number: String,
    pub operator: Operator,
    pub service_type: ServiceType,
    /// Numeric text; only read when `service_type == Credit`.
    pub amount: String,
    /// Pricing-table label; only read when `service_type == Data`.
    pub data_pack: String,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone_number: String::new(),
            operator: Operator::default(),
            service_type: ServiceType::default(),
            amount: String::new(),
            data_pack: default_data_pack().label.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation result
// ---------------------------------------------------------------------------

/// Form fields that carry validation rules.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    PhoneNumber,
    Amount,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::PhoneNumber => "phoneNumber",
            Field::Amount => "amount",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-keyed, human-readable validation messages.
///
/// Always rebuilt wholesale by [`crate::validate`]; never merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, msg) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {msg}")?;
            first = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// WizardStage
// ---------------------------------------------------------------------------

/// Screens of the linear order wizard.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStage {
    #[default]
    Home,
    Order,
    Payment,
    Confirmation,
}

impl WizardStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStage::Home => "home",
            WizardStage::Order => "order",
            WizardStage::Payment => "payment",
            WizardStage::Confirmation => "confirmation",
        }
    }
}

impl fmt::Display for WizardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Submitted orders
// ---------------------------------------------------------------------------

/// Identifier assigned by an [`crate::OrderRepository`] when an order is saved.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub Uuid);

impl OrderId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A submitted order as written to the order log: draft fields + price + timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(flatten)]
    pub draft: OrderDraft,
    pub price: Fcfa,
    pub submitted_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn new(draft: OrderDraft, price: Fcfa, submitted_at: DateTime<Utc>) -> Self {
        Self {
            draft,
            price,
            submitted_at,
        }
    }
}

/// Delivery state shown after a successful payment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeliveryStatus {
    InDelivery { eta_minutes: u32 },
}

/// An order whose payment settled successfully.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedOrder {
    pub order_id: OrderId,
    pub record: OrderRecord,
    pub receipt: PaymentReceipt,
    pub delivery: DeliveryStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_draft_matches_fresh_form() {
        let d = OrderDraft::default();
        assert_eq!(d.operator, Operator::Mtn);
        assert_eq!(d.service_type, ServiceType::Credit);
        assert_eq!(d.data_pack, "220 Mo");
        assert!(d.full_name.is_empty());
        assert!(d.phone_number.is_empty());
        assert!(d.amount.is_empty());
    }

    #[test]
    fn enums_parse_case_insensitively() {
        assert_eq!("mtn".parse::<Operator>().unwrap(), Operator::Mtn);
        assert_eq!(" ORANGE ".parse::<Operator>().unwrap(), Operator::Orange);
        assert_eq!("Data".parse::<ServiceType>().unwrap(), ServiceType::Data);
        let err = "wave".parse::<Operator>().unwrap_err();
        assert_eq!(err.to_string(), "unknown operator 'wave'");
    }

    #[test]
    fn draft_serializes_with_camel_case_keys() {
        let d = OrderDraft {
            full_name: "Jean".to_string(),
            phone_number: "0712345678".to_string(),
            operator: Operator::Orange,
            ..OrderDraft::default()
        };
        let v = serde_json::to_value(&d).unwrap();
        assert_eq!(v["fullName"], "Jean");
        assert_eq!(v["phoneNumber"], "0712345678");
        assert_eq!(v["operator"], "Orange");
        assert_eq!(v["serviceType"], "Credit");
        assert_eq!(v["dataPack"], "220 Mo");
    }

    #[test]
    fn validation_errors_serialize_as_field_map() {
        let mut e = ValidationErrors::new();
        e.insert(Field::PhoneNumber, "bad");
        e.insert(Field::FullName, "missing");
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["fullName"], "missing");
        assert_eq!(v["phoneNumber"], "bad");
        assert_eq!(e.to_string(), "fullName: missing; phoneNumber: bad");
    }
}
