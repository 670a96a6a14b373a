use std::fmt;

use crate::types::{OrderId, OrderRecord};

/// Storage failure while recording a submitted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The backing store could not be written.
    Write(String),
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::Write(msg) => write!(f, "order repository write failed: {msg}"),
        }
    }
}

impl std::error::Error for RepositoryError {}

/// Persistence seam for submitted orders.
///
/// `save` takes `&self`; implementations that mutate use interior locking.
pub trait OrderRepository: Send + Sync {
    fn save(&self, order: &OrderRecord) -> Result<OrderId, RepositoryError>;
}
