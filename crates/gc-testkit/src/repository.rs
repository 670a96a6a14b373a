use std::sync::Mutex;

use gc_order::{OrderId, OrderRecord, OrderRepository, RepositoryError};
use uuid::Uuid;

/// Keeps saved orders in memory. Ids are `Uuid::from_u128(1)`, `(2)`, ...
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<Vec<(OrderId, OrderRecord)>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> Vec<(OrderId, OrderRecord)> {
        self.orders.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OrderRepository for InMemoryOrderRepository {
    fn save(&self, order: &OrderRecord) -> Result<OrderId, RepositoryError> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|_| RepositoryError::Write("in-memory repository poisoned".to_string()))?;
        let id = OrderId(Uuid::from_u128(orders.len() as u128 + 1));
        orders.push((id, order.clone()));
        Ok(id)
    }
}

/// Every save fails with the given message.
pub struct FailingRepository {
    message: String,
}

impl FailingRepository {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl OrderRepository for FailingRepository {
    fn save(&self, _order: &OrderRecord) -> Result<OrderId, RepositoryError> {
        Err(RepositoryError::Write(self.message.clone()))
    }
}
