use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use gc_order::{OrderId, OrderRecord, OrderRepository, RepositoryError};
use tracing::info;

use crate::{AuditEvent, AuditWriter};

pub const ORDERS_TOPIC: &str = "orders";
pub const ORDER_SUBMITTED: &str = "ORDER_SUBMITTED";

/// [`OrderRepository`] backed by the JSONL order log.
///
/// Each saved order becomes one `ORDER_SUBMITTED` event whose `event_id` is
/// the returned [`OrderId`].
pub struct AuditOrderRepository {
    writer: Mutex<AuditWriter>,
}

impl AuditOrderRepository {
    /// Append to `path`, continuing any chain already in the file.
    pub fn open(path: impl AsRef<Path>, hash_chain: bool) -> Result<Self> {
        let writer = AuditWriter::resume(path, hash_chain)?;
        Ok(Self::from_writer(writer))
    }

    pub fn from_writer(writer: AuditWriter) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

impl OrderRepository for AuditOrderRepository {
    fn save(&self, order: &OrderRecord) -> Result<OrderId, RepositoryError> {
        let payload = serde_json::to_value(order)
            .map_err(|e| RepositoryError::Write(format!("serialize order: {e}")))?;

        let mut w = self
            .writer
            .lock()
            .map_err(|_| RepositoryError::Write("order log writer poisoned".to_string()))?;
        let ev = w
            .append(ORDERS_TOPIC, ORDER_SUBMITTED, payload)
            .map_err(|e| RepositoryError::Write(format!("{e:#}")))?;

        info!(event_id = %ev.event_id, seq = ev.seq, path = ?w.path(), "order written to log");
        Ok(OrderId(ev.event_id))
    }
}

/// Parse every `ORDER_SUBMITTED` event in a log back into `(OrderId, OrderRecord)`.
/// Events of other types are skipped.
pub fn read_order_records(content: &str) -> Result<Vec<(OrderId, OrderRecord)>> {
    let mut out = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let ev: AuditEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("parse audit event at line {}", i + 1))?;
        if ev.event_type != ORDER_SUBMITTED {
            continue;
        }
        let record: OrderRecord = serde_json::from_value(ev.payload)
            .with_context(|| format!("parse order record at line {}", i + 1))?;
        out.push((OrderId(ev.event_id), record));
    }
    Ok(out)
}
