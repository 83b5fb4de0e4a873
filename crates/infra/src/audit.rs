//! Audit log writer implementations.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;

use mesa_orders::{AuditEntry, AuditLog, StoreError};

/// Emits audit records as structured log lines (dev wiring).
#[derive(Debug, Default)]
pub struct LoggingAuditLog;

impl LoggingAuditLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AuditLog for LoggingAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
        info!(
            actor = %entry.actor,
            action = %entry.action,
            entity_type = %entry.entity_type,
            entity_id = %entry.entity_id,
            previous = entry.previous.as_deref().unwrap_or("-"),
            new = entry.new.as_deref().unwrap_or("-"),
            "audit"
        );
        Ok(())
    }
}

/// Collects audit records in memory for assertions in tests.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.entries.lock().unwrap().push(entry);
        Ok(())
    }
}
