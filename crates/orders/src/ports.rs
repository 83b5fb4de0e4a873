//! Collaborator interfaces the order core depends on.
//!
//! Account/address CRUD, push delivery and the audit sink are separate
//! subsystems; the core only sees these seams. Implementations live in
//! `mesa-infra` and are injected once at process startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use mesa_core::{AddressId, DomainResult, OrderId, UserId};

use crate::order::Order;

/// Directory projection of a user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    /// Push-notification token, present only if the user registered a device.
    pub push_token: Option<String>,
}

/// Directory projection of a delivery address. Exposes the owning user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
}

/// User/Address Directory collaborator.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn user_by_id(&self, id: UserId) -> DomainResult<UserRecord>;
    async fn address_by_id(&self, id: AddressId) -> DomainResult<AddressRecord>;
}

/// Severity attached to admin notifications.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warn,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
        }
    }
}

/// Push-notification sender. Fire-and-forget: implementations log failures
/// and never surface them to the caller.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_admins(&self, title: &str, body: &str, severity: Severity);
    async fn notify_user(&self, push_token: &str, title: &str, body: &str);
}

/// One append-only audit record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub actor: UserId,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub previous: Option<String>,
    pub new: Option<String>,
}

/// Audit Log Writer collaborator. Failures are logged, not propagated.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError>;
}

/// Storage-layer failure. Translated to `DomainError` at the orchestration
/// boundary; driver details never reach HTTP responses.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage failure: {0}")]
    Backend(String),

    /// Unique-constraint rejection of a second open order for the same user.
    #[error("user already has an open order")]
    DuplicateOpenOrder,
}

/// Order Store collaborator over the `Order` aggregate.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;
    async fn update(&self, order: &Order) -> Result<(), StoreError>;
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;
    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;
    /// The user's open order (`delivery_date IS NULL`), if any.
    async fn find_open_for_user(&self, user_id: UserId) -> Result<Option<Order>, StoreError>;
    /// Open orders, optionally restricted to those whose last status change
    /// happened before `older_than` (used by the pending-order sweep).
    async fn list_pending(
        &self,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>, StoreError>;
}
