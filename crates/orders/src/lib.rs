//! `mesa-orders` — order lifecycle and status-workflow engine.
//!
//! The module split mirrors the shape of the system:
//! - `status`: delivery-type-specific status vocabularies (the state machine's states)
//! - `order`: the `Order` aggregate and its transition/edit-window rules
//! - `pricing`: catalog-snapshot pricing of line items and additional items
//! - `ports`: collaborator interfaces (catalog, directory, notifier, audit, store)
//! - `service`: the lifecycle orchestrator (validation → pricing → persistence → side effects)

pub mod order;
pub mod ports;
pub mod pricing;
pub mod service;
pub mod status;

pub use order::{AdditionalItem, LineItem, Order, StatusChange};
pub use ports::{
    AuditEntry, AuditLog, Notifier, OrderStore, Severity, StoreError, UserDirectory,
};
pub use pricing::{
    AdditionalItemRequest, CatalogEntry, CatalogLookup, LineItemRequest, PricedItems,
};
pub use service::{CreateOrderRequest, OrderService, UpdateOrderRequest};
pub use status::{DeliveryStatus, DeliveryType, OrderStatus, PaymentMethod, PickupStatus};
