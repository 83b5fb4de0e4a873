//! Collaborator wiring.
//!
//! `build_services` selects between the dev wiring (in-memory stores, logging
//! notifier/audit) and the persistent wiring (`USE_PERSISTENT_STORES=true`,
//! Postgres order store) at startup. Catalog and directory currently stay
//! in-memory in both modes — their systems of record live behind other
//! services and can be swapped to remote-backed lookups later.

use std::sync::Arc;

use sqlx::PgPool;

use mesa_infra::{
    InMemoryAuditLog, InMemoryCatalog, InMemoryDirectory, InMemoryOrderStore, LoggingAuditLog,
    LoggingNotifier, PostgresOrderStore, RecordingNotifier,
};
use mesa_orders::{Notifier, OrderService, OrderStore};

pub struct AppServices {
    pub orders: OrderService,
    /// Shared handles for background plumbing (pending-order sweep).
    pub store: Arc<dyn OrderStore>,
    pub notifier: Arc<dyn Notifier>,
}

/// Seeded-collaborator handles for the in-memory wiring (dev/test).
pub struct InMemoryHandles {
    pub store: Arc<InMemoryOrderStore>,
    pub catalog: Arc<InMemoryCatalog>,
    pub directory: Arc<InMemoryDirectory>,
    pub notifier: Arc<RecordingNotifier>,
    pub audit: Arc<InMemoryAuditLog>,
}

pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        return build_persistent_services().await;
    }

    build_dev_services()
}

/// Dev wiring: in-memory stores, but notifications and audit records go to
/// the log instead of piling up in recording buffers.
fn build_dev_services() -> AppServices {
    let store = Arc::new(InMemoryOrderStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let notifier: Arc<dyn Notifier> = Arc::new(LoggingNotifier::new());
    let audit = Arc::new(LoggingAuditLog::new());

    let store: Arc<dyn OrderStore> = store;

    let orders = OrderService::new(
        store.clone(),
        catalog,
        directory,
        notifier.clone(),
        audit,
    );

    AppServices {
        orders,
        store,
        notifier,
    }
}

/// In-memory wiring with recording collaborators. Test callers seed the
/// catalog/directory through the returned handles and inspect notifications.
pub fn build_in_memory_services() -> (AppServices, InMemoryHandles) {
    let store = Arc::new(InMemoryOrderStore::new());
    let catalog = Arc::new(InMemoryCatalog::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let audit = Arc::new(InMemoryAuditLog::new());

    let orders = OrderService::new(
        store.clone(),
        catalog.clone(),
        directory.clone(),
        notifier.clone(),
        audit.clone(),
    );

    let services = AppServices {
        orders,
        store: store.clone(),
        notifier: notifier.clone(),
    };
    let handles = InMemoryHandles {
        store,
        catalog,
        directory,
        notifier,
        audit,
    };
    (services, handles)
}

async fn build_persistent_services() -> AppServices {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres");

    let store = Arc::new(PostgresOrderStore::new(pool));
    store
        .ensure_schema()
        .await
        .expect("Failed to apply order schema");

    // Catalog/directory are still in-memory read models here (can be swapped
    // to remote-backed lookups later).
    let catalog = Arc::new(InMemoryCatalog::new());
    let directory = Arc::new(InMemoryDirectory::new());
    let notifier = Arc::new(LoggingNotifier::new());
    let audit = Arc::new(LoggingAuditLog::new());

    let store: Arc<dyn OrderStore> = store;
    let notifier: Arc<dyn Notifier> = notifier;

    let orders = OrderService::new(
        store.clone(),
        catalog,
        directory,
        notifier.clone(),
        audit,
    );

    AppServices {
        orders,
        store,
        notifier,
    }
}
