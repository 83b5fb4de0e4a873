//! `mesa-infra` — adapters behind the order core's collaborator seams.
//!
//! In-memory implementations back dev/test wiring; the Postgres order store
//! backs the persistent mode. The pending-order sweep lives here because it
//! is pure plumbing over the store + notifier seams.

pub mod audit;
pub mod memory;
pub mod notify;
pub mod postgres;
pub mod sweep;

pub use audit::{InMemoryAuditLog, LoggingAuditLog};
pub use memory::{InMemoryCatalog, InMemoryDirectory, InMemoryOrderStore};
pub use notify::{LoggingNotifier, RecordingNotifier};
pub use postgres::PostgresOrderStore;
pub use sweep::PendingOrderSweep;
