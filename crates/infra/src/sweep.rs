//! Pending-order sweep.
//!
//! A fixed-interval background task that flags orders stuck in a non-terminal
//! status past an age threshold. It only reads orders and pushes admin
//! notifications; sends are sequential with a fixed delay between them so the
//! downstream push collaborator is never flooded.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use mesa_orders::{Notifier, OrderStore, Severity, StoreError};

pub struct PendingOrderSweep {
    store: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    /// Time between sweep passes.
    pub interval: Duration,
    /// Orders whose last status change is older than this are flagged.
    pub max_age: chrono::Duration,
    /// Pause between consecutive admin notifications within one pass.
    pub send_delay: Duration,
}

impl PendingOrderSweep {
    pub fn new(
        store: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        max_age: chrono::Duration,
        send_delay: Duration,
    ) -> Self {
        Self {
            store,
            notifier,
            interval,
            max_age,
            send_delay,
        }
    }

    /// Run the sweep forever on its own task.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            // The first tick fires immediately; skip it so a freshly started
            // process does not re-notify on restart loops.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match self.sweep_once(Utc::now()).await {
                    Ok(0) => {}
                    Ok(flagged) => info!(flagged, "pending-order sweep flagged stuck orders"),
                    Err(e) => warn!("pending-order sweep failed: {e}"),
                }
            }
        })
    }

    /// One sweep pass. Returns how many orders were flagged.
    pub async fn sweep_once(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let threshold = now - self.max_age;
        let stuck = self.store.list_pending(Some(threshold)).await?;

        for order in &stuck {
            let age_minutes = (now - order.status_updated_at).num_minutes();
            self.notifier
                .notify_admins(
                    "Order needs attention",
                    &format!(
                        "order {} has been {} for {} minutes",
                        order.id,
                        order.status.as_str(),
                        age_minutes
                    ),
                    Severity::Warn,
                )
                .await;
            tokio::time::sleep(self.send_delay).await;
        }

        Ok(stuck.len())
    }
}
