//! The `Order` aggregate.
//!
//! Identity, owner, delivery type and payment method are fixed at creation.
//! Status moves through the delivery-type vocabulary via `transition`; item
//! collections and totals change via `apply_repricing` while the order is
//! still editable.

use chrono::{DateTime, Duration, Utc};

use mesa_core::{AddressId, DomainError, DomainResult, Money, OrderId, UserId};

use crate::pricing::PricedItems;
use crate::status::{DeliveryType, OrderStatus, PaymentMethod};

/// How long after entering PREPARING an order may still be updated.
pub const EDIT_WINDOW_MINUTES: i64 = 10;

/// Line item snapshot, frozen from the catalog at pricing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub description: String,
    pub unit_price: Money,
    pub quantity: u32,
    pub comment: Option<String>,
}

/// Additional-item snapshot (extras, sides), frozen at pricing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdditionalItem {
    pub description: String,
    pub price: Money,
}

/// Outcome of a status transition, used for audit and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub previous: OrderStatus,
    pub current: OrderStatus,
}

/// Root aggregate. An order is "open" while `delivery_date` is null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
    pub address_id: Option<AddressId>,
    pub items: Vec<LineItem>,
    pub additional_items: Vec<AdditionalItem>,
    pub total_additional: Money,
    pub total: Money,
    pub delivery_date: Option<DateTime<Utc>>,
    pub status_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Create a new order in the RECEIVED-equivalent of its vocabulary.
    pub fn place(
        id: OrderId,
        user_id: UserId,
        delivery_type: DeliveryType,
        payment_method: PaymentMethod,
        address_id: Option<AddressId>,
        priced: PricedItems,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            delivery_type,
            payment_method,
            status: OrderStatus::initial(delivery_type),
            address_id,
            items: priced.items,
            additional_items: priced.additional_items,
            total_additional: priced.total_additional,
            total: priced.total,
            delivery_date: None,
            status_updated_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.delivery_date.is_none()
    }

    /// Move to the status addressed by `index` in this order's vocabulary.
    ///
    /// Terminal orders are immutable. Membership is the only ordering rule:
    /// non-terminal statuses may be revisited or skipped.
    pub fn transition(&mut self, index: u8, now: DateTime<Utc>) -> DomainResult<StatusChange> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "order is {} and can no longer change status",
                self.status.as_str()
            )));
        }

        let requested = OrderStatus::from_index(self.delivery_type, index).ok_or_else(|| {
            DomainError::validation(format!(
                "status index {} is not in the {} vocabulary",
                index,
                self.delivery_type.as_str()
            ))
        })?;

        let previous = self.status;
        let pending = !requested.is_terminal();

        self.status = requested;
        self.delivery_date = if pending { None } else { Some(now) };
        self.status_updated_at = now;
        self.updated_at = now;

        Ok(StatusChange {
            previous,
            current: requested,
        })
    }

    /// Reject edits on terminal orders and on PREPARING orders whose
    /// 10-minute edit window has elapsed. Exactly at the boundary still passes.
    pub fn ensure_editable(&self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "order is {} and can no longer be updated",
                self.status.as_str()
            )));
        }

        if self.status.is_preparing()
            && now - self.status_updated_at > Duration::minutes(EDIT_WINDOW_MINUTES)
        {
            return Err(DomainError::invalid_state(
                "order has been in preparation for more than 10 minutes and can no longer be updated",
            ));
        }

        Ok(())
    }

    /// Apply a fresh pricing pass from an update request.
    ///
    /// The newly priced snapshots are APPENDED to the persisted collections
    /// while the totals are overwritten with the request's totals. This
    /// mirrors the observed behavior of the system being reimplemented
    /// (an always-create item sub-operation inside update); a wholesale
    /// replace would assign instead of extend here.
    pub fn apply_repricing(&mut self, priced: PricedItems, now: DateTime<Utc>) {
        self.items.extend(priced.items);
        self.additional_items.extend(priced.additional_items);
        self.total_additional = priced.total_additional;
        self.total = priced.total;
        self.updated_at = now;
    }
}
