//! Order lifecycle orchestrator.
//!
//! Coordinates validation → pricing → persistence → side effects. All domain
//! failures abort before any write; notification/audit failures after a
//! successful write are logged and never fail the request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use mesa_core::{AddressId, DomainError, DomainResult, OrderId, UserId};

use crate::order::Order;
use crate::ports::{AuditEntry, AuditLog, Notifier, OrderStore, Severity, StoreError, UserDirectory};
use crate::pricing::{price_items, AdditionalItemRequest, CatalogLookup, LineItemRequest};
use crate::status::{DeliveryType, PaymentMethod};

/// Validated order-creation command (enums already parsed at the HTTP boundary).
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub delivery_type: DeliveryType,
    pub payment_method: PaymentMethod,
    pub address_id: Option<AddressId>,
    pub items: Vec<LineItemRequest>,
    pub additional_items: Vec<AdditionalItemRequest>,
}

/// Order update command: a fresh item list to price and apply.
/// Delivery type, payment method and address are immutable after creation.
#[derive(Debug, Clone)]
pub struct UpdateOrderRequest {
    pub items: Vec<LineItemRequest>,
    pub additional_items: Vec<AdditionalItemRequest>,
}

pub struct OrderService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogLookup>,
    directory: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
    audit: Arc<dyn AuditLog>,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogLookup>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self {
            store,
            catalog,
            directory,
            notifier,
            audit,
        }
    }

    /// Create an order for `user_id`.
    pub async fn create(&self, user_id: UserId, request: CreateOrderRequest) -> DomainResult<Order> {
        let address_id = self.validate_address(user_id, &request).await?;

        let user = self.directory.user_by_id(user_id).await?;

        if let Some(open) = self
            .store
            .find_open_for_user(user_id)
            .await
            .map_err(store_error)?
        {
            return Err(DomainError::conflict(format!(
                "user already has an open order ({})",
                open.id
            )));
        }

        let priced = price_items(
            self.catalog.as_ref(),
            &request.items,
            &request.additional_items,
        )
        .await?;

        let now = Utc::now();
        let order = Order::place(
            OrderId::new(),
            user_id,
            request.delivery_type,
            request.payment_method,
            address_id,
            priced,
            now,
        );

        self.store.insert(&order).await.map_err(store_error)?;

        // Side effects only after the write committed.
        if let Some(token) = user.push_token.as_deref() {
            self.notifier
                .notify_user(
                    token,
                    "Order received",
                    "We received your order and will start preparing it soon.",
                )
                .await;
        }
        self.notifier
            .notify_admins(
                "New order",
                &format!("order {} placed by {}", order.id, user.name),
                Severity::Info,
            )
            .await;

        Ok(order)
    }

    /// Update an open order: re-price the request and apply it.
    pub async fn update(
        &self,
        caller: UserId,
        order_id: OrderId,
        request: UpdateOrderRequest,
    ) -> DomainResult<Order> {
        let mut order = self.load(order_id).await?;

        if order.user_id != caller {
            return Err(DomainError::forbidden("order belongs to another user"));
        }

        let now = Utc::now();
        order.ensure_editable(now)?;

        // Owner must still resolve in the directory, as at create time.
        self.directory.user_by_id(caller).await?;

        let priced = price_items(
            self.catalog.as_ref(),
            &request.items,
            &request.additional_items,
        )
        .await?;

        order.apply_repricing(priced, now);
        self.store.update(&order).await.map_err(store_error)?;

        Ok(order)
    }

    /// Execute a status transition, then dispatch notifications and the audit record.
    pub async fn transition_status(
        &self,
        actor: UserId,
        order_id: OrderId,
        status_index: u8,
    ) -> DomainResult<Order> {
        let mut order = self.load(order_id).await?;

        let change = order.transition(status_index, Utc::now())?;
        self.store.update(&order).await.map_err(store_error)?;

        self.notifier
            .notify_admins(
                "Order status updated",
                &format!("order {} is now {}", order.id, change.current.as_str()),
                Severity::Info,
            )
            .await;

        match self.directory.user_by_id(order.user_id).await {
            Ok(user) => {
                if let Some(token) = user.push_token.as_deref() {
                    self.notifier
                        .notify_user(token, "Order update", change.current.customer_message())
                        .await;
                }
            }
            Err(e) => warn!(order_id = %order.id, "owner lookup failed after transition: {e}"),
        }

        let entry = AuditEntry {
            actor,
            action: "order.status_change".to_string(),
            entity_type: "order".to_string(),
            entity_id: order.id.to_string(),
            previous: Some(change.previous.as_str().to_string()),
            new: Some(change.current.as_str().to_string()),
        };
        if let Err(e) = self.audit.record(entry).await {
            warn!(order_id = %order.id, "audit record failed: {e}");
        }

        Ok(order)
    }

    pub async fn get(&self, order_id: OrderId) -> DomainResult<Order> {
        self.load(order_id).await
    }

    pub async fn list_all(&self) -> DomainResult<Vec<Order>> {
        self.store.list_all().await.map_err(store_error)
    }

    pub async fn list_for_user(&self, user_id: UserId) -> DomainResult<Vec<Order>> {
        self.store.list_for_user(user_id).await.map_err(store_error)
    }

    pub async fn list_pending(
        &self,
        older_than: Option<DateTime<Utc>>,
    ) -> DomainResult<Vec<Order>> {
        self.store.list_pending(older_than).await.map_err(store_error)
    }

    async fn load(&self, order_id: OrderId) -> DomainResult<Order> {
        self.store
            .find_by_id(order_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| DomainError::not_found(format!("order {order_id}")))
    }

    /// Address is required iff the order is DELIVERY, and must belong to the
    /// ordering user. PICKUP orders never carry one.
    async fn validate_address(
        &self,
        user_id: UserId,
        request: &CreateOrderRequest,
    ) -> DomainResult<Option<AddressId>> {
        match request.delivery_type {
            DeliveryType::Pickup => Ok(None),
            DeliveryType::Delivery => {
                let address_id = request.address_id.ok_or_else(|| {
                    DomainError::validation("delivery orders require an address")
                })?;
                let address = self.directory.address_by_id(address_id).await?;
                if address.user_id != user_id {
                    return Err(DomainError::validation(
                        "address does not belong to the ordering user",
                    ));
                }
                Ok(Some(address_id))
            }
        }
    }
}

fn store_error(e: StoreError) -> DomainError {
    match e {
        StoreError::DuplicateOpenOrder => {
            DomainError::conflict("user already has an open order")
        }
        StoreError::Backend(detail) => {
            warn!("order store failure: {detail}");
            DomainError::internal("the order could not be saved")
        }
    }
}
