//! In-memory collaborators (dev/test wiring).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use mesa_core::{AdditionalItemId, AddressId, DomainError, DomainResult, Money, OrderId, ProductId, UserId};
use mesa_orders::ports::{AddressRecord, UserRecord};
use mesa_orders::{CatalogEntry, CatalogLookup, Order, OrderStore, StoreError, UserDirectory};

/// Mutex-map order store. The same "one open order per user" uniqueness the
/// Postgres store enforces with a partial index is checked on insert here so
/// both backends present the same contract.
#[derive(Default)]
pub struct InMemoryOrderStore {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().unwrap();
        if orders
            .values()
            .any(|o| o.user_id == order.user_id && o.is_open())
        {
            return Err(StoreError::DuplicateOpenOrder);
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), StoreError> {
        let mut orders = self.orders.lock().unwrap();
        if !orders.contains_key(&order.id) {
            return Err(StoreError::Backend(format!(
                "order {} vanished during update",
                order.id
            )));
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let mut all: Vec<Order> = self.orders.lock().unwrap().values().cloned().collect();
        all.sort_by_key(|o| o.created_at);
        Ok(all)
    }

    async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let mut mine: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        mine.sort_by_key(|o| o.created_at);
        Ok(mine)
    }

    async fn find_open_for_user(&self, user_id: UserId) -> Result<Option<Order>, StoreError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.user_id == user_id && o.is_open())
            .cloned())
    }

    async fn list_pending(
        &self,
        older_than: Option<DateTime<Utc>>,
    ) -> Result<Vec<Order>, StoreError> {
        let mut pending: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .values()
            .filter(|o| o.is_open())
            .filter(|o| older_than.map_or(true, |t| o.status_updated_at < t))
            .cloned()
            .collect();
        pending.sort_by_key(|o| o.status_updated_at);
        Ok(pending)
    }
}

/// In-memory catalog lookup, seedable for dev/test.
#[derive(Default)]
pub struct InMemoryCatalog {
    products: Mutex<HashMap<ProductId, CatalogEntry>>,
    additionals: Mutex<HashMap<AdditionalItemId, CatalogEntry>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_product(&self, id: ProductId, description: impl Into<String>, price: Money) {
        self.products.lock().unwrap().insert(
            id,
            CatalogEntry {
                description: description.into(),
                price,
            },
        );
    }

    pub fn add_additional(&self, id: AdditionalItemId, description: impl Into<String>, price: Money) {
        self.additionals.lock().unwrap().insert(
            id,
            CatalogEntry {
                description: description.into(),
                price,
            },
        );
    }
}

#[async_trait]
impl CatalogLookup for InMemoryCatalog {
    async fn product_by_id(&self, id: ProductId) -> DomainResult<CatalogEntry> {
        self.products
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("product {id}")))
    }

    async fn additional_by_id(&self, id: AdditionalItemId) -> DomainResult<CatalogEntry> {
        self.additionals
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("additional item {id}")))
    }
}

/// In-memory user/address directory, seedable for dev/test.
#[derive(Default)]
pub struct InMemoryDirectory {
    users: Mutex<HashMap<UserId, UserRecord>>,
    addresses: Mutex<HashMap<AddressId, AddressRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, id: UserId, name: impl Into<String>, push_token: Option<String>) {
        self.users.lock().unwrap().insert(
            id,
            UserRecord {
                id,
                name: name.into(),
                push_token,
            },
        );
    }

    pub fn add_address(&self, id: AddressId, user_id: UserId, label: impl Into<String>) {
        self.addresses.lock().unwrap().insert(
            id,
            AddressRecord {
                id,
                user_id,
                label: label.into(),
            },
        );
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn user_by_id(&self, id: UserId) -> DomainResult<UserRecord> {
        self.users
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("user {id}")))
    }

    async fn address_by_id(&self, id: AddressId) -> DomainResult<AddressRecord> {
        self.addresses
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("address {id}")))
    }
}
