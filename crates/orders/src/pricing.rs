//! Pricing engine.
//!
//! Pure computation over catalog reads: each requested item is snapshotted
//! (description + price frozen at call time) so later catalog changes never
//! retroactively affect stored orders. All arithmetic stays in integer minor
//! units (`Money`).

use async_trait::async_trait;

use mesa_core::{AdditionalItemId, DomainError, DomainResult, Money, ProductId};

use crate::order::{AdditionalItem, LineItem};

/// Catalog projection of a product or additional item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub description: String,
    pub price: Money,
}

/// Catalog Lookup collaborator (product/additional-item CRUD lives elsewhere).
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn product_by_id(&self, id: ProductId) -> DomainResult<CatalogEntry>;
    async fn additional_by_id(&self, id: AdditionalItemId) -> DomainResult<CatalogEntry>;
}

/// One requested order line, referencing the catalog by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub comment: Option<String>,
}

/// One requested additional item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdditionalItemRequest {
    pub additional_id: AdditionalItemId,
}

/// Snapshots plus totals produced by a pricing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedItems {
    pub items: Vec<LineItem>,
    pub additional_items: Vec<AdditionalItem>,
    pub total_additional: Money,
    pub total: Money,
}

/// Compute totals from already-snapshotted items.
///
/// Returns `(total_additional, total)` where
/// `total = total_additional + Σ(line price × quantity)`.
pub fn compute_totals(items: &[LineItem], additional_items: &[AdditionalItem]) -> (Money, Money) {
    let total_additional: Money = additional_items.iter().map(|a| a.price).sum();
    let lines: Money = items.iter().map(|i| i.unit_price.times(i.quantity)).sum();
    (total_additional, total_additional + lines)
}

/// Snapshot the requested items from the catalog and compute totals.
pub async fn price_items(
    catalog: &dyn CatalogLookup,
    items: &[LineItemRequest],
    additional_items: &[AdditionalItemRequest],
) -> DomainResult<PricedItems> {
    if items.is_empty() {
        return Err(DomainError::validation("order must have at least one item"));
    }

    let mut snapshots = Vec::with_capacity(items.len());
    for request in items {
        if request.quantity == 0 {
            return Err(DomainError::validation("item quantity must be positive"));
        }
        let entry = catalog.product_by_id(request.product_id).await?;
        snapshots.push(LineItem {
            description: entry.description,
            unit_price: entry.price,
            quantity: request.quantity,
            comment: request.comment.clone(),
        });
    }

    let mut additional_snapshots = Vec::with_capacity(additional_items.len());
    for request in additional_items {
        let entry = catalog.additional_by_id(request.additional_id).await?;
        additional_snapshots.push(AdditionalItem {
            description: entry.description,
            price: entry.price,
        });
    }

    let (total_additional, total) = compute_totals(&snapshots, &additional_snapshots);
    Ok(PricedItems {
        items: snapshots,
        additional_items: additional_snapshots,
        total_additional,
        total,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    struct FixtureCatalog {
        products: HashMap<ProductId, CatalogEntry>,
        additionals: HashMap<AdditionalItemId, CatalogEntry>,
    }

    #[async_trait]
    impl CatalogLookup for FixtureCatalog {
        async fn product_by_id(&self, id: ProductId) -> DomainResult<CatalogEntry> {
            self.products
                .get(&id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("product {id}")))
        }

        async fn additional_by_id(&self, id: AdditionalItemId) -> DomainResult<CatalogEntry> {
            self.additionals
                .get(&id)
                .cloned()
                .ok_or_else(|| DomainError::not_found(format!("additional item {id}")))
        }
    }

    fn catalog_with(price_cents: i64) -> (FixtureCatalog, ProductId, AdditionalItemId) {
        let product_id = ProductId::new();
        let additional_id = AdditionalItemId::new();
        let mut products = HashMap::new();
        products.insert(
            product_id,
            CatalogEntry {
                description: "Margherita".to_string(),
                price: Money::from_cents(price_cents),
            },
        );
        let mut additionals = HashMap::new();
        additionals.insert(
            additional_id,
            CatalogEntry {
                description: "Extra cheese".to_string(),
                price: Money::from_cents(300),
            },
        );
        (
            FixtureCatalog {
                products,
                additionals,
            },
            product_id,
            additional_id,
        )
    }

    #[tokio::test]
    async fn snapshots_come_from_the_catalog_not_the_request() {
        let (catalog, product_id, additional_id) = catalog_with(1000);

        let priced = price_items(
            &catalog,
            &[LineItemRequest {
                product_id,
                quantity: 2,
                comment: Some("no basil".to_string()),
            }],
            &[AdditionalItemRequest { additional_id }],
        )
        .await
        .unwrap();

        assert_eq!(priced.items[0].description, "Margherita");
        assert_eq!(priced.items[0].unit_price.cents(), 1000);
        assert_eq!(priced.items[0].comment.as_deref(), Some("no basil"));
        assert_eq!(priced.total_additional.cents(), 300);
        assert_eq!(priced.total.cents(), 2 * 1000 + 300);
    }

    #[tokio::test]
    async fn empty_item_list_is_rejected() {
        let (catalog, _, additional_id) = catalog_with(1000);
        let err = price_items(&catalog, &[], &[AdditionalItemRequest { additional_id }])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let (catalog, product_id, _) = catalog_with(1000);
        let err = price_items(
            &catalog,
            &[LineItemRequest {
                product_id,
                quantity: 0,
                comment: None,
            }],
            &[],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_product_fails_with_not_found() {
        let (catalog, _, _) = catalog_with(1000);
        let err = price_items(
            &catalog,
            &[LineItemRequest {
                product_id: ProductId::new(),
                quantity: 1,
                comment: None,
            }],
            &[],
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    proptest! {
        #[test]
        fn total_is_additionals_plus_line_extensions(
            lines in prop::collection::vec((1i64..=100_000, 1u32..=20), 1..10),
            extras in prop::collection::vec(1i64..=50_000, 0..10),
        ) {
            let items: Vec<LineItem> = lines
                .iter()
                .map(|(price, qty)| LineItem {
                    description: "item".to_string(),
                    unit_price: Money::from_cents(*price),
                    quantity: *qty,
                    comment: None,
                })
                .collect();
            let additionals: Vec<AdditionalItem> = extras
                .iter()
                .map(|price| AdditionalItem {
                    description: "extra".to_string(),
                    price: Money::from_cents(*price),
                })
                .collect();

            let (total_additional, total) = compute_totals(&items, &additionals);

            let expected_extras: i64 = extras.iter().sum();
            let expected_lines: i64 = lines
                .iter()
                .map(|(price, qty)| price * i64::from(*qty))
                .sum();

            prop_assert_eq!(total_additional.cents(), expected_extras);
            prop_assert_eq!(total.cents(), expected_extras + expected_lines);
        }
    }
}
