use axum::http::StatusCode;
use serde::Deserialize;

use mesa_core::{AdditionalItemId, AddressId, ProductId};
use mesa_orders::{
    AdditionalItemRequest, DeliveryType, LineItemRequest, Order, PaymentMethod,
};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct OrderItemDto {
    pub product_id: String,
    pub quantity: u32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdditionalItemDto {
    pub additional_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderDto {
    pub delivery_type: String,
    pub payment_method: String,
    pub address_id: Option<String>,
    pub items: Vec<OrderItemDto>,
    #[serde(default)]
    pub additional_items: Vec<AdditionalItemDto>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderDto {
    pub items: Vec<OrderItemDto>,
    #[serde(default)]
    pub additional_items: Vec<AdditionalItemDto>,
}

#[derive(Debug, Deserialize)]
pub struct PendingQuery {
    /// Restrict to orders whose last status change is at least this old.
    pub older_than_minutes: Option<i64>,
}

// -------------------------
// Parse helpers
// -------------------------

pub fn parse_delivery_type(s: &str) -> Result<DeliveryType, axum::response::Response> {
    DeliveryType::parse(s).ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "warn",
            "invalid request",
            "delivery_type must be one of: DELIVERY, PICKUP",
        )
    })
}

pub fn parse_payment_method(s: &str) -> Result<PaymentMethod, axum::response::Response> {
    PaymentMethod::parse(s).ok_or_else(|| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "warn",
            "invalid request",
            "payment_method must be one of: CASH, PIX, CREDIT_CARD",
        )
    })
}

pub fn parse_address_id(s: &str) -> Result<AddressId, axum::response::Response> {
    s.parse().map_err(|_| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            "warn",
            "invalid request",
            "invalid address id",
        )
    })
}

pub fn to_line_items(
    items: Vec<OrderItemDto>,
) -> Result<Vec<LineItemRequest>, axum::response::Response> {
    let mut requests = Vec::with_capacity(items.len());
    for item in items {
        let product_id: ProductId = item.product_id.parse().map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "warn",
                "invalid request",
                "invalid product id",
            )
        })?;
        requests.push(LineItemRequest {
            product_id,
            quantity: item.quantity,
            comment: item.comment,
        });
    }
    Ok(requests)
}

pub fn to_additional_items(
    items: Vec<AdditionalItemDto>,
) -> Result<Vec<AdditionalItemRequest>, axum::response::Response> {
    let mut requests = Vec::with_capacity(items.len());
    for item in items {
        let additional_id: AdditionalItemId = item.additional_id.parse().map_err(|_| {
            errors::json_error(
                StatusCode::BAD_REQUEST,
                "warn",
                "invalid request",
                "invalid additional item id",
            )
        })?;
        requests.push(AdditionalItemRequest { additional_id });
    }
    Ok(requests)
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn order_to_json(order: &Order) -> serde_json::Value {
    serde_json::json!({
        "id": order.id.to_string(),
        "user_id": order.user_id.to_string(),
        "delivery_type": order.delivery_type.as_str(),
        "payment_method": order.payment_method.as_str(),
        "status": order.status.as_str(),
        "address_id": order.address_id.map(|a| a.to_string()),
        "items": order.items.iter().map(|i| serde_json::json!({
            "description": i.description,
            "unit_price_cents": i.unit_price.cents(),
            "quantity": i.quantity,
            "comment": i.comment,
        })).collect::<Vec<_>>(),
        "additional_items": order.additional_items.iter().map(|a| serde_json::json!({
            "description": a.description,
            "price_cents": a.price.cents(),
        })).collect::<Vec<_>>(),
        "total_additional_cents": order.total_additional.cents(),
        "total_cents": order.total.cents(),
        "total": order.total.to_string(),
        "delivery_date": order.delivery_date.map(|d| d.to_rfc3339()),
        "status_updated_at": order.status_updated_at.to_rfc3339(),
        "created_at": order.created_at.to_rfc3339(),
        "updated_at": order.updated_at.to_rfc3339(),
    })
}
