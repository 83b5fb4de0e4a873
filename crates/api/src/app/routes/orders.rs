use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Duration, Utc};

use mesa_core::OrderId;
use mesa_orders::{CreateOrderRequest, UpdateOrderRequest};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new().nest("/order", order_router())
}

fn order_router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/pending", get(list_pending_orders))
        .route("/user/all", get(list_my_orders))
        .route("/:id", get(get_order).patch(update_order))
        .route("/:order_id/orderstatus/:orderstatus", patch(update_order_status))
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::CreateOrderDto>,
) -> axum::response::Response {
    let delivery_type = match dto::parse_delivery_type(&body.delivery_type) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let payment_method = match dto::parse_payment_method(&body.payment_method) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let address_id = match body.address_id.as_deref().map(dto::parse_address_id) {
        Some(Ok(v)) => Some(v),
        Some(Err(resp)) => return resp,
        None => None,
    };
    let items = match dto::to_line_items(body.items) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let additional_items = match dto::to_additional_items(body.additional_items) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let request = CreateOrderRequest {
        delivery_type,
        payment_method,
        address_id,
        items,
        additional_items,
    };

    match services.orders.create(caller.user_id(), request).await {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderDto>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "warn",
                "invalid request",
                "invalid order id",
            )
        }
    };
    let items = match dto::to_line_items(body.items) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let additional_items = match dto::to_additional_items(body.additional_items) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let request = UpdateOrderRequest {
        items,
        additional_items,
    };

    match services
        .orders
        .update(caller.user_id(), order_id, request)
        .await
    {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_order_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((order_id, orderstatus)): Path<(String, String)>,
) -> axum::response::Response {
    if !caller.is_admin() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "warn",
            "forbidden",
            "only staff may change order status",
        );
    }

    let order_id: OrderId = match order_id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "warn",
                "invalid request",
                "invalid order id",
            )
        }
    };
    let status_index: u8 = match orderstatus.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "warn",
                "invalid request",
                "order status must be a numeric index",
            )
        }
    };

    match services
        .orders
        .transition_status(caller.user_id(), order_id, status_index)
        .await
    {
        Ok(order) => (StatusCode::CREATED, Json(dto::order_to_json(&order))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let order_id: OrderId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "warn",
                "invalid request",
                "invalid order id",
            )
        }
    };

    match services.orders.get(order_id).await {
        Ok(order) => {
            if !caller.is_admin() && order.user_id != caller.user_id() {
                return errors::json_error(
                    StatusCode::FORBIDDEN,
                    "warn",
                    "forbidden",
                    "order belongs to another user",
                );
            }
            (StatusCode::OK, Json(dto::order_to_json(&order))).into_response()
        }
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    if !caller.is_admin() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "warn",
            "forbidden",
            "only staff may list all orders",
        );
    }

    match services.orders.list_all().await {
        Ok(orders) => order_list_response(&orders),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_pending_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<dto::PendingQuery>,
) -> axum::response::Response {
    if !caller.is_admin() {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "warn",
            "forbidden",
            "only staff may list pending orders",
        );
    }

    let older_than = query
        .older_than_minutes
        .map(|minutes| Utc::now() - Duration::minutes(minutes));

    match services.orders.list_pending(older_than).await {
        Ok(orders) => order_list_response(&orders),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn list_my_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    match services.orders.list_for_user(caller.user_id()).await {
        Ok(orders) => order_list_response(&orders),
        Err(e) => errors::domain_error_to_response(e),
    }
}

fn order_list_response(orders: &[mesa_orders::Order]) -> axum::response::Response {
    let items = orders.iter().map(dto::order_to_json).collect::<Vec<_>>();
    (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
}
