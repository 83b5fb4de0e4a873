use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use mesa_api::app::services::InMemoryHandles;
use mesa_api::middleware::{USER_ID_HEADER, USER_ROLE_HEADER};
use mesa_core::{AdditionalItemId, AddressId, Money, ProductId, UserId};

struct TestServer {
    base_url: String,
    handles: InMemoryHandles,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory wiring, ephemeral port.
        let (services, handles) = mesa_api::app::services::build_in_memory_services();
        let app = mesa_api::app::build_app(Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            handles,
            handle,
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct Seed {
    user_id: UserId,
    address_id: AddressId,
    product_id: ProductId,
    additional_id: AdditionalItemId,
}

fn seed_catalog_and_user(srv: &TestServer) -> Seed {
    let user_id = UserId::new();
    let address_id = AddressId::new();
    let product_id = ProductId::new();
    let additional_id = AdditionalItemId::new();

    srv.handles
        .catalog
        .add_product(product_id, "Margherita", Money::from_cents(1000));
    srv.handles
        .catalog
        .add_additional(additional_id, "Extra cheese", Money::from_cents(300));
    srv.handles
        .directory
        .add_user(user_id, "Ana", Some("token-ana".to_string()));
    srv.handles.directory.add_address(address_id, user_id, "home");

    Seed {
        user_id,
        address_id,
        product_id,
        additional_id,
    }
}

fn as_user(req: reqwest::RequestBuilder, user_id: UserId) -> reqwest::RequestBuilder {
    req.header(USER_ID_HEADER, user_id.to_string())
}

fn as_admin(req: reqwest::RequestBuilder, user_id: UserId) -> reqwest::RequestBuilder {
    req.header(USER_ID_HEADER, user_id.to_string())
        .header(USER_ROLE_HEADER, "admin")
}

fn pickup_order_body(seed: &Seed) -> serde_json::Value {
    json!({
        "delivery_type": "PICKUP",
        "payment_method": "PIX",
        "items": [
            { "product_id": seed.product_id.to_string(), "quantity": 2 }
        ]
    })
}

async fn create_order(
    client: &reqwest::Client,
    srv: &TestServer,
    seed: &Seed,
) -> serde_json::Value {
    let res = as_user(
        client.post(format!("{}/order", srv.base_url)),
        seed.user_id,
    )
    .json(&pickup_order_body(seed))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn identity_headers_are_required() {
    let srv = TestServer::spawn().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/order/user/all", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Health stays open.
    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_pickup_order_prices_from_catalog() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let client = reqwest::Client::new();

    let body = create_order(&client, &srv, &seed).await;

    assert_eq!(body["status"], "RECEIVED");
    assert_eq!(body["total_cents"], 2000);
    assert_eq!(body["total"], "20.00");
    assert!(body["address_id"].is_null());
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // Admin push fired on creation.
    assert_eq!(srv.handles.notifier.admin_notifications().len(), 1);
    assert_eq!(srv.handles.notifier.user_notifications().len(), 1);
}

#[tokio::test]
async fn second_open_order_is_rejected_with_conflict() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let client = reqwest::Client::new();

    create_order(&client, &srv, &seed).await;

    let res = as_user(
        client.post(format!("{}/order", srv.base_url)),
        seed.user_id,
    )
    .json(&pickup_order_body(&seed))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["severity"], "warn");
}

#[tokio::test]
async fn delivery_order_requires_an_address() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let client = reqwest::Client::new();

    let res = as_user(
        client.post(format!("{}/order", srv.base_url)),
        seed.user_id,
    )
    .json(&json!({
        "delivery_type": "DELIVERY",
        "payment_method": "CASH",
        "items": [
            { "product_id": seed.product_id.to_string(), "quantity": 1 }
        ]
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = as_user(
        client.post(format!("{}/order", srv.base_url)),
        seed.user_id,
    )
    .json(&json!({
        "delivery_type": "DELIVERY",
        "payment_method": "CASH",
        "address_id": seed.address_id.to_string(),
        "items": [
            { "product_id": seed.product_id.to_string(), "quantity": 1 }
        ]
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["address_id"].as_str().unwrap(),
        seed.address_id.to_string()
    );
}

#[tokio::test]
async fn status_lifecycle_via_numeric_index() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let admin = UserId::new();
    let client = reqwest::Client::new();

    let order = create_order(&client, &srv, &seed).await;
    let order_id = order["id"].as_str().unwrap();

    // 2 = READY_FOR_PICKUP on the pickup ladder.
    let res = as_admin(
        client.patch(format!(
            "{}/order/{}/orderstatus/2",
            srv.base_url, order_id
        )),
        admin,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "READY_FOR_PICKUP");

    // 3 = DELIVERED; the order closes and stamps a delivery date.
    let res = as_admin(
        client.patch(format!(
            "{}/order/{}/orderstatus/3",
            srv.base_url, order_id
        )),
        admin,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["status"], "DELIVERED");
    assert!(body["delivery_date"].is_string());

    // Terminal orders refuse further transitions.
    let res = as_admin(
        client.patch(format!(
            "{}/order/{}/orderstatus/1",
            srv.base_url, order_id
        )),
        admin,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn status_change_is_admin_only_and_index_checked() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let client = reqwest::Client::new();

    let order = create_order(&client, &srv, &seed).await;
    let order_id = order["id"].as_str().unwrap();

    let res = as_user(
        client.patch(format!(
            "{}/order/{}/orderstatus/1",
            srv.base_url, order_id
        )),
        seed.user_id,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = as_admin(
        client.patch(format!(
            "{}/order/{}/orderstatus/9",
            srv.base_url, order_id
        )),
        UserId::new(),
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_appends_items_and_reprices() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let client = reqwest::Client::new();

    let order = create_order(&client, &srv, &seed).await;
    let order_id = order["id"].as_str().unwrap();

    let res = as_user(
        client.patch(format!("{}/order/{}", srv.base_url, order_id)),
        seed.user_id,
    )
    .json(&json!({
        "items": [
            { "product_id": seed.product_id.to_string(), "quantity": 1 }
        ],
        "additional_items": [
            { "additional_id": seed.additional_id.to_string() }
        ]
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["total_cents"], 1300);
    assert_eq!(body["total_additional_cents"], 300);
}

#[tokio::test]
async fn update_of_someone_elses_order_is_forbidden() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let client = reqwest::Client::new();

    let order = create_order(&client, &srv, &seed).await;
    let order_id = order["id"].as_str().unwrap();

    let res = as_user(
        client.patch(format!("{}/order/{}", srv.base_url, order_id)),
        UserId::new(),
    )
    .json(&json!({
        "items": [
            { "product_id": seed.product_id.to_string(), "quantity": 1 }
        ]
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn order_reads_enforce_ownership_and_role() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let admin = UserId::new();
    let client = reqwest::Client::new();

    let order = create_order(&client, &srv, &seed).await;
    let order_id = order["id"].as_str().unwrap();

    // Owner and admin can fetch by id; a stranger cannot.
    let res = as_user(
        client.get(format!("{}/order/{}", srv.base_url, order_id)),
        seed.user_id,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = as_admin(
        client.get(format!("{}/order/{}", srv.base_url, order_id)),
        admin,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = as_user(
        client.get(format!("{}/order/{}", srv.base_url, order_id)),
        UserId::new(),
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The full listing is staff-only.
    let res = as_user(client.get(format!("{}/order", srv.base_url)), seed.user_id)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = as_admin(client.get(format!("{}/order", srv.base_url)), admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // The caller's own listing needs no role.
    let res = as_user(
        client.get(format!("{}/order/user/all", srv.base_url)),
        seed.user_id,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn pending_listing_is_admin_only_and_excludes_closed_orders() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let admin = UserId::new();
    let client = reqwest::Client::new();

    let order = create_order(&client, &srv, &seed).await;
    let order_id = order["id"].as_str().unwrap();

    let res = as_user(
        client.get(format!("{}/order/pending", srv.base_url)),
        seed.user_id,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = as_admin(client.get(format!("{}/order/pending", srv.base_url)), admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // A fresh order is not "older than 30 minutes".
    let res = as_admin(
        client.get(format!(
            "{}/order/pending?older_than_minutes=30",
            srv.base_url
        )),
        admin,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());

    // Cancelling closes the order; it drops out of the pending view.
    let res = as_admin(
        client.patch(format!(
            "{}/order/{}/orderstatus/4",
            srv.base_url, order_id
        )),
        admin,
    )
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = as_admin(client.get(format!("{}/order/pending", srv.base_url)), admin)
        .send()
        .await
        .unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_catalog_entries_surface_as_not_found() {
    let srv = TestServer::spawn().await;
    let seed = seed_catalog_and_user(&srv);
    let client = reqwest::Client::new();

    let res = as_user(
        client.post(format!("{}/order", srv.base_url)),
        seed.user_id,
    )
    .json(&json!({
        "delivery_type": "PICKUP",
        "payment_method": "CASH",
        "items": [
            { "product_id": ProductId::new().to_string(), "quantity": 1 }
        ]
    }))
    .send()
    .await
    .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
