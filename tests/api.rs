use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{json, Value};
use storefront_backend::countdown::Clock;
use storefront_backend::{build_router, seed, AppConfig, AppState};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const ADMIN_PASSWORD: &str = "correct horse";
const JWT_SECRET: &str = "test-secret";

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 28, 9, 0, 0).unwrap()
}

fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: Some(JWT_SECRET.to_string()),
        admin_password_hash: Some(bcrypt::hash(ADMIN_PASSWORD, 4).expect("hash password")),
        ..AppConfig::default()
    }
}

async fn spawn_app() -> std::net::SocketAddr {
    let state = AppState::with_clock(seed::demo_store(now()), test_config(), Arc::new(FixedClock(now())));
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    addr
}

async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    body: Option<&Value>,
    headers: &[(&str, &str)],
) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let payload = body.map(|b| b.to_string()).unwrap_or_default();
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if body.is_some() {
        req.push_str("Content-Type: application/json\r\n");
    }
    req.push_str(&format!("Content-Length: {}\r\n\r\n{payload}", payload.len()));
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, body.to_string())
}

async fn send_json(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    body: Option<&Value>,
    headers: &[(&str, &str)],
) -> (u16, Value) {
    let (status, body) = send_raw(addr, method, path, body, headers).await;
    let json = if body.is_empty() { Value::Null } else { serde_json::from_str(&body).expect("json body") };
    (status, json)
}

async fn product_id(addr: std::net::SocketAddr, name: &str) -> i64 {
    let (_, products) = send_json(addr, "GET", "/api/products", None, &[]).await;
    products
        .as_array()
        .expect("product list")
        .iter()
        .find(|p| p["name"] == name)
        .and_then(|p| p["id"].as_i64())
        .expect("product id")
}

async fn admin_token(addr: std::net::SocketAddr) -> String {
    let (status, body) = send_json(
        addr,
        "POST",
        "/api/admin/login",
        Some(&json!({ "password": ADMIN_PASSWORD })),
        &[],
    )
    .await;
    assert_eq!(status, 200);
    format!("Bearer {}", body["access_token"].as_str().expect("token"))
}

#[tokio::test]
async fn health_and_catalogue() {
    let addr = spawn_app().await;

    let (status, body) = send_raw(addr, "GET", "/api/health", None, &[]).await;
    assert_eq!(status, 200);
    assert_eq!(body, "OK");

    let (status, products) = send_json(addr, "GET", "/api/products?limit=3", None, &[]).await;
    assert_eq!(status, 200);
    assert_eq!(products.as_array().unwrap().len(), 3);

    let (status, body) = send_json(addr, "GET", "/api/products/9999", None, &[]).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Product not found");

    let (status, methods) = send_json(addr, "GET", "/api/shipping-methods", None, &[]).await;
    assert_eq!(status, 200);
    assert_eq!(methods[1]["id"], "express");
}

#[tokio::test]
async fn coupon_codes_match_case_insensitively() {
    let addr = spawn_app().await;

    for code in ["save10", "SAVE10", " Save10 "] {
        let (status, body) = send_json(
            addr,
            "POST",
            "/api/coupons/validate",
            Some(&json!({ "code": code, "subtotal": 120.0 })),
            &[],
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(body["valid"], true, "{code}");
        assert_eq!(body["discount_amount"], 12.0);
        assert_eq!(body["discount_type"], "percentage");
    }

    let (status, coupon) = send_json(addr, "GET", "/api/coupons/code/welcome5", None, &[]).await;
    assert_eq!(status, 200);
    assert_eq!(coupon["code"], "WELCOME5");
}

#[tokio::test]
async fn rejected_coupons_report_messages() {
    let addr = spawn_app().await;

    let cases = [
        (json!({ "code": "EXPIRED5", "subtotal": 1000.0 }), "expired", "This coupon has expired"),
        (json!({ "code": "NOPE", "subtotal": 10.0 }), "not_found", "Coupon not found"),
        (json!({ "code": "WELCOME5", "subtotal": 10.0 }), "minimum_not_met", "Minimum purchase of $25.00 required"),
    ];
    for (payload, reason, message) in cases {
        let (status, body) = send_json(addr, "POST", "/api/coupons/validate", Some(&payload), &[]).await;
        assert_eq!(status, 200);
        assert_eq!(body["valid"], false);
        assert_eq!(body["reason"], reason);
        assert_eq!(body["message"], message);
        assert_eq!(body["discount_amount"], 0.0);
    }
}

#[tokio::test]
async fn product_scoped_coupon_validated_against_cart_lines() {
    let addr = spawn_app().await;
    let chair = product_id(addr, "Office Chair").await;
    let keyboard = product_id(addr, "Mechanical Keyboard").await;

    // electronics only, minimum 200 on the whole cart
    let (_, body) = send_json(
        addr,
        "POST",
        "/api/coupons/validate",
        Some(&json!({
            "code": "electronics15",
            "cart_items": [
                { "product_id": chair, "quantity": 1 },
                { "product_id": keyboard, "quantity": 1 }
            ]
        })),
        &[],
    )
    .await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["discount_amount"], 22.5);
}

#[tokio::test]
async fn cart_summary_and_checkout_flow() {
    let addr = spawn_app().await;
    let laptop = product_id(addr, "Laptop Pro 15").await;

    let (status, line) = send_json(
        addr,
        "POST",
        "/api/cart",
        Some(&json!({ "session_id": "sess-1", "product_id": laptop, "quantity": 2 })),
        &[],
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(line["line_total"], 2599.98);

    let (status, summary) =
        send_json(addr, "GET", "/api/cart/sess-1/summary?coupon_code=flat50", None, &[]).await;
    assert_eq!(status, 200);
    assert_eq!(summary["subtotal"], 2599.98);
    assert_eq!(summary["discount_amount"], 50.0);
    assert_eq!(summary["total"], 2549.98);
    assert_eq!(summary["applied_coupon"]["code"], "FLAT50");

    let (_, summary) = send_json(addr, "GET", "/api/cart/sess-1/summary?coupon_code=EXPIRED5", None, &[]).await;
    assert_eq!(summary["discount_amount"], 0.0);
    assert_eq!(summary["coupon_message"], "This coupon has expired");

    let (status, placed) = send_json(
        addr,
        "POST",
        "/api/checkout",
        Some(&json!({
            "session_id": "sess-1",
            "items": [{ "product_id": laptop, "quantity": 2 }],
            "coupon_code": "flat50",
            "shipping_method": "standard"
        })),
        &[],
    )
    .await;
    assert_eq!(status, 201);
    let order_id = placed["orderId"].as_str().expect("order id").to_string();
    assert_eq!(placed["total"], 2559.98);

    let (status, order) = send_json(addr, "GET", &format!("/api/orders/{order_id}"), None, &[]).await;
    assert_eq!(status, 200);
    assert_eq!(order["coupon_code"], "FLAT50");
    assert_eq!(order["items"][0]["quantity"], 2);

    let (_, product) = send_json(addr, "GET", &format!("/api/products/{laptop}"), None, &[]).await;
    assert_eq!(product["stock"], 8);

    let (_, cart) = send_json(addr, "GET", "/api/cart/sess-1", None, &[]).await;
    assert_eq!(cart.as_array().unwrap().len(), 0);

    let (_, history) = send_json(addr, "GET", "/api/orders/session/sess-1", None, &[]).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn checkout_failures_are_single_messages() {
    let addr = spawn_app().await;
    let desk = product_id(addr, "Standing Desk").await;

    let (status, body) =
        send_json(addr, "POST", "/api/checkout", Some(&json!({ "items": [] })), &[]).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Cart must contain at least one item");

    let (status, body) = send_json(
        addr,
        "POST",
        "/api/checkout",
        Some(&json!({ "items": [{ "product_id": desk, "quantity": 6 }] })),
        &[],
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Insufficient stock for Standing Desk");

    let (status, body) = send_json(
        addr,
        "POST",
        "/api/checkout",
        Some(&json!({ "items": [{ "product_id": desk, "quantity": 1 }], "coupon_code": "bogus" })),
        &[],
    )
    .await;
    assert_eq!(status, 404);
    assert_eq!(body["error"], "Coupon not found");
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let addr = spawn_app().await;
    let new_coupon = json!({
        "code": "once",
        "description": "single use",
        "discount_type": "fixed",
        "discount_value": 5.0,
        "usage_limit": 1
    });

    let (status, _) = send_json(addr, "POST", "/api/coupons", Some(&new_coupon), &[]).await;
    assert_eq!(status, 401);

    let (status, _) = send_json(
        addr,
        "POST",
        "/api/admin/login",
        Some(&json!({ "password": "wrong" })),
        &[],
    )
    .await;
    assert_eq!(status, 401);

    let token = admin_token(addr).await;
    let auth = [("Authorization", token.as_str())];

    let (status, created) = send_json(addr, "POST", "/api/coupons", Some(&new_coupon), &auth).await;
    assert_eq!(status, 201);
    assert_eq!(created["code"], "ONCE");

    let (status, body) = send_json(addr, "POST", "/api/coupons", Some(&new_coupon), &auth).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"], "Coupon code already exists");

    let (status, body) = send_json(
        addr,
        "POST",
        "/api/coupons",
        Some(&json!({ "code": "TOOMUCH", "discount_type": "percentage", "discount_value": 120.0 })),
        &auth,
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Percentage discount cannot exceed 100%");
}

#[tokio::test]
async fn usage_limit_applies_across_checkouts() {
    let addr = spawn_app().await;
    let token = admin_token(addr).await;
    let auth = [("Authorization", token.as_str())];
    let mouse = product_id(addr, "Wireless Mouse").await;

    let (status, _) = send_json(
        addr,
        "POST",
        "/api/coupons",
        Some(&json!({ "code": "ONCE", "discount_type": "fixed", "discount_value": 5.0, "usage_limit": 1 })),
        &auth,
    )
    .await;
    assert_eq!(status, 201);

    let order = json!({ "items": [{ "product_id": mouse, "quantity": 1 }], "coupon_code": "once" });
    let (status, first) = send_json(addr, "POST", "/api/checkout", Some(&order), &[]).await;
    assert_eq!(status, 201);
    assert_eq!(first["discount_amount"], 5.0);

    let (status, second) = send_json(addr, "POST", "/api/checkout", Some(&order), &[]).await;
    assert_eq!(status, 400);
    assert_eq!(second["error"], "This coupon has reached its usage limit");

    let (_, body) = send_json(addr, "GET", "/api/coupons/code/ONCE", None, &[]).await;
    assert_eq!(body["times_used"], 1);

    let (status, _) = send_raw(addr, "POST", "/api/coupons/reset-usage", None, &auth).await;
    assert_eq!(status, 204);
    let (status, _) = send_json(addr, "POST", "/api/checkout", Some(&order), &[]).await;
    assert_eq!(status, 201);
}

#[tokio::test]
async fn flash_sale_countdown_snapshot_and_stream() {
    let addr = spawn_app().await;
    let token = admin_token(addr).await;
    let auth = [("Authorization", token.as_str())];
    let webcam = product_id(addr, "4K Webcam").await;

    let end = now() + Duration::seconds(3_723);
    let (status, sale) = send_json(
        addr,
        "POST",
        "/api/flash-sales",
        Some(&json!({
            "product_id": webcam,
            "title": "Webcam rush",
            "discount_percentage": 25.0,
            "start_time": now() - Duration::minutes(30),
            "end_time": end
        })),
        &auth,
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(sale["flash_price"], 149.99);
    assert_eq!(sale["status"]["is_active"], true);
    assert_eq!(sale["urgency"], "medium");
    let id = sale["id"].as_i64().unwrap();

    let (status, countdown) =
        send_json(addr, "GET", &format!("/api/flash-sales/{id}/countdown"), None, &[]).await;
    assert_eq!(status, 200);
    assert_eq!(countdown["hours"], 1);
    assert_eq!(countdown["minutes"], 2);
    assert_eq!(countdown["seconds"], 3);
    assert_eq!(countdown["isExpired"], false);

    // Seeded sale that has not started yet is listed but unavailable.
    let (_, sales) = send_json(addr, "GET", "/api/flash-sales", None, &[]).await;
    let pending = sales
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["title"] == "Evening lamp deal")
        .expect("seeded sale");
    assert_eq!(pending["unavailable_reason"], "Flash sale has not started yet");

    let (status, bad) = send_json(
        addr,
        "POST",
        "/api/flash-sales",
        Some(&json!({
            "product_id": webcam,
            "title": "Too long",
            "discount_percentage": 10.0,
            "start_time": now(),
            "end_time": now() + Duration::hours(30)
        })),
        &auth,
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(bad["error"], "Flash sales cannot exceed 24 hours in duration");
}

#[tokio::test]
async fn countdown_stream_ends_with_expired_event() {
    let ended_at = now() - Duration::minutes(1);
    let mut store = seed::demo_store(now());
    let hub = store
        .products(0, usize::MAX)
        .into_iter()
        .find(|p| p.name == "USB-C Hub")
        .unwrap()
        .id;
    let id = store.next_id();
    store.insert_flash_sale(storefront_backend::models::flash_sale::FlashSale {
        id,
        product_id: hub,
        title: "Over already".to_string(),
        description: None,
        discount_percentage: 10.0,
        start_time: ended_at - Duration::hours(1),
        end_time: ended_at,
        max_quantity: None,
        sold_quantity: 0,
        is_active: true,
    });

    let app = build_router(AppState::with_clock(store, test_config(), Arc::new(FixedClock(now()))));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    let (status, body) =
        send_raw(addr, "GET", &format!("/api/flash-sales/{id}/countdown/stream"), None, &[]).await;
    assert_eq!(status, 200);
    assert!(body.contains("event: countdown"), "{body}");
    assert!(body.contains("\"isExpired\":true"), "{body}");
}

#[tokio::test]
async fn free_shipping_coupon_zeroes_shipping_at_checkout() {
    let addr = spawn_app().await;
    let lamp = product_id(addr, "Desk Lamp").await;

    let (_, body) = send_json(
        addr,
        "POST",
        "/api/coupons/validate",
        Some(&json!({ "code": "freeship", "subtotal": 30.0 })),
        &[],
    )
    .await;
    assert_eq!(body["valid"], true);
    assert_eq!(body["discount_amount"], 0.0);
    assert_eq!(body["free_shipping_applied"], true);
    assert_eq!(body["discount_type"], "free_shipping");

    send_json(
        addr,
        "POST",
        "/api/cart",
        Some(&json!({ "session_id": "ship", "product_id": lamp, "quantity": 1 })),
        &[],
    )
    .await;
    let (_, summary) = send_json(addr, "GET", "/api/cart/ship/summary?coupon_code=FREESHIP", None, &[]).await;
    assert_eq!(summary["free_shipping_applied"], true);
    assert_eq!(summary["total"], 39.99);

    let (status, placed) = send_json(
        addr,
        "POST",
        "/api/checkout",
        Some(&json!({
            "session_id": "ship",
            "items": [{ "product_id": lamp, "quantity": 1 }],
            "coupon_code": "FREESHIP",
            "shipping_method": "express"
        })),
        &[],
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(placed["shipping_cost"], 0.0);
    assert_eq!(placed["total"], 39.99);
}

#[tokio::test]
async fn coupon_update_can_clear_limits_and_dates() {
    let addr = spawn_app().await;
    let token = admin_token(addr).await;
    let auth = [("Authorization", token.as_str())];

    let (_, save20) = send_json(addr, "GET", "/api/coupons/code/SAVE20", None, &[]).await;
    let id = save20["id"].as_i64().unwrap();
    assert_eq!(save20["usage_limit"], 50);

    let (status, updated) = send_json(
        addr,
        "PUT",
        &format!("/api/coupons/{id}"),
        Some(&json!({ "usage_limit": null, "valid_until": null, "valid_from": "2025-01-01T00:00:00Z" })),
        &auth,
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(updated["usage_limit"], Value::Null);
    assert_eq!(updated["valid_until"], Value::Null);
    assert_eq!(updated["valid_from"], "2025-01-01T00:00:00Z");
    assert_eq!(updated["discount_value"], 20.0);

    let (status, _) = send_json(
        addr,
        "PUT",
        &format!("/api/coupons/{id}"),
        Some(&json!({ "description": "kept limits" })),
        &auth,
    )
    .await;
    assert_eq!(status, 200);
    let (_, kept) = send_json(addr, "GET", "/api/coupons/code/SAVE20", None, &[]).await;
    assert_eq!(kept["usage_limit"], Value::Null);
    assert_eq!(kept["valid_from"], "2025-01-01T00:00:00Z");

    let (status, body) = send_json(
        addr,
        "PUT",
        &format!("/api/coupons/{id}"),
        Some(&json!({ "valid_from": "2030-01-01T00:00:00Z", "valid_until": "2029-01-01T00:00:00Z" })),
        &auth,
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Coupon must become valid before it expires");
}

#[tokio::test]
async fn oversized_flash_line_pays_regular_price() {
    let addr = spawn_app().await;
    let hub = product_id(addr, "USB-C Hub").await;

    let (status, placed) = send_json(
        addr,
        "POST",
        "/api/checkout",
        Some(&json!({ "items": [{ "product_id": hub, "quantity": 25 }] })),
        &[],
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(placed["subtotal"], 1999.75);

    let (_, sales) = send_json(addr, "GET", "/api/flash-sales", None, &[]).await;
    let hub_sale = sales
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["title"] == "Hub hour")
        .expect("seeded sale");
    assert_eq!(hub_sale["sold_quantity"], 0);

    let (status, body) = send_json(
        addr,
        "POST",
        "/api/checkout",
        Some(&json!({ "items": [{ "product_id": hub, "quantity": -1 }, { "product_id": hub, "quantity": 2 }] })),
        &[],
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Quantity must be greater than 0");
}
