use actix_web::{http::StatusCode, web, web::ServiceConfig};
use forge_payment_engine::{
    db_types::{OrderStatusType, PaymentMethod, PaymentStatusType},
    OrderFlowApi,
};
use serde_json::{json, Value};

use super::{
    helpers::{get_request, post_request, sample_order},
    mocks::MockPaymentStore,
};
use crate::routes::{CreateOrderRoute, OrderByIdRoute, OrderFulfillmentRoute, OrdersSearchRoute};

fn checkout_body() -> Value {
    json!({
        "items": [{ "id": "benchy", "title": "Calibration boat", "price": 25050 }],
        "customer": {
            "name": "Asha Rao",
            "email": "asha@example.com",
            "phone": "9876543210",
            "pincode": "411001"
        },
        "payment": { "method": "upi" }
    })
}

#[actix_web::test]
async fn create_order_returns_the_stored_record() {
    let (status, body) = post_request("/order", checkout_body(), configure_insert).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["order_id"], "k7m2p9qr4t");
    assert_eq!(order["status"], "pending");
    assert_eq!(order["payment_status"], "PENDING");
    assert_eq!(order["total_price"], 25050);
}

#[actix_web::test]
async fn create_order_carries_the_payment_method_through() {
    let (status, _) = post_request("/order", checkout_body(), configure_insert).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn create_order_without_a_payment_block_is_accepted() {
    let mut body = checkout_body();
    body.as_object_mut().unwrap().remove("payment");
    let (status, _) = post_request("/order", body, configure_insert_no_method).await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn create_order_rejects_empty_item_lists() {
    let mut body = checkout_body();
    body["items"] = json!([]);
    let (status, body) = post_request("/order", body, configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("at least one item"), "unexpected body: {body}");
}

#[actix_web::test]
async fn create_order_rejects_malformed_emails() {
    for email in ["not-an-email", "someone@", "@nowhere", "a@b"] {
        let mut body = checkout_body();
        body["customer"]["email"] = json!(email);
        let (status, body) = post_request("/order", body, configure_untouched).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "email {email} was accepted");
        assert!(body.contains("Invalid email address"), "unexpected body: {body}");
    }
}

#[actix_web::test]
async fn create_order_rejects_malformed_pincodes() {
    for pincode in ["4110", "41100a", "4110011"] {
        let mut body = checkout_body();
        body["customer"]["pincode"] = json!(pincode);
        let (status, body) = post_request("/order", body, configure_untouched).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "pincode {pincode} was accepted");
        assert!(body.contains("Invalid pincode"), "unexpected body: {body}");
    }
}

#[actix_web::test]
async fn fetch_missing_order_is_a_404() {
    let (status, body) = get_request("/order/k7m2p9qr4t", configure_fetch_none).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.contains("not found"), "unexpected body: {body}");
}

#[actix_web::test]
async fn fetch_order_with_underscore_in_id_is_a_400() {
    let (status, _) = get_request("/order/ord_42", configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn search_requires_email_or_phone() {
    let (status, body) = get_request("/orders/search", configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.contains("at least one of email or phone"), "unexpected body: {body}");

    let (status, _) = get_request("/orders/search?email=&phone=", configure_untouched).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn search_by_email_returns_matches() {
    let (status, body) = get_request("/orders/search?email=asha", configure_search).await;
    assert_eq!(status, StatusCode::OK);
    let orders: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(orders[0]["customer"]["email"], "asha@example.com");
}

#[actix_web::test]
async fn fulfillment_update_sets_tracking() {
    let body = json!({ "new_status": "shipped", "tracking_number": "AWB123456" });
    let (status, body) = post_request("/order/k7m2p9qr4t/fulfillment", body, configure_fulfillment).await;
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(order["status"], "shipped");
    assert_eq!(order["tracking_number"], "AWB123456");
    assert_eq!(order["payment_status"], "SUCCESS");
}

/// A store that must never be reached: requests failing validation stop at the handler.
fn configure_untouched(cfg: &mut ServiceConfig) {
    let store = MockPaymentStore::new();
    register(cfg, store);
}

fn configure_insert(cfg: &mut ServiceConfig) {
    let mut store = MockPaymentStore::new();
    store
        .expect_insert_order()
        .withf(|order| order.payment_method == Some(PaymentMethod::Upi))
        .returning(|_| Ok(sample_order("k7m2p9qr4t")));
    register(cfg, store);
}

fn configure_insert_no_method(cfg: &mut ServiceConfig) {
    let mut store = MockPaymentStore::new();
    store
        .expect_insert_order()
        .withf(|order| order.payment_method.is_none())
        .returning(|_| Ok(sample_order("k7m2p9qr4t")));
    register(cfg, store);
}

fn configure_fetch_none(cfg: &mut ServiceConfig) {
    let mut store = MockPaymentStore::new();
    store.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    register(cfg, store);
}

fn configure_search(cfg: &mut ServiceConfig) {
    let mut store = MockPaymentStore::new();
    store.expect_search_orders().withf(|q| q.email.as_deref() == Some("asha")).returning(|_| {
        Ok(vec![sample_order("k7m2p9qr4t")])
    });
    register(cfg, store);
}

fn configure_fulfillment(cfg: &mut ServiceConfig) {
    let mut store = MockPaymentStore::new();
    store.expect_update_fulfillment().returning(|_, update| {
        let mut order = sample_order("k7m2p9qr4t");
        order.payment_status = PaymentStatusType::Success;
        order.status = update.new_status.unwrap_or(OrderStatusType::Confirmed);
        order.tracking_number = update.tracking_number;
        Ok(order)
    });
    register(cfg, store);
}

fn register(cfg: &mut ServiceConfig, store: MockPaymentStore) {
    let api = OrderFlowApi::new(store);
    cfg.service(CreateOrderRoute::<MockPaymentStore>::new())
        .service(OrderByIdRoute::<MockPaymentStore>::new())
        .service(OrdersSearchRoute::<MockPaymentStore>::new())
        .service(OrderFulfillmentRoute::<MockPaymentStore>::new())
        .app_data(web::Data::new(api));
}
