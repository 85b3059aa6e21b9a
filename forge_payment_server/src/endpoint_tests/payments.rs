use actix_web::{http::StatusCode, web, web::ServiceConfig};
use fpg_common::Secret;
use forge_payment_engine::OrderFlowApi;
use phonepe_tools::{PhonePeApi, PhonePeConfig};
use serde_json::json;

use super::{
    helpers::post_request,
    mocks::MockPaymentStore,
};
use crate::routes::InitiatePaymentRoute;

/// Credentials that pass the configuration gate. No test here ever reaches the network: every request is stopped
/// by the gate, by path validation, or by the store lookup first.
fn configured() -> PhonePeConfig {
    PhonePeConfig {
        merchant_id: "MERCHANTUAT".into(),
        api_key: Secret::new("key".into()),
        salt_key: Secret::new("salt".into()),
        salt_index: 1,
        environment: Default::default(),
        callback_url: "https://shop.example.com/webhook/phonepe".into(),
    }
}

#[actix_web::test]
async fn missing_provider_config_blocks_initiation() {
    let body = json!({ "order_id": "k7m2p9qr4t", "redirect_url": "https://shop.example.com/payment/done" });
    let (status, body) = post_request("/payment/initiate", body, configure_unconfigured).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.contains("Invalid server configuration"), "unexpected body: {body}");
    assert!(body.contains("\"success\":false"), "unexpected body: {body}");
}

#[actix_web::test]
async fn initiation_for_unknown_order_is_a_404() {
    let body = json!({ "order_id": "k7m2p9qr4t", "redirect_url": "https://shop.example.com/payment/done" });
    let (status, _) = post_request("/payment/initiate", body, configure_fetch_none).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn initiation_rejects_underscored_order_ids() {
    let body = json!({ "order_id": "ord_42", "redirect_url": "https://shop.example.com/payment/done" });
    let (status, _) = post_request("/payment/initiate", body, configure_fetch_none).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

fn configure_unconfigured(cfg: &mut ServiceConfig) {
    register(cfg, MockPaymentStore::new(), PhonePeConfig::default());
}

fn configure_fetch_none(cfg: &mut ServiceConfig) {
    let mut store = MockPaymentStore::new();
    store.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    register(cfg, store, configured());
}

fn register(cfg: &mut ServiceConfig, store: MockPaymentStore, config: PhonePeConfig) {
    let api = OrderFlowApi::new(store);
    let phonepe = PhonePeApi::new(config).unwrap();
    cfg.service(InitiatePaymentRoute::<MockPaymentStore>::new())
        .app_data(web::Data::new(api))
        .app_data(web::Data::new(phonepe));
}
