use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use fpg_common::Secret;
use forge_payment_engine::{
    db_types::{OrderStatusType, PaymentStatusType},
    OrderFlowApi,
};
use phonepe_tools::helpers::x_verify;
use serde_json::json;

use super::{
    helpers::{call, sample_order},
    mocks::MockPaymentStore,
};
use crate::{middleware::XVerifyMiddlewareFactory, routes::PhonepeWebhookRoute};

const SALT_KEY: &str = "test-salt";
const SALT_INDEX: u8 = 1;

/// The provider's envelope as it arrives on the wire: plain JSON.
fn callback_body() -> String {
    json!({
        "success": true,
        "code": "PAYMENT_SUCCESS",
        "message": "Your payment is successful.",
        "data": {
            "merchantId": "MERCHANTUAT",
            "merchantTransactionId": "k7m2p9qr4t_1714500000000_deadbeef",
            "transactionId": "T2405021234",
            "amount": 25050,
            "state": "COMPLETED",
            "responseCode": "SUCCESS"
        }
    })
    .to_string()
}

/// The same envelope in the alternative wrapped shape.
fn wrapped_callback_body() -> String {
    let encoded = base64::encode(callback_body());
    json!({ "response": encoded }).to_string()
}

async fn post_callback(
    body: String,
    signature: Option<String>,
    configure: fn(&mut ServiceConfig),
) -> (StatusCode, String) {
    let mut req = TestRequest::post()
        .uri("/webhook/phonepe")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body);
    if let Some(sig) = signature {
        req = req.insert_header(("X-VERIFY", sig));
    }
    call(req.to_request(), configure).await
}

#[actix_web::test]
async fn plain_envelope_callback_is_reconciled_and_acked() {
    let body = callback_body();
    let signature = x_verify(&body, SALT_KEY, SALT_INDEX);
    let (status, body) = post_callback(body, Some(signature), configure_reconciling).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"code":"CALLBACK_RECEIVED"}"#);
}

#[actix_web::test]
async fn wrapped_envelope_callback_is_reconciled_and_acked() {
    let body = wrapped_callback_body();
    let signature = x_verify(&body, SALT_KEY, SALT_INDEX);
    let (status, body) = post_callback(body, Some(signature), configure_reconciling).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"code":"CALLBACK_RECEIVED"}"#);
}

#[actix_web::test]
async fn missing_signature_is_a_401() {
    let (status, _) = post_callback(callback_body(), None, configure_untouched).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn tampered_body_is_a_401_and_never_reaches_the_store() {
    let signature = x_verify(&callback_body(), SALT_KEY, SALT_INDEX);
    let mut tampered = callback_body();
    tampered.truncate(tampered.len() - 2);
    tampered.push_str("X}");
    let (status, body) = post_callback(tampered, Some(signature), configure_untouched).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.contains("signature"), "unexpected body: {body}");
}

#[actix_web::test]
async fn wrong_salt_index_is_a_401() {
    let body = callback_body();
    let signature = x_verify(&body, SALT_KEY, 2);
    let (status, _) = post_callback(body, Some(signature), configure_untouched).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn signed_but_undecodable_payload_is_still_acked() {
    let body = r#"{"response":"not base64 at all"}"#.to_string();
    let signature = x_verify(&body, SALT_KEY, SALT_INDEX);
    let (status, body) = post_callback(body, Some(signature), configure_untouched).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"code":"CALLBACK_RECEIVED"}"#);
}

#[actix_web::test]
async fn signed_callback_with_store_failure_is_still_acked() {
    let body = callback_body();
    let signature = x_verify(&body, SALT_KEY, SALT_INDEX);
    let (status, body) = post_callback(body, Some(signature), configure_fetch_none).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true,"code":"CALLBACK_RECEIVED"}"#);
}

/// A store that must never be reached: the request dies at the signature check or the decode step.
fn configure_untouched(cfg: &mut ServiceConfig) {
    register(cfg, MockPaymentStore::new());
}

/// A store that must reconcile exactly one successful payment for the order in the callback.
fn configure_reconciling(cfg: &mut ServiceConfig) {
    let mut store = MockPaymentStore::new();
    store
        .expect_fetch_order_by_order_id()
        .withf(|id| id.as_str() == "k7m2p9qr4t")
        .times(1)
        .returning(|_| Ok(Some(sample_order("k7m2p9qr4t"))));
    store
        .expect_apply_payment_update()
        .withf(|_, update| update.payment_status == PaymentStatusType::Success)
        .times(1)
        .returning(|_, update| {
            let mut order = sample_order("k7m2p9qr4t");
            order.payment_status = update.payment_status;
            order.status = update.new_order_status.unwrap_or(OrderStatusType::Pending);
            order.merchant_tx_id = Some(update.merchant_tx_id);
            order.payment_response = Some(update.payment_response);
            Ok(order)
        });
    register(cfg, store);
}

/// The order referenced by the callback does not exist; the reconciler fails internally but the provider still
/// gets its acknowledgement.
fn configure_fetch_none(cfg: &mut ServiceConfig) {
    let mut store = MockPaymentStore::new();
    store.expect_fetch_order_by_order_id().returning(|_| Ok(None));
    register(cfg, store);
}

fn register(cfg: &mut ServiceConfig, store: MockPaymentStore) {
    let api = OrderFlowApi::new(store);
    let scope = web::scope("/webhook")
        .wrap(XVerifyMiddlewareFactory::new(Secret::new(SALT_KEY.to_string()), SALT_INDEX))
        .service(PhonepeWebhookRoute::<MockPaymentStore>::new());
    cfg.service(scope).app_data(web::Data::new(api));
}
