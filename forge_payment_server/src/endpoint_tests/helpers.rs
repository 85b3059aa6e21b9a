use actix_web::{
    body::MessageBody,
    dev::ServiceResponse,
    http::StatusCode,
    test,
    test::TestRequest,
    web::ServiceConfig,
    App,
};
use chrono::{TimeZone, Utc};
use fpg_common::Paise;
use forge_payment_engine::db_types::{
    CustomerInfo,
    LineItem,
    Order,
    OrderId,
    OrderStatusType,
    PaymentMethod,
    PaymentStatusType,
};

pub async fn get_request(path: &str, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let req = TestRequest::get().uri(path).to_request();
    call(req, configure).await
}

pub async fn post_request(path: &str, body: serde_json::Value, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let req = TestRequest::post().uri(path).set_json(body).to_request();
    call(req, configure).await
}

/// Drive a request through a configured test app. Middleware rejections surface as `Err` from the service, so
/// those are rendered through their `ResponseError` impl to give tests a plain status + body to assert on.
pub async fn call(req: actix_http::Request, configure: fn(&mut ServiceConfig)) -> (StatusCode, String) {
    let _ = env_logger::try_init().ok();
    let app = App::new().configure(configure);
    let service = test::init_service(app).await;
    match test::try_call_service(&service, req).await {
        Ok(res) => into_parts(res),
        Err(e) => {
            let res = e.error_response();
            let status = res.status();
            let body = body_string(res.into_body());
            (status, body)
        },
    }
}

fn into_parts(res: ServiceResponse) -> (StatusCode, String) {
    let status = res.status();
    let body = body_string(res.into_body());
    (status, body)
}

fn body_string<B: MessageBody>(body: B) -> String {
    match body.try_into_bytes() {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    }
}

/// A confirmed-payment-free order as the store would return it just after checkout.
pub fn sample_order(order_id: &str) -> Order {
    let created = Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap();
    Order {
        id: 1,
        order_id: OrderId::new(order_id).unwrap(),
        customer: CustomerInfo {
            name: Some("Asha Rao".into()),
            email: Some("asha@example.com".into()),
            phone: Some("9876543210".into()),
            pincode: Some("411001".into()),
            ..Default::default()
        },
        items: vec![LineItem {
            id: "benchy".into(),
            title: "Calibration boat".into(),
            price: Paise::from(25050),
            quantity: None,
        }],
        total_price: Paise::from(25050),
        status: OrderStatusType::Pending,
        payment_method: Some(PaymentMethod::Upi),
        payment_status: PaymentStatusType::Pending,
        merchant_tx_id: None,
        payment_response: None,
        tracking_number: None,
        tracking_url: None,
        created_at: created,
        updated_at: created,
    }
}
