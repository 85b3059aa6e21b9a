use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use forge_payment_engine::{OrderFlowApi, SqliteDatabase};
use phonepe_tools::PhonePeApi;

use crate::{
    config::ServerConfig,
    errors::ServerError,
    middleware::XVerifyMiddlewareFactory,
    routes::{
        health,
        CreateOrderRoute,
        InitiatePaymentRoute,
        OrderByIdRoute,
        OrderFulfillmentRoute,
        OrdersSearchRoute,
        PaymentStatusRoute,
        PhonepeWebhookRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    let phonepe =
        PhonePeApi::new(config.phonepe.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("fpg::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(phonepe.clone()));
        let api_scope = web::scope("/api")
            .service(CreateOrderRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new())
            .service(OrdersSearchRoute::<SqliteDatabase>::new())
            .service(OrderFulfillmentRoute::<SqliteDatabase>::new())
            .service(InitiatePaymentRoute::<SqliteDatabase>::new())
            .service(PaymentStatusRoute::<SqliteDatabase>::new());
        // The only inbound trust boundary: callbacks must carry a valid X-VERIFY signature over the raw body.
        let webhook_scope = web::scope("/webhook")
            .wrap(XVerifyMiddlewareFactory::new(config.phonepe.salt_key.clone(), config.phonepe.salt_index))
            .service(PhonepeWebhookRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope).service(webhook_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
