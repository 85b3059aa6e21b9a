//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
use std::str::FromStr;

use actix_web::{get, web, HttpResponse, Responder};
use fpg_common::Paise;
use forge_payment_engine::{
    db_types::{FulfillmentUpdate, GatewayState, GatewayUpdate, NewOrder, OrderId, PaymentStatusType},
    derive_payment_status,
    order_objects::OrderQueryFilter,
    traits::PaymentStoreDatabase,
    OrderFlowApi,
};
use log::*;
use phonepe_tools::{InitiatePaymentParams, PhonePeApi, PhonePeApiError, ProviderEnvelope, ProviderStatus};

use crate::{
    data_objects::{
        CallbackAck,
        CallbackPayload,
        NewOrderParams,
        OrderSearchParams,
        PaymentInitRequest,
        PaymentInitResponse,
        PaymentStatusResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/order" impl PaymentStoreDatabase);
/// Route handler for storefront checkouts.
///
/// The request is validated field by field so the client gets a specific message back; the order total is always
/// recomputed from the line items rather than trusted from the client.
pub async fn create_order<B: PaymentStoreDatabase>(
    params: web::Json<NewOrderParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received create order request");
    let params = params.into_inner();
    validate_new_order(&params)?;
    let order = NewOrder::new(params.items, params.customer, params.payment.method);
    if order.total_price <= Paise::from(0) {
        return Err(ServerError::InvalidRequestBody("Order total must be positive".to_string()));
    }
    let order = api.process_new_order(order).await?;
    Ok(HttpResponse::Ok().json(order))
}

fn validate_new_order(params: &NewOrderParams) -> Result<(), ServerError> {
    if params.items.is_empty() {
        return Err(ServerError::InvalidRequestBody("Orders must contain at least one item".to_string()));
    }
    if let Some(email) = params.customer.email.as_deref() {
        let looks_like_email = email.split_once('@').map(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        });
        if looks_like_email != Some(true) {
            return Err(ServerError::InvalidRequestBody(format!("Invalid email address: {email}")));
        }
    }
    if let Some(pincode) = params.customer.pincode.as_deref() {
        if pincode.len() != 6 || !pincode.chars().all(|c| c.is_ascii_digit()) {
            return Err(ServerError::InvalidRequestBody(format!("Invalid pincode: {pincode}")));
        }
    }
    Ok(())
}

route!(order_by_id => Get "/order/{order_id}" impl PaymentStoreDatabase);
pub async fn order_by_id<B: PaymentStoreDatabase>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from_str(&path.into_inner()).map_err(|e| ServerError::InvalidRequestPath(e.to_string()))?;
    trace!("💻️ Received order request for {order_id}");
    let order =
        api.fetch_order(&order_id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id}")))?;
    Ok(HttpResponse::Ok().json(order))
}

route!(orders_search => Get "/orders/search" impl PaymentStoreDatabase);
/// Order lookup for the storefront's "my orders" page. At least one of email or phone must be supplied;
/// both match case-insensitively on substrings, and results come back newest first.
pub async fn orders_search<B: PaymentStoreDatabase>(
    params: web::Query<OrderSearchParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let params = params.into_inner();
    if params.email.as_deref().map_or(true, str::is_empty) && params.phone.as_deref().map_or(true, str::is_empty) {
        return Err(ServerError::InvalidRequestBody("Provide at least one of email or phone".to_string()));
    }
    let mut query = OrderQueryFilter::default();
    if let Some(email) = params.email.filter(|e| !e.is_empty()) {
        query = query.with_email(email);
    }
    if let Some(phone) = params.phone.filter(|p| !p.is_empty()) {
        query = query.with_phone(phone);
    }
    let orders = api.search_orders(query).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_fulfillment => Post "/order/{order_id}/fulfillment" impl PaymentStoreDatabase);
/// Admin updates to order lifecycle and tracking fields. Payment columns are unreachable from this endpoint.
pub async fn order_fulfillment<B: PaymentStoreDatabase>(
    path: web::Path<String>,
    update: web::Json<FulfillmentUpdate>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = OrderId::from_str(&path.into_inner()).map_err(|e| ServerError::InvalidRequestPath(e.to_string()))?;
    debug!("💻️ Received fulfillment update for {order_id}");
    let order = api.update_fulfillment(&order_id, update.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(initiate_payment => Post "/payment/initiate" impl PaymentStoreDatabase);
/// Kick off a pay-page payment for an existing order.
///
/// The amount is taken from the stored order, never from the request. On success the merchant transaction id is
/// persisted against the order before the redirect URL goes back to the client. The order stays `Pending`
/// throughout; only a reconciled gateway event moves it.
pub async fn initiate_payment<B: PaymentStoreDatabase>(
    params: web::Json<PaymentInitRequest>,
    api: web::Data<OrderFlowApi<B>>,
    phonepe: web::Data<PhonePeApi>,
) -> Result<HttpResponse, ServerError> {
    let params = params.into_inner();
    let order_id =
        OrderId::from_str(&params.order_id).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    phonepe.config().validate().map_err(ServerError::from)?;
    let order =
        api.fetch_order(&order_id).await?.ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id}")))?;
    let init_params = InitiatePaymentParams {
        order_id: order.order_id.as_str().to_string(),
        amount: order.total_price.to_rupees(),
        redirect_url: params.redirect_url,
        callback_url: None,
        user_phone: order.customer.phone.clone(),
        user_name: order.customer.name.clone(),
    };
    let init = phonepe.initiate_payment(init_params).await.map_err(|e| {
        warn!("💻️ Payment initiation for order {order_id} failed. {e}");
        match e {
            e @ (PhonePeApiError::Configuration(_) | PhonePeApiError::InvalidAmount(_)) => ServerError::from(e),
            e => ServerError::PaymentProviderError(format!("{e}. The order was not charged; payment can be retried.")),
        }
    })?;
    api.register_payment_attempt(&order_id, &init.merchant_tx_id).await?;
    Ok(HttpResponse::Ok().json(PaymentInitResponse {
        success: true,
        redirect_url: init.redirect_url,
        transaction_id: init.merchant_tx_id,
    }))
}

route!(payment_status => Get "/payment/status/{merchant_tx_id}" impl PaymentStoreDatabase);
/// Poll the provider for the state of a payment attempt, reconciling the order on a definitive result.
///
/// The response always reflects what the gateway reported. If the local write fails, that is logged and the
/// gateway truth still goes back to the client; the next poll or callback will reconcile.
pub async fn payment_status<B: PaymentStoreDatabase>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<B>>,
    phonepe: web::Data<PhonePeApi>,
) -> Result<HttpResponse, ServerError> {
    let merchant_tx_id = path.into_inner();
    let status = phonepe.check_payment_status(&merchant_tx_id).await.map_err(ServerError::from)?;
    let update = gateway_update_from_status(&status);
    let (derived, _) = derive_payment_status(&update.state, update.response_code.as_deref());
    let order_status = if derived == PaymentStatusType::Pending {
        None
    } else {
        match api.apply_gateway_update(update).await {
            Ok(order) => Some(order.status),
            Err(e) => {
                warn!("💻️ Could not reconcile order for [{merchant_tx_id}] after status poll. {e}");
                None
            },
        }
    };
    Ok(HttpResponse::Ok().json(PaymentStatusResponse {
        success: true,
        merchant_tx_id: status.merchant_tx_id,
        state: status.state,
        response_code: status.response_code,
        order_status,
    }))
}

fn gateway_update_from_status(status: &ProviderStatus) -> GatewayUpdate {
    GatewayUpdate {
        merchant_tx_id: status.merchant_tx_id.clone(),
        provider_tx_id: status.provider_tx_id.clone(),
        state: GatewayState::from(status.state.as_str()),
        response_code: status.response_code.clone(),
        amount: status.amount.and_then(|rupees| Paise::from_rupees(rupees).ok()),
        raw_response: status.raw.to_string(),
    }
}

//----------------------------------------------   Webhook  ----------------------------------------------------
route!(phonepe_webhook => Post "/phonepe" impl PaymentStoreDatabase);
/// The provider's payment callback. The signature middleware has already verified the raw body by the time this
/// handler runs, so whatever happens here, the response is a 200 acknowledgement: a verified-but-broken payload
/// is our problem to log and chase, not something to make the provider retry forever.
pub async fn phonepe_webhook<B: PaymentStoreDatabase>(
    body: web::Bytes,
    api: web::Data<OrderFlowApi<B>>,
) -> HttpResponse {
    trace!("💻️ Received payment provider callback");
    match decode_callback(&body) {
        Ok(update) => {
            let mtx = update.merchant_tx_id.clone();
            match api.apply_gateway_update(update).await {
                Ok(order) => {
                    info!("💻️ Callback [{mtx}] reconciled. Order {} is {}", order.order_id, order.payment_status)
                },
                Err(e) => warn!("💻️ Could not reconcile callback [{mtx}]. {e}"),
            }
        },
        Err(e) => warn!("💻️ Discarding undecodable callback payload. {e}"),
    }
    HttpResponse::Ok().json(CallbackAck::received())
}

/// The callback body is the provider's response envelope as plain JSON. Some provider stacks wrap the same
/// envelope as `{"response": "<base64>"}` instead, so that shape is accepted as a fallback.
fn decode_callback(body: &[u8]) -> Result<GatewayUpdate, ServerError> {
    let (envelope, raw_response) = match serde_json::from_slice::<ProviderEnvelope>(body) {
        Ok(envelope) => (envelope, String::from_utf8_lossy(body).to_string()),
        Err(_) => {
            let payload: CallbackPayload =
                serde_json::from_slice(body).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
            let decoded =
                base64::decode(&payload.response).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
            let envelope: ProviderEnvelope =
                serde_json::from_slice(&decoded).map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
            let raw_response = String::from_utf8_lossy(&decoded).to_string();
            (envelope, raw_response)
        },
    };
    let data = envelope.data.unwrap_or_default();
    let merchant_tx_id = data
        .merchant_transaction_id
        .ok_or_else(|| ServerError::InvalidRequestBody("Callback carries no merchant transaction id".to_string()))?;
    let state = data.state.as_deref().map(GatewayState::from).unwrap_or(GatewayState::Pending);
    Ok(GatewayUpdate {
        merchant_tx_id,
        provider_tx_id: data.transaction_id,
        state,
        response_code: data.response_code,
        amount: data.amount.map(Paise::from),
        raw_response,
    })
}
