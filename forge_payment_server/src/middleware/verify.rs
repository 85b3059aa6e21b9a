//! Callback signature middleware for Actix Web.
//!
//! The payment provider signs every callback it posts: the `X-VERIFY` header carries
//! `hex(sha256(rawBody + saltKey))###saltIndex`. This middleware extracts the raw request body *before* any JSON
//! parsing, validates the signature, and re-injects the payload for the route handler on success. A missing or
//! invalid signature is a 401 and the handler is never invoked, so an unverified body can never reach the
//! reconciler.

use std::{
    future::{ready, Ready},
    rc::Rc,
};

use actix_http::h1;
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ErrorBadRequest,
    web,
    Error,
};
use fpg_common::Secret;
use futures::future::LocalBoxFuture;
use log::{trace, warn};

use crate::{errors::ServerError, helpers::check_x_verify};

const X_VERIFY_HEADER: &str = "X-VERIFY";

pub struct XVerifyMiddlewareFactory {
    salt_key: Secret<String>,
    salt_index: u8,
}

impl XVerifyMiddlewareFactory {
    pub fn new(salt_key: Secret<String>, salt_index: u8) -> Self {
        XVerifyMiddlewareFactory { salt_key, salt_index }
    }
}

impl<S, B> Transform<S, ServiceRequest> for XVerifyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = XVerifyMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(XVerifyMiddlewareService {
            salt_key: self.salt_key.clone(),
            salt_index: self.salt_index,
            service: Rc::new(service),
        }))
    }
}

pub struct XVerifyMiddlewareService<S> {
    salt_key: Secret<String>,
    salt_index: u8,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for XVerifyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let salt_key = self.salt_key.reveal().clone();
        let salt_index = self.salt_index;
        Box::pin(async move {
            trace!("🔐️ Checking callback signature for request");
            let header = req
                .headers()
                .get(X_VERIFY_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .ok_or_else(|| {
                    warn!("🔐️ No X-VERIFY header found in callback. Denying access.");
                    Error::from(ServerError::InvalidCallbackSignature)
                })?;
            let data = req.extract::<web::Bytes>().await.map_err(|e| {
                warn!("🔐️ Failed to extract request data: {:?}", e);
                ErrorBadRequest("Failed to extract request data.")
            })?;
            if check_x_verify(&header, data.as_ref(), &salt_key, salt_index) {
                trace!("🔐️ Callback signature check ✅️");
                req.set_payload(bytes_to_payload(data));
                service.call(req).await
            } else {
                warn!("🔐️ Invalid X-VERIFY signature found in callback. Denying access.");
                Err(Error::from(ServerError::InvalidCallbackSignature))
            }
        })
    }
}

fn bytes_to_payload(buf: web::Bytes) -> Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    Payload::from(pl)
}
