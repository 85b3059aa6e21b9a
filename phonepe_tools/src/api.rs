use std::{sync::Arc, time::Duration};

use fpg_common::Paise;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde_json::Value;

use crate::{
    config::PhonePeConfig,
    data_objects::{PaymentInitiation, PaymentInstrument, PayRequestEnvelope, ProviderEnvelope, ProviderStatus},
    helpers::{new_merchant_tx_id, x_verify},
    PhonePeApiError,
};

/// Outbound calls carry no explicit cancellation; the client-wide timeout bounds how long a provider call can hang.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PAY_PATH: &str = "/pg/v1/pay";
const STATUS_PATH: &str = "/pg/v1/status";

#[derive(Debug, Clone)]
pub struct InitiatePaymentParams {
    pub order_id: String,
    /// Decimal rupees. Converted to paise exactly once, when the request envelope is built.
    pub amount: f64,
    pub redirect_url: String,
    /// Overrides the configured callback URL when set.
    pub callback_url: Option<String>,
    pub user_phone: Option<String>,
    pub user_name: Option<String>,
}

#[derive(Clone)]
pub struct PhonePeApi {
    config: PhonePeConfig,
    client: Arc<Client>,
}

impl PhonePeApi {
    pub fn new(config: PhonePeConfig) -> Result<Self, PhonePeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PhonePeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &PhonePeConfig {
        &self.config
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.environment.base_url())
    }

    /// Ask the provider for a pay-page redirect for the given order.
    ///
    /// Generates a fresh merchant transaction id for this attempt. The caller must persist the returned
    /// `merchant_tx_id` against the order; this method does not touch any store.
    pub async fn initiate_payment(&self, params: InitiatePaymentParams) -> Result<PaymentInitiation, PhonePeApiError> {
        self.config.validate()?;
        let merchant_tx_id = new_merchant_tx_id(&params.order_id);
        let envelope = self.build_pay_envelope(&params, &merchant_tx_id)?;
        let payload =
            base64::encode(serde_json::to_vec(&envelope).map_err(|e| PhonePeApiError::JsonError(e.to_string()))?);
        let signature = x_verify(&payload, self.config.salt_key.reveal(), self.config.salt_index);
        debug!("💳️ Initiating payment for order {} as {merchant_tx_id}", params.order_id);
        let response = self
            .client
            .post(self.url(PAY_PATH))
            .header("X-VERIFY", signature)
            .header("X-MERCHANT-ID", &self.config.merchant_id)
            .json(&serde_json::json!({ "request": payload }))
            .send()
            .await
            .map_err(|e| PhonePeApiError::RequestError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PhonePeApiError::RequestError(e.to_string()))?;
            return Err(PhonePeApiError::QueryError { status, message });
        }
        let envelope =
            response.json::<ProviderEnvelope>().await.map_err(|e| PhonePeApiError::JsonError(e.to_string()))?;
        if !envelope.success {
            return Err(PhonePeApiError::ProviderError {
                code: envelope.code,
                message: envelope.message.unwrap_or_default(),
            });
        }
        let data = envelope.data.unwrap_or_default();
        let redirect_url = data
            .instrument_response
            .and_then(|ir| ir.redirect_info)
            .map(|ri| ri.url)
            .ok_or_else(|| PhonePeApiError::ResponseError("No redirect URL in pay-page response".to_string()))?;
        info!("💳️ Payment initiated for order {}. Pay page at {redirect_url}", params.order_id);
        Ok(PaymentInitiation { merchant_tx_id, redirect_url, provider_tx_id: data.transaction_id })
    }

    /// Query the provider for the current state of a payment attempt.
    ///
    /// Returns the provider's envelope as-is (plus the rupee conversion); mapping gateway states onto order
    /// fields is the reconciler's job.
    pub async fn check_payment_status(&self, merchant_tx_id: &str) -> Result<ProviderStatus, PhonePeApiError> {
        self.config.validate()?;
        let path = format!("{STATUS_PATH}/{}/{merchant_tx_id}", self.config.merchant_id);
        // Status checks carry no body, so the signature covers the empty payload.
        let signature = x_verify("", self.config.salt_key.reveal(), self.config.salt_index);
        trace!("💳️ Checking payment status for {merchant_tx_id}");
        let response = self
            .client
            .get(self.url(&path))
            .header("X-VERIFY", signature)
            .header("X-MERCHANT-ID", &self.config.merchant_id)
            .send()
            .await
            .map_err(|e| PhonePeApiError::RequestError(e.to_string()))?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.map_err(|e| PhonePeApiError::RequestError(e.to_string()))?;
            return Err(PhonePeApiError::QueryError { status, message });
        }
        let raw = response.json::<Value>().await.map_err(|e| PhonePeApiError::JsonError(e.to_string()))?;
        let status = ProviderStatus::from_raw(merchant_tx_id, raw)?;
        debug!("💳️ Status for {merchant_tx_id}: {}", status.state);
        Ok(status)
    }

    fn build_pay_envelope(
        &self,
        params: &InitiatePaymentParams,
        merchant_tx_id: &str,
    ) -> Result<PayRequestEnvelope, PhonePeApiError> {
        if params.amount <= 0.0 {
            return Err(PhonePeApiError::InvalidAmount(format!(
                "Payment amount must be positive, got {}",
                params.amount
            )));
        }
        let amount = Paise::from_rupees(params.amount).map_err(|e| PhonePeApiError::InvalidAmount(e.to_string()))?;
        let merchant_user_id =
            params.user_name.clone().unwrap_or_else(|| format!("guest-{}", params.order_id));
        Ok(PayRequestEnvelope {
            merchant_id: self.config.merchant_id.clone(),
            merchant_transaction_id: merchant_tx_id.to_string(),
            merchant_user_id,
            amount: amount.value(),
            redirect_url: params.redirect_url.clone(),
            callback_url: params.callback_url.clone().unwrap_or_else(|| self.config.callback_url.clone()),
            mobile_number: params.user_phone.clone(),
            payment_instrument: PaymentInstrument::pay_page(),
        })
    }
}

#[cfg(test)]
mod test {
    use fpg_common::Secret;

    use super::*;
    use crate::PhonePeEnvironment;

    fn api() -> PhonePeApi {
        let config = PhonePeConfig {
            merchant_id: "MERCHANTUAT".into(),
            api_key: Secret::new("key".into()),
            salt_key: Secret::new("salt".into()),
            salt_index: 1,
            environment: PhonePeEnvironment::Sandbox,
            callback_url: "https://shop.example.com/webhook/phonepe".into(),
        };
        PhonePeApi::new(config).unwrap()
    }

    fn params() -> InitiatePaymentParams {
        InitiatePaymentParams {
            order_id: "482".into(),
            amount: 250.50,
            redirect_url: "https://shop.example.com/payment/done".into(),
            callback_url: None,
            user_phone: Some("9876543210".into()),
            user_name: None,
        }
    }

    #[test]
    fn envelope_encodes_minor_units() {
        let envelope = api().build_pay_envelope(&params(), "482_1699999999999_a1b2c3d4").unwrap();
        assert_eq!(envelope.amount, 25050);
        assert_eq!(envelope.merchant_transaction_id, "482_1699999999999_a1b2c3d4");
        assert_eq!(envelope.merchant_user_id, "guest-482");
        assert_eq!(envelope.callback_url, "https://shop.example.com/webhook/phonepe");
    }

    #[test]
    fn non_positive_amounts_are_rejected_before_any_network_call() {
        let mut p = params();
        p.amount = 0.0;
        assert!(matches!(api().build_pay_envelope(&p, "482_1_aa"), Err(PhonePeApiError::InvalidAmount(_))));
        p.amount = -10.0;
        assert!(matches!(api().build_pay_envelope(&p, "482_1_aa"), Err(PhonePeApiError::InvalidAmount(_))));
    }

    #[test]
    fn urls_are_keyed_on_environment() {
        let api = api();
        assert_eq!(api.url("/pg/v1/pay"), "https://api-preprod.phonepe.com/apis/pg-sandbox/pg/v1/pay");
    }
}
