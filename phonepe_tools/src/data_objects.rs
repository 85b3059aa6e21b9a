use fpg_common::Paise;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::PhonePeApiError;

/// The decoded payment-initiation envelope. On the wire it travels base64-encoded as `{"request": <base64>}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayRequestEnvelope {
    pub merchant_id: String,
    pub merchant_transaction_id: String,
    pub merchant_user_id: String,
    /// Integer minor units (paise). The rupee conversion happens exactly once, when this envelope is built.
    pub amount: i64,
    pub redirect_url: String,
    pub callback_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    pub payment_instrument: PaymentInstrument,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInstrument {
    #[serde(rename = "type")]
    pub instrument_type: String,
}

impl PaymentInstrument {
    pub fn pay_page() -> Self {
        Self { instrument_type: "PAY_PAGE".to_string() }
    }
}

/// The provider's response envelope, shared by initiation responses, status responses and webhook callbacks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEnvelope {
    pub success: bool,
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<ProviderData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderData {
    #[serde(default)]
    pub merchant_id: Option<String>,
    #[serde(default)]
    pub merchant_transaction_id: Option<String>,
    /// The provider's own transaction id, distinct from the merchant transaction id we generate.
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Integer minor units (paise).
    #[serde(default)]
    pub amount: Option<i64>,
    /// The gateway's state enum, e.g. COMPLETED, FAILED, PENDING.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub response_code: Option<String>,
    #[serde(default)]
    pub instrument_response: Option<InstrumentResponse>,
    #[serde(default)]
    pub payment_instrument: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentResponse {
    #[serde(rename = "type")]
    pub instrument_type: String,
    #[serde(default)]
    pub redirect_info: Option<RedirectInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectInfo {
    pub url: String,
    #[serde(default)]
    pub method: Option<String>,
}

/// The result of a successful payment initiation. The caller is responsible for persisting the merchant
/// transaction id against the order.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentInitiation {
    pub merchant_tx_id: String,
    pub redirect_url: String,
    pub provider_tx_id: Option<String>,
}

/// A parsed status-check result. `amount` has been converted back to decimal rupees — the only place the
/// minor-unit conversion happens on the response path. `raw` carries the untouched provider payload for audit.
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub merchant_tx_id: String,
    pub provider_tx_id: Option<String>,
    pub state: String,
    pub response_code: Option<String>,
    pub amount: Option<f64>,
    pub raw: Value,
}

impl ProviderStatus {
    pub fn from_raw(merchant_tx_id: &str, raw: Value) -> Result<Self, PhonePeApiError> {
        let envelope: ProviderEnvelope =
            serde_json::from_value(raw.clone()).map_err(|e| PhonePeApiError::JsonError(e.to_string()))?;
        let data = envelope.data.unwrap_or_default();
        let merchant_tx_id = data.merchant_transaction_id.unwrap_or_else(|| merchant_tx_id.to_string());
        let amount = data.amount.map(|paise| Paise::from(paise).to_rupees());
        Ok(Self {
            merchant_tx_id,
            provider_tx_id: data.transaction_id,
            state: data.state.unwrap_or_else(|| "PENDING".to_string()),
            response_code: data.response_code,
            amount,
            raw,
        })
    }
}
