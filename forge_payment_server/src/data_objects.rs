use std::fmt::Display;

use forge_payment_engine::db_types::{CustomerInfo, LineItem, OrderStatusType, PaymentMethod};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// A storefront checkout. The total is always recomputed server-side from the line items.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderParams {
    pub items: Vec<LineItem>,
    pub customer: CustomerInfo,
    #[serde(default)]
    pub payment: PaymentParams,
}

/// The checkout's `payment` block. Only the method is taken from the client; amounts always come from the
/// line items.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentParams {
    #[serde(default)]
    pub method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderSearchParams {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInitRequest {
    pub order_id: String,
    /// Where the provider's pay page sends the customer's browser afterwards.
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentInitResponse {
    pub success: bool,
    pub redirect_url: String,
    pub transaction_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentStatusResponse {
    pub success: bool,
    pub merchant_tx_id: String,
    pub state: String,
    pub response_code: Option<String>,
    /// Present when the referenced order could be loaded after reconciliation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_status: Option<OrderStatusType>,
}

/// The alternative webhook body shape: the response envelope base64-encoded under a `response` key.
/// The primary shape is the envelope itself as plain JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackPayload {
    pub response: String,
}

/// The webhook always acknowledges receipt once the signature has passed, whatever happens downstream,
/// so the provider never retries into a verified-but-unprocessable payload.
#[derive(Debug, Clone, Serialize)]
pub struct CallbackAck {
    pub success: bool,
    pub code: &'static str,
}

impl CallbackAck {
    pub fn received() -> Self {
        Self { success: true, code: "CALLBACK_RECEIVED" }
    }
}
