use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use fpg_common::Paise;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

//--------------------------------------        OrderId        -------------------------------------------------------
/// The order's public token, assigned by the store on creation.
///
/// Order ids never contain underscores, so the order id embedded as a merchant-transaction-id prefix can always be
/// recovered with a simple split on the first `_`.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(String);

#[derive(Debug, Clone, Error)]
#[error("Invalid order id: {0}")]
pub struct InvalidOrderId(String);

const ORDER_ID_CHARSET: &[u8] = b"0123456789abcdefghjkmnpqrstvwxyz";
const ORDER_ID_LEN: usize = 10;

impl OrderId {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, InvalidOrderId> {
        let value = value.into();
        if value.is_empty() {
            return Err(InvalidOrderId("order ids must not be empty".to_string()));
        }
        if value.contains('_') {
            return Err(InvalidOrderId(format!("order ids must not contain underscores: {value}")));
        }
        Ok(Self(value))
    }

    /// Generate a fresh underscore-free token.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let token: String =
            (0..ORDER_ID_LEN).map(|_| ORDER_ID_CHARSET[rng.gen_range(0..ORDER_ID_CHARSET.len())] as char).collect();
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = InvalidOrderId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------   OrderStatusType     -------------------------------------------------------
/// The business lifecycle state of an order. Distinct from [`PaymentStatusType`]: an order can be `Pending` with a
/// failed payment (awaiting a retry), and fulfilment states are only ever set by an admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// Created by checkout; payment not (successfully) completed yet.
    Pending,
    /// Payment reconciled as successful.
    Confirmed,
    Shipped,
    Completed,
    Cancelled,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "Pending"),
            OrderStatusType::Confirmed => write!(f, "Confirmed"),
            OrderStatusType::Shipped => write!(f, "Shipped"),
            OrderStatusType::Completed => write!(f, "Completed"),
            OrderStatusType::Cancelled => write!(f, "Cancelled"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid order status: {0}")]
pub struct ConversionError(String);

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Shipped" => Ok(Self::Shipped),
            "Completed" => Ok(Self::Completed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------  PaymentStatusType    -------------------------------------------------------
/// Set only by the reconciler. `Pending → Success` and `Pending → Failed` are the only forward transitions;
/// `Success` is terminal and nothing ever regresses to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatusType {
    Pending,
    Success,
    Failed,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Pending => write!(f, "PENDING"),
            PaymentStatusType::Success => write!(f, "SUCCESS"),
            PaymentStatusType::Failed => write!(f, "FAILED"),
        }
    }
}

//--------------------------------------    PaymentMethod      -------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Card,
    Wallet,
    Netbanking,
    Cod,
    Paypage,
}

//--------------------------------------     GatewayState      -------------------------------------------------------
/// The payment provider's own status enum, as reported in status envelopes and webhook callbacks.
/// Parsing never fails: unrecognised states are carried through as [`GatewayState::Other`] and reconcile to
/// `PENDING`, so a new provider state cannot corrupt an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayState {
    Completed,
    Failed,
    Pending,
    Other(String),
}

impl From<&str> for GatewayState {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "COMPLETED" => Self::Completed,
            "FAILED" => Self::Failed,
            "PENDING" => Self::Pending,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl Display for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayState::Completed => write!(f, "COMPLETED"),
            GatewayState::Failed => write!(f, "FAILED"),
            GatewayState::Pending => write!(f, "PENDING"),
            GatewayState::Other(s) => write!(f, "{s}"),
        }
    }
}

//--------------------------------------     GatewayUpdate     -------------------------------------------------------
/// A gateway status envelope, normalised for reconciliation. Built by the server from either a verified webhook
/// callback or a status-poll response; the reconciler treats both identically.
#[derive(Debug, Clone)]
pub struct GatewayUpdate {
    pub merchant_tx_id: String,
    pub provider_tx_id: Option<String>,
    pub state: GatewayState,
    pub response_code: Option<String>,
    pub amount: Option<Paise>,
    /// The full raw provider payload, persisted against the order for audit.
    pub raw_response: String,
}

//--------------------------------------      LineItem         -------------------------------------------------------
/// A catalog snapshot taken at order-creation time, not a live reference to a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    /// Unit price in paise.
    pub price: Paise,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl LineItem {
    /// The item's contribution to the order total. Saturates at [`Paise::MAX`] on absurd prices or quantities;
    /// order validation rejects saturated totals.
    pub fn line_total(&self) -> Paise {
        self.price * i64::from(self.quantity.unwrap_or(1))
    }
}

//--------------------------------------    CustomerInfo       -------------------------------------------------------
/// Contact and shipping details captured at checkout. Every field is optional here; the HTTP layer enforces
/// whatever presence and format rules apply to a given endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address_line1: Option<String>,
    #[serde(default)]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub pincode: Option<String>,
    /// Tax-invoice field.
    #[serde(default)]
    pub gstin: Option<String>,
}

//--------------------------------------        Order          -------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub order_id: OrderId,
    #[sqlx(json)]
    pub customer: CustomerInfo,
    #[sqlx(json)]
    pub items: Vec<LineItem>,
    pub total_price: Paise,
    pub status: OrderStatusType,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: PaymentStatusType,
    pub merchant_tx_id: Option<String>,
    pub payment_response: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder        -------------------------------------------------------
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub items: Vec<LineItem>,
    pub customer: CustomerInfo,
    pub payment_method: Option<PaymentMethod>,
    pub total_price: Paise,
}

impl NewOrder {
    pub fn new(items: Vec<LineItem>, customer: CustomerInfo, payment_method: Option<PaymentMethod>) -> Self {
        let total_price = items.iter().map(LineItem::line_total).sum();
        Self { items, customer, payment_method, total_price }
    }
}

//--------------------------------------    PaymentUpdate      -------------------------------------------------------
/// The reconciler's full-overwrite update. Repeated application of the same update is a no-op by construction:
/// there are no increments or merges here (see the concurrency notes on [`crate::OrderFlowApi`]).
#[derive(Debug, Clone)]
pub struct PaymentUpdate {
    pub payment_status: PaymentStatusType,
    pub merchant_tx_id: String,
    pub payment_response: String,
    /// Only set on successful payments (`confirmed`); `None` leaves the order's lifecycle state untouched.
    pub new_order_status: Option<OrderStatusType>,
}

//--------------------------------------  FulfillmentUpdate    -------------------------------------------------------
/// An admin-driven update to the order lifecycle and tracking fields. Payment fields are out of reach by design.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FulfillmentUpdate {
    pub new_status: Option<OrderStatusType>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
}

impl FulfillmentUpdate {
    pub fn is_empty(&self) -> bool {
        self.new_status.is_none() && self.tracking_number.is_none() && self.tracking_url.is_none()
    }
}
