use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use forge_payment_engine::traits::PaymentStoreError;
use phonepe_tools::PhonePeApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("Callback signature invalid or not provided")]
    InvalidCallbackSignature,
    #[error("The payment provider rejected the request. {0}")]
    PaymentProviderError(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCallbackSignature => StatusCode::UNAUTHORIZED,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::PaymentProviderError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "success": false, "error": self.to_string() }).to_string())
    }
}

impl From<PaymentStoreError> for ServerError {
    fn from(e: PaymentStoreError) -> Self {
        match e {
            PaymentStoreError::OrderNotFound(id) => Self::NoRecordFound(format!("Order {id}")),
            PaymentStoreError::InvalidOrderId(s) => Self::InvalidRequestPath(s),
            PaymentStoreError::InvalidMerchantTxId(s) => {
                Self::InvalidRequestPath(format!("Malformed merchant transaction id: {s}"))
            },
            PaymentStoreError::MerchantTxConflict(s) => {
                Self::BackendError(format!("Merchant transaction id {s} is already in use"))
            },
            PaymentStoreError::QueryError(s) => Self::InvalidRequestBody(s),
            PaymentStoreError::DatabaseError(s) => Self::BackendError(s),
        }
    }
}

impl From<PhonePeApiError> for ServerError {
    fn from(e: PhonePeApiError) -> Self {
        match e {
            PhonePeApiError::Configuration(s) => Self::ConfigurationError(s),
            PhonePeApiError::InvalidAmount(s) => Self::InvalidRequestBody(s),
            e => Self::PaymentProviderError(e.to_string()),
        }
    }
}
