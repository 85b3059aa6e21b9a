use thiserror::Error;

#[derive(Debug, Error)]
pub enum PhonePeApiError {
    #[error("PhonePe configuration is incomplete: {0}")]
    Configuration(String),
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid payment amount: {0}")]
    InvalidAmount(String),
    #[error("Could not reach the payment provider: {0}")]
    RequestError(String),
    #[error("Invalid response from the payment provider: {0}")]
    ResponseError(String),
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Provider query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Provider rejected the request. {code}. {message}")]
    ProviderError { code: String, message: String },
}
