use thiserror::Error;

use crate::db_types::OrderId;

#[derive(Debug, Clone, Error)]
pub enum PaymentStoreError {
    #[error("Could not complete the database request. {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("Merchant transaction id {0} is already attached to a different order")]
    MerchantTxConflict(String),
    #[error("Invalid order id. {0}")]
    InvalidOrderId(String),
    #[error("Merchant transaction id {0} does not carry an order id prefix")]
    InvalidMerchantTxId(String),
    #[error("Ill-formed query. {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for PaymentStoreError {
    fn from(e: sqlx::Error) -> Self {
        Self::DatabaseError(e.to_string())
    }
}
