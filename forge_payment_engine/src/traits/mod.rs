//! The traits that define the interface between the payment engine and its storage backend.
//!
//! Backends implement [`PaymentStoreDatabase`]; the business logic in [`crate::OrderFlowApi`] is written against
//! the trait alone, so a backend swap never touches reconciliation semantics.

mod data_objects;
mod payment_store_database;

pub use data_objects::PaymentStoreError;
pub use payment_store_database::PaymentStoreDatabase;
