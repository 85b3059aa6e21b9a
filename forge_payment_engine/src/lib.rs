//! # Forge Payment Engine
//!
//! The engine owns the order store and the payment reconciliation rules for the Forge storefront. It knows nothing
//! about HTTP or about any particular payment provider's wire format; the server crate normalises provider payloads
//! into [`db_types::GatewayUpdate`] values and hands them to the [`OrderFlowApi`].
//!
//! Storage backends implement the [`traits::PaymentStoreDatabase`] trait. The only backend shipped today is
//! [`SqliteDatabase`], behind the (default) `sqlite` feature.

pub mod db_types;
pub mod order_objects;
pub mod traits;

mod fpe_api;
pub use fpe_api::{derive_payment_status, OrderFlowApi};

#[cfg(feature = "sqlite")]
pub mod sqlite;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
