//! Client for the PhonePe pay-page API.
//!
//! This crate hides request signing and the provider's envelope format from callers. It never touches the order
//! store: persisting transaction ids and reconciling gateway states against orders is the payment engine's job.
mod api;
mod config;
mod error;

mod data_objects;
pub mod helpers;

pub use api::{InitiatePaymentParams, PhonePeApi};
pub use config::{PhonePeConfig, PhonePeEnvironment};
pub use data_objects::{PaymentInitiation, PaymentInstrument, PayRequestEnvelope, ProviderData, ProviderEnvelope, ProviderStatus};
pub use error::PhonePeApiError;
