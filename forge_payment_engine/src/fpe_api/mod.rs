mod order_flow_api;

pub use order_flow_api::{derive_payment_status, OrderFlowApi};
