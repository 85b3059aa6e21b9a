//! # Forge Payment Gateway server
//! This module hosts the HTTP surface of the gateway. It is responsible for:
//! Accepting storefront checkouts and order lookups.
//! Initiating pay-page payments and polling their status.
//! Verifying and reconciling the provider's payment callbacks.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/api/...`: Order and payment routes for the storefront.
//! * `/webhook/phonepe`: The signed callback route for the payment provider.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
