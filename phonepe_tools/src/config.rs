use std::str::FromStr;

use fpg_common::Secret;
use log::*;

use crate::PhonePeApiError;

const SANDBOX_BASE_URL: &str = "https://api-preprod.phonepe.com/apis/pg-sandbox";
const PRODUCTION_BASE_URL: &str = "https://api.phonepe.com/apis/hermes";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhonePeEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl PhonePeEnvironment {
    pub fn base_url(&self) -> &'static str {
        match self {
            PhonePeEnvironment::Sandbox => SANDBOX_BASE_URL,
            PhonePeEnvironment::Production => PRODUCTION_BASE_URL,
        }
    }
}

impl FromStr for PhonePeEnvironment {
    type Err = PhonePeApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "preprod" | "test" => Ok(Self::Sandbox),
            "production" | "prod" | "live" => Ok(Self::Production),
            other => Err(PhonePeApiError::Configuration(format!("Unknown PhonePe environment: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PhonePeConfig {
    pub merchant_id: String,
    pub api_key: Secret<String>,
    pub salt_key: Secret<String>,
    pub salt_index: u8,
    pub environment: PhonePeEnvironment,
    /// The publicly reachable URL the provider posts payment-status callbacks to.
    pub callback_url: String,
}

impl PhonePeConfig {
    pub fn new_from_env_or_default() -> Self {
        let merchant_id = std::env::var("FPG_PHONEPE_MERCHANT_ID").unwrap_or_else(|_| {
            error!("💳️ FPG_PHONEPE_MERCHANT_ID is not set. Payment initiation will be refused until it is.");
            String::default()
        });
        let api_key = Secret::new(std::env::var("FPG_PHONEPE_API_KEY").unwrap_or_else(|_| {
            error!("💳️ FPG_PHONEPE_API_KEY is not set. Payment initiation will be refused until it is.");
            String::default()
        }));
        let salt_key = Secret::new(std::env::var("FPG_PHONEPE_SALT_KEY").unwrap_or_else(|_| {
            error!("💳️ FPG_PHONEPE_SALT_KEY is not set. Requests cannot be signed until it is.");
            String::default()
        }));
        let salt_index = std::env::var("FPG_PHONEPE_SALT_INDEX")
            .ok()
            .and_then(|s| {
                s.parse::<u8>()
                    .map_err(|e| warn!("💳️ Invalid FPG_PHONEPE_SALT_INDEX ({s}). {e}. Using 1."))
                    .ok()
            })
            .unwrap_or(1);
        let environment = std::env::var("FPG_PHONEPE_ENV")
            .ok()
            .and_then(|s| {
                PhonePeEnvironment::from_str(&s)
                    .map_err(|e| warn!("💳️ {e}. Using the sandbox environment."))
                    .ok()
            })
            .unwrap_or_default();
        let callback_url = std::env::var("FPG_PHONEPE_CALLBACK_URL").unwrap_or_else(|_| {
            error!("💳️ FPG_PHONEPE_CALLBACK_URL is not set. Payment initiation will be refused until it is.");
            String::default()
        });
        Self { merchant_id, api_key, salt_key, salt_index, environment, callback_url }
    }

    /// The pre-flight configuration gate. Every payment operation calls this first so that a missing credential
    /// surfaces as a clear configuration error rather than an opaque provider rejection.
    pub fn validate(&self) -> Result<(), PhonePeApiError> {
        let mut missing = Vec::new();
        if self.merchant_id.is_empty() {
            missing.push("merchant_id");
        }
        if self.api_key.reveal().is_empty() {
            missing.push("api_key");
        }
        if self.salt_key.reveal().is_empty() {
            missing.push("salt_key");
        }
        if self.callback_url.is_empty() {
            missing.push("callback_url");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(PhonePeApiError::Configuration(format!("Missing values: {}", missing.join(", "))))
        }
    }

    pub fn is_configured(&self) -> bool {
        self.validate().is_ok()
    }
}
