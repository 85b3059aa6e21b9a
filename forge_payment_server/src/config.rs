use std::env;

use log::*;
use phonepe_tools::PhonePeConfig;

const DEFAULT_FPG_HOST: &str = "127.0.0.1";
const DEFAULT_FPG_PORT: u16 = 8480;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Payment provider credentials and endpoints. May be incomplete, in which case payment initiation is
    /// refused with a configuration error while the rest of the server keeps working.
    pub phonepe: PhonePeConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FPG_HOST.to_string(),
            port: DEFAULT_FPG_PORT,
            database_url: String::default(),
            phonepe: PhonePeConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FPG_HOST").ok().unwrap_or_else(|| DEFAULT_FPG_HOST.into());
        let port = env::var("FPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for FPG_PORT. {e} Using the default, {DEFAULT_FPG_PORT}, instead."
                    );
                    DEFAULT_FPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_FPG_PORT);
        let database_url = env::var("FPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ FPG_DATABASE_URL is not set. Please set it to the URL for the order store database.");
            String::default()
        });
        let phonepe = PhonePeConfig::new_from_env_or_default();
        Self { host, port, database_url, phonepe }
    }
}
