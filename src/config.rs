//! Env-driven configuration for the server, the CLI and the Gemini client.
//!
//! Values are read from the process environment; `dotenv` is loaded on demand
//! by the binaries. Defaults are provided for convenience during development.
use std::env;
use std::net::{IpAddr, SocketAddr};

pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_url: String,
    pub gemini_model: String,
    pub prompt_template: Option<String>,
    pub api_host: String,
    pub api_port: String,
}

impl Config {
    pub fn dotenv_load() {
        dotenv::dotenv().ok();
    }

    pub fn new() -> Result<Self, env::VarError> {
        Ok(Config {
            gemini_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            gemini_url: env::var("GEMINI_URL").unwrap_or_else(|_| DEFAULT_GEMINI_URL.to_string()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            prompt_template: env::var("ICON_PROMPT_TEMPLATE").ok().filter(|t| !t.trim().is_empty()),
            api_host: env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            api_port: env::var("API_PORT").unwrap_or_else(|_| "8189".to_string()),
        })
    }

    /// Resolve `api_host`/`api_port`, falling back to 127.0.0.1:8189 on bad input.
    pub fn socket_address(&self) -> SocketAddr {
        let ip: IpAddr = self.api_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid API_HOST '{}', falling back to 127.0.0.1", self.api_host);
            IpAddr::from([127, 0, 0, 1])
        });
        let port: u16 = self.api_port.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid API_PORT '{}', falling back to 8189", self.api_port);
            8189
        });
        SocketAddr::new(ip, port)
    }

    pub fn print_env_vars() {
        let key_state = match env::var("GEMINI_API_KEY") {
            Ok(k) if !k.is_empty() => "<set>",
            _ => "<unset>",
        };
        println!("GEMINI_API_KEY: {}", key_state);
        println!("GEMINI_URL: {}", env::var("GEMINI_URL").unwrap_or_else(|_| "<unset>".to_string()));
        println!("GEMINI_MODEL: {}", env::var("GEMINI_MODEL").unwrap_or_else(|_| "<unset>".to_string()));
        println!("ICON_PROMPT_TEMPLATE: {}", env::var("ICON_PROMPT_TEMPLATE").map(|_| "<set>".to_string()).unwrap_or_else(|_| "<unset>".to_string()));
        println!("API_HOST: {}", env::var("API_HOST").unwrap_or_else(|_| "<unset>".to_string()));
        println!("API_PORT: {}", env::var("API_PORT").unwrap_or_else(|_| "<unset>".to_string()));
    }
}
