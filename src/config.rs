use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub listing: ListingConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Origin plus API prefix; always ends with a `/`.
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub page_size: usize,
    pub search_debounce_ms: u64,
    pub auth_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// `None` disables the limiter.
    pub requests_per_minute: Option<u32>,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            search_debounce_ms: 500,
            auth_timeout_ms: 5000,
        }
    }
}

impl ListingConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_millis(self.auth_timeout_ms)
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = env::var("BACKEND_URL")
            .or_else(|_| env::var("SERVER_BASE_URL"))
            .unwrap_or_else(|_| "http://localhost:8000/api/v1/".to_string());

        let defaults = ListingConfig::default();

        Ok(Self {
            backend: BackendConfig {
                base_url: normalize_base_url(&base_url)?,
                api_key: env::var("API_KEY").ok().filter(|key| !key.is_empty()),
            },
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            listing: ListingConfig {
                page_size: env::var("DEFAULT_PAGE_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|size| *size > 0)
                    .unwrap_or(defaults.page_size),
                search_debounce_ms: env::var("SEARCH_DEBOUNCE_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.search_debounce_ms),
                auth_timeout_ms: env::var("AUTH_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.auth_timeout_ms),
            },
            rate_limit: RateLimitConfig {
                requests_per_minute: env::var("RATE_LIMIT_PER_MINUTE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|limit| *limit > 0),
            },
        })
    }

    /// Config pointing at an explicit backend, used by tests and tools.
    pub fn for_backend(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            backend: BackendConfig {
                base_url: normalize_base_url(base_url)?,
                api_key: None,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            listing: ListingConfig::default(),
            rate_limit: RateLimitConfig {
                requests_per_minute: None,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn search_debounce(&self) -> Duration {
        self.listing.search_debounce()
    }

    pub fn auth_timeout(&self) -> Duration {
        self.listing.auth_timeout()
    }
}

fn normalize_base_url(raw: &str) -> anyhow::Result<String> {
    let trimmed = raw.trim();
    // The backend client speaks plain HTTP/1; TLS is terminated in front of it.
    if !trimmed.starts_with("http://") {
        anyhow::bail!("backend url must use http://: {}", trimmed);
    }
    if trimmed.ends_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}/", trimmed))
    }
}
