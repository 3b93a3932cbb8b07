use std::sync::Arc;

use crate::{
    config::Config,
    infrastructure::{BackendClient, RateLimiter},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: BackendClient,
    /// `None` when no limit is configured.
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let backend = BackendClient::new(&config.backend);
        let rate_limiter = config
            .rate_limit
            .requests_per_minute
            .map(|limit| Arc::new(RateLimiter::per_minute(limit)));

        Self {
            config: Arc::new(config),
            backend,
            rate_limiter,
        }
    }
}
