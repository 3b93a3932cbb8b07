// Rate limiting - fixed window per client, keyed by x-forwarded-for or the
// peer address. Disabled unless a limit is configured.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio::sync::RwLock;
use tracing::warn;

use crate::app_state::AppState;
use crate::error::AppError;

pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Debug)]
pub struct RateLimiter {
    limit: u32,
    interval: Duration,
    windows: Arc<RwLock<HashMap<String, RateLimitWindow>>>,
}

#[derive(Debug)]
struct RateLimitWindow {
    requests: u32,
    window_start: Instant,
}

impl RateLimiter {
    pub fn new(limit: u32, interval: Duration) -> Self {
        Self {
            limit,
            interval,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn per_minute(limit: u32) -> Self {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Count a request from `client`; `false` once the window is exhausted.
    pub async fn check(&self, client: &str) -> bool {
        self.check_at(client, Instant::now()).await
    }

    /// Count a request at `now`. Windows that have expired for every client
    /// are dropped first, so the table only holds clients seen this interval.
    pub async fn check_at(&self, client: &str, now: Instant) -> bool {
        let mut windows = self.windows.write().await;
        windows.retain(|_, w| now.saturating_duration_since(w.window_start) <= self.interval);
        let window = windows.entry(client.to_string()).or_insert(RateLimitWindow {
            requests: 0,
            window_start: now,
        });

        if now.saturating_duration_since(window.window_start) > self.interval {
            window.requests = 0;
            window.window_start = now;
        }

        window.requests = window.requests.saturating_add(1);
        window.requests <= self.limit
    }

    /// Number of clients with a live window.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.len()
    }
}

fn client_key(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return forwarded.to_string();
    }
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit_middleware(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(limiter) = &state.rate_limiter {
        let client = client_key(&request);
        if !limiter.check(&client).await {
            warn!("Rate limit exceeded for {}", client);
            return AppError::TooManyRequests(RATE_LIMIT_MESSAGE.to_string()).into_response();
        }
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_window_limits_and_resets() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.check_at("1.2.3.4", start).await);
        assert!(limiter.check_at("1.2.3.4", start).await);
        assert!(!limiter.check_at("1.2.3.4", start).await);
        assert!(limiter.check_at("5.6.7.8", start).await);
        assert!(limiter.check_at("1.2.3.4", start + Duration::from_secs(61)).await);
    }

    #[tokio::test]
    async fn test_expired_windows_are_pruned() {
        let limiter = RateLimiter::new(5, Duration::from_secs(60));
        let start = Instant::now();
        for i in 0..100 {
            assert!(limiter.check_at(&format!("10.0.0.{i}"), start).await);
        }
        assert_eq!(limiter.tracked_clients().await, 100);

        assert!(limiter.check_at("10.0.1.1", start + Duration::from_secs(30)).await);
        assert_eq!(limiter.tracked_clients().await, 101);

        assert!(limiter.check_at("10.0.1.2", start + Duration::from_secs(61)).await);
        assert_eq!(limiter.tracked_clients().await, 2);
        assert!(limiter.check_at("10.0.1.2", start + Duration::from_secs(200)).await);
        assert_eq!(limiter.tracked_clients().await, 1);
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        let request = Request::builder()
            .header("x-forwarded-for", "10.0.0.1, 10.0.0.2")
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "10.0.0.1");

        let bare = Request::builder().body(axum::body::Body::empty()).unwrap();
        assert_eq!(client_key(&bare), "unknown");
    }
}
