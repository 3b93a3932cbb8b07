// Infrastructure - outbound backend client and HTTP middleware
pub mod backend_client; // JSON client for the curriculum backend
pub mod middleware;     // Bearer extraction and rate limiting

pub use backend_client::{BackendClient, BackendResponse, ForwardRequest};
pub use middleware::{rate_limit_middleware, BearerToken, RateLimiter};
