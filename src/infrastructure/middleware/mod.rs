pub mod bearer_extractor;
pub mod rate_limit;

pub use bearer_extractor::BearerToken;
pub use rate_limit::{rate_limit_middleware, RateLimiter};
