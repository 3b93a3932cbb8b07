// Proxy - the `/api/...` surface forwarding to the curriculum backend

pub mod handlers;
pub mod router;

pub use router::{api_routes, create_api_router};
