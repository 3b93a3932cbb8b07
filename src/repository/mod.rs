// Repositories: one per entity collection, plus many-to-many link stores

pub mod http;
pub mod memory;
pub mod traits;

pub use http::{HttpLinks, HttpRepository};
pub use memory::{InMemoryLinks, InMemoryRepository};
pub use traits::{EntityRepository, LinkRepository, ListRequest};
