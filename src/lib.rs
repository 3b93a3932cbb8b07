// Curriculum Console - admin console over the educational content hierarchy

// Core types and primitives
pub mod core;

// Records, list engine and console view-models
pub mod models;
pub mod listing;
pub mod console;

// Data access and authoring
pub mod session;
pub mod repository;
pub mod question;
pub mod data_seeder;

// HTTP surface
pub mod infrastructure;
pub mod proxy;
pub mod app_state;
pub mod config;

// Common utilities
pub mod error;

// Re-exports for convenience
pub use error::{AppError, AppResult};
