//! VenueHub API Library
//!
//! HTTP handlers, middleware and application setup for the marketplace API.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
mod services;
pub mod setup;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use api_doc::{get_openapi_spec, ApiDoc};
pub use venuehub_infra::ErrorResponse;
