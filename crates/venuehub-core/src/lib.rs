//! VenueHub Core Library
//!
//! This crate provides core domain models, error types, configuration, and validation
//! that are shared across all VenueHub components.

pub mod config;
pub mod encryption;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, RateLimitRule, RateLimitSettings, VenueHubConfig};
pub use encryption::EncryptionService;
pub use error::{AppError, ErrorMetadata, LogLevel};
