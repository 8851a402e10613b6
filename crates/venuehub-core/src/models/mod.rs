//! Data models for the application
//!
//! This module contains all data structures used throughout the application,
//! organized by domain. Each sub-module represents a specific feature area.

mod audit;
mod billing;
mod booking;
mod catalog;
mod common;
mod gallery;
mod listing;
mod notification;
mod organization;
mod payment;
mod policy;
mod review;
mod shop;
mod tenant;
mod user;

// Re-export all models for convenient imports
pub use audit::*;
pub use billing::*;
pub use booking::*;
pub use catalog::*;
pub use common::*;
pub use gallery::*;
pub use listing::*;
pub use notification::*;
pub use organization::*;
pub use payment::*;
pub use policy::*;
pub use review::*;
pub use shop::*;
pub use tenant::*;
pub use user::*;
