//! # mailsweep Domain
//!
//! Business domain types and models for mailsweep.
//!
//! This crate contains:
//! - Message identifiers, pages and previews
//! - Run state, progress and outcome types
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other mailsweep crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
