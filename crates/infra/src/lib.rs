//! # mailsweep Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - The reqwest HTTP transport
//! - The Gmail REST mailbox gateway
//! - Credential sources (static token, OAuth refresh grant)
//! - Configuration loading from files and the environment
//!
//! ## Architecture
//! - Implements traits defined in `mailsweep-core`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod auth;
pub mod config;
pub mod errors;
pub mod gmail;
pub mod http;

// Re-export commonly used items
pub use auth::{credential_provider, CachedCredentialProvider, RefreshTokenSource, StaticTokenSource, TokenSource};
pub use errors::InfraError;
pub use gmail::{gateway_from_config, GmailGateway};
pub use http::{ReqwestTransport, ReqwestTransportBuilder};
