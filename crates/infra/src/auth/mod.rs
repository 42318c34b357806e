//! Bearer credential acquisition
//!
//! A [`TokenSource`] mints tokens; [`CachedCredentialProvider`] hands out the
//! last one until it is about to expire.

pub mod provider;
pub mod source;

pub use provider::{credential_provider, CachedCredentialProvider};
pub use source::{RefreshTokenSource, StaticTokenSource, TokenSource};
