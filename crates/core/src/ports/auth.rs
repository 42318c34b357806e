//! Credential port

use async_trait::async_trait;
use mailsweep_domain::{BearerToken, Result};

/// Supplies the bearer credential for a run.
///
/// Implementations cache the token until it nears expiry. Failure to obtain a
/// token is reported as `SweepError::Auth`.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire(&self) -> Result<BearerToken>;
}
