//! # mailsweep Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (transport, credentials, mailbox)
//! - The backoff-aware request executor
//! - Enumeration, the batch engine and run orchestration
//! - The search query builder
//!
//! ## Architecture Principles
//! - Only depends on `mailsweep-common` and `mailsweep-domain`
//! - No HTTP client or platform code
//! - All external dependencies via traits

pub mod executor;
pub mod ports;
pub mod query;
pub mod sweep;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use executor::{BackoffExecutor, ErrorEnvelope, RetryNotice, RetryObserver};
pub use ports::{
    CredentialProvider, HttpMethod, HttpRequest, HttpResponse, HttpTransport, MailboxGateway,
};
pub use query::build_query;
pub use sweep::{
    BatchEngine, Discovery, EngineConfig, Enumerator, NoProgress, PreviewService,
    ProgressObserver, SweepService,
};
