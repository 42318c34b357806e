//! Port interfaces
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

pub mod auth;
pub mod http;
pub mod mailbox;

pub use auth::CredentialProvider;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};
pub use mailbox::MailboxGateway;
