//! Domain data types

pub mod credential;
pub mod message;
pub mod query;
pub mod run;

pub use credential::BearerToken;
pub use message::{
    IdentifierSet, MailboxProfile, MessageId, MessagePage, MessagePreview, PageToken, PreviewPage,
};
pub use query::QuerySpec;
pub use run::{ItemFailure, ItemOutcome, ProgressSnapshot, RunResult, RunState};
