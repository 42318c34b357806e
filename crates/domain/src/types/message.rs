//! Message identifiers, enumeration pages and metadata previews

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of one remote message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Ordered, immutable result of one enumeration.
///
/// Order is the order the service returned ids in, page after page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierSet(Vec<MessageId>);

impl IdentifierSet {
    pub fn new(ids: Vec<MessageId>) -> Self {
        Self(ids)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[MessageId] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MessageId> {
        self.0.iter()
    }
}

impl FromIterator<MessageId> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = MessageId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a MessageId;
    type IntoIter = std::slice::Iter<'a, MessageId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Continuation cursor returned by the enumeration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One page of enumeration results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessagePage {
    pub ids: Vec<MessageId>,
    /// `None` on the final page.
    pub next_page_token: Option<PageToken>,
}

/// Header summary of a message, used for previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessagePreview {
    pub id: MessageId,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub date: String,
}

/// Account summary of the authenticated mailbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailboxProfile {
    pub email_address: String,
    pub messages_total: u64,
    pub threads_total: u64,
    /// Mailbox change cursor at the time of the lookup
    pub history_id: Option<String>,
}

/// One page of previews with a continuation hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPage {
    pub items: Vec<MessagePreview>,
    pub page: usize,
    pub total_matches: usize,
    pub has_more: bool,
}
