//! Wire shapes of the Gmail REST endpoints used by the gateway

use mailsweep_domain::constants::{NO_RECIPIENT, NO_SENDER, NO_SUBJECT};
use mailsweep_domain::{MailboxProfile, MessageId, MessagePage, MessagePreview, PageToken};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMessagesResponse {
    #[serde(default)]
    pub messages: Option<Vec<MessageRef>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageRef {
    pub id: String,
}

impl From<ListMessagesResponse> for MessagePage {
    fn from(value: ListMessagesResponse) -> Self {
        MessagePage {
            ids: value
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(|m| MessageId::new(m.id))
                .collect(),
            next_page_token: value
                .next_page_token
                .filter(|token| !token.is_empty())
                .map(PageToken::new),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageMetadata {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub payload: Option<Payload>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Payload {
    #[serde(default)]
    pub headers: Vec<Header>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Header {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl MessageMetadata {
    /// First header named `name`, compared case-insensitively.
    fn header(&self, name: &str) -> Option<&str> {
        self.payload
            .as_ref()?
            .headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Preview for `requested`; absent headers fall back to placeholders.
    pub fn into_preview(self, requested: &MessageId) -> MessagePreview {
        let text = |name: &str, fallback: &str| {
            self.header(name).filter(|v| !v.is_empty()).unwrap_or(fallback).to_string()
        };

        MessagePreview {
            from: text("From", NO_SENDER),
            to: text("To", NO_RECIPIENT),
            subject: text("Subject", NO_SUBJECT),
            date: text("Date", ""),
            id: self.id.clone().map_or_else(|| requested.clone(), MessageId::new),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProfileResponse {
    pub email_address: String,
    #[serde(default)]
    pub messages_total: u64,
    #[serde(default)]
    pub threads_total: u64,
    #[serde(default)]
    pub history_id: Option<String>,
}

impl From<ProfileResponse> for MailboxProfile {
    fn from(value: ProfileResponse) -> Self {
        MailboxProfile {
            email_address: value.email_address,
            messages_total: value.messages_total,
            threads_total: value.threads_total,
            history_id: value.history_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_without_messages_is_an_empty_final_page() {
        let parsed: ListMessagesResponse =
            serde_json::from_str(r#"{"resultSizeEstimate":0}"#).unwrap();
        let page = MessagePage::from(parsed);
        assert!(page.ids.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn empty_next_page_token_ends_enumeration() {
        let parsed: ListMessagesResponse =
            serde_json::from_str(r#"{"messages":[{"id":"a","threadId":"t"}],"nextPageToken":""}"#)
                .unwrap();
        let page = MessagePage::from(parsed);
        assert_eq!(page.ids, vec![MessageId::from("a")]);
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn headers_are_case_insensitive_with_placeholders() {
        let parsed: MessageMetadata = serde_json::from_str(
            r#"{"id":"m1","payload":{"headers":[
                {"name":"FROM","value":"Shop <news@shop.com>"},
                {"name":"subject","value":""}
            ]}}"#,
        )
        .unwrap();

        let preview = parsed.into_preview(&MessageId::from("m1"));
        assert_eq!(preview.from, "Shop <news@shop.com>");
        assert_eq!(preview.to, NO_RECIPIENT);
        assert_eq!(preview.subject, NO_SUBJECT);
        assert_eq!(preview.date, "");
    }

    #[test]
    fn missing_payload_uses_requested_id() {
        let preview = MessageMetadata::default().into_preview(&MessageId::from("x"));
        assert_eq!(preview.id, MessageId::from("x"));
        assert_eq!(preview.from, NO_SENDER);
    }
}
