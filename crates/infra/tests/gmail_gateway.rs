//! Gateway behaviour against a mock Gmail API

mod support;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use mailsweep_core::{Enumerator, MailboxGateway, RetryNotice};
use mailsweep_domain::constants::{NO_RECIPIENT, NO_SENDER};
use mailsweep_domain::{BearerToken, MessageId, PageToken, SweepError};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn token() -> BearerToken {
    BearerToken::new("test-token", None)
}

#[tokio::test]
async fn list_page_sends_bearer_and_paging_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("q", "from:shop.com"))
        .and(query_param("maxResults", "500"))
        .and(query_param("pageToken", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [{ "id": "x1" }, { "id": "x2" }],
            "nextPageToken": "def"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = support::gateway(&server, 0)
        .list_page(&token(), "from:shop.com", 500, Some(&PageToken::new("abc")))
        .await
        .unwrap();

    assert_eq!(page.ids, vec![MessageId::from("x1"), MessageId::from("x2")]);
    assert_eq!(page.next_page_token, Some(PageToken::new("def")));
}

#[tokio::test]
async fn enumerator_follows_every_page() {
    let server = MockServer::start().await;
    let ids = support::ids(1203);
    support::mount_listing(&server, "subject:(promo)", &ids, 500).await;

    let enumerator = Enumerator::new(support::gateway(&server, 0));
    let found = enumerator.enumerate("subject:(promo)", &token()).await.unwrap();

    assert_eq!(found.len(), 1203);
    assert_eq!(found.as_slice()[0], MessageId::from("m0"));
    assert_eq!(found.as_slice()[1202], MessageId::from("m1202"));
}

#[tokio::test]
async fn enumeration_of_nothing_is_empty() {
    let server = MockServer::start().await;
    support::mount_listing(&server, "label:none", &[], 500).await;

    let enumerator = Enumerator::new(support::gateway(&server, 0));
    let found = enumerator.enumerate("label:none", &token()).await.unwrap();

    assert!(found.is_empty());
}

#[tokio::test]
async fn unauthorized_is_an_auth_error_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "code": 401, "message": "Request had invalid authentication credentials.", "status": "UNAUTHENTICATED" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = support::gateway(&server, 3)
        .list_page(&token(), "x", 500, None)
        .await
        .unwrap_err();

    assert!(matches!(err, SweepError::Auth { .. }), "{err:?}");
}

#[tokio::test]
async fn rate_limited_list_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "errors": [{ "reason": "userRateLimitExceeded" }] }
        })))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [{ "id": "a" }] })))
        .mount(&server)
        .await;

    let notices = Arc::new(AtomicU32::new(0));
    let seen = notices.clone();
    let gateway = support::gateway_with_executor(
        &server,
        |executor| {
            executor.with_observer(Arc::new(move |_attempt: u32, notice: &RetryNotice| {
                assert!(matches!(notice, RetryNotice::Backoff(_)));
                seen.fetch_add(1, Ordering::SeqCst);
            }))
        },
        3,
    );

    let page = gateway.list_page(&token(), "x", 500, None).await.unwrap();

    assert_eq!(page.ids, vec![MessageId::from("a")]);
    assert_eq!(notices.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn forbidden_without_rate_limit_reason_is_terminal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/m1/trash"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "Insufficient Permission", "errors": [{ "reason": "insufficientPermissions" }] }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = support::gateway(&server, 3).trash(&token(), &MessageId::from("m1")).await.unwrap_err();

    assert_eq!(err, SweepError::service(403, "Insufficient Permission"));
}

#[tokio::test]
async fn trash_of_missing_message_is_a_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/messages/gone/trash"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let err = support::gateway(&server, 0).trash(&token(), &MessageId::from("gone")).await.unwrap_err();

    assert!(matches!(err, SweepError::Service { status: 404, .. }), "{err:?}");
}

#[tokio::test]
async fn preview_fills_missing_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/messages/m7"))
        .and(query_param("format", "metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "m7",
            "payload": { "headers": [
                { "name": "subject", "value": "Weekly deals" },
                { "name": "Date", "value": "Tue, 1 Oct 2024 10:00:00 +0000" }
            ]}
        })))
        .mount(&server)
        .await;

    let preview =
        support::gateway(&server, 0).fetch_preview(&token(), &MessageId::from("m7")).await.unwrap();

    assert_eq!(preview.id, MessageId::from("m7"));
    assert_eq!(preview.subject, "Weekly deals");
    assert_eq!(preview.from, NO_SENDER);
    assert_eq!(preview.to, NO_RECIPIENT);
    assert_eq!(preview.date, "Tue, 1 Oct 2024 10:00:00 +0000");
}

#[tokio::test]
async fn profile_is_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "emailAddress": "me@example.com",
            "messagesTotal": 1234,
            "threadsTotal": 900,
            "historyId": "42"
        })))
        .mount(&server)
        .await;

    let profile = support::gateway(&server, 0).profile(&token()).await.unwrap();

    assert_eq!(profile.email_address, "me@example.com");
    assert_eq!(profile.messages_total, 1234);
    assert_eq!(profile.threads_total, 900);
    assert_eq!(profile.history_id.as_deref(), Some("42"));
}
