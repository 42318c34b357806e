#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use mailsweep_common::resilience::BackoffPolicy;
use mailsweep_core::BackoffExecutor;
use mailsweep_infra::{GmailGateway, ReqwestTransport};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Gateway pointed at `server` with a fast, jitter-free retry policy.
pub fn gateway(server: &MockServer, max_retries: u32) -> Arc<GmailGateway> {
    gateway_with_executor(server, |executor| executor, max_retries)
}

pub fn gateway_with_executor(
    server: &MockServer,
    customize: impl FnOnce(BackoffExecutor) -> BackoffExecutor,
    max_retries: u32,
) -> Arc<GmailGateway> {
    let transport = ReqwestTransport::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("transport should build");
    let policy = BackoffPolicy::builder()
        .max_retries(max_retries)
        .base_delay(Duration::from_millis(10))
        .no_jitter()
        .build()
        .expect("policy should build");
    let executor = customize(BackoffExecutor::new(Arc::new(transport), policy));
    Arc::new(GmailGateway::new(executor, server.uri()))
}

/// Ids `m0..m{n-1}`.
pub fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("m{i}")).collect()
}

fn list_body(ids: &[String], next: Option<&str>) -> Value {
    let messages: Vec<Value> = ids.iter().map(|id| json!({ "id": id, "threadId": id })).collect();
    match next {
        Some(token) => json!({ "messages": messages, "nextPageToken": token }),
        None => json!({ "messages": messages, "resultSizeEstimate": messages.len() }),
    }
}

/// Serve `ids` for `query` in pages of `page_len`, chained with `p1`, `p2`, ...
pub async fn mount_listing(server: &MockServer, query: &str, ids: &[String], page_len: usize) {
    let pages: Vec<&[String]> =
        if ids.is_empty() { vec![&[][..]] } else { ids.chunks(page_len).collect() };

    for (index, page) in pages.iter().enumerate() {
        let next = (index + 1 < pages.len()).then(|| format!("p{}", index + 1));
        let mock = Mock::given(method("GET"))
            .and(path("/messages"))
            .and(query_param("q", query));
        let mock = if index == 0 {
            mock.and(query_param_is_missing("pageToken"))
        } else {
            mock.and(query_param("pageToken", format!("p{index}")))
        };

        mock.respond_with(
            ResponseTemplate::new(200).set_body_json(list_body(page, next.as_deref())),
        )
        .mount(server)
        .await;
    }
}
