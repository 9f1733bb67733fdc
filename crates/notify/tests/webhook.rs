//! Wire-contract tests for the webhook channel.

use notify::{NotifyChannel, NotifyEvent, WebhookChannel};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn posts_text_and_tagall_to_the_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/notify"))
        .and(body_partial_json(serde_json::json!({ "tagall": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let channel = WebhookChannel::new(format!("{}/notify", server.uri()));
    let event = NotifyEvent::new_feed_post(
        "alice",
        "Flash SALE now",
        "https://www.instagram.com/p/abc123/",
    );

    channel.send(&event).await.expect("send should succeed");

    // Body text carries the handle, the excerpt and the permalink.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("@alice"));
    assert!(text.contains("Flash SALE now"));
    assert!(text.contains("abc123"));
}

#[tokio::test]
async fn server_errors_are_reported_as_channel_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let channel = WebhookChannel::new(server.uri());
    let result = channel
        .send(&NotifyEvent::new_story_link("alice", "http://x"))
        .await;

    assert!(result.is_err());
}
