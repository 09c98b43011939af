use std::fs;

use subscriber_metrics::metrics::MetricsSummary;
use subscriber_metrics::routes::MessageBody;
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{page_json, subscriber_json, TestApp};

#[tokio::test]
async fn subscribers_returns_400_when_not_configured() {
    let test_app = TestApp::spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.publication_server)
        .await;

    let response = test_app.get_subscribers().await;

    assert_eq!(response.status().as_u16(), 400);

    let body: MessageBody = response.json().await.unwrap();

    assert!(body.message.contains("configuration"));
}

#[tokio::test]
async fn subscribers_returns_400_when_stored_configuration_is_malformed() {
    let test_app = TestApp::spawn_app().await;
    let path = test_app.credential_store.path();

    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, r#"{"api_key": "only-a-key"}"#).unwrap();

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&test_app.publication_server)
        .await;

    let response = test_app.get_subscribers().await;

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn subscribers_returns_metrics_for_every_page() {
    let test_app = TestApp::spawn_configured_app().await;

    Mock::given(method("GET"))
        .and(path("/publications/pub_123/subscriptions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                subscriber_json("sub_1", "active", 3),
                subscriber_json("sub_2", "inactive", 0),
            ],
            1,
            4,
        )))
        .expect(1)
        .mount(&test_app.publication_server)
        .await;
    Mock::given(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(
            vec![
                subscriber_json("sub_3", "active", 0),
                subscriber_json("sub_4", "inactive", 0),
            ],
            2,
            4,
        )))
        .expect(1)
        .mount(&test_app.publication_server)
        .await;
    Mock::given(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], 3, 4)))
        .expect(1)
        .mount(&test_app.publication_server)
        .await;

    let response = test_app.get_subscribers().await;

    assert_eq!(response.status().as_u16(), 200);

    let summary: MetricsSummary = response.json().await.unwrap();
    let ids: Vec<&str> = summary.subscribers.iter().map(|s| s.id.as_str()).collect();
    let days: Vec<Option<u64>> = summary
        .subscribers
        .iter()
        .map(|s| s.days_to_unsubscribe)
        .collect();

    assert_eq!(summary.total_subscribers, 4);
    assert_eq!(summary.active_subscribers, 2);
    assert_eq!(summary.inactive_subscribers, 2);
    assert_eq!(summary.percent_clicked_once, 25.0);
    assert_eq!(ids, vec!["sub_1", "sub_2", "sub_3", "sub_4"]);
    assert_eq!(days, vec![None, Some(4), None, Some(4)]);
}

#[tokio::test]
async fn subscribers_returns_404_when_publication_does_not_exist() {
    let test_app = TestApp::spawn_configured_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&test_app.publication_server)
        .await;

    let response = test_app.get_subscribers().await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn subscribers_returns_404_when_publication_has_no_subscribers() {
    let test_app = TestApp::spawn_configured_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json(vec![], 1, 0)))
        .expect(1)
        .mount(&test_app.publication_server)
        .await;

    let response = test_app.get_subscribers().await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn subscribers_returns_400_when_stored_api_key_is_rejected() {
    let test_app = TestApp::spawn_configured_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&test_app.publication_server)
        .await;

    let response = test_app.get_subscribers().await;

    assert_eq!(response.status().as_u16(), 400);

    let body: MessageBody = response.json().await.unwrap();

    assert_eq!(body.message, "Invalid API key or unauthorized access.");
}

#[tokio::test]
async fn subscribers_returns_500_with_upstream_message_on_server_errors() {
    let test_app = TestApp::spawn_configured_app().await;

    Mock::given(any())
        .respond_with(
            ResponseTemplate::new(502).set_body_json(serde_json::json!({
                "errors": [{ "message": "Upstream is down" }]
            })),
        )
        .expect(1)
        .mount(&test_app.publication_server)
        .await;

    let response = test_app.get_subscribers().await;

    assert_eq!(response.status().as_u16(), 500);

    let body: MessageBody = response.json().await.unwrap();

    assert_eq!(body.message, "Upstream is down");
}
