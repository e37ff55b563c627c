use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use trip_planner_rs::{
    OpenAIClient, PlannerConfig, PlannerError, RecommendationMode, Recommender, TripPlanner,
};

fn completion(content: serde_json::Value) -> String {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
    .to_string()
}

fn recommender_for(server: &mockito::Server) -> Recommender {
    let client = OpenAIClient::new("sk-test")
        .unwrap()
        .with_base_url(server.url());
    Recommender::new(Arc::new(client))
}

#[tokio::test]
async fn test_recommendations_round_trip_through_chat_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let reply = json!({
        "recommendations": [
            { "name": "Alfama", "desc": "Oldest district" },
            { "name": "LX Factory", "desc": "Creative hub" }
        ]
    })
    .to_string();

    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "model": "gpt-4.1-mini",
                "temperature": 0.7,
                "response_format": { "type": "json_object" }
            })),
            Matcher::Regex("knowledgeable travel expert".to_string()),
            Matcher::Regex("Current itinerary includes: Belem Tower".to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(completion(json!(reply)))
        .create_async()
        .await;

    let recommendations = assert_ok!(
        recommender_for(&server)
            .get_recommendations("Lisbon", &["Belem Tower".to_string()], &[], RecommendationMode::New)
            .await
    );

    mock.assert_async().await;
    assert_eq!(recommendations.len(), 2);
    assert_eq!(recommendations[0].name, "Alfama");
    assert_eq!(recommendations[1].description, "Creative hub");
}

#[tokio::test]
async fn test_old_mode_prompt_reaches_endpoint() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("From my previous trip, I visited: Gion, Nishiki Market".to_string()),
            Matcher::Regex("recommend all of them".to_string()),
        ]))
        .with_status(200)
        .with_body(completion(json!(r#"{"recommendations":[]}"#)))
        .create_async()
        .await;

    let past = vec!["Gion".to_string(), "Nishiki Market".to_string()];
    let recommendations = recommender_for(&server)
        .get_recommendations("Kyoto", &[], &past, RecommendationMode::Old)
        .await
        .unwrap();

    mock.assert_async().await;
    assert!(recommendations.is_empty());
}

#[tokio::test]
async fn test_missing_content_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion(serde_json::Value::Null))
        .create_async()
        .await;

    let err = assert_err!(
        recommender_for(&server)
            .get_recommendations("Oslo", &[], &[], RecommendationMode::Mix)
            .await
    );
    assert!(matches!(err, PlannerError::MalformedResponse(_)));
    assert!(err.to_string().contains("no recommendations received"));
}

#[tokio::test]
async fn test_non_json_reply_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(completion(json!("Here are my top picks: Vigeland Park...")))
        .create_async()
        .await;

    let err = recommender_for(&server)
        .get_recommendations("Oslo", &[], &[], RecommendationMode::New)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MALFORMED_RESPONSE");
}

#[tokio::test]
async fn test_http_failure_is_upstream_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(json!({ "error": { "message": "Incorrect API key provided" } }).to_string())
        .create_async()
        .await;

    let err = recommender_for(&server)
        .get_recommendations("Oslo", &[], &[], RecommendationMode::New)
        .await
        .unwrap_err();

    match &err {
        PlannerError::Upstream { status, message, .. } => {
            assert_eq!(*status, Some(401));
            assert!(message.contains("Incorrect API key"));
        }
        other => panic!("expected upstream error, got {other:?}"),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(503)
        .with_body("upstream overloaded")
        .expect(1)
        .create_async()
        .await;

    let err = recommender_for(&server)
        .get_recommendations("Oslo", &[], &[], RecommendationMode::New)
        .await
        .unwrap_err();

    mock.assert_async().await;
    assert!(err.is_retryable());
    assert!(err.to_string().contains("upstream overloaded"));
}

#[test]
fn test_planner_requires_chat_key() {
    let config = PlannerConfig::default();
    let err = TripPlanner::from_config(&config).unwrap_err();
    assert!(matches!(err, PlannerError::MissingCredential(_)));
}
