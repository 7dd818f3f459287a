use super::*;
use crate::testing::silent_server;
use mockito::{Matcher, Server};
use serde_json::json;

fn client_for(server: &Server) -> BackendClient {
    BackendClient::with_base_url(server.url()).unwrap()
}

#[tokio::test]
async fn test_run_simple_search() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/run_simple_search_duck/")
        .match_body(Matcher::Json(json!({
            "subject": "Baker Street hotels hotel contact phone number"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "message": "Simple search completed",
                "result_content": [
                    {"title": "Hotel A", "snippet": "Near the park", "link": "https://a.example"},
                    {"title": "Hotel B", "snippet": "Call 555-0100", "link": "https://b.example"}
                ]
            }"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let items = client
        .run_simple_search(
            "Baker Street hotels hotel contact phone number",
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].title, "Hotel A");
    assert_eq!(items[1].link, "https://b.example");
}

#[tokio::test]
async fn test_run_simple_search_pre_cancelled_skips_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/run_simple_search_duck/")
        .expect(0)
        .create_async()
        .await;

    let token = CancellationToken::new();
    token.cancel();

    let client = client_for(&server);
    let err = client.run_simple_search("anything", &token).await.unwrap_err();

    assert!(err.is_cancelled());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_cancel_during_request_yields_cancelled() {
    let client = BackendClient::with_base_url(silent_server().await).unwrap();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let urls = vec!["https://e1.example".to_string()];
    let search = client.run_simple_search("anything", &token);
    let err = tokio::time::timeout(Duration::from_secs(5), search)
        .await
        .expect("cancellation should end the request")
        .unwrap_err();
    assert!(err.is_cancelled());

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });
    let session = SessionId::from("s");
    let plan = client.start_travel_plan("Montreux", &session, &urls, &token);
    let err = tokio::time::timeout(Duration::from_secs(5), plan)
        .await
        .expect("cancellation should end the request")
        .unwrap_err();
    assert!(err.is_cancelled());
}

#[tokio::test]
async fn test_backend_error_is_carried_untranslated() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/run_simple_search_duck/")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Search failed: rate limited"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .run_simple_search("Paris news", &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        ClientError::Backend { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("rate limited"));
        }
        other => panic!("expected backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/analyze_data/")
        .with_status(200)
        .with_body("not json")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .analyze_data(&SessionId::from("s-1"), "What is nearby?")
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let client = BackendClient::with_base_url("http://127.0.0.1:1".to_string()).unwrap();
    let err = client
        .scrape_content("https://a.example", &SessionId::from("s-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
}

#[tokio::test]
async fn test_scrape_content() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/simple_scraping/")
        .match_body(Matcher::Json(json!({
            "url": "https://a.example",
            "folderUUID": "session-42"
        })))
        .with_status(200)
        .with_body(r#"{"content": "Front desk: 555-0100"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .scrape_content("https://a.example", &SessionId::from("session-42"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.content.as_deref(), Some("Front desk: 555-0100"));
}

#[tokio::test]
async fn test_start_travel_plan() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/start_travel_plan/")
        .match_body(Matcher::Json(json!({
            "locationName": "221B, Baker Street",
            "folderUUID": "session-42",
            "urls": ["https://e1.example", "https://e2.example"]
        })))
        .with_status(200)
        .with_body(r#"{"travel_plan": {"day_1": ["Concert"]}}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let urls = vec![
        "https://e1.example".to_string(),
        "https://e2.example".to_string(),
    ];
    let plan = client
        .start_travel_plan(
            "221B, Baker Street",
            &SessionId::from("session-42"),
            &urls,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(plan.0, json!({"day_1": ["Concert"]}));
}

#[tokio::test]
async fn test_analyze_data() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/analyze_data/")
        .match_body(Matcher::Json(json!({
            "folderUUID": "session-42",
            "query": "Tell me about the history of this location."
        })))
        .with_status(200)
        .with_body(r#"{"query": "q", "response": "Founded in 1850.", "context": []}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .analyze_data(
            &SessionId::from("session-42"),
            "Tell me about the history of this location.",
        )
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(response.response.as_deref(), Some("Founded in 1850."));
}

#[tokio::test]
async fn test_generate_hotel_info_uses_hotel_base_url() {
    let mut api = Server::new_async().await;
    let mut hotels = Server::new_async().await;

    let api_mock = api
        .mock("POST", "/generate_hotel_info/")
        .expect(0)
        .create_async()
        .await;
    let hotel_mock = hotels
        .mock("POST", "/generate_hotel_info/")
        .match_body(Matcher::Json(json!({"uuid": "session-42"})))
        .with_status(200)
        .with_body(
            r#"{"responses": [
                {"filename": "a.txt", "response": "Hotel A: 4 stars"},
                {"filename": "b.txt", "response": "Hotel B: pool"}
            ]}"#,
        )
        .create_async()
        .await;

    let client = BackendClient::new(&BackendConfig {
        api_url: api.url(),
        hotel_api_url: Some(hotels.url()),
        request_timeout_secs: 5,
    })
    .unwrap();

    let entries = client
        .generate_hotel_info(&SessionId::from("session-42"))
        .await
        .unwrap();

    api_mock.assert_async().await;
    hotel_mock.assert_async().await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].filename, "a.txt");
}

#[tokio::test]
async fn test_create_session_folder() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/generate_uuid_folder/")
        .match_body(Matcher::Json(json!({
            "locationName": "Baker Street, London",
            "folderUUID": "session-42"
        })))
        .with_status(200)
        .with_body(
            r#"{"message": "Folder and file created", "folder_uuid": "session-42", "file_path": "data/session-42/location_data.json"}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let ack = client
        .create_session_folder("Baker Street, London", &SessionId::from("session-42"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(ack.folder_uuid.as_deref(), Some("session-42"));
}
