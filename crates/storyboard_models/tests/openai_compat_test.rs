//! Tests for the chat-completions client against a local stub server.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyboard_core::{GenerateRequest, Message, Role};
use storyboard_error::GenerationErrorKind;
use storyboard_interface::TextGenerator;
use storyboard_models::{OfflineGenerator, OpenAICompatibleClient};
use storyboard_rate_limit::{CredentialPool, GenerationConfig};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Captured request: authorization header and JSON body.
type Captured = Arc<Mutex<Vec<(String, serde_json::Value)>>>;

/// Serve one canned HTTP response per connection, recording each request.
async fn stub_server(responses: Vec<(u16, String)>) -> (String, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let (auth, request_body) = read_request(&mut socket).await;
            let json = serde_json::from_slice(&request_body).unwrap_or(serde_json::Value::Null);
            sink.lock().unwrap().push((auth, json));

            let response = format!(
                "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (format!("http://{}/v1/chat/completions", addr), captured)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = socket.read(&mut chunk).await.unwrap();
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        if n == 0 {
            break buf.len();
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let header = |name: &str| {
        head.lines()
            .find_map(|line| {
                let (k, v) = line.split_once(':')?;
                k.trim().eq_ignore_ascii_case(name).then(|| v.trim().to_string())
            })
            .unwrap_or_default()
    };
    let length: usize = header("content-length").parse().unwrap_or(0);
    let auth = header("authorization");

    while buf.len() < header_end + length {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    (auth, buf[header_end..].to_vec())
}

fn completion(content: &str) -> String {
    serde_json::json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn client(endpoint: String, keys: &[&str]) -> OpenAICompatibleClient {
    OpenAICompatibleClient::new(
        endpoint,
        "test-model",
        CredentialPool::new(keys.iter().copied()),
        Duration::from_secs(5),
    )
    .unwrap()
    .with_system_prompt("Return JSON only.")
}

fn request() -> GenerateRequest {
    GenerateRequest::from_prompt("Split the story", 0.2, 2400)
}

#[tokio::test]
async fn test_success_strips_fences_and_sends_body() {
    let (endpoint, captured) =
        stub_server(vec![(200, completion("```json\n[\"a\", \"b\"]\n```"))]).await;

    let out = client(endpoint, &["k1"]).generate(&request()).await.unwrap();

    assert_eq!(out, "[\"a\", \"b\"]");
    let captured = captured.lock().unwrap();
    let (auth, body) = &captured[0];
    assert_eq!(auth, "Bearer k1");
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["max_tokens"], 2400);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "Return JSON only.");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "Split the story");
}

#[tokio::test]
async fn test_status_codes_map_to_error_kinds() {
    let cases: Vec<(u16, fn(&GenerationErrorKind) -> bool)> = vec![
        (429, |k| matches!(k, GenerationErrorKind::RateLimited(_))),
        (401, |k| matches!(k, GenerationErrorKind::AuthError { status: 401, .. })),
        (403, |k| matches!(k, GenerationErrorKind::AuthError { status: 403, .. })),
        (400, |k| matches!(k, GenerationErrorKind::BadRequest { status: 400, .. })),
        (503, |k| matches!(k, GenerationErrorKind::ServerError { status: 503, .. })),
    ];

    for (status, check) in cases {
        let (endpoint, _) = stub_server(vec![(status, "{\"error\":\"x\"}".to_string())]).await;
        let err = client(endpoint, &["k1"]).generate(&request()).await.unwrap_err();
        assert!(check(&err.kind), "status {} mapped to {:?}", status, err.kind);
    }
}

#[tokio::test]
async fn test_missing_content_is_malformed() {
    let (endpoint, _) = stub_server(vec![(200, "{\"choices\":[]}".to_string())]).await;
    let err = client(endpoint, &["k1"]).generate(&request()).await.unwrap_err();
    assert!(matches!(err.kind, GenerationErrorKind::MalformedResponse(_)));

    let (endpoint, _) = stub_server(vec![(200, "not json".to_string())]).await;
    let err = client(endpoint, &["k1"]).generate(&request()).await.unwrap_err();
    assert!(matches!(err.kind, GenerationErrorKind::MalformedResponse(_)));
}

#[tokio::test]
async fn test_attempt_selects_key() {
    let (endpoint, captured) = stub_server(vec![
        (200, completion("one")),
        (200, completion("two")),
    ])
    .await;
    let client = client(endpoint, &["k1", "k2"]);

    client.generate(&request()).await.unwrap();
    client.generate(&request().with_attempt(1)).await.unwrap();

    let captured = captured.lock().unwrap();
    assert_eq!(captured[0].0, "Bearer k1");
    assert_eq!(captured[1].0, "Bearer k2");
}

#[tokio::test]
async fn test_empty_pool_is_no_credentials() {
    let err = client("http://127.0.0.1:9/unused".to_string(), &[])
        .generate(&request())
        .await
        .unwrap_err();
    assert_eq!(err.kind, GenerationErrorKind::NoCredentials);
}

#[tokio::test]
async fn test_explicit_system_message_is_not_duplicated() {
    let client = client("http://127.0.0.1:9/unused".to_string(), &["k"]);
    let req = GenerateRequest::builder()
        .messages(vec![
            Message::new(Role::System, "custom"),
            Message::new(Role::User, "hi"),
        ])
        .build()
        .unwrap();

    let body = client.to_chat_request(&req);

    assert_eq!(body.messages().len(), 2);
    assert_eq!(body.messages()[0].content.as_deref(), Some("custom"));
}

#[test]
fn test_from_config_without_keys() {
    let config = GenerationConfig {
        api_key_env_prefix: "STORYBOARD_TEST_UNSET_KEY_".to_string(),
        ..GenerationConfig::default()
    };
    let err = OpenAICompatibleClient::from_config(&config).unwrap_err();
    assert_eq!(err.kind, GenerationErrorKind::NoCredentials);
}

#[tokio::test]
async fn test_offline_generator_is_transport_failure() {
    let err = OfflineGenerator.generate(&request()).await.unwrap_err();
    assert!(matches!(err.kind, GenerationErrorKind::Transport(_)));
}

#[cfg(feature = "api")]
#[tokio::test]
async fn test_live_longcat_call() {
    dotenvy::dotenv().ok();
    let client = OpenAICompatibleClient::from_config(&GenerationConfig::default()).unwrap();
    let out = client
        .generate(&GenerateRequest::from_prompt(
            "Return the JSON array [1, 2, 3] and nothing else.",
            0.0,
            50,
        ))
        .await
        .unwrap();
    assert!(out.contains('1'));
}
