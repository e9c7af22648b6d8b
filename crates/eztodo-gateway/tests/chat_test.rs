use std::net::SocketAddr;

use eztodo_config::{AppConfig, ConfigSources, EndpointConfig};
use eztodo_gateway::{APOLOGY, GatewayServer};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn start_gateway(
    backend: &MockServer,
    pairs: &[(&str, &str)],
) -> (SocketAddr, oneshot::Sender<()>) {
    let mut config = AppConfig::default();
    config.providers.openai = EndpointConfig {
        base_url: Some(format!("{}/v1", backend.uri())),
        model: None,
    };
    config.providers.deepseek = EndpointConfig {
        base_url: Some(backend.uri()),
        model: None,
    };

    let server = GatewayServer::new(config, ConfigSources::from_pairs(pairs.iter().copied()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        server
            .serve(listener, async {
                rx.await.ok();
            })
            .await
            .unwrap();
    });

    (addr, tx)
}

async fn post_chat(addr: SocketAddr, body: serde_json::Value) -> (u16, serde_json::Value) {
    let response = reqwest::Client::new()
        .post(format!("http://{}/api/ai/chat", addr))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = response.status().as_u16();
    (status, response.json().await.unwrap())
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_deepseek_is_default_provider() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer sk-public-deepseek"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("Focus on task one.")))
        .expect(1)
        .mount(&backend)
        .await;

    let (addr, _shutdown) = start_gateway(
        &backend,
        &[
            ("DEEPSEEK_API_KEY", "sk-build-deepseek"),
            ("EZTODO_PUBLIC_DEEPSEEK_API_KEY", "sk-public-deepseek"),
        ],
    )
    .await;

    let (status, body) = post_chat(
        addr,
        json!({"message": "what now?", "history": [], "todos": [{"title": "a"}], "plans": []}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["response"], "Focus on task one.");
    assert_eq!(body["debug"]["aiService"], "deepseek");
    assert_eq!(body["debug"]["hasApiKey"], true);
}

#[tokio::test]
async fn test_openai_selected_by_public_name() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-openai"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("From OpenAI.")))
        .expect(1)
        .mount(&backend)
        .await;

    let (addr, _shutdown) = start_gateway(
        &backend,
        &[
            ("EZTODO_PUBLIC_AI_SERVICE", "openai"),
            ("AI_SERVICE", "deepseek"),
            ("OPENAI_API_KEY", "sk-openai"),
        ],
    )
    .await;

    let (status, body) = post_chat(addr, json!({"message": "hi"})).await;
    assert_eq!(status, 200);
    assert_eq!(body["response"], "From OpenAI.");
    assert_eq!(body["debug"]["aiService"], "openai");
}

#[tokio::test]
async fn test_history_is_windowed_before_dispatch() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("ok")))
        .mount(&backend)
        .await;

    let (addr, _shutdown) = start_gateway(&backend, &[("DEEPSEEK_API_KEY", "sk-x")]).await;

    let history: Vec<_> = (0..10)
        .map(|i| {
            let role = if i % 2 == 0 { "user" } else { "assistant" };
            json!({"role": role, "content": format!("turn {i}")})
        })
        .collect();
    let (status, _) = post_chat(
        addr,
        json!({"message": "latest", "history": history, "todos": [1, 2, 3], "plans": [1]}),
    )
    .await;
    assert_eq!(status, 200);

    let received = backend.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
    let messages = sent["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 8);
    assert!(
        messages[0]["content"]
            .as_str()
            .unwrap()
            .contains("3 tasks and 1 plans")
    );
    let middle: Vec<_> = messages[1..7]
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect();
    assert_eq!(
        middle,
        vec!["turn 4", "turn 5", "turn 6", "turn 7", "turn 8", "turn 9"]
    );
    assert_eq!(messages[7], json!({"role": "user", "content": "latest"}));
}

#[tokio::test]
async fn test_missing_key_fails_without_outbound_call() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("never")))
        .expect(0)
        .mount(&backend)
        .await;

    let (addr, _shutdown) = start_gateway(
        &backend,
        &[("AI_SERVICE", "openai"), ("DEEPSEEK_API_KEY", "sk-wrong-family")],
    )
    .await;

    let (status, body) = post_chat(addr, json!({"message": "hi"})).await;
    assert_eq!(status, 500);
    assert_eq!(body["success"], false);
    assert_eq!(body["response"], APOLOGY);
    assert_eq!(body["debug"]["kind"], "missing_credential");
    assert!(body["error"].as_str().unwrap().contains("OpenAI"));
}

#[tokio::test]
async fn test_backend_error_is_flattened() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream overloaded"))
        .mount(&backend)
        .await;

    let (addr, _shutdown) = start_gateway(&backend, &[("DEEPSEEK_API_KEY", "sk-x")]).await;

    let (status, body) = post_chat(addr, json!({"message": "hi"})).await;
    assert_eq!(status, 500);
    assert_eq!(body["debug"]["kind"], "backend_error");
    assert_eq!(
        body["error"],
        "DeepSeek API request failed: 503 upstream overloaded"
    );
}

#[tokio::test]
async fn test_unknown_provider_and_recovery() {
    let backend = MockServer::start().await;
    let (addr, _shutdown) = start_gateway(&backend, &[("AI_SERVICE", "anthropic")]).await;

    let (status, body) = post_chat(addr, json!({"message": "hi"})).await;
    assert_eq!(status, 500);
    assert_eq!(body["debug"]["kind"], "unknown_provider");

    // A failed request leaves the server usable.
    let response = reqwest::get(format!("http://{}/health", addr)).await.unwrap();
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_invalid_json_body() {
    let backend = MockServer::start().await;
    let (addr, _shutdown) = start_gateway(&backend, &[("AI_SERVICE", "local")]).await;

    let response = reqwest::Client::new()
        .post(format!("http://{}/api/ai/chat", addr))
        .header("content-type", "application/json")
        .body("{\"message\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["debug"]["kind"], "malformed_request");
}
