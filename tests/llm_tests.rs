//! LLM client tests against mocked Ollama and Gemini HTTP APIs

use rentscout::llm::gemini::GeminiClient;
use rentscout::llm::ollama::OllamaClient;
use rentscout::llm::{LLMClient, ProviderRegistry};
use rentscout::types::{AppError, ToolDefinition};
use rentscout::RentScoutConfig;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn kayak_tool() -> ToolDefinition {
    ToolDefinition {
        name: "kayak_search".to_string(),
        description: "Build a Kayak car rental search link".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "loc": {"type": "string"},
                "pickup": {"type": "string"},
                "dropoff": {"type": "string"}
            },
            "required": ["loc", "pickup", "dropoff"]
        }),
    }
}

fn history() -> Vec<(String, String)> {
    vec![
        ("system".to_string(), "You are a Car Rentals Expert.".to_string()),
        ("user".to_string(), "car rental in Miami from June 1st to June 5th".to_string()),
    ]
}

// ============= Ollama =============

#[tokio::test]
async fn test_ollama_generate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama2",
            "stream": false,
            "messages": [{"role": "user", "content": "Find rentals"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama2",
            "message": {"role": "assistant", "content": "Enterprise, $40/day"},
            "done": true,
            "done_reason": "stop"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "llama2");
    let text = client.generate("Find rentals").await.unwrap();
    assert_eq!(text, "Enterprise, $40/day");
}

#[tokio::test]
async fn test_ollama_tool_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "tools": [{"type": "function", "function": {"name": "kayak_search"}}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [{
                    "function": {
                        "name": "kayak_search",
                        "arguments": {"loc": "miami", "pickup": "2024-06-01", "dropoff": "2024-06-05"}
                    }
                }]
            },
            "done": true
        })))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "llama3.1");
    let response = client
        .generate_with_tools(&history(), &[kayak_tool()])
        .await
        .unwrap();

    assert_eq!(response.finish_reason, "tool_calls");
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "kayak_search");
    assert_eq!(response.tool_calls[0].arguments["pickup"], "2024-06-01");
}

#[tokio::test]
async fn test_ollama_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(404).set_body_string("model 'llama2' not found"))
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "llama2");
    let err = client.generate("hi").await.unwrap_err();

    assert!(matches!(err, AppError::LLM(_)));
    assert!(err.to_string().contains("not found"));
}

#[tokio::test]
async fn test_ollama_health_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "0.5.7"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(server.uri(), "llama2");
    assert!(client.health_check().await.is_ok());
}

#[tokio::test]
async fn test_ollama_unreachable_gives_run_hint() {
    // Nothing listens on the discard port
    let client = OllamaClient::new("http://127.0.0.1:9", "llama2");
    let err = client.health_check().await.unwrap_err();

    assert!(matches!(err, AppError::Connection(_)));
    assert_eq!(
        err.user_message(),
        "Cannot connect to Ollama at http://127.0.0.1:9. Please make sure it's running with: 'ollama run llama2'"
    );
}

// ============= Gemini =============

#[tokio::test]
async fn test_gemini_generate_with_system() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": {"parts": [{"text": "You are a Summary Expert."}]},
            "contents": [{"role": "user", "parts": [{"text": "Summarize"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Best deal: "}, {"text": "Thrifty"}]},
                "finishReason": "STOP"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key", server.uri(), "gemini-pro");
    let text = client
        .generate_with_system("You are a Summary Expert.", "Summarize")
        .await
        .unwrap();

    assert_eq!(text, "Best deal: Thrifty");
}

#[tokio::test]
async fn test_gemini_function_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .and(body_partial_json(json!({
            "tools": [{"functionDeclarations": [{"name": "kayak_search"}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{
                        "functionCall": {
                            "name": "kayak_search",
                            "args": {"loc": "miami", "pickup": "2024-06-01", "dropoff": "2024-06-05"}
                        }
                    }]
                },
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key", server.uri(), "gemini-pro");
    let response = client
        .generate_with_tools(&history(), &[kayak_tool()])
        .await
        .unwrap();

    assert_eq!(response.finish_reason, "tool_calls");
    assert_eq!(response.tool_calls[0].arguments["loc"], "miami");
}

#[tokio::test]
async fn test_gemini_api_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-pro:generateContent"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new("bad-key", server.uri(), "gemini-pro");
    let err = client.generate("hi").await.unwrap_err();

    assert!(matches!(err, AppError::LLM(_)));
    assert!(err.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn test_gemini_health_check_missing_model() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models/gemini-nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = GeminiClient::new("test-key", server.uri(), "gemini-nope");
    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, AppError::Connection(_)));
}

// ============= Registry wiring =============

#[tokio::test]
async fn test_registry_client_uses_configured_provider() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "llama3.1",
            "options": {"num_predict": 256}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"role": "assistant", "content": "ok"},
            "done": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config: RentScoutConfig = format!(
        r#"
[providers.local]
type = "ollama"
base_url = "{}"
default_model = "llama2"

[models.default]
provider = "local"
model = "llama3.1"
max_tokens = 256
"#,
        server.uri()
    )
    .parse()
    .unwrap();

    let client = ProviderRegistry::from_config(&config)
        .create_client_for_model("default")
        .unwrap();
    assert_eq!(client.generate("hi").await.unwrap(), "ok");
}

#[test]
fn test_registry_gemini_requires_api_key() {
    let config: RentScoutConfig = r#"
[providers.gemini]
type = "gemini"
api_key_env = "RENTSCOUT_TEST_UNSET_GEMINI_KEY"
default_model = "gemini-pro"

[models.default]
provider = "gemini"
model = "gemini-pro"
"#
    .parse()
    .unwrap();

    let err = ProviderRegistry::from_config(&config)
        .create_client_for_model("default")
        .err()
        .unwrap();

    assert!(matches!(err, AppError::Configuration(_)));
    assert!(err.to_string().contains("RENTSCOUT_TEST_UNSET_GEMINI_KEY"));
}
