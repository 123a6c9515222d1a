use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use repochat_pipeline::AnswerGenerator;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for an OpenAI-compatible `/chat/completions` endpoint
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String,
}

impl OpenAiGenerator {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AnswerGenerator for OpenAiGenerator {
    async fn generate(&self, system_prompt: &str, query: &str) -> Result<String> {
        let body = CompletionRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: system_prompt,
                },
                Message {
                    role: "user",
                    content: query,
                },
            ],
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.endpoint))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("{} returned {status}: {}", self.endpoint, detail.trim());
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .context("Malformed completion response")?;
        log::debug!("Completion received from {}", self.endpoint);

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .context("Completion response contained no choices")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    #[test]
    fn test_endpoint_join() {
        let generator =
            OpenAiGenerator::new("http://localhost:8000/v1/", "m", None, Duration::from_secs(1))
                .unwrap();
        assert_eq!(generator.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_generate_sends_prompt_and_key() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                assert_eq!(headers["authorization"], "Bearer secret");
                assert_eq!(body["model"], "coder");
                assert_eq!(body["messages"][0]["role"], "system");
                assert_eq!(body["messages"][1]["content"], "what is Order?");
                let echo = body["messages"][0]["content"].as_str().unwrap_or_default().to_string();
                Json(json!({ "choices": [{ "message": { "role": "assistant", "content": echo } }] }))
            }),
        );
        let base = serve(app).await;

        let generator = OpenAiGenerator::new(
            &base,
            "coder",
            Some("secret".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        let answer = generator.generate("context here", "what is Order?").await.unwrap();
        assert_eq!(answer, "context here");
    }

    #[tokio::test]
    async fn test_generate_reports_http_errors() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let base = serve(app).await;

        let generator = OpenAiGenerator::new(&base, "coder", None, Duration::from_secs(5)).unwrap();
        let err = generator.generate("p", "q").await.unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("429"), "{message}");
        assert!(message.contains("slow down"), "{message}");
    }

    #[tokio::test]
    async fn test_generate_without_choices() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base = serve(app).await;

        let generator = OpenAiGenerator::new(&base, "coder", None, Duration::from_secs(5)).unwrap();
        let err = generator.generate("p", "q").await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }
}
