use crate::config::{LlmConfig, LlmProvider};
use crate::error::{AttemptError, BackendError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, warn};

/// Structured analysis of one document segment, as returned by the
/// text-generation backend. The response must carry exactly these five
/// fields; anything else is a parse failure and the attempt is retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChunkFinding {
    pub data_collection_practices: String,
    pub data_sharing: String,
    pub user_rights: String,
    pub concerning_clauses: Vec<String>,
    pub changes_notification: String,
}

/// Anything that can turn one document segment into a [`ChunkFinding`].
///
/// [`LlmClient`] is the production implementation; tests substitute
/// instrumented fakes.
#[async_trait]
pub trait SegmentAnalyzer: Send + Sync {
    async fn analyze_segment(&self, segment: &str) -> Result<ChunkFinding, BackendError>;
}

pub struct LlmClient {
    config: LlmConfig,
    client: Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    async fn request_finding(&self, segment: &str) -> Result<ChunkFinding, AttemptError> {
        let content = match self.config.provider {
            LlmProvider::OpenAI => self.complete_with_openai(segment).await?,
            LlmProvider::Ollama => self.complete_with_ollama(segment).await?,
            LlmProvider::Anthropic => self.complete_with_anthropic(segment).await?,
        };

        parse_finding(&content)
    }

    async fn complete_with_openai(&self, segment: &str) -> Result<String, AttemptError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": segment_prompt(segment)
                }
            ],
            "max_completion_tokens": self.config.max_tokens,
            "temperature": self.config.temperature
        });

        let default_url = "https://api.openai.com".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_url);

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let response_json = check_status(response).await?;
        response_json["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AttemptError::Shape("no message content in OpenAI response".into()))
    }

    async fn complete_with_ollama(&self, segment: &str) -> Result<String, AttemptError> {
        let default_url = "http://localhost:11434".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_url);

        let payload = serde_json::json!({
            "model": self.config.model,
            "prompt": format!("System: {}\n\nUser: {}", SYSTEM_PROMPT, segment_prompt(segment)),
            "stream": false,
            "format": "json",
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens
            }
        });

        let response = self
            .client
            .post(format!("{}/api/generate", base_url))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let response_json = check_status(response).await?;
        response_json["response"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AttemptError::Shape("no response field in Ollama response".into()))
    }

    async fn complete_with_anthropic(&self, segment: &str) -> Result<String, AttemptError> {
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        let payload = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": segment_prompt(segment)
                }
            ]
        });

        let default_url = "https://api.anthropic.com".to_string();
        let base_url = self.config.base_url.as_ref().unwrap_or(&default_url);

        let response = self
            .client
            .post(format!("{}/v1/messages", base_url))
            .header("x-api-key", api_key)
            .header("Content-Type", "application/json")
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await?;

        let response_json = check_status(response).await?;
        response_json["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| AttemptError::Shape("no text content in Anthropic response".into()))
    }
}

#[async_trait]
impl SegmentAnalyzer for LlmClient {
    /// Requests a structured finding for one segment, retrying failed
    /// attempts immediately up to the configured maximum. The final
    /// attempt's cause is propagated; nothing is swallowed.
    async fn analyze_segment(&self, segment: &str) -> Result<ChunkFinding, BackendError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match self.request_finding(segment).await {
                Ok(finding) => return Ok(finding),
                Err(cause) if attempt < max_attempts => {
                    warn!(attempt, max_attempts, error = %cause, "backend attempt failed, retrying");
                }
                Err(cause) => {
                    error!(attempt, error = %cause, "backend attempts exhausted");
                    return Err(BackendError {
                        attempts: attempt,
                        cause,
                    });
                }
            }
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a consumer-rights analyst reviewing terms-of-service and \
privacy-policy documents. For each excerpt you are given, extract what the document says about \
data collection, data sharing, user rights, concerning clauses, and change notification. \
Respond with a single JSON object and nothing else.";

fn segment_prompt(segment: &str) -> String {
    format!(
        r#"Analyze the following terms and conditions excerpt:

{segment}

Provide a structured analysis with the following:
1. Data collection practices
2. Data sharing with third parties
3. User rights and controls
4. Concerning clauses (arbitration, liability limits)
5. Changes to terms notification process

Format the response as a JSON object with exactly these fields:
{{"dataCollectionPractices": "...", "dataSharing": "...", "userRights": "...", "concerningClauses": ["..."], "changesNotification": "..."}}"#
    )
}

async fn check_status(response: reqwest::Response) -> Result<serde_json::Value, AttemptError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AttemptError::Status { status, body });
    }

    Ok(response.json().await?)
}

/// Decodes the backend's textual payload into a [`ChunkFinding`].
///
/// The payload is untrusted generative output: a markdown code fence
/// around the object is tolerated, anything else that fails to decode is
/// an attempt failure.
fn parse_finding(content: &str) -> Result<ChunkFinding, AttemptError> {
    let mut payload = content.trim();

    if let Some(stripped) = payload.strip_prefix("```") {
        let stripped = stripped.strip_prefix("json").unwrap_or(stripped);
        payload = stripped.strip_suffix("```").unwrap_or(stripped).trim();
    }

    Ok(serde_json::from_str(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmConfig, LlmProvider};
    use httpmock::prelude::*;
    use serde_json::json;

    fn finding_json() -> serde_json::Value {
        json!({
            "dataCollectionPractices": "Collects email and browsing history",
            "dataSharing": "Shares aggregate data with third parties",
            "userRights": "Users may request deletion",
            "concerningClauses": ["Mandatory arbitration"],
            "changesNotification": "Posted to the website without notice"
        })
    }

    fn ollama_config(base_url: String) -> LlmConfig {
        LlmConfig {
            provider: LlmProvider::Ollama,
            api_key: None,
            base_url: Some(base_url),
            model: "test-model".to_string(),
            max_tokens: 500,
            temperature: 0.0,
            timeout_seconds: 5,
            max_attempts: 3,
        }
    }

    #[test]
    fn parse_finding_accepts_plain_json() {
        let finding = parse_finding(&finding_json().to_string()).unwrap();
        assert_eq!(finding.concerning_clauses, vec!["Mandatory arbitration"]);
    }

    #[test]
    fn parse_finding_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", finding_json());
        let finding = parse_finding(&fenced).unwrap();
        assert_eq!(finding.user_rights, "Users may request deletion");
    }

    #[test]
    fn parse_finding_rejects_missing_fields() {
        let partial = json!({ "dataSharing": "none" }).to_string();
        assert!(parse_finding(&partial).is_err());
    }

    #[test]
    fn parse_finding_rejects_extra_fields() {
        let mut value = finding_json();
        value["riskScore"] = json!(9);
        assert!(parse_finding(&value.to_string()).is_err());
    }

    #[tokio::test]
    async fn returns_the_parsed_finding_on_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200)
                    .json_body(json!({ "response": finding_json().to_string() }));
            })
            .await;

        let client = LlmClient::new(ollama_config(server.base_url())).unwrap();
        let finding = client.analyze_segment("you agree to arbitration").await.unwrap();

        assert_eq!(finding.data_sharing, "Shares aggregate data with third parties");
        assert_eq!(mock.hits_async().await, 1);
    }

    #[tokio::test]
    async fn exhausts_all_attempts_on_server_errors() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("backend down");
            })
            .await;

        let client = LlmClient::new(ollama_config(server.base_url())).unwrap();
        let err = client.analyze_segment("some text").await.unwrap_err();

        assert_eq!(err.attempts, 3);
        assert!(matches!(err.cause, AttemptError::Status { .. }));
        assert_eq!(mock.hits_async().await, 3);
    }

    #[tokio::test]
    async fn malformed_findings_are_retried_like_failures() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200)
                    .json_body(json!({ "response": "I'd be happy to help with that!" }));
            })
            .await;

        let client = LlmClient::new(ollama_config(server.base_url())).unwrap();
        let err = client.analyze_segment("some text").await.unwrap_err();

        assert_eq!(err.attempts, 3);
        assert!(matches!(err.cause, AttemptError::Finding(_)));
        assert_eq!(mock.hits_async().await, 3);
    }
}
