use crate::domain::error::{ConfigError, ModelError};
use crate::domain::models::ContextConfig;
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The remote document generator: one prompt in, one markdown document out.
pub trait ModelClient {
    fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub const API_KEY_ENV: &'static str = "GEMINI_API_KEY";
    pub const DEFAULT_MODEL: &'static str = ContextConfig::DEFAULT_MODEL;
    pub const DEFAULT_BASE_URL: &'static str = ContextConfig::DEFAULT_BASE_URL;

    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(ContextConfig::DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_key(std::env::var(Self::API_KEY_ENV).ok())
    }

    /// An absent or blank key is a configuration error.
    pub fn from_key(api_key: Option<String>) -> Result<Self, ConfigError> {
        match api_key {
            Some(key) if !key.trim().is_empty() => Ok(Self::new(key.trim())),
            _ => Err(ConfigError::MissingCredential {
                var: Self::API_KEY_ENV,
            }),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}models/{}:generateContent", self.base_url, self.model)
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateContentRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

impl GenerateContentResponse {
    /// Joins the text parts of the first candidate.
    pub fn into_text(self) -> Result<String, ModelError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            Err(ModelError::EmptyResponse)
        } else {
            Ok(text)
        }
    }
}

pub struct GeminiClient {
    config: GeminiConfig,
    client: Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }
}

impl ModelClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let url = self.config.endpoint();
        info!("Sending request to {} ({} chars)", self.config.model, prompt.len());

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.config.api_key.as_str())
            .json(&GenerateContentRequest::from_prompt(prompt))
            .send()
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        debug!("Model API responded with {}", status);
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;
        parsed.into_text()
    }
}

impl GeminiClient {
    fn transport_error(&self, err: reqwest::Error) -> ModelError {
        if err.is_timeout() {
            ModelError::Timeout(self.config.timeout.as_secs())
        } else {
            ModelError::Http(err)
        }
    }
}

fn status_error(status: StatusCode, body: &str) -> ModelError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::InvalidCredential {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => ModelError::RateLimited(message),
        _ => ModelError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const ENDPOINT: &str = "/models/gemini-2.0-flash:generateContent";

    fn client_for(server: &mockito::Server) -> GeminiClient {
        let config = GeminiConfig::new("test-key").with_base_url(server.url());
        GeminiClient::new(config).unwrap()
    }

    #[test]
    fn test_from_key() {
        assert!(matches!(
            GeminiConfig::from_key(None),
            Err(ConfigError::MissingCredential { var: "GEMINI_API_KEY" })
        ));
        assert!(GeminiConfig::from_key(Some("   ".to_string())).is_err());

        let config = GeminiConfig::from_key(Some(" abc ".to_string())).unwrap();
        assert_eq!(config.api_key, "abc");
        assert_eq!(config.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_endpoint() {
        let config = GeminiConfig::new("k")
            .with_base_url("http://localhost:1234/v1beta")
            .with_model("gemini-1.5-pro");
        assert_eq!(
            config.endpoint(),
            "http://localhost:1234/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateContentRequest::from_prompt("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "# Title\n"}, {"text": "Body"}]}}]
        }))
        .unwrap();
        assert_eq!(response.into_text().unwrap(), "# Title\nBody");

        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(empty.into_text(), Err(ModelError::EmptyResponse)));
    }

    #[test]
    fn test_generate_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", ENDPOINT)
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "contents": [{"parts": [{"text": "describe this"}]}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r##"{"candidates":[{"content":{"parts":[{"text":"# Demo README"}]}}]}"##)
            .create();

        let document = client_for(&server).generate("describe this").unwrap();

        assert_eq!(document, "# Demo README");
        mock.assert();
    }

    #[test]
    fn test_generate_maps_status_codes() {
        let mut server = mockito::Server::new();
        let _denied = server
            .mock("POST", ENDPOINT)
            .with_status(403)
            .with_body(r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#)
            .create();

        let err = client_for(&server).generate("x").unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidCredential { status: 403, ref message } if message == "API key not valid"
        ));
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            ModelError::RateLimited(ref m) if m == "slow down"
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":{"message":"boom"}}"#),
            ModelError::Api { status: 500, ref message } if message == "boom"
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, ""),
            ModelError::InvalidCredential { status: 401, .. }
        ));
    }
}
