use crate::{
    config::GeminiConfig,
    error::{GenerationError, Result},
    gemini::GenerationTransport,
    models::{
        gemini::ErrorEnvelope, GenerateContentRequest, GenerateContentResponse,
        GenerationRequest,
    },
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| GenerationError::Config("Gemini API key is required".into()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs_or_default()))
            .build()
            .map_err(|e| GenerationError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            api_base: config.api_base_or_default(),
            model: config.model_or_default(),
        })
    }

    pub fn endpoint(&self) -> String {
        let model_path = if self.model.starts_with("models/") {
            self.model.clone()
        } else {
            format!("models/{}", self.model)
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn build_headers(&self) -> Result<reqwest::header::HeaderMap> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "x-goog-api-key",
            self.api_key
                .parse()
                .map_err(|_| GenerationError::Config("API key is not a valid header".into()))?,
        );
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        Ok(headers)
    }
}

/// Maps a non-success body to a provider error, keeping the provider's own message
/// when the body is the usual `{"error": {...}}` envelope.
pub(crate) fn provider_error(status: StatusCode, body: &str) -> GenerationError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(kind) if !envelope.error.message.is_empty() => {
                format!("{}: {}", kind, envelope.error.message)
            }
            Some(kind) => kind,
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string(),
        Err(_) => body.trim().to_string(),
    };

    GenerationError::Provider {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl GenerationTransport for GeminiClient {
    async fn generate_content(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerateContentResponse> {
        let payload = GenerateContentRequest::from(request);
        let endpoint = self.endpoint();

        log::debug!(
            "Posting {} image part(s) to {}",
            request.image_count(),
            endpoint
        );

        let response = self
            .client
            .post(&endpoint)
            .headers(self.build_headers()?)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Transport(format!("request timed out: {}", e))
                } else {
                    GenerationError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            log::error!("Gemini returned {}: {}", status, body);
            return Err(provider_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| GenerationError::Response(e.to_string()))
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiClient {
        GeminiClient::new(
            GeminiConfig::new()
                .with_api_key("test-key")
                .with_api_base("http://localhost:9999/v1beta/"),
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_api_key() {
        let result = GeminiClient::new(GeminiConfig::new());
        assert!(matches!(result, Err(GenerationError::Config(_))));
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint(),
            "http://localhost:9999/v1beta/models/gemini-2.5-flash-image-preview:generateContent"
        );

        let prefixed = GeminiClient::new(
            GeminiConfig::new()
                .with_api_key("k")
                .with_model("models/custom-image"),
        )
        .unwrap();
        assert!(prefixed
            .endpoint()
            .ends_with("/v1beta/models/custom-image:generateContent"));
        assert_eq!(prefixed.model(), "models/custom-image");
    }

    #[test]
    fn test_provider_error_from_envelope() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        match provider_error(StatusCode::TOO_MANY_REQUESTS, body) {
            GenerationError::Provider { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_provider_error_from_plain_body() {
        match provider_error(StatusCode::BAD_GATEWAY, "") {
            GenerationError::Provider { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        match provider_error(StatusCode::INTERNAL_SERVER_ERROR, "upstream broke\n") {
            GenerationError::Provider { message, .. } => assert_eq!(message, "upstream broke"),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
