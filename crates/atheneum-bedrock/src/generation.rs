//! Nova text generation over Bedrock.

use async_trait::async_trait;
use atheneum::config::env_vars::{env_string, BEDROCK_MODEL_ID};
use atheneum::generation::LanguageModel;
use atheneum::{Error, Result};
use aws_sdk_bedrockruntime::primitives::Blob;
use aws_sdk_bedrockruntime::Client;
use serde::{Deserialize, Serialize};

use crate::map_invoke_error;

/// Default text-generation model.
pub const DEFAULT_TEXT_MODEL: &str = "amazon.nova-micro-v1:0";

const DEFAULT_MAX_TOKENS: u32 = 512;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TOP_P: f32 = 0.9;

/// Nova text-generation model integration.
///
/// # Configuration
///
/// - Model id: `BEDROCK_MODEL_ID` env var, or [`with_model`](Self::with_model)
/// - Sampling: [`with_max_tokens`](Self::with_max_tokens),
///   [`with_temperature`](Self::with_temperature), [`with_top_p`](Self::with_top_p)
pub struct NovaTextModel {
    client: Client,
    model_id: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

impl NovaTextModel {
    /// Create a model over an existing Bedrock client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            model_id: env_string(BEDROCK_MODEL_ID)
                .unwrap_or_else(|| DEFAULT_TEXT_MODEL.to_string()),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }

    /// Create a model from the default AWS configuration chain.
    pub async fn from_env() -> Self {
        Self::new(crate::client_from_env().await)
    }

    /// Override the model id.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Cap the generated completion length.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set nucleus-sampling top-p.
    #[must_use]
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }
}

#[async_trait]
impl LanguageModel for NovaTextModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::invalid_input("cannot generate from an empty prompt"));
        }

        let body = serde_json::to_vec(&NovaRequest {
            messages: vec![NovaMessage {
                role: "user",
                content: vec![NovaContent {
                    text: prompt.to_string(),
                }],
            }],
            inference_config: NovaInferenceConfig {
                max_new_tokens: self.max_tokens,
                temperature: self.temperature,
                top_p: self.top_p,
            },
        })?;

        let response = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(map_invoke_error)?;

        let parsed: NovaResponse = serde_json::from_slice(response.body().as_ref())?;
        let text = parsed
            .output
            .message
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_default();
        if text.is_empty() {
            return Err(Error::provider_unavailable(
                "Bedrock returned an empty completion",
            ));
        }

        tracing::trace!(model = %self.model_id, chars = text.len(), "generated completion");
        Ok(text)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[derive(Debug, Serialize)]
struct NovaRequest {
    messages: Vec<NovaMessage>,
    #[serde(rename = "inferenceConfig")]
    inference_config: NovaInferenceConfig,
}

#[derive(Debug, Serialize)]
struct NovaMessage {
    role: &'static str,
    content: Vec<NovaContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NovaContent {
    text: String,
}

#[derive(Debug, Serialize)]
struct NovaInferenceConfig {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct NovaResponse {
    output: NovaOutput,
}

#[derive(Debug, Deserialize)]
struct NovaOutput {
    message: NovaOutputMessage,
}

#[derive(Debug, Deserialize)]
struct NovaOutputMessage {
    content: Vec<NovaContent>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use aws_sdk_bedrockruntime::config::{BehaviorVersion, Region};

    fn test_client() -> Client {
        let conf = aws_sdk_bedrockruntime::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-2"))
            .build();
        Client::from_conf(conf)
    }

    #[test]
    fn defaults_match_the_original_service() {
        let model = NovaTextModel::new(test_client());
        assert_eq!(model.model_id(), DEFAULT_TEXT_MODEL);
        assert_eq!(model.max_tokens, 512);
        assert!((model.temperature - 0.7).abs() < f32::EPSILON);
        assert!((model.top_p - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn builder_overrides() {
        let model = NovaTextModel::new(test_client())
            .with_model("amazon.nova-lite-v1:0")
            .with_max_tokens(256)
            .with_temperature(0.2)
            .with_top_p(0.5);
        assert_eq!(model.model_id(), "amazon.nova-lite-v1:0");
        assert_eq!(model.max_tokens, 256);
    }

    #[test]
    fn request_body_shape() {
        let request = NovaRequest {
            messages: vec![NovaMessage {
                role: "user",
                content: vec![NovaContent {
                    text: "hello".to_string(),
                }],
            }],
            inference_config: NovaInferenceConfig {
                max_new_tokens: 512,
                temperature: 0.7,
                top_p: 0.9,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"][0]["text"], "hello");
        assert_eq!(json["inferenceConfig"]["max_new_tokens"], 512);
        assert!(json["inferenceConfig"]["temperature"].is_number());
        assert!(json["inferenceConfig"]["top_p"].is_number());
    }

    #[test]
    fn response_body_shape() {
        let parsed: NovaResponse = serde_json::from_str(
            r#"{
                "output": {
                    "message": {
                        "role": "assistant",
                        "content": [{"text": "Douglas Adams wrote comedic science fiction."}]
                    }
                },
                "stopReason": "end_turn"
            }"#,
        )
        .unwrap();
        assert_eq!(
            parsed.output.message.content[0].text,
            "Douglas Adams wrote comedic science fiction."
        );
    }

    #[tokio::test]
    async fn empty_prompt_is_rejected_before_the_network() {
        let model = NovaTextModel::new(test_client());
        let result = model.generate("  ").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    #[ignore = "requires AWS credentials and Bedrock access"]
    async fn live_generation_roundtrip() {
        let model = NovaTextModel::from_env().await;
        let answer = model
            .generate("Reply with the single word: ready")
            .await
            .unwrap();
        assert!(!answer.is_empty());
    }
}
