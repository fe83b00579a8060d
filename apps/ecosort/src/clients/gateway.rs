//! AI gateway client.
//!
//! The gateway speaks the OpenAI chat-completions dialect. Output is
//! constrained with a single function tool, `classify_ewaste`, and a forced
//! `tool_choice`; the classification comes back as the tool call's JSON
//! `arguments` string.

use super::{http_client, join_url};
use crate::config::UpstreamConfig;
use ecosort_core::{Category, Classification, ImageUpload};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, error, info};

const TOOL_NAME: &str = "classify_ewaste";

/// Gateway failures. Display strings are shown to users as-is.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("AI gateway API key is not configured")]
    NotConfigured,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI service quota exceeded. Please contact support.")]
    QuotaExceeded,

    #[error("AI Gateway error: {0}")]
    Status(u16),

    #[error("No classification result from AI")]
    NoResult,

    #[error("Invalid classification result: {0}")]
    InvalidResult(String),

    #[error("AI gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
}

// =============================================================================
// RESPONSE SHAPE
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    #[serde(default)]
    name: String,
    arguments: String,
}

// =============================================================================
// CLIENT
// =============================================================================

/// Classification client.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GatewayClient {
    /// Build a client. Fails with [`GatewayError::NotConfigured`] without a key.
    pub fn new(config: &UpstreamConfig) -> Result<Self, GatewayError> {
        let api_key = config
            .gateway_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(GatewayError::NotConfigured)?
            .to_string();

        Ok(Self {
            http: http_client(config)?,
            endpoint: join_url(&config.gateway_url, "v1/chat/completions"),
            api_key,
            model: config.model.clone(),
        })
    }

    /// Classify an image.
    pub async fn classify(&self, image: &ImageUpload) -> Result<Classification, GatewayError> {
        info!(mime = image.mime(), bytes = image.size(), "classification request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body(&self.model, image))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "AI gateway error");
            return Err(match status.as_u16() {
                429 => GatewayError::RateLimited,
                402 => GatewayError::QuotaExceeded,
                code => GatewayError::Status(code),
            });
        }

        let completion: ChatCompletion = response.json().await?;
        debug!("AI response received");

        let classification = parse_completion(completion)?;
        info!(category = %classification.category, "classification successful");
        Ok(classification)
    }
}

fn parse_completion(completion: ChatCompletion) -> Result<Classification, GatewayError> {
    let call = completion
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.tool_calls.into_iter().next())
        .ok_or(GatewayError::NoResult)?;

    if !call.function.name.is_empty() && call.function.name != TOOL_NAME {
        return Err(GatewayError::InvalidResult(format!(
            "unexpected tool '{}'",
            call.function.name
        )));
    }

    let classification: Classification = serde_json::from_str(&call.function.arguments)
        .map_err(|e| GatewayError::InvalidResult(e.to_string()))?;
    classification
        .validate()
        .map_err(|e| GatewayError::InvalidResult(e.to_string()))?;
    Ok(classification)
}

/// The instruction text sent alongside the image.
#[must_use]
pub fn classification_prompt() -> String {
    let categories: String = Category::ALL
        .iter()
        .map(|c| format!("- {} ({})\n", c.label(), c.examples()))
        .collect();

    format!(
        "You are an expert AI system for classifying electronic waste (e-waste).\n\
         Analyze the provided image and identify the type of e-waste shown. \
         Classify it into one of these categories:\n\
         {categories}\n\
         Provide:\n\
         1. Primary category\n\
         2. Confidence level (0-100%)\n\
         3. Specific item identification\n\
         4. Material composition\n\
         5. Recycling recommendations\n\
         6. Environmental hazards if any\n\n\
         Be precise and educational."
    )
}

fn tool_schema() -> Value {
    let categories: Vec<&str> = Category::ALL.iter().map(|c| c.label()).collect();
    json!({
        "type": "function",
        "function": {
            "name": TOOL_NAME,
            "description": "Classify electronic waste and provide recycling guidance",
            "parameters": {
                "type": "object",
                "properties": {
                    "category": {
                        "type": "string",
                        "enum": categories,
                        "description": "Primary e-waste category"
                    },
                    "confidence": {
                        "type": "number",
                        "minimum": 0,
                        "maximum": 100,
                        "description": "Confidence level in percentage"
                    },
                    "item": {
                        "type": "string",
                        "description": "Specific item identification"
                    },
                    "materials": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "List of materials present"
                    },
                    "recycling_guidance": {
                        "type": "string",
                        "description": "Detailed recycling recommendations"
                    },
                    "hazards": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Environmental or health hazards if any"
                    },
                    "disposal_steps": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Step-by-step disposal instructions"
                    }
                },
                "required": [
                    "category", "confidence", "item", "materials",
                    "recycling_guidance", "hazards", "disposal_steps"
                ],
                "additionalProperties": false
            }
        }
    })
}

fn request_body(model: &str, image: &ImageUpload) -> Value {
    json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": classification_prompt() },
                { "type": "image_url", "image_url": { "url": image.data_url() } }
            ]
        }],
        "tools": [tool_schema()],
        "tool_choice": { "type": "function", "function": { "name": TOOL_NAME } }
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn completion(arguments: &str) -> ChatCompletion {
        serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "tool_calls": [{
                        "function": { "name": TOOL_NAME, "arguments": arguments }
                    }]
                }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn new_requires_key() {
        let config = UpstreamConfig::default();
        assert!(matches!(GatewayClient::new(&config), Err(GatewayError::NotConfigured)));

        let blank = UpstreamConfig {
            gateway_key: Some("  ".to_string()),
            ..UpstreamConfig::default()
        };
        assert!(matches!(GatewayClient::new(&blank), Err(GatewayError::NotConfigured)));
    }

    #[test]
    fn request_forces_the_tool() {
        let image = ImageUpload::from_bytes("image/png", &[1, 2, 3]).unwrap();
        let body = request_body("m", &image);
        assert_eq!(body["model"], "m");
        assert_eq!(body["tool_choice"]["function"]["name"], TOOL_NAME);
        assert_eq!(body["tools"][0]["function"]["parameters"]["required"].as_array().unwrap().len(), 7);
        assert_eq!(
            body["messages"][0]["content"][1]["image_url"]["url"],
            image.data_url()
        );
        assert_eq!(
            body["tools"][0]["function"]["parameters"]["properties"]["category"]["enum"][1],
            "Circuit Boards"
        );
    }

    #[test]
    fn prompt_lists_every_category() {
        let prompt = classification_prompt();
        for category in Category::ALL {
            assert!(prompt.contains(category.label()));
        }
    }

    #[test]
    fn parses_tool_arguments() {
        let args = r#"{"category":"Metals","confidence":77.5,"item":"Copper cable",
            "materials":["copper","PVC"],"recycling_guidance":"Scrap yard",
            "hazards":[],"disposal_steps":["Strip insulation"]}"#;
        let c = parse_completion(completion(args)).unwrap();
        assert_eq!(c.category, Category::Metals);
        assert_eq!(c.materials, vec!["copper", "PVC"]);
    }

    #[test]
    fn missing_tool_call_is_no_result() {
        let empty: ChatCompletion =
            serde_json::from_value(json!({"choices":[{"message":{"content":"hi"}}]})).unwrap();
        assert!(matches!(parse_completion(empty), Err(GatewayError::NoResult)));

        let none: ChatCompletion = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(parse_completion(none), Err(GatewayError::NoResult)));
    }

    #[test]
    fn rejects_invalid_arguments() {
        assert!(matches!(
            parse_completion(completion("not json")),
            Err(GatewayError::InvalidResult(_))
        ));

        let out_of_range = r#"{"category":"Metals","confidence":170,"item":"x",
            "materials":[],"recycling_guidance":"","hazards":[],"disposal_steps":[]}"#;
        assert!(matches!(
            parse_completion(completion(out_of_range)),
            Err(GatewayError::InvalidResult(_))
        ));
    }
}
