//! Enrichment client for OpenAI-compatible chat-completion services.
//!
//! One request per food item, JSON-object response mode, no retries. Every
//! failure is mapped to [`UnavailableReason`] and logged, never returned as an
//! error.

use crate::config::toml_config::ServiceConfig;
use crate::domain::model::{
    EnrichmentOutcome, EnrichmentPayload, UnavailableReason, REQUIRED_FIELDS,
};
use crate::domain::ports::Enricher;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const RESPONSE_PREVIEW_CHARS: usize = 200;

const SYSTEM_PROMPT: &str = "You translate food names for a nutrition database. Rules:
1. Write every translation in the language's own script.
2. Chinese must be simplified Chinese characters, never pinyin.
3. Japanese uses kanji and kana as a native speaker would, never romaji.
4. Korean must be Hangul, never romanization.
5. Keep the exact meaning of the original food name.
6. Estimate calories per 100g from common nutrition references.";

fn user_prompt(name: &str, description: &str) -> String {
    format!(
        r#"Translate this food item:

Food Name: {name}
Description: {description}

Reply with ONLY a JSON object containing exactly these fields:
- spanish: the name in Spanish
- french: the name in French
- chinese: the name in simplified Chinese characters
- japanese: the name in Japanese (kanji/kana)
- korean: the name in Hangul
- german: the name in German
- calories_per_100g: a realistic number

Example:
{{
  "spanish": "manzana",
  "french": "pomme",
  "chinese": "苹果",
  "japanese": "りんご",
  "korean": "사과",
  "german": "Apfel",
  "calories_per_100g": 52
}}"#
    )
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// 驗證模型回傳內容；缺任何欄位就整筆作廢
pub fn parse_payload(content: &str) -> std::result::Result<EnrichmentPayload, UnavailableReason> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| UnavailableReason::MalformedJson(e.to_string()))?;

    let object = value.as_object().ok_or_else(|| {
        UnavailableReason::MalformedJson("top-level value is not an object".to_string())
    })?;

    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !object.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(UnavailableReason::MissingFields(missing));
    }

    serde_json::from_value(value).map_err(|e| UnavailableReason::InvalidField(e.to_string()))
}

pub struct OpenAiEnricher {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiEnricher {
    pub fn new(config: &ServiceConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint)
    }

    async fn request_completion(
        &self,
        name: &str,
        description: &str,
    ) -> std::result::Result<String, UnavailableReason> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(name, description),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!("Making API request to: {}", self.completions_url());
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| UnavailableReason::Transport(e.to_string()))?;

        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            return Err(UnavailableReason::HttpStatus(status.as_u16()));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UnavailableReason::Transport(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(UnavailableReason::EmptyCompletion)
    }
}

#[async_trait]
impl Enricher for OpenAiEnricher {
    async fn enrich(&self, name: &str, description: &str) -> EnrichmentOutcome {
        tracing::info!("Requesting translations for: {}", name);

        let result = match self.request_completion(name, description).await {
            Ok(content) => {
                let preview: String = content.chars().take(RESPONSE_PREVIEW_CHARS).collect();
                tracing::info!("Received response for {}: {}...", name, preview);
                parse_payload(&content)
            }
            Err(reason) => Err(reason),
        };

        if let Err(reason) = &result {
            tracing::error!("Enrichment unavailable for {}: {}", name, reason);
        }
        result.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FULL: &str = r#"{
        "spanish": "manzana", "french": "pomme", "chinese": "苹果",
        "japanese": "りんご", "korean": "사과", "german": "Apfel",
        "calories_per_100g": 52
    }"#;

    #[test]
    fn test_parse_payload_accepts_complete_object() {
        let payload = parse_payload(FULL).unwrap();
        assert_eq!(payload.korean, "사과");
        assert_eq!(payload.calories_per_100g.as_u64(), Some(52));
    }

    #[test]
    fn test_parse_payload_rejects_missing_calories() {
        let mut value: Value = serde_json::from_str(FULL).unwrap();
        value.as_object_mut().unwrap().remove("calories_per_100g");

        let reason = parse_payload(&value.to_string()).unwrap_err();
        assert_eq!(
            reason,
            UnavailableReason::MissingFields(vec!["calories_per_100g".to_string()])
        );
    }

    #[test]
    fn test_parse_payload_reports_every_missing_field() {
        let reason = parse_payload(r#"{"spanish": "pan", "german": "Brot"}"#).unwrap_err();
        match reason {
            UnavailableReason::MissingFields(fields) => {
                assert_eq!(
                    fields,
                    vec!["french", "chinese", "japanese", "korean", "calories_per_100g"]
                );
            }
            other => panic!("unexpected reason: {other:?}"),
        }
    }

    #[test]
    fn test_parse_payload_rejects_malformed_and_wrong_types() {
        assert!(matches!(
            parse_payload("not json"),
            Err(UnavailableReason::MalformedJson(_))
        ));
        assert!(matches!(
            parse_payload("[1, 2]"),
            Err(UnavailableReason::MalformedJson(_))
        ));

        let mut value: Value = serde_json::from_str(FULL).unwrap();
        value["calories_per_100g"] = json!("about fifty");
        assert!(matches!(
            parse_payload(&value.to_string()),
            Err(UnavailableReason::InvalidField(_))
        ));
    }

    #[test]
    fn test_request_body_shape() {
        let body = ChatCompletionRequest {
            model: "gpt-3.5-turbo",
            messages: vec![ChatMessage {
                role: "user",
                content: user_prompt("Kiwi", "Fuzzy fruit"),
            }],
            temperature: 0.3,
            max_tokens: 500,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["response_format"], json!({"type": "json_object"}));
        assert_eq!(value["max_tokens"], json!(500));
        let content = value["messages"][0]["content"].as_str().unwrap();
        assert!(content.contains("Food Name: Kiwi"));
        assert!(content.contains("Description: Fuzzy fruit"));
    }
}
