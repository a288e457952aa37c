//! Gemini `generateContent` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::parse::{extract_labels, parse_quiz_response, OPTIONS_PER_QUESTION};
use super::{illustration, prompt, AiOutcome, ChatMessage, Illustration, Quiz, TutorModel};
use crate::config::AiConfig;
use crate::error::TutorError;

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(config: &AiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            model: config.model.clone(),
            image_model: config.image_model.clone(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// POST `body` to `model` and return the decoded JSON response.
    /// Errors are user-presentable strings.
    async fn generate(&self, model: &str, body: &Value) -> Result<Value, String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err("no Gemini API key is configured (set GEMINI_API_KEY)".into());
        };

        // header auth keeps the key out of URLs and logs
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        info!(model, url_prefix = %self.base_url, "Calling Gemini");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini HTTP request failed: {}", e);
                "the AI service could not be reached".to_string()
            })?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| {
            error!("Failed to read response body: {}", e);
            "the AI service returned an unreadable response".to_string()
        })?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %truncate(&text, 500), "Gemini returned an error");
            return Err(format!("the AI service returned HTTP {}", status.as_u16()));
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("Gemini response was not JSON: {}", e);
            "the AI service returned an unreadable response".to_string()
        })
    }
}

#[async_trait]
impl TutorModel for GeminiClient {
    async fn explain(&self, history: &[ChatMessage], system_instruction: &str) -> AiOutcome {
        let body = explain_body(history, system_instruction);
        match self.generate(&self.model, &body).await {
            Ok(data) => {
                let outcome = AiOutcome::from_text(response_text(&data));
                if outcome == AiOutcome::Empty {
                    debug!(note = ?block_note(&data), "Gemini returned no text");
                }
                outcome
            }
            Err(msg) => AiOutcome::Failure(msg),
        }
    }

    async fn generate_quiz(
        &self,
        topic: &str,
        count: usize,
        system_instruction: &str,
    ) -> Result<Quiz, TutorError> {
        let body = quiz_body(topic, count, system_instruction);
        let data = self
            .generate(&self.model, &body)
            .await
            .map_err(TutorError::Ai)?;
        let text = response_text(&data);
        if text.trim().is_empty() {
            return Err(TutorError::EmptyResponse);
        }
        parse_quiz_response(&text)
    }

    async fn illustrate(&self, description: &str) -> Illustration {
        let body = image_body(description);
        let data = match self.generate(&self.image_model, &body).await {
            Ok(data) => data,
            Err(msg) => {
                warn!(error = %msg, "diagram generation failed, rendering placeholder");
                return illustration::placeholder(description);
            }
        };

        match inline_image(&data) {
            Some((mime_type, image)) => {
                let caption = response_text(&data);
                let mut labels = extract_labels(&caption);
                if labels.is_empty() {
                    labels = extract_labels(description);
                }
                Illustration {
                    mime_type,
                    data: image,
                    description: description.to_string(),
                    labels,
                    is_placeholder: false,
                }
            }
            None => {
                warn!("Gemini returned no image data, rendering placeholder");
                illustration::placeholder(description)
            }
        }
    }
}

/// Map the transcript to Gemini `contents`, attaching inline media to the
/// turn that carried it.
pub fn build_contents(history: &[ChatMessage]) -> Vec<Value> {
    history
        .iter()
        .map(|msg| {
            let mut parts = Vec::new();
            if !msg.content.is_empty() {
                parts.push(json!({ "text": msg.content }));
            }
            if let Some(att) = &msg.attachment {
                parts.push(json!({
                    "inlineData": { "mimeType": att.mime_type, "data": att.data }
                }));
            }
            json!({ "role": msg.role.as_str(), "parts": parts })
        })
        .collect()
}

pub fn explain_body(history: &[ChatMessage], system_instruction: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "contents": build_contents(history),
    })
}

pub fn quiz_body(topic: &str, count: usize, system_instruction: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt::quiz_request(topic, count) }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": quiz_schema(),
        },
    })
}

pub fn image_body(description: &str) -> Value {
    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt::illustration_request(description) }] }],
        "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] },
    })
}

fn quiz_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "questions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "question": { "type": "STRING" },
                        "options": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "minItems": OPTIONS_PER_QUESTION,
                            "maxItems": OPTIONS_PER_QUESTION,
                        },
                        "correctAnswerIndex": { "type": "INTEGER" },
                        "explanation": { "type": "STRING" },
                    },
                    "required": ["question", "options", "correctAnswerIndex", "explanation"],
                },
            },
        },
        "required": ["questions"],
    })
}

/// Concatenated non-thought text of the first candidate.
pub fn response_text(data: &Value) -> String {
    let Some(parts) = data["candidates"][0]["content"]["parts"].as_array() else {
        return String::new();
    };
    parts
        .iter()
        .filter(|p| !p.get("thought").and_then(Value::as_bool).unwrap_or(false))
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect()
}

/// First inline image part of the first candidate as `(mime_type, base64)`.
pub fn inline_image(data: &Value) -> Option<(String, String)> {
    data["candidates"][0]["content"]["parts"]
        .as_array()?
        .iter()
        .find_map(|p| {
            let inline = p.get("inlineData")?;
            let mime = inline.get("mimeType")?.as_str()?;
            let payload = inline.get("data")?.as_str()?;
            mime.starts_with("image/")
                .then(|| (mime.to_string(), payload.to_string()))
        })
}

fn block_note(data: &Value) -> Option<String> {
    if let Some(reason) = data["promptFeedback"]["blockReason"].as_str() {
        return Some(format!("prompt blocked ({reason})"));
    }
    data["candidates"][0]["finishReason"]
        .as_str()
        .filter(|r| !r.eq_ignore_ascii_case("STOP"))
        .map(|r| format!("finish reason: {r}"))
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{Attachment, Role};
    use chrono::Utc;

    fn msg(role: Role, content: &str, attachment: Option<Attachment>) -> ChatMessage {
        ChatMessage {
            role,
            content: content.into(),
            attachment,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn contents_carry_roles_and_inline_media() {
        let history = vec![
            msg(Role::User, "What is this?", Some(Attachment::from_bytes("image/png", b"png"))),
            msg(Role::Model, "A triangle.", None),
            msg(Role::User, "Why?", None),
        ];
        let body = explain_body(&history, "be kind");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be kind");

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[0]["parts"][1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn quiz_body_requests_json_schema() {
        let body = quiz_body("fractions", 5, "sys");
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert!(body["contents"][0]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("fractions"));
    }

    #[test]
    fn response_text_skips_thoughts() {
        let data = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "7 x 8 = " },
                    { "text": "56" }
                ]}
            }]
        });
        assert_eq!(response_text(&data), "7 x 8 = 56");
    }

    #[test]
    fn response_text_empty_without_candidates() {
        let data = json!({ "promptFeedback": { "blockReason": "SAFETY" } });
        assert_eq!(response_text(&data), "");
        assert_eq!(block_note(&data).as_deref(), Some("prompt blocked (SAFETY)"));
    }

    #[test]
    fn inline_image_found() {
        let data = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Labels: Root, Stem" },
                    { "inlineData": { "mimeType": "image/png", "data": "AAAA" } }
                ]}
            }]
        });
        assert_eq!(inline_image(&data), Some(("image/png".into(), "AAAA".into())));
    }

    #[tokio::test]
    async fn missing_api_key_is_failure_outcome() {
        let client = GeminiClient::new(&AiConfig::default()).unwrap();
        assert!(!client.has_api_key());
        let outcome = client.explain(&[msg(Role::User, "hi", None)], "sys").await;
        assert!(matches!(outcome, AiOutcome::Failure(m) if m.contains("API key")));
        let ill = client.illustrate("a cell").await;
        assert!(ill.is_placeholder);
    }
}
