//! Gemini `generateContent` client for intent classification.

use async_trait::async_trait;
use komando_common::{IntentArgument, KomandoError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use crate::client::{
    ClassifierClient, ClassifierRequest, ClassifierResponse, FunctionCall, HistoryRole,
    ToolDeclaration,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiSystemInstruction>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: &'static str,
    parts: Vec<GeminiTextPart>,
}

#[derive(Debug, Serialize)]
struct GeminiTextPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiTool {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize, Default)]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(rename = "maxOutputTokens", skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(rename = "promptFeedback")]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    thought: bool,
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Debug, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Deserialize)]
struct GeminiPromptFeedback {
    #[serde(rename = "blockReason")]
    block_reason: Option<String>,
}

/// Client for the Gemini `generateContent` endpoint with function calling.
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(base_url: Option<String>, model: String, api_key: String) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            model,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn role_to_string(role: HistoryRole) -> &'static str {
        match role {
            HistoryRole::User => "user",
            HistoryRole::Model => "model",
        }
    }

    fn convert_tools(tools: &[ToolDeclaration]) -> Vec<GeminiTool> {
        if tools.is_empty() {
            return Vec::new();
        }
        vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|tool| GeminiFunctionDeclaration {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                })
                .collect(),
        }]
    }

    fn build_request_body(request: &ClassifierRequest) -> GeminiRequest {
        GeminiRequest {
            contents: request
                .history
                .iter()
                .map(|entry| GeminiContent {
                    role: Self::role_to_string(entry.role),
                    parts: vec![GeminiTextPart {
                        text: entry.text.clone(),
                    }],
                })
                .collect(),
            system_instruction: request.system_instruction.as_ref().map(|text| {
                GeminiSystemInstruction {
                    parts: vec![GeminiTextPart { text: text.clone() }],
                }
            }),
            tools: Self::convert_tools(&request.tools),
            generation_config: GeminiGenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
            },
        }
    }

    fn parse_response(response: GeminiResponse) -> Result<ClassifierResponse> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!("prompt blocked: {r}"))
                .unwrap_or_else(|| "no candidates in Gemini response".to_string());
            return Err(KomandoError::Classifier(reason));
        };

        debug!(finish_reason = ?candidate.finish_reason, "Gemini candidate received");

        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();
        let mut text = None;
        let mut function_calls = Vec::new();

        for part in parts {
            if part.thought {
                continue;
            }
            if text.is_none() {
                if let Some(t) = part.text.filter(|t| !t.is_empty()) {
                    text = Some(t);
                }
            }
            if let Some(call) = part.function_call {
                function_calls.push(FunctionCall {
                    name: call.name,
                    args: args_to_map(call.args)?,
                });
            }
        }

        Ok(ClassifierResponse {
            text,
            function_calls,
        })
    }
}

fn args_to_map(args: Value) -> Result<IntentArgument> {
    match args {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(IntentArgument::new()),
        other => Err(KomandoError::Classifier(format!(
            "function call arguments must be an object, got {other}"
        ))),
    }
}

#[async_trait]
impl ClassifierClient for GeminiClient {
    async fn complete(&self, request: ClassifierRequest) -> Result<ClassifierResponse> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = Self::build_request_body(&request);

        // Key goes in a header, never in the URL.
        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| KomandoError::Classifier(format!("Gemini request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            error!(%status, body = %body_text, "Gemini API error response");
            return Err(KomandoError::Classifier(format!(
                "Gemini API error {status}: {body_text}"
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            KomandoError::Classifier(format!("Failed to parse Gemini response: {e}"))
        })?;

        Self::parse_response(gemini_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
