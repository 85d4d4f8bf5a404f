//! OpenAI-compatible chat-completions client with function tools.

use async_trait::async_trait;
use komando_common::{IntentArgument, KomandoError, Result};
use serde::{Deserialize, Serialize};

use crate::client::{
    ClassifierClient, ClassifierRequest, ClassifierResponse, FunctionCall, HistoryRole,
    ToolDeclaration,
};

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<OpenAiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    tool_type: &'static str,
    function: OpenAiFunction,
}

#[derive(Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
}

#[derive(Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<OpenAiToolCall>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    function: OpenAiFunctionCall,
}

#[derive(Deserialize)]
struct OpenAiFunctionCall {
    name: String,
    /// JSON-encoded argument object.
    #[serde(default)]
    arguments: String,
}

/// Client for OpenAI-compatible `/v1/chat/completions` endpoints with tools.
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(base_url: Option<String>, model: String, api_key: String) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
            http_client: reqwest::Client::new(),
        }
    }

    fn role_to_string(role: HistoryRole) -> &'static str {
        match role {
            HistoryRole::User => "user",
            HistoryRole::Model => "assistant",
        }
    }

    fn convert_tools(tools: &[ToolDeclaration]) -> Vec<OpenAiTool> {
        tools
            .iter()
            .map(|tool| OpenAiTool {
                tool_type: "function",
                function: OpenAiFunction {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                },
            })
            .collect()
    }

    fn build_request_body(&self, request: &ClassifierRequest) -> OpenAiRequest {
        let mut messages = Vec::new();
        if let Some(ref system) = request.system_instruction {
            messages.push(OpenAiMessage {
                role: "system",
                content: system.clone(),
            });
        }
        for entry in &request.history {
            messages.push(OpenAiMessage {
                role: Self::role_to_string(entry.role),
                content: entry.text.clone(),
            });
        }
        OpenAiRequest {
            model: self.model.clone(),
            messages,
            tools: Self::convert_tools(&request.tools),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    fn parse_response(response: OpenAiResponse) -> Result<ClassifierResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| KomandoError::Classifier("No choices in OpenAI response".to_string()))?;

        let function_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| {
                let args = parse_arguments(&call.function.arguments)?;
                Ok(FunctionCall {
                    name: call.function.name,
                    args,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ClassifierResponse {
            text: choice.message.content.filter(|t| !t.is_empty()),
            function_calls,
        })
    }
}

fn parse_arguments(raw: &str) -> Result<IntentArgument> {
    if raw.trim().is_empty() {
        return Ok(IntentArgument::new());
    }
    serde_json::from_str(raw).map_err(|e| {
        KomandoError::Classifier(format!("Malformed tool call arguments: {e}"))
    })
}

#[async_trait]
impl ClassifierClient for OpenAiClient {
    async fn complete(&self, request: ClassifierRequest) -> Result<ClassifierResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| KomandoError::Classifier(format!("OpenAI request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(KomandoError::Classifier(format!(
                "OpenAI API error {status}: {body_text}"
            )));
        }

        let oai_response: OpenAiResponse = response.json().await.map_err(|e| {
            KomandoError::Classifier(format!("Failed to parse OpenAI response: {e}"))
        })?;

        Self::parse_response(oai_response)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HistoryEntry;
    use serde_json::json;

    #[test]
    fn request_body_matches_openai_format() {
        let client = OpenAiClient::new(None, "gpt-4o-mini".to_string(), "sk-test".to_string());
        let request = ClassifierRequest {
            system_instruction: Some("Delegasikan.".to_string()),
            history: vec![HistoryEntry::model("Selamat datang."), HistoryEntry::user("Halo")],
            tools: vec![ToolDeclaration {
                name: "panggil_sub_agen_penagihan".to_string(),
                description: "Tagihan".to_string(),
                parameters: json!({"type": "object"}),
            }],
            temperature: Some(0.5),
            max_tokens: Some(512),
        };

        let json = serde_json::to_value(client.build_request_body(&request)).unwrap();

        assert_eq!(json["model"], "gpt-4o-mini");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["max_tokens"], 512);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "assistant");
        assert_eq!(messages[2]["role"], "user");
        assert_eq!(json["tools"][0]["type"], "function");
        assert_eq!(json["tools"][0]["function"]["name"], "panggil_sub_agen_penagihan");
    }

    #[test]
    fn request_body_omits_optional_fields() {
        let client = OpenAiClient::new(None, "gpt-4o-mini".to_string(), "sk-test".to_string());
        let request = ClassifierRequest {
            history: vec![HistoryEntry::user("Halo")],
            ..Default::default()
        };
        let json = serde_json::to_value(client.build_request_body(&request)).unwrap();
        assert!(json.get("tools").is_none());
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn parses_tool_calls() {
        let raw = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "panggil_sub_agen_rekam_medis",
                            "arguments": "{\"permintaan_pengguna\": \"Cek hasil lab\"}"
                        }
                    }]
                }
            }]
        });
        let response: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let parsed = OpenAiClient::parse_response(response).unwrap();
        assert!(parsed.text.is_none());
        assert_eq!(parsed.function_calls.len(), 1);
        assert_eq!(parsed.function_calls[0].args["permintaan_pengguna"], "Cek hasil lab");
    }

    #[test]
    fn parses_plain_text_reply() {
        let raw = json!({"choices": [{"message": {"content": "Halo!"}}]});
        let response: OpenAiResponse = serde_json::from_value(raw).unwrap();
        let parsed = OpenAiClient::parse_response(response).unwrap();
        assert_eq!(parsed.text.as_deref(), Some("Halo!"));
        assert!(parsed.function_calls.is_empty());
    }

    #[test]
    fn malformed_arguments_are_classifier_errors() {
        assert!(parse_arguments("{not json").is_err());
        assert!(parse_arguments("").unwrap().is_empty());
    }

    #[test]
    fn empty_choices_is_an_error() {
        let response: OpenAiResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(OpenAiClient::parse_response(response).is_err());
    }
}
