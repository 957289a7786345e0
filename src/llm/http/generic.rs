use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::{FlowError, Result};
use crate::llm::client::LlmClient;
use crate::llm::response_cleaner::parse_structured;
use crate::llm::types::{LlmRequest, LlmResponse, ToolCall};

const ERROR_PREVIEW_LEN: usize = 500;

/// Chat-completions client. Speaks the OpenAI wire format, which Gemini
/// and most hosted models expose as a compatibility endpoint.
#[derive(Clone)]
pub struct GenericHttpClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl GenericHttpClient {
    fn build_client(timeout: Duration) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| FlowError::Config(format!("failed to build HTTP client: {e}")))
    }

    pub fn new<S1, S2, S3>(endpoint: S1, api_key: S2, model: S3) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::with_timeout(endpoint, api_key, model, Duration::from_secs(120))
    }

    pub fn with_timeout<S1, S2, S3>(
        endpoint: S1,
        api_key: S2,
        model: S3,
        timeout: Duration,
    ) -> Result<Self>
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Ok(Self {
            client: Self::build_client(timeout)?,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn full_endpoint(&self) -> String {
        if self.endpoint.contains("/chat/completions") {
            self.endpoint.clone()
        } else {
            format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
        }
    }

    fn build_body(&self, request: &LlmRequest) -> Value {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({ "role": "system", "content": system }));
        }

        let user_content = if request.media.is_empty() {
            json!(request.prompt)
        } else {
            let mut parts = vec![json!({ "type": "text", "text": request.prompt })];
            parts.extend(request.media.iter().map(|media| {
                json!({ "type": "image_url", "image_url": { "url": media.url } })
            }));
            json!(parts)
        };
        messages.push(json!({ "role": "user", "content": user_content }));

        if !request.tool_results.is_empty() {
            let calls: Vec<Value> = request
                .tool_results
                .iter()
                .map(|execution| {
                    json!({
                        "id": execution.id,
                        "type": "function",
                        "function": {
                            "name": execution.name,
                            "arguments": execution.input.to_string(),
                        }
                    })
                })
                .collect();
            messages.push(json!({ "role": "assistant", "content": Value::Null, "tool_calls": calls }));
            for execution in &request.tool_results {
                messages.push(json!({
                    "role": "tool",
                    "tool_call_id": execution.id,
                    "content": execution.output.to_string(),
                }));
            }
        }

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature,
        });

        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = json!(tools);
        }

        if let Some(schema) = &request.output_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema.name.clone().unwrap_or_else(|| "output".to_string()),
                    "schema": schema.to_json_schema(),
                }
            });
        }
        body
    }
}

fn truncate(text: &str) -> String {
    if text.len() <= ERROR_PREVIEW_LEN {
        return text.to_string();
    }
    let mut cut = ERROR_PREVIEW_LEN;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...(truncated, {} bytes total)", &text[..cut], text.len())
}

/// Extracts tool calls and the structured reply from a chat-completions payload.
pub(crate) fn parse_completion(payload: &Value) -> Result<LlmResponse> {
    let message = &payload["choices"][0]["message"];
    if message.is_null() {
        return Err(FlowError::Generation(format!(
            "response has no message: {}",
            truncate(&payload.to_string())
        )));
    }

    let mut tool_calls = Vec::new();
    if let Some(calls) = message["tool_calls"].as_array() {
        for (idx, call) in calls.iter().enumerate() {
            let Some(name) = call["function"]["name"].as_str() else {
                continue;
            };
            let arguments = match &call["function"]["arguments"] {
                Value::String(raw) => serde_json::from_str(raw).map_err(|e| {
                    FlowError::Generation(format!("tool `{name}` arguments are not JSON: {e}"))
                })?,
                Value::Null => json!({}),
                other => other.clone(),
            };
            tool_calls.push(ToolCall {
                id: call["id"]
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("call-{idx}")),
                name: name.to_string(),
                arguments,
            });
        }
    }

    let output = message["content"].as_str().and_then(parse_structured);
    Ok(LlmResponse {
        output,
        tool_calls,
        metadata: payload.get("usage").cloned(),
    })
}

#[async_trait]
impl LlmClient for GenericHttpClient {
    #[instrument(skip(self, request), fields(model = %self.model))]
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let endpoint = self.full_endpoint();
        let body = self.build_body(&request);

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FlowError::Generation(format!("HTTP request error: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FlowError::Generation(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(FlowError::Generation(format!(
                "request to {} failed with status {}: {}",
                endpoint,
                status,
                truncate(&text)
            )));
        }

        let payload: Value = serde_json::from_str(&text).map_err(|e| {
            FlowError::Generation(format!("response parse error: {e}: {}", truncate(&text)))
        })?;
        let parsed = parse_completion(&payload)?;
        debug!(
            tool_calls = parsed.tool_calls.len(),
            has_output = parsed.output.is_some(),
            "completion received"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::MediaRef;
    use crate::schema::Schema;
    use crate::tools::ToolExecution;

    fn client() -> GenericHttpClient {
        GenericHttpClient::new("https://example.test/v1", "key", "test-model").unwrap()
    }

    #[test]
    fn appends_chat_completions_path() {
        assert_eq!(
            client().full_endpoint(),
            "https://example.test/v1/chat/completions"
        );
    }

    #[test]
    fn body_carries_media_tools_results_and_schema() {
        let mut request = LlmRequest::new("describe")
            .with_media(vec![MediaRef::parse("data:image/png;base64,aGVsbG8=").unwrap()])
            .with_output_schema(Schema::object().field("description", Schema::string()));
        request.tool_results.push(ToolExecution {
            id: "c1".into(),
            name: "lookup".into(),
            input: json!({ "q": 1 }),
            output: json!({ "ok": true }),
        });
        let body = client().build_body(&request);
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages[0]["content"][1]["type"], "image_url");
        assert_eq!(messages[1]["tool_calls"][0]["id"], "c1");
        assert_eq!(messages[2]["role"], "tool");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn parses_tool_calls_and_fenced_content() {
        let payload = json!({
            "choices": [{
                "message": {
                    "content": "```json\n{\"reply\": \"hi\"}\n```",
                    "tool_calls": [{
                        "id": "abc",
                        "function": { "name": "lookup", "arguments": "{\"category\":\"Plumbing\"}" }
                    }]
                }
            }]
        });
        let parsed = parse_completion(&payload).unwrap();
        assert_eq!(parsed.tool_calls[0].arguments["category"], "Plumbing");
        assert_eq!(parsed.output.unwrap()["reply"], "hi");
    }

    #[test]
    fn missing_message_is_an_error() {
        assert!(parse_completion(&json!({ "choices": [] })).is_err());
    }
}
