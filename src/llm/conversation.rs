use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::MollyError;

use super::provider::LLMProvider;
use super::tools::{tool_declarations, SYSTEM_PROMPT};
use super::types::Message;

/// A tool invocation decoded from a model reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolIntent {
    pub action: String,
    #[serde(default)]
    pub parameters: Value,
}

/// Result of `ConversationContext::ask`: either the model asked for a tool
/// to be run, or it answered directly in prose.
#[derive(Debug, Clone)]
pub enum AskOutcome {
    Intent(ToolIntent),
    Prose(String),
}

/// One conversational session bound to a `chat_id`. Holds the system
/// directive and tool schemas fixed at construction, plus a growing turn
/// history, mirroring `ModelContextProtocol`'s per-session Gemini chat.
pub struct ConversationContext {
    provider: Box<dyn LLMProvider>,
    tools: Vec<Value>,
    history: Vec<Message>,
}

impl ConversationContext {
    pub fn new(provider: Box<dyn LLMProvider>) -> Self {
        Self {
            provider,
            tools: tool_declarations(),
            history: Vec::new(),
        }
    }

    /// Builds the dynamic four-field prompt exactly as the original's
    /// `ask_gemini` prompt_content f-string did, sends it through the
    /// provider, and decodes the reply into an intent or prose.
    pub async fn ask(
        &mut self,
        objective: &str,
        input_type: &str,
        input_data: &str,
        response_requirements: &str,
    ) -> Result<AskOutcome, MollyError> {
        let prompt = format!(
            "**Current objective of this interaction:** {}\n\
             **Input type:** {}\n\
             **User request:** {}\n\
             **Specific response requirements:** {}\n",
            objective, input_type, input_data, response_requirements
        );

        self.history.push(Message::user(&prompt));

        let system = self.render_system_prompt();
        let text = self
            .provider
            .complete(&prompt, Some(&system))
            .await?
            .content
            .trim()
            .to_string();

        self.history.push(Message::assistant(&text));

        Ok(self.decode(&text))
    }

    /// Appends the tool's output as a synthetic user-role turn (never a
    /// tool-role turn, to sidestep provider-specific function-response
    /// framing) and optionally sends a follow-up user turn after it.
    pub async fn inject_tool_result(
        &mut self,
        tool_output: &Value,
        follow_up: Option<&str>,
    ) -> Result<Option<String>, MollyError> {
        let formatted = format!(
            "Here are the results of the requested action:\n```json\n{}\n```\n",
            serde_json::to_string_pretty(tool_output).unwrap_or_default()
        );
        self.history.push(Message::user(&formatted));

        debug!("injecting tool result into conversation history");

        let system = self.render_system_prompt();
        // Sending the tool-output turn alone doesn't force a reply; mirror the
        // original by only round-tripping to the model when there's a follow-up.
        if let Some(follow_up) = follow_up {
            self.history.push(Message::user(follow_up));
            let response = self.provider.complete(follow_up, Some(&system)).await?;
            self.history.push(Message::assistant(&response.content));
            return Ok(Some(response.content));
        }

        Ok(None)
    }

    /// Clears turn history, keeping the system directive and tool bindings.
    pub fn reset(&mut self) {
        self.history.clear();
        info!("conversation history reset");
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    fn render_system_prompt(&self) -> String {
        format!(
            "{}\n\nAvailable tools:\n{}",
            SYSTEM_PROMPT,
            serde_json::to_string_pretty(&self.tools).unwrap_or_default()
        )
    }

    /// Two-level intent decoding: scan the reply for a fenced ```json block;
    /// if it decodes to an object carrying an `action` key, it's an intent,
    /// promoting any top-level `target`/`session_name` into `parameters` if
    /// absent there (the original's explicit fallback block). Anything else
    /// is treated as prose.
    fn decode(&self, text: &str) -> AskOutcome {
        let Some(start) = text.find("```json") else {
            return AskOutcome::Prose(text.to_string());
        };
        let rest = &text[start + "```json".len()..];
        let Some(end) = rest.find("```") else {
            return AskOutcome::Prose(text.to_string());
        };
        let json_str = rest[..end].trim();

        let parsed: Value = match serde_json::from_str(json_str) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "model emitted a json-fenced block that failed to parse; treating as prose");
                return AskOutcome::Prose(text.to_string());
            }
        };

        let Some(obj) = parsed.as_object() else {
            return AskOutcome::Prose(text.to_string());
        };
        let Some(action) = obj.get("action").and_then(Value::as_str) else {
            return AskOutcome::Prose(text.to_string());
        };

        let mut parameters = obj
            .get("parameters")
            .or_else(|| obj.get("params"))
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        if let Some(params_obj) = parameters.as_object_mut() {
            for key in ["target", "session_name"] {
                if !params_obj.contains_key(key) {
                    if let Some(v) = obj.get(key) {
                        params_obj.insert(key.to_string(), v.clone());
                    }
                }
            }
        }

        info!(action = %action, "model suggested a parseable action");
        AskOutcome::Intent(ToolIntent {
            action: action.to_string(),
            parameters,
        })
    }
}
