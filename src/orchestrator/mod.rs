pub mod report_handler;
pub mod results;
pub mod scan_pipeline;

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::cve::CveClient;
use crate::db::Database;
use crate::errors::MollyError;
use crate::llm::AskOutcome;
use crate::session::ChatSessionRegistry;

/// Ties together persistence, CVE enrichment and the per-chat LLM
/// conversation to answer a single user turn, dispatching to a scan, a
/// results lookup or a report generation when the model requests one.
pub struct Orchestrator {
    db: Database,
    chat_sessions: Arc<ChatSessionRegistry>,
    cve_client: Arc<CveClient>,
    reports_dir: PathBuf,
}

impl Orchestrator {
    pub fn new(db: Database, chat_sessions: Arc<ChatSessionRegistry>, reports_dir: PathBuf) -> Self {
        Self {
            db,
            chat_sessions,
            cve_client: Arc::new(CveClient::new()),
            reports_dir,
        }
    }

    /// Handles one user message within `chat_id`'s conversation: asks the
    /// model what it wants, then dispatches to the matching tool handler or
    /// returns its prose reply directly.
    pub async fn handle_query(&self, chat_id: &str, user_text: &str) -> Result<String, MollyError> {
        let chat = self.chat_sessions.get_or_create(chat_id);

        let outcome = {
            let mut ctx = chat.lock().await;
            ctx.ask(
                "Determine whether the user wants to perform an action or is asking a general question.",
                "user_message",
                user_text,
                "Respond with a ```json fenced {\"action\": ..., \"parameters\": {...}} object for an action, or plain text otherwise.",
            )
            .await?
        };

        let intent = match outcome {
            AskOutcome::Prose(text) => return Ok(text),
            AskOutcome::Intent(intent) => intent,
        };

        match intent.action.as_str() {
            "start_network_scan" => {
                let Some(target) = intent.parameters.get("target").and_then(Value::as_str) else {
                    let outcome = {
                        let mut ctx = chat.lock().await;
                        ctx.ask(
                            "The user asked to start a network scan but didn't specify a target.",
                            "missing_parameter",
                            user_text,
                            "Ask the user, in plain text, which target (an IP address or a CIDR range) they want to scan.",
                        )
                        .await?
                    };
                    return Ok(match outcome {
                        AskOutcome::Prose(text) => text,
                        AskOutcome::Intent(_) => "Which target would you like me to scan?".to_string(),
                    });
                };
                let session_name = intent.parameters.get("session_name").and_then(Value::as_str);

                let tool_output = scan_pipeline::start_network_scan(
                    &self.db,
                    &self.cve_client,
                    &chat,
                    &self.reports_dir,
                    target,
                    session_name,
                    None,
                )
                .await?;

                Ok(tool_output
                    .get("ai_summary")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| {
                        tool_output
                            .get("error")
                            .and_then(Value::as_str)
                            .unwrap_or("The scan could not be completed.")
                            .to_string()
                    }))
            }
            "get_scan_results" => {
                let scan_id = intent.parameters.get("scan_id").and_then(Value::as_i64);
                let session_name = intent.parameters.get("session_name").and_then(Value::as_str);
                results::get_scan_results_for_ai(&self.db, &chat, scan_id, session_name).await
            }
            "generate_detailed_host_report" => {
                let host_ip = intent
                    .parameters
                    .get("host_ip")
                    .and_then(Value::as_str)
                    .ok_or_else(|| MollyError::BadRequest("generate_detailed_host_report requires host_ip".into()))?;
                let session_name = intent
                    .parameters
                    .get("session_name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| MollyError::BadRequest("generate_detailed_host_report requires session_name".into()))?;

                match report_handler::generate_detailed_host_report(&self.db, &self.reports_dir, host_ip, session_name) {
                    Ok(path) => Ok(format!("Detailed report for {} generated at {}", host_ip, path)),
                    Err(e) => {
                        warn!(error = %e, host_ip, session_name, "detailed host report generation failed");
                        Ok(format!("I couldn't generate that report: {}", e))
                    }
                }
            }
            other => Ok(results::unsupported_action_reply(other)),
        }
    }

    pub fn reset_chat(&self, chat_id: &str) {
        self.chat_sessions.reset(chat_id);
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMProvider;
    use crate::llm::types::LLMResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedProvider {
        replies: Mutex<Vec<String>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<&str>) -> Self {
            Self { replies: Mutex::new(replies.into_iter().rev().map(String::from).collect()) }
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, _prompt: &str, _system: Option<&str>) -> Result<LLMResponse, MollyError> {
            let content = self.replies.lock().unwrap().pop().unwrap_or_default();
            Ok(LLMResponse { content, input_tokens: None, output_tokens: None, cost_usd: None, model: "stub".into() })
        }

        async fn complete_structured(&self, _prompt: &str, _schema: &Value, _system: Option<&str>) -> Result<Value, MollyError> {
            unimplemented!()
        }

        fn provider_name(&self) -> &str { "stub" }
        fn model_name(&self) -> &str { "stub" }
    }

    #[tokio::test]
    async fn test_handle_query_returns_prose_directly() {
        let db = Database::in_memory().unwrap();
        let factory: crate::session::ProviderFactory =
            Arc::new(|| Box::new(ScriptedProvider::new(vec!["Hello there!"])) as Box<dyn LLMProvider>);
        let sessions = Arc::new(ChatSessionRegistry::new(factory));
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(db, sessions, dir.path().to_path_buf());

        let reply = orchestrator.handle_query("chat-1", "what is a CVE?").await.unwrap();
        assert_eq!(reply, "Hello there!");
    }

    #[tokio::test]
    async fn test_handle_query_unsupported_action_is_graceful() {
        let db = Database::in_memory().unwrap();
        let factory: crate::session::ProviderFactory = Arc::new(|| {
            Box::new(ScriptedProvider::new(vec![
                "```json\n{\"action\": \"analyze_service_vulnerability\", \"parameters\": {}}\n```",
            ])) as Box<dyn LLMProvider>
        });
        let sessions = Arc::new(ChatSessionRegistry::new(factory));
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(db, sessions, dir.path().to_path_buf());

        let reply = orchestrator.handle_query("chat-2", "tell me about this ssh banner").await.unwrap();
        assert!(reply.contains("don't currently support"));
    }

    #[tokio::test]
    async fn test_start_network_scan_without_target_asks_for_clarification() {
        let db = Database::in_memory().unwrap();
        let factory: crate::session::ProviderFactory = Arc::new(|| {
            Box::new(ScriptedProvider::new(vec![
                "```json\n{\"action\": \"start_network_scan\", \"parameters\": {}}\n```",
                "Sure, which IP address or range would you like me to scan?",
            ])) as Box<dyn LLMProvider>
        });
        let sessions = Arc::new(ChatSessionRegistry::new(factory));
        let dir = tempfile::tempdir().unwrap();
        let orchestrator = Orchestrator::new(db, sessions, dir.path().to_path_buf());

        let reply = orchestrator.handle_query("chat-3", "can you scan something for me?").await.unwrap();
        assert_eq!(reply, "Sure, which IP address or range would you like me to scan?");
        assert!(orchestrator.db().list_scans().unwrap().is_empty());
    }
}
