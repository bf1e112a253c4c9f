use std::io::{self, Write};
use std::path::PathBuf;

use tracing::error;
use uuid::Uuid;

use crate::cli::commands::ChatArgs;
use crate::config::{self, resolve_credential, MollyConfig};
use crate::db::Database;
use crate::errors::MollyError;
use crate::llm::create_provider;
use crate::orchestrator::Orchestrator;
use crate::session::ChatSessionRegistry;

/// Runs an interactive terminal conversation against a single `Orchestrator`,
/// reading one line at a time from stdin until EOF or `exit`/`quit`.
pub async fn handle_chat(args: ChatArgs) -> Result<(), MollyError> {
    let file_config = match &args.config {
        Some(path) => config::parse_config(&PathBuf::from(path)).await?,
        None => MollyConfig::default(),
    };

    let db_path = file_config
        .database
        .as_ref()
        .and_then(|d| d.path.clone())
        .unwrap_or(args.db);
    let reports_dir = file_config
        .reporting
        .as_ref()
        .and_then(|r| r.output_directory.clone())
        .unwrap_or(args.reports_dir);

    let llm = file_config.llm.unwrap_or_default();
    let provider_name = llm.provider.unwrap_or(args.provider);
    let model = llm.model.or(args.model);
    let base_url = llm.base_url.or(args.base_url);
    let api_key = llm
        .api_key
        .map(|k| resolve_credential(&k))
        .or(args.api_key)
        .ok_or_else(|| MollyError::Config("no LLM API key provided via --api-key or config".into()))?;

    let db = Database::new(&db_path)?;
    let factory: crate::session::ProviderFactory = std::sync::Arc::new(move || {
        create_provider(&provider_name, &api_key, model.as_deref(), base_url.as_deref())
            .expect("configured LLM provider failed to construct")
    });
    let chat_sessions = std::sync::Arc::new(ChatSessionRegistry::new(factory));
    let orchestrator = Orchestrator::new(db, chat_sessions, PathBuf::from(reports_dir));

    let chat_id = args.chat_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    println!("Molly is listening. Conversation id: {}. Type 'exit' to quit.", chat_id);

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        match orchestrator.handle_query(&chat_id, line).await {
            Ok(reply) => println!("{}\n", reply),
            Err(e) => error!(error = %e, "chat turn failed"),
        }
    }

    Ok(())
}
