use std::path::PathBuf;

use tracing::info;

use crate::api;
use crate::cli::commands::ServeArgs;
use crate::config::{self, resolve_credential, MollyConfig};
use crate::errors::MollyError;

pub async fn handle_serve(args: ServeArgs) -> Result<(), MollyError> {
    let file_config = match &args.config {
        Some(path) => config::parse_config(&PathBuf::from(path)).await?,
        None => MollyConfig::default(),
    };

    let host = file_config
        .server
        .as_ref()
        .and_then(|s| s.host.clone())
        .unwrap_or(args.host);
    let port = file_config.server.as_ref().and_then(|s| s.port).unwrap_or(args.port);
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
    let provider = llm.provider.unwrap_or(args.provider);
    let model = llm.model.or(args.model);
    let base_url = llm.base_url.or(args.base_url);
    let api_key = llm
        .api_key
        .map(|k| resolve_credential(&k))
        .or(args.api_key)
        .ok_or_else(|| MollyError::Config("no LLM API key provided via --api-key or config".into()))?;

    info!(%host, port, "starting API server");

    let state = api::create_app_state(&db_path, PathBuf::from(reports_dir), provider, api_key, model, base_url).await?;
    let app = api::build_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| MollyError::Internal(format!("server error: {}", e)))?;

    Ok(())
}
