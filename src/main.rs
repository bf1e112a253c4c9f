use clap::Parser;
use molly_core::cli::{self, Cli, Commands};
use molly_core::errors::MollyError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => cli::serve::handle_serve(args).await,
        Commands::Chat(args) => cli::chat::handle_chat(args).await,
        Commands::Validate(args) => cli::validate::handle_validate(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            MollyError::Config(_) => 2,
            MollyError::Authentication(_) => 4,
            MollyError::BadRequest(_) | MollyError::NotFound(_) => 5,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}
