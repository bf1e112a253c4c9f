use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "molly", version, about = "Conversational network security scanning assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve(ServeArgs),
    /// Talk to Molly from the terminal, one conversation at a time
    Chat(ChatArgs),
    /// Validate a YAML configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone)]
pub struct ServeArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listen port
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Listen address
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// SQLite database path
    #[arg(long, default_value = "./data/molly.db")]
    pub db: String,

    /// Directory where generated reports are written
    #[arg(long, default_value = "./reports")]
    pub reports_dir: String,

    /// LLM provider: anthropic, openai, gemini, openrouter, local
    #[arg(long, default_value = "anthropic")]
    pub provider: String,

    /// LLM model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// LLM API key (or use env vars referenced from the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Local/self-hosted LLM endpoint
    #[arg(long)]
    pub base_url: Option<String>,
}

#[derive(Args, Clone)]
pub struct ChatArgs {
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// SQLite database path
    #[arg(long, default_value = "./data/molly.db")]
    pub db: String,

    /// Directory where generated reports are written
    #[arg(long, default_value = "./reports")]
    pub reports_dir: String,

    /// LLM provider: anthropic, openai, gemini, openrouter, local
    #[arg(long, default_value = "anthropic")]
    pub provider: String,

    /// LLM model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// LLM API key (or use env vars referenced from the config file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Local/self-hosted LLM endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// Conversation identifier to resume; a random one is used if omitted
    #[arg(long)]
    pub chat_id: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
