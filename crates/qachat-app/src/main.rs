mod cli;
mod config;
mod repl;

use tracing_subscriber::EnvFilter;

use qachat_ai::{GeminiClient, GeminiConfig, Session};

/// Load environment variables from a .env file (KEY=VALUE lines).
fn load_dotenv(explicit: Option<&str>) {
    let mut candidates = Vec::new();
    if let Some(path) = explicit {
        candidates.push(std::path::PathBuf::from(path));
    }
    // Workspace root (qachat/) — two levels up from crates/qachat-app/
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    candidates.push(manifest_dir.join("..").join("..").join(".env"));
    candidates.push(std::path::PathBuf::from(".env"));

    for path in &candidates {
        if let Ok(contents) = std::fs::read_to_string(path) {
            for line in contents.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    let key = key.trim();
                    let value = value.trim().trim_matches('"').trim_matches('\'');
                    if std::env::var(key).is_err() {
                        std::env::set_var(key, value);
                    }
                }
            }
            return;
        }
    }
}

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // Load .env before reading any configuration
    load_dotenv(args.env_file.as_deref());

    // Initialize logging
    let log_directive = args.log_level.as_deref().unwrap_or("qachat=warn");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "qachat=warn".parse().unwrap()),
            ),
        )
        .init();

    tracing::info!("qachat v{} starting...", env!("CARGO_PKG_VERSION"));

    // Configuration errors are fatal before any session starts
    let config = match config::AppConfig::from_env(args.model) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {e}");
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    let mut gemini = GeminiConfig::new(config.api_key);
    if let Some(model) = config.model {
        gemini = gemini.with_model(model);
    }
    tracing::info!(model = %gemini.model, "Using model");

    let client = GeminiClient::new(gemini);
    let mut session = Session::new();

    if let Err(e) = repl::run(&mut session, &client).await {
        tracing::error!("I/O error: {e}");
        std::process::exit(1);
    }
    tracing::info!("Shutdown complete");
}
