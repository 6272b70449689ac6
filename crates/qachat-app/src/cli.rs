use clap::Parser;

/// qachat — a terminal chat client for Google's Generative Language API.
#[derive(Parser, Debug)]
#[command(name = "qachat", version, about)]
pub struct Args {
    /// Model to chat with (overrides QACHAT_MODEL).
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Path to a .env file to load before reading the environment.
    #[arg(long)]
    pub env_file: Option<String>,

    /// Log level override (debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
