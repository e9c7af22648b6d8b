use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use eztodo_config::{AppConfig, ConfigLoader, ConfigSources, Setting};
use eztodo_gateway::{AppState, ChatRequest, GatewayResult, GatewayServer, chat};
use eztodo_security::RedactingWriter;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eztodo", version, about = "AI chat gateway for the eztodo task manager")]
struct Cli {
    /// Path to a YAML config file (defaults to ~/.eztodo/config.yml when present).
    #[arg(long, global = true, env = "EZTODO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway.
    Serve {
        #[arg(long, env = "EZTODO_HOST")]
        host: Option<String>,
        #[arg(long, env = "EZTODO_PORT")]
        port: Option<u16>,
    },
    /// Show which provider would be used and whether it has a credential.
    Resolve,
    /// Send a single message through the gateway in-process.
    Ask { message: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let sources = ConfigSources::from_env();

    match cli.command {
        Command::Serve { host, port } => serve(config, sources, host, port).await,
        Command::Resolve => {
            print_resolution(&sources);
            Ok(ExitCode::SUCCESS)
        }
        Command::Ask { message } => ask(config, sources, message).await,
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(RedactingWriter::stderr())
        .init();
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<AppConfig> {
    let loader = match path {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    loader.load().context("failed to load configuration")
}

async fn serve(
    mut config: AppConfig,
    sources: ConfigSources,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<ExitCode> {
    if let Some(host) = host {
        config.gateway.host = host;
    }
    if let Some(port) = port {
        config.gateway.port = port;
    }
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    GatewayServer::new(config, sources)
        .run()
        .await
        .with_context(|| format!("gateway failed on {addr}"))?;

    info!("gateway stopped");
    Ok(ExitCode::SUCCESS)
}

fn print_resolution(sources: &ConfigSources) {
    let resolved = eztodo_config::resolve(sources);
    println!("provider:   {}", resolved.provider);
    println!(
        "credential: {}",
        if resolved.has_credential() { "set" } else { "not set" }
    );

    for setting in Setting::ALL {
        for source in setting.sources() {
            let state = if sources.get(source.name).is_some() {
                "set"
            } else {
                "-"
            };
            println!("  {:<32} {}", source.name, state);
        }
    }
}

async fn ask(config: AppConfig, sources: ConfigSources, message: String) -> anyhow::Result<ExitCode> {
    let state = AppState::new(config, sources);
    let (json, code) = ask_once(&state, message).await?;
    println!("{json}");
    Ok(ExitCode::from(code))
}

/// Run one message through the controller. Returns the pretty-printed
/// result and the process exit status: 0 on success, 1 on failure.
async fn ask_once(state: &AppState, message: String) -> anyhow::Result<(String, u8)> {
    let result = chat::handle(state, &ChatRequest::new(message)).await;
    let json = serde_json::to_string_pretty(&result.to_json())?;
    Ok((json, exit_status(&result)))
}

fn exit_status(result: &GatewayResult) -> u8 {
    if result.is_success() { 0 } else { 1 }
}
