use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use llm_connector::{require_transport, Config, Driver, FileStore, HttpTransport};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// llm-connector - send a payload to every known LLM endpoint
#[derive(Parser, Debug)]
#[command(name = "llm-connector")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (default: ~/.config/llm-connector/settings.toml)
    #[arg(short, long, env = "LLM_CONNECTOR_SETTINGS")]
    settings: Option<PathBuf>,

    /// Working directory
    #[arg(short, long)]
    working_dir: Option<PathBuf>,

    /// Text to send instead of the configured payload
    #[arg(short, long, global = true)]
    text: Option<String>,

    /// Write diagnostics to a file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send the payload to FROM and forward its answer to TO
    Relay {
        from: String,
        to: String,
    },
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            registry
                .with(fmt::layer().with_writer(file).with_ansi(false))
                .init();
        }
        None => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env files (local first, then home directory)
    // Errors are ignored - files are optional
    let _ = dotenvy::from_filename(".env");
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".env"));
    }

    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    if let Some(ref working_dir) = args.working_dir {
        std::env::set_current_dir(working_dir)?;
    }

    let mut config = match args.settings {
        Some(ref path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(text) = args.text {
        config.request.payload = text;
    }

    // Nothing is sent if the HTTP client cannot be built
    let transport = match require_transport(HttpTransport::new(config.request.timeout()), &config) {
        Ok(transport) => transport,
        Err(code) => {
            eprintln!("Error initializing HTTP client");
            return Ok(code);
        }
    };

    let store = FileStore::new(&config.files.endpoints);
    let driver = Driver::from_config(store, transport, &config)?;

    match args.command {
        None => {
            let summary = driver.run().await?;
            if summary.empty > 0 {
                eprintln!("Error: no response from {} endpoint(s)", summary.empty);
            }
        }
        Some(Command::Relay { from, to }) => match driver.relay(&from, &to).await {
            Ok(answer) => println!("{}", answer),
            Err(e) => {
                eprintln!("Error: {}", e);
                return Ok(ExitCode::FAILURE);
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
