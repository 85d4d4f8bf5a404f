//! Komando API server binary.
//!
//! Usage:
//!   komando-api --config komando.toml
//!   komando-api --port 8080 --bind 0.0.0.0

use anyhow::{Context, bail};
use komando_api::{AppState, serve};
use komando_coordinator::CoordinatorConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "\
Komando API Server

Usage: komando-api [OPTIONS]

Options:
  -p, --port <PORT>      Port to listen on (default: 8080)
  -b, --bind <ADDR>      Bind address (default: 127.0.0.1, env: KOMANDO_BIND_ADDR)
  -c, --config <FILE>    Path to komando.toml
  -h, --help             Show this help message

Environment variables:
  KOMANDO_BIND_ADDR      Bind address (overridden by --bind)
  KOMANDO_CORS_ORIGINS   CORS allowed origins (comma-separated)
  GEMINI_API_KEY         Gemini credential (API_KEY is also accepted)
  OPENAI_API_KEY         OpenAI credential when provider = \"openai\"
";

#[derive(Debug, Default)]
struct CliArgs {
    port: Option<u16>,
    bind: Option<String>,
    config: Option<String>,
    help: bool,
}

impl CliArgs {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Self::default();
        while let Some(flag) = args.next() {
            let mut value = || {
                args.next()
                    .with_context(|| format!("Missing value for {flag}"))
            };
            match flag.as_str() {
                "--port" | "-p" => {
                    let raw = value()?;
                    parsed.port = Some(
                        raw.parse()
                            .with_context(|| format!("Invalid port number '{raw}'"))?,
                    );
                }
                "--bind" | "-b" => parsed.bind = Some(value()?),
                "--config" | "-c" => parsed.config = Some(value()?),
                "--help" | "-h" => parsed.help = true,
                other => bail!("Unrecognized argument '{other}'\n\n{USAGE}"),
            }
        }
        Ok(parsed)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,komando_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse(std::env::args().skip(1))?;
    if args.help {
        print!("{USAGE}");
        return Ok(());
    }

    let host = args
        .bind
        .or_else(|| std::env::var("KOMANDO_BIND_ADDR").ok())
        .unwrap_or_else(|| "127.0.0.1".to_string());
    if host == "0.0.0.0" {
        tracing::warn!("Listening on all interfaces; put a firewall or reverse proxy in front");
    }

    let cors_origins: Option<Vec<String>> = std::env::var("KOMANDO_CORS_ORIGINS")
        .ok()
        .map(|s| s.split(',').map(|o| o.trim().to_string()).collect());

    let config = match &args.config {
        Some(path) => {
            tracing::info!(path = %path, "Loading configuration");
            CoordinatorConfig::from_file(path)?
        }
        None => CoordinatorConfig::default(),
    };

    let state = AppState::new(&config);
    tracing::info!(
        model = %state.coordinator.classifier_model(),
        latency_ms = config.executor.latency_ms,
        "Coordinator ready"
    );

    let addr: SocketAddr = format!("{}:{}", host, args.port.unwrap_or(8080)).parse()?;
    serve(Arc::new(state), addr, cors_origins).await
}
