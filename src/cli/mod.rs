use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use console::style;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::core::agent::JobAgent;
use crate::core::backend::LoopbackBackend;
use crate::core::bridge::TypeBridge;
use crate::core::registry::AgentRegistry;
use crate::interfaces::web::DispatchServer;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8790;

/// How long a loopback job "runs" before reporting success.
const LOOPBACK_RUN_FOR_SECS: u64 = 5;

fn print_help() {
    println!("\n {}\n", style("emissary: stateless job agent service").bold());
    println!("   {}   Start the dispatch server", style("serve").green());
    println!("           --host <addr>   Bind address (default {DEFAULT_HOST})");
    println!("           --port <port>   Bind port (default {DEFAULT_PORT})");
    println!("   {}    Show this help", style("help").green());
    println!(
        "\n {} {} <command> [flags]\n",
        style("Usage:").bold(),
        style("emissary").green()
    );
}

pub(crate) fn parse_serve_flags(
    args: &[String],
    start: usize,
    mut host: String,
    mut port: u16,
) -> (String, u16) {
    let mut i = start;
    while i < args.len() {
        match args[i].as_str() {
            "--host" => {
                if i + 1 < args.len() {
                    host = args[i + 1].clone();
                    i += 2;
                } else {
                    i += 1;
                }
            }
            "--port" => {
                if i + 1 < args.len() {
                    port = args[i + 1].parse().unwrap_or(DEFAULT_PORT);
                    i += 2;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }
    (host, port)
}

pub async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("serve") => {
            let host = std::env::var("EMISSARY_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
            let port = std::env::var("EMISSARY_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT);
            let (host, port) = parse_serve_flags(&args, 2, host, port);
            serve(host, port).await
        }
        Some("help") | None => {
            print_help();
            Ok(())
        }
        Some(other) => {
            print_help();
            anyhow::bail!("unknown command '{other}'")
        }
    }
}

async fn serve(host: String, port: u16) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    // The registry is built once at startup and read-only afterwards.
    // Real deployments register their backend agents here; out of the box
    // only the loopback agent is available, for smoke-testing dispatch.
    let mut registry = AgentRegistry::new();
    registry.register(Arc::new(JobAgent::new(
        "loopback_task",
        LoopbackBackend::new(Duration::from_secs(LOOPBACK_RUN_FOR_SECS)),
        LoopbackBackend::status_map(),
        TypeBridge::new(LoopbackBackend::native_types()),
    )));

    DispatchServer::new(host, port, Arc::new(registry))
        .run()
        .await
}
