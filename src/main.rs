mod render;
mod routes;
mod settings;

use crate::routes::Relay;
use crate::settings::Settings;
use atrium_api::client::AtriumApi;
use atrium_api::scoreboard::ScoreboardExtractor;
use log::{error, info};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args() {
        return Ok(());
    }

    better_panic::install();
    setup_logging();

    let settings = Settings::load()?;
    info!(
        "following entity {} on {} (timeout {:?})",
        settings.entity_id, settings.fixtures_url, settings.timeout
    );

    let relay = Arc::new(Relay::new(
        AtriumApi::new(settings.fixtures_url.clone(), settings.timeout),
        ScoreboardExtractor::new(settings.entity_id.clone()),
    ));

    let (addr, server) = warp::serve(routes::routes(relay))
        .try_bind_with_graceful_shutdown(settings.bind, shutdown_signal())?;

    info!("placar listening on http://{addr}/api/index");
    server.await;

    Ok(())
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server keeps
/// running and must be stopped externally.
async fn shutdown_signal() {
    wait_for_shutdown(tokio::signal::ctrl_c()).await;
}

async fn wait_for_shutdown(signal: impl Future<Output = std::io::Result<()>>) {
    match signal.await {
        Ok(()) => info!("shutdown requested"),
        Err(e) => {
            error!("could not listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

/// `log` records from this crate and warp go through the tracing-subscriber
/// bridge; `RUST_LOG` overrides the default `info` filter.
fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn handle_cli_args() -> bool {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return false;
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            true
        }
        "-V" | "--version" => {
            println!("placar {}", env!("CARGO_PKG_VERSION"));
            true
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

fn usage_text() -> &'static str {
    "placar - live basketball scoreboard relay for broadcast overlays

Usage:
  placar
  placar --help
  placar --version

Endpoints:
  GET  /api/index?competition=<id>             overlay page (polls every 20s)
  GET  /api/placar?competition=<id>[&json=1]   scoreboard as HTML or JSON
  POST /api/placar  {\"competition\": \"<id>\"}

Environment:
  PLACAR_BIND           Listen address (default 0.0.0.0:7071)
  PLACAR_FIXTURES_URL   Atrium fixtures endpoint
  PLACAR_ENTITY_ID      Atrium entity id of the followed team (default SESI Araraquara)
  PLACAR_TIMEOUT_SECS   Upstream request timeout in seconds (default 10)
  RUST_LOG              Log filter (default info)"
}
