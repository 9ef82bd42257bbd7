//! PDF conversion relay.
//!
//! ```text
//!   Browser form / CLI
//!         │  POST /api/convert (JSON)
//!         ▼
//!   ┌──────────────────────────────┐
//!   │  http (axum, request id)     │
//!   │  convert::relay              │──── GET ?access_key&…&document_url
//!   │    credential → validate     │──── POST form access_key&…&document_html
//!   │    → one upstream call       │          │
//!   └──────────────────────────────┘          ▼
//!         ▲                             conversion provider
//!         └──── PDF bytes or {"error": …} ◀───┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use pdf_relay::config::resolve_config;
use pdf_relay::lifecycle::{startup, Shutdown};
use pdf_relay::observability::logging;

#[derive(Parser)]
#[command(name = "pdf-relay")]
#[command(about = "Relay PDF conversion requests to the PDFlayer API", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, env = "PDF_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let config = resolve_config(args.config.as_deref())?;

    logging::init_logging(&config.observability);
    tracing::info!("pdf-relay v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    shutdown.watch_signals();
    startup::run(config, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
