use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Submit PDF conversions to a running pdf-relay", long_about = None)]
struct Cli {
    /// Base URL of the relay.
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Conversion option as key=value (repeatable), e.g. -o page_size=A4.
    #[arg(short = 'o', long = "option", value_parser = parse_option)]
    options: Vec<(String, String)>,

    /// Where to write the PDF. Defaults to <document_name|document>.pdf.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the request that would be sent and exit.
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a remote page by URL
    Url { document_url: String },
    /// Convert a local HTML file
    Html { file: PathBuf },
    /// Check relay health
    Health,
}

fn parse_option(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

fn build_payload(mode: &str, document: (&str, String), options: &[(String, String)]) -> Value {
    let mut payload = Map::new();
    payload.insert("mode".into(), Value::from(mode));
    for (key, value) in options {
        if !value.is_empty() {
            payload.insert(key.clone(), Value::from(value.as_str()));
        }
    }
    payload.insert(document.0.into(), Value::from(document.1));
    Value::Object(payload)
}

/// Render the request for display, with inline HTML elided.
fn preview_request(endpoint: &str, payload: &Value) -> Result<String, serde_json::Error> {
    let mut shown = payload.clone();
    if let Some(html) = shown.get_mut("document_html") {
        if html.as_str().is_some_and(|h| !h.is_empty()) {
            *html = Value::from("<html>...");
        }
    }
    Ok(format!("POST {}\n{}", endpoint, serde_json::to_string_pretty(&shown)?))
}

fn output_path(explicit: Option<&Path>, options: &[(String, String)]) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    let name = options
        .iter()
        .rev()
        .find(|(k, v)| k == "document_name" && !v.is_empty())
        .map(|(_, v)| v.as_str())
        .unwrap_or("document");
    PathBuf::from(format!("{}.pdf", name))
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let payload = match &cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", base)).send().await?;
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Url { document_url } => {
            build_payload("url", ("document_url", document_url.trim().to_string()), &cli.options)
        }
        Commands::Html { file } => {
            let html = std::fs::read_to_string(file)?;
            build_payload("html", ("document_html", html.trim().to_string()), &cli.options)
        }
    };

    let endpoint = format!("{}/api/convert", base);
    if cli.dry_run {
        println!("{}", preview_request(&endpoint, &payload)?);
        return Ok(ExitCode::SUCCESS);
    }

    let res = client
        .post(&endpoint)
        .json(&payload)
        .send()
        .await?;

    let status = res.status();
    let content_type = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !status.is_success() || content_type.contains("application/json") {
        let text = res.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| "PDF generation failed.".to_string());
        eprintln!("Error ({}): {}", status, message);
        return Ok(ExitCode::FAILURE);
    }

    let bytes = res.bytes().await?;
    let path = output_path(cli.output.as_deref(), &cli.options);
    std::fs::write(&path, &bytes)?;
    println!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(ExitCode::SUCCESS)
}
