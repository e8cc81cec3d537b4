//! Cloud clipboard server
//!
//! Serve the clipboard HTTP API backed by a single SQLite file.
//!
//! Usage:
//!   cloudclip                                   # Serve on 127.0.0.1:8788
//!   cloudclip --bind 0.0.0.0 --port 9000        # Listen elsewhere
//!   cloudclip --db-path /data/clip.db           # Use another database file

mod http;

use std::env;
use std::path::PathBuf;
use tracing::info;

use cloudclip_core::{ClipService, ServiceConfig};

const DEFAULT_BIND: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8788;

fn print_usage() {
    println!("Cloud Clipboard v0.1.0");
    println!();
    println!("Usage:");
    println!("  cloudclip [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --db-path <PATH>            Database path (default: cloudclip.db)");
    println!("  --bind <ADDR>               Listen address (default: 127.0.0.1)");
    println!("  --port <PORT>               Listen port (default: 8788)");
    println!("  --max-body <SIZE>           Max request body (default: 32MB, e.g., 8MB, 512KB)");
    println!("  --strict-auth               Refuse gated routes when AUTH_PASSWORD is unset");
    println!("  --help, -h                  Show this help");
    println!();
    println!("API Endpoints:");
    println!("  POST   /api/auth            Check password (JSON: password)");
    println!("  GET    /api/settings        Get display settings");
    println!("  POST   /api/settings        Update settings (JSON: appTitle, subTitle)");
    println!("  GET    /api/items           List items (?page=N&limit=M)");
    println!("  POST   /api/items           Create item (multipart form)");
    println!("  DELETE /api/items/:id       Delete item and its files");
    println!("  GET    /api/files/:id       View file inline (header or ?token=)");
    println!("  GET    /api/file/:id        Download file (header or ?token=)");
    println!("  GET    /api/health          Liveness check");
    println!();
    println!("Environment:");
    println!("  AUTH_PASSWORD               Shared password for all gated routes");
    println!("  RUST_LOG                    Set log level (e.g., info, debug)");
}

/// Parse a human-readable size string into bytes (e.g., "32MB", "512KB", "1GB")
fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim().to_uppercase();

    // Find where the number ends and unit begins
    let num_end = s.find(|c: char| !c.is_ascii_digit() && c != '.').unwrap_or(s.len());
    let (num_str, unit) = s.split_at(num_end);

    let num: f64 = num_str.parse().ok()?;

    let multiplier: u64 = match unit.trim() {
        "" | "B" => 1,
        "KB" | "K" => 1024,
        "MB" | "M" => 1024 * 1024,
        "GB" | "G" => 1024 * 1024 * 1024,
        _ => return None,
    };

    Some((num * multiplier as f64) as u64)
}

fn display_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} bytes", bytes)
    }
}

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let show_help = args.iter().any(|a| a == "--help" || a == "-h");
    let strict_auth = args.iter().any(|a| a == "--strict-auth");

    // Parse --db-path
    let db_path: PathBuf = args.windows(2)
        .find(|w| w[0] == "--db-path")
        .map(|w| PathBuf::from(&w[1]))
        .unwrap_or_else(|| PathBuf::from(cloudclip_core::service::core::DEFAULT_DB_PATH));

    // Parse --bind
    let bind: String = args.windows(2)
        .find(|w| w[0] == "--bind")
        .map(|w| w[1].clone())
        .unwrap_or_else(|| DEFAULT_BIND.to_string());

    // Parse --port
    let port: u16 = match args.windows(2).find(|w| w[0] == "--port") {
        Some(w) => match w[1].parse() {
            Ok(p) => p,
            Err(_) => {
                eprintln!("Invalid --port value: {}", w[1]);
                return;
            }
        },
        None => DEFAULT_PORT,
    };

    // Parse --max-body
    let max_body: Option<u64> = args.windows(2)
        .find(|w| w[0] == "--max-body")
        .and_then(|w| {
            parse_size(&w[1]).or_else(|| {
                eprintln!("Invalid --max-body value: {}", w[1]);
                eprintln!("   Expected format: 32MB, 512KB, 1GB, etc.");
                None
            })
        });

    if show_help {
        print_usage();
        return;
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    println!("Cloud Clipboard v0.1.0");
    println!();

    let mut config = ServiceConfig::new().with_db_path(db_path.clone());
    if let Ok(password) = env::var("AUTH_PASSWORD") {
        config = config.with_auth_password(password);
    }
    if strict_auth {
        config = config.with_strict_auth();
    }
    if let Some(bytes) = max_body {
        config = config.with_max_body_bytes(bytes);
    }

    println!("Database: {}", db_path.display());
    println!("Max body: {}", display_size(config.max_body_bytes));

    let service = match ClipService::start(config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to start: {}", e);
            return;
        }
    };

    println!();
    println!("Serving on http://{}:{}", bind, port);
    println!("Press Ctrl+C to stop...");
    println!();

    let server = tokio::spawn(http::run_api_server(service, bind, port));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!();
            info!("Received shutdown signal");
        }
        _ = server => {
            // Only returns if the listener could not be bound
            return;
        }
    }

    println!("Shutting down...");
}
