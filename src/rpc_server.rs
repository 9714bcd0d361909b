//! Awesomebar RPC server: JSON-RPC over stdin/stdout for a browser UI process.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"awesomebar.input", "params":{"text":"..."}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//!
//! Diagnostics go to stderr; stdout carries only protocol lines.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use awesomebar::app::App;
use awesomebar::platform;
use awesomebar::rpc_handler::handle_method;

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Simple rate limiter: max requests per second.
struct RateLimiter {
    window_start: Instant,
    request_count: u32,
    max_per_second: u32,
}

impl RateLimiter {
    fn new(max_per_second: u32) -> Self {
        Self { window_start: Instant::now(), request_count: 0, max_per_second }
    }

    /// Returns true if the request is allowed, false if rate-limited.
    fn check(&mut self) -> bool {
        if self.window_start.elapsed().as_secs() >= 1 {
            self.window_start = Instant::now();
            self.request_count = 0;
        }
        self.request_count += 1;
        self.request_count <= self.max_per_second
    }
}

/// `AWESOMEBAR_DATA_DIR` wins over the platform data directory.
fn data_dir() -> PathBuf {
    match std::env::var("AWESOMEBAR_DATA_DIR") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => platform::get_data_dir(),
    }
}

async fn write_line(stdout: &mut tokio::io::Stdout, value: &Value) -> std::io::Result<()> {
    let mut line = value.to_string();
    line.push('\n');
    stdout.write_all(line.as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;
    let db_path = platform::database_path(&dir);
    let app = Mutex::new(App::new(&db_path.to_string_lossy(), None)?);
    tracing::info!(db = %db_path.display(), "awesomebar-rpc starting");

    let mut stdout = tokio::io::stdout();
    write_line(&mut stdout, &json!({"event":"ready","version":env!("CARGO_PKG_VERSION")})).await?;

    let mut rate_limiter = RateLimiter::new(200);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, "unparseable request");
                write_line(&mut stdout, &json!({"id":null,"error":format!("parse error: {}", e)})).await?;
                continue;
            }
        };

        let id = req.get("id").cloned().unwrap_or(Value::Null);

        if !rate_limiter.check() {
            tracing::warn!("rate limit exceeded");
            write_line(&mut stdout, &json!({"id": id, "error": "rate limit exceeded"})).await?;
            continue;
        }

        let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
        let params = req.get("params").cloned().unwrap_or(json!({}));

        let response = match handle_method(&app, method, &params).await {
            Ok(val) => json!({"id": id, "result": val}),
            Err(err) => {
                tracing::debug!(method, error = %err, "request failed");
                json!({"id": id, "error": err})
            }
        };
        write_line(&mut stdout, &response).await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
