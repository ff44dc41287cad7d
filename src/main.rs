use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let http_port: u16 = std::env::var("KEEPNOTES_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(5000);
    let db_path = std::env::var("KEEPNOTES_DB_PATH").unwrap_or_else(|_| "keepnotes.db".to_string());
    // The signing secret is read exactly once and injected into the token
    // service; nothing else in the process sees it.
    let secret = match std::env::var("KEEPNOTES_SECRET") {
        Ok(s) if !s.is_empty() => s,
        _ => {
            warn!("KEEPNOTES_SECRET is unset; tokens are signed with a development-only secret");
            "keepnotes-dev-secret".to_string()
        }
    };

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "keepnotes",
        "keepnotes starting: RUST_LOG='{}', http_port={}, db_path='{}'",
        rust_log, http_port, db_path
    );

    keepnotes::server::run_with_config(http_port, std::path::Path::new(&db_path), secret.as_bytes())
        .await
}
