//! Snapshot retrieval from the remote gateway
//!
//! One GET per invocation; there is no retry policy and no concurrent
//! fetch deduplication. Library consumers that trigger fetches from
//! multiple tasks should debounce upstream, since a later snapshot simply
//! replaces an earlier one.
//!
//! The body is read as text before JSON parsing so a misconfigured tunnel
//! or proxy answering with an HTML warning page is reported as such
//! instead of as an opaque parse error.

use reqwest::Client;
use tracing::info;

use crate::config::Config;
use crate::error::SnapshotError;
use crate::snapshot::Snapshot;

const SNAPSHOT_PATH: &str = "/historypnldaily";
const EXCERPT_LEN: usize = 200;

/// Build the HTTP client used for snapshot fetches.
pub fn build_client() -> Result<Client, SnapshotError> {
    Client::builder()
        .user_agent("Mozilla/5.0 (compatible; PnlviewBot/1.0)")
        .build()
        .map_err(SnapshotError::Transport)
}

/// Fetch one snapshot from the gateway and ingest it.
///
/// Transport, status, HTML-body and JSON-parse failures are fatal to the
/// fetch cycle; a successfully parsed document never fails ingestion (see
/// `Snapshot::from_value`).
pub async fn fetch_snapshot(config: &Config, client: &Client) -> Result<Snapshot, SnapshotError> {
    let url = format!(
        "{}{}",
        config.backend_url.trim_end_matches('/'),
        SNAPSHOT_PATH
    );
    info!("Fetching snapshot from {}", url);

    let mut request = client.get(&url).header("Content-Type", "application/json");
    // ngrok free tier serves a browser warning page unless this header is set
    if config.backend_url.contains("ngrok") {
        request = request.header("ngrok-skip-browser-warning", "true");
    }

    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(SnapshotError::Status {
            status,
            excerpt: excerpt(&body),
        });
    }

    if looks_like_html(&body) {
        return Err(SnapshotError::HtmlBody {
            excerpt: excerpt(&body),
        });
    }

    let doc: serde_json::Value =
        serde_json::from_str(&body).map_err(|source| SnapshotError::Parse {
            source,
            excerpt: excerpt(&body),
        })?;

    Ok(Snapshot::from_value(&doc))
}

fn looks_like_html(body: &str) -> bool {
    let trimmed = body.trim_start();
    trimmed.starts_with("<!DOCTYPE") || trimmed.starts_with("<html")
}

fn excerpt(body: &str) -> String {
    body.chars().take(EXCERPT_LEN).collect()
}
